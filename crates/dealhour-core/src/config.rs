use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let request_timeout_secs = parse_u64("DEALHOUR_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEALHOUR_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        ebay_client_id: optional("EBAY_CLIENT_ID"),
        ebay_client_secret: optional("EBAY_CLIENT_SECRET"),
        ebay_scope: or_default("EBAY_SCOPE", "https://api.ebay.com/oauth/api_scope"),
        ebay_marketplace_id: or_default("EBAY_MARKETPLACE_ID", "EBAY_US"),
        ebay_api_base_url: or_default("EBAY_API_BASE_URL", "https://api.ebay.com"),
        ebay_end_user_context: or_default(
            "EBAY_END_USER_CONTEXT",
            "contextualLocation=country=IL,currency=ILS",
        ),
        gemini_api_key: optional("GEMINI_API_KEY"),
        gemini_model: or_default("GEMINI_MODEL", "gemini-2.0-flash"),
        gemini_api_base_url: or_default(
            "GEMINI_API_BASE_URL",
            "https://generativelanguage.googleapis.com",
        ),
        telegram_token: optional("TELEGRAM_TOKEN"),
        telegram_channel_id: optional("CHANNEL_ID"),
        telegram_api_base_url: or_default("TELEGRAM_API_BASE_URL", "https://api.telegram.org"),
        epn_campaign_id: optional("EPN_CAMPAIGN_ID"),
        data_dir: PathBuf::from(or_default("DEALHOUR_DATA_DIR", "./data")),
        database_url: or_default("DATABASE_URL", "sqlite://database.sqlite?mode=rwc"),
        niches_path: PathBuf::from(or_default("DEALHOUR_NICHES_PATH", "./config/niches.yaml")),
        log_level: or_default("DEALHOUR_LOG_LEVEL", "info"),
        request_timeout_secs,
        generate_cron: or_default("DEALHOUR_GENERATE_CRON", "0 45 8 * * *"),
        send_cron: or_default("DEALHOUR_SEND_CRON", "0 0 9-21 * * *"),
        channel_promo_url: or_default("DEALHOUR_CHANNEL_PROMO_URL", "https://t.me/BestDealsHour"),
    })
}
