use std::path::PathBuf;

/// Runtime configuration assembled from environment variables.
///
/// Credentials are optional here; the components that need them report a
/// typed error at call time instead of refusing to start.
#[derive(Clone)]
pub struct AppConfig {
    pub ebay_client_id: Option<String>,
    pub ebay_client_secret: Option<String>,
    pub ebay_scope: String,
    pub ebay_marketplace_id: String,
    pub ebay_api_base_url: String,
    pub ebay_end_user_context: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base_url: String,
    pub telegram_token: Option<String>,
    pub telegram_channel_id: Option<String>,
    pub telegram_api_base_url: String,
    pub epn_campaign_id: Option<String>,
    pub data_dir: PathBuf,
    pub database_url: String,
    pub niches_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub generate_cron: String,
    pub send_cron: String,
    pub channel_promo_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "ebay_client_id",
                &self.ebay_client_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "ebay_client_secret",
                &self.ebay_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("ebay_scope", &self.ebay_scope)
            .field("ebay_marketplace_id", &self.ebay_marketplace_id)
            .field("ebay_api_base_url", &self.ebay_api_base_url)
            .field("ebay_end_user_context", &self.ebay_end_user_context)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base_url", &self.gemini_api_base_url)
            .field(
                "telegram_token",
                &self.telegram_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_channel_id", &self.telegram_channel_id)
            .field("telegram_api_base_url", &self.telegram_api_base_url)
            .field("epn_campaign_id", &self.epn_campaign_id)
            .field("data_dir", &self.data_dir)
            .field("database_url", &"[redacted]")
            .field("niches_path", &self.niches_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("generate_cron", &self.generate_cron)
            .field("send_cron", &self.send_cron)
            .field("channel_promo_url", &self.channel_promo_url)
            .finish()
    }
}
