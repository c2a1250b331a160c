use dealhour_core::StoreError;
use dealhour_db::DbError;
use dealhour_ebay::EbayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// `TELEGRAM_TOKEN` or `CHANNEL_ID` is not configured.
    #[error("channel credentials missing (set TELEGRAM_TOKEN and CHANNEL_ID)")]
    CredentialsMissing,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("channel rejected the message (HTTP {status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("niche catalog is empty")]
    NoNiches,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ebay(#[from] EbayError),

    #[error(transparent)]
    Db(#[from] DbError),
}
