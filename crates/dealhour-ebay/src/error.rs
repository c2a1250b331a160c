use dealhour_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EbayError {
    /// `EBAY_CLIENT_ID` or `EBAY_CLIENT_SECRET` is not configured.
    #[error("eBay API credentials missing (set EBAY_CLIENT_ID and EBAY_CLIENT_SECRET)")]
    CredentialsMissing,

    /// The identity endpoint rejected the client credentials.
    #[error("eBay rejected the client credentials (HTTP {status}): {body}")]
    UpstreamAuth { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
