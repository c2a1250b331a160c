use thiserror::Error;

/// Failures inside the enrichment path. [`crate::Batcher::enrich`] recovers
/// from every one of them with the template fallback.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generative backend returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("generative backend returned no text")]
    EmptyResponse,

    #[error("could not parse a JSON array from the reply: {0}")]
    Parse(String),

    #[error("reply entry is missing required field `{field}`")]
    MissingField { field: &'static str },
}
