//! Marketing-copy enrichment for candidate deals.
//!
//! A batch of candidates is sent to a Gemini model as one prompt. The reply
//! is decoded permissively and correlated back to candidates by item id.
//! Whenever the backend is unavailable or its reply cannot be used, a
//! deterministic template fills the same schema, so enrichment never fails.

pub mod batcher;
pub mod decode;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod template;

pub use batcher::Batcher;
pub use error::EnrichError;
pub use gemini::GeminiClient;
pub use template::template_copy;
