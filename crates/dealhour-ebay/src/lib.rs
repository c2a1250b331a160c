//! eBay marketplace access: OAuth token cache, category directory and the
//! tiered deal search.

pub mod auth;
pub mod categories;
pub mod client;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod types;

pub use auth::{system_clock, Clock, TokenCache};
pub use categories::flatten_category_tree;
pub use client::{EbayClient, EbayClientConfig};
pub use error::EbayError;
pub use filter::{filter_by_shipping, has_reasonable_shipping, select_diverse};
pub use normalize::normalize_item;
