//! Response shapes for the identity, Browse and Taxonomy APIs.
//!
//! Only the fields the pipeline reads are modelled. Monetary amounts arrive
//! as decimal strings (`{"value": "12.99", "currency": "USD"}`) and are
//! parsed during normalization, not here.

use serde::{Deserialize, Serialize};

/// `POST /identity/v1/oauth2/token` response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// The persisted token document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    /// Epoch milliseconds, already reduced by the refresh margin.
    pub expires_at: i64,
}

/// `GET /buy/browse/v1/item_summary/search` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub item_summaries: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub item_web_url: Option<String>,
    #[serde(default)]
    pub thumbnail_images: Vec<Image>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub price: Option<Amount>,
    #[serde(default)]
    pub marketing_price: Option<MarketingPrice>,
    #[serde(default)]
    pub seller: Option<Seller>,
    #[serde(default)]
    pub shipping_options: Vec<ShippingOption>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub item_location: Option<ItemLocation>,
    #[serde(default)]
    pub categories: Vec<ItemCategory>,
    #[serde(default)]
    pub leaf_category_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amount {
    pub value: String,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingPrice {
    #[serde(default)]
    pub original_price: Option<Amount>,
    #[serde(default)]
    pub discount_percentage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub feedback_percentage: Option<String>,
    #[serde(default)]
    pub feedback_score: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    #[serde(default)]
    pub shipping_cost_type: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<Amount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemLocation {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCategory {
    pub category_id: String,
}

/// `GET /commerce/taxonomy/v1/get_default_category_tree_id` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeIdResponse {
    pub category_tree_id: String,
}

/// `GET /commerce/taxonomy/v1/category_tree/{id}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeResponse {
    pub root_category_node: CategoryTreeNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeNode {
    pub category: CategoryRef,
    #[serde(default)]
    pub child_category_tree_nodes: Vec<CategoryTreeNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub category_id: String,
    pub category_name: String,
}
