//! HTTP client for the eBay Browse and Taxonomy APIs.
//!
//! One [`EbayClient`] owns the token cache and the document store used for
//! the token and category snapshot. Use [`EbayClientConfig::from_app_config`]
//! for production or set `base_url` to a mock server in tests.

use std::sync::Arc;
use std::time::Duration;

use dealhour_core::{save_categories, AppConfig, CandidateDeal, Category, DocumentStore, Strategy};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::auth::{Clock, TokenCache};
use crate::categories::flatten_category_tree;
use crate::error::EbayError;
use crate::filter::{filter_by_shipping, select_diverse};
use crate::normalize::normalize_item;
use crate::types::{CategoryTreeIdResponse, CategoryTreeResponse, ItemSummary, SearchResponse};

const SEARCH_LIMIT: u32 = 50;
const MAX_DEALS_PER_STRATEGY: usize = 5;
const CONDITION_FILTER: &str = "conditions:{NEW|OPEN_BOX}";

#[derive(Debug, Clone)]
pub struct EbayClientConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: String,
    pub marketplace_id: String,
    pub end_user_context: String,
    pub timeout_secs: u64,
}

impl EbayClientConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.ebay_api_base_url.clone(),
            client_id: config.ebay_client_id.clone(),
            client_secret: config.ebay_client_secret.clone(),
            scope: config.ebay_scope.clone(),
            marketplace_id: config.ebay_marketplace_id.clone(),
            end_user_context: config.ebay_end_user_context.clone(),
            timeout_secs: config.request_timeout_secs,
        }
    }
}

pub struct EbayClient {
    client: Client,
    base_url: String,
    marketplace_id: String,
    end_user_context: String,
    tokens: TokenCache,
    store: Arc<dyn DocumentStore>,
}

impl EbayClient {
    /// # Errors
    ///
    /// Returns [`EbayError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: EbayClientConfig, store: Arc<dyn DocumentStore>) -> Result<Self, EbayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dealhour/0.1 (deal-discovery)")
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let tokens = TokenCache::new(
            client.clone(),
            &base_url,
            config.client_id,
            config.client_secret,
            config.scope,
            Arc::clone(&store),
        );

        Ok(Self {
            client,
            base_url,
            marketplace_id: config.marketplace_id,
            end_user_context: config.end_user_context,
            tokens,
            store,
        })
    }

    /// Replace the token cache clock, for deterministic expiry tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.tokens = self.tokens.with_clock(clock);
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Fetches up to five candidate deals for `strategy`.
    ///
    /// Query tiers run from most to least specific and stop at the first
    /// tier with results. A failing tier is logged and the next one tried;
    /// the error surfaces only when no tier completed. Zero results across
    /// all tiers is an empty list, never placeholder data.
    ///
    /// # Errors
    ///
    /// - Any token error from [`TokenCache::access_token`].
    /// - The last search error when every tier failed.
    pub async fn fetch_deals(&self, strategy: &Strategy) -> Result<Vec<CandidateDeal>, EbayError> {
        tracing::info!(
            strategy = %strategy.strategy_id,
            keywords = %strategy.keywords.join(", "),
            "searching eBay"
        );
        let token = self.tokens.access_token().await?;

        let mut items: Vec<ItemSummary> = Vec::new();
        let mut any_tier_completed = false;
        let mut last_error = None;

        for (tier, query) in query_tiers(&strategy.keywords).iter().enumerate() {
            let params = search_params(strategy, query, tier == 0);
            match self.search(&token, &params).await {
                Ok(found) if !found.is_empty() => {
                    tracing::info!(query = %query, count = found.len(), "found items");
                    items = found;
                    break;
                }
                Ok(_) => {
                    any_tier_completed = true;
                    tracing::info!(query = %query, "no items for query tier");
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "search tier failed");
                    last_error = Some(e);
                }
            }
        }

        if items.is_empty() {
            if let (false, Some(e)) = (any_tier_completed, last_error) {
                return Err(e);
            }
            tracing::info!(strategy = %strategy.strategy_id, "no items found in any query tier");
            return Ok(Vec::new());
        }

        let candidates = items.into_iter().map(normalize_item).collect();
        let accepted = filter_by_shipping(candidates);
        Ok(select_diverse(
            accepted,
            MAX_DEALS_PER_STRATEGY,
            &mut rand::rng(),
        ))
    }

    /// Refreshes the category directory from the marketplace's default
    /// tree and replaces the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EbayError`] on token, transport or decode failure, or
    /// [`EbayError::Store`] if the snapshot cannot be written.
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, EbayError> {
        let token = self.tokens.access_token().await?;

        let tree_id_url = format!(
            "{}/commerce/taxonomy/v1/get_default_category_tree_id",
            self.base_url
        );
        let tree_id: CategoryTreeIdResponse = self
            .get_json(
                &tree_id_url,
                &token,
                &[("marketplace_id", self.marketplace_id.as_str())],
                "get_default_category_tree_id",
            )
            .await?;

        let tree_url = format!(
            "{}/commerce/taxonomy/v1/category_tree/{}",
            self.base_url, tree_id.category_tree_id
        );
        let tree: CategoryTreeResponse = self
            .get_json(&tree_url, &token, &[], "category_tree")
            .await?;

        let categories = flatten_category_tree(&tree.root_category_node);
        save_categories(self.store.as_ref(), &categories)?;
        tracing::info!(count = categories.len(), "saved category snapshot");
        Ok(categories)
    }

    async fn search(
        &self,
        token: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<ItemSummary>, EbayError> {
        let url = format!("{}/buy/browse/v1/item_summary/search", self.base_url);
        let query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let response: SearchResponse = self
            .get_json(&url, token, &query, "item_summary/search")
            .await?;
        Ok(response.item_summaries)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, EbayError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("X-EBAY-C-MARKETPLACE-ID", &self.marketplace_id)
            .header("X-EBAY-C-ENDUSERCTX", &self.end_user_context)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EbayError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| EbayError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

/// All keywords, then the first two, then the first alone. Repeated queries
/// are kept; a repeat runs without the free-shipping filter.
pub(crate) fn query_tiers(keywords: &[String]) -> Vec<String> {
    let mut tiers = Vec::with_capacity(3);
    tiers.push(keywords.join(" "));
    if keywords.len() >= 2 {
        tiers.push(keywords[..2].join(" "));
    }
    if let Some(first) = keywords.first() {
        tiers.push(first.clone());
    }
    tiers.retain(|query| !query.trim().is_empty());
    tiers
}

/// Query parameters for one search tier. Only the first tier asks for free
/// shipping; later tiers relax it.
pub(crate) fn search_params(
    strategy: &Strategy,
    query: &str,
    first_tier: bool,
) -> Vec<(&'static str, String)> {
    let mut filters = Vec::new();
    if let Some(max) = strategy.max_price {
        filters.push(format!("price:[..{max}]"));
    }
    if let Some(min) = strategy.min_price {
        filters.push(format!("price:[{min}..]"));
    }
    if strategy.prefer_free_shipping && first_tier {
        filters.push("freeShipping:true".to_string());
    }
    filters.push(CONDITION_FILTER.to_string());

    let mut params = vec![
        ("q", query.to_string()),
        ("limit", SEARCH_LIMIT.to_string()),
        ("sort", "bestMatch".to_string()),
        ("filter", filters.join(",")),
    ];
    if let Some(category_id) = strategy.category_ids.first() {
        params.push(("category_ids", category_id.clone()));
    }
    params
}
