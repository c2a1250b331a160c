//! Collaborator seams for the generator and the sender.
//!
//! Production wiring uses the eBay client, the enrichment batcher, the
//! Telegram channel and the SQLite ledger; tests substitute stubs.

use async_trait::async_trait;
use dealhour_core::{CandidateDeal, MarketingCopy, Strategy};
use dealhour_ebay::EbayClient;
use dealhour_enrich::Batcher;
use sqlx::SqlitePool;

use crate::error::{ChannelError, PipelineError};
use crate::telegram::TelegramChannel;

/// Produces candidate deals for one strategy.
#[async_trait]
pub trait DealSource: Send + Sync {
    async fn fetch_deals(&self, strategy: &Strategy) -> Result<Vec<CandidateDeal>, PipelineError>;
}

/// Produces marketing copy for a batch of candidates.
///
/// Implementations never fail; every returned copy carries the `item_id` of
/// its candidate, and candidates with no usable copy are left out.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, deals: &[CandidateDeal]) -> Vec<MarketingCopy>;
}

/// Publishes one rendered deal. Returns the channel's message id.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn post(
        &self,
        caption: &str,
        image_url: Option<&str>,
        link: &str,
    ) -> Result<i64, ChannelError>;
}

/// Durable record of distributed items.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Records `item_id` as sent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Db`] wrapping `DbError::AlreadySent` when the
    /// item was recorded before.
    async fn mark_sent(&self, item_id: &str, title: &str) -> Result<(), PipelineError>;
}

#[async_trait]
impl DealSource for EbayClient {
    async fn fetch_deals(&self, strategy: &Strategy) -> Result<Vec<CandidateDeal>, PipelineError> {
        Ok(EbayClient::fetch_deals(self, strategy).await?)
    }
}

#[async_trait]
impl Enricher for Batcher {
    async fn enrich(&self, deals: &[CandidateDeal]) -> Vec<MarketingCopy> {
        Batcher::enrich(self, deals).await
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn post(
        &self,
        caption: &str,
        image_url: Option<&str>,
        link: &str,
    ) -> Result<i64, ChannelError> {
        self.send_deal(caption, image_url, link).await
    }
}

#[async_trait]
impl Ledger for SqlitePool {
    async fn mark_sent(&self, item_id: &str, title: &str) -> Result<(), PipelineError> {
        Ok(dealhour_db::mark_sent(self, item_id, title).await?)
    }
}
