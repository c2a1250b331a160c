//! Drains the head of the deal queue to the channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Timelike};
use dealhour_core::{load_queue, load_settings, replace_queue, DocumentStore, EnrichedDeal};
use dealhour_db::DbError;

use crate::error::PipelineError;
use crate::message::render_caption;
use crate::traits::{Channel, Ledger};

#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Queue entries consumed per run.
    pub batch_size: usize,
    pub post_pause: Duration,
    pub promo_url: String,
}

impl SenderConfig {
    #[must_use]
    pub fn new(promo_url: impl Into<String>) -> Self {
        Self {
            batch_size: 3,
            post_pause: Duration::from_secs(5),
            promo_url: promo_url.into(),
        }
    }
}

pub struct QueueSender {
    channel: Arc<dyn Channel>,
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn DocumentStore>,
    config: SenderConfig,
}

impl QueueSender {
    #[must_use]
    pub fn new(
        channel: Arc<dyn Channel>,
        ledger: Arc<dyn Ledger>,
        store: Arc<dyn DocumentStore>,
        config: SenderConfig,
    ) -> Self {
        Self {
            channel,
            ledger,
            store,
            config,
        }
    }

    /// Drains one batch using the local wall-clock hour.
    pub async fn drain(&self) -> usize {
        self.drain_at(Local::now().hour()).await
    }

    /// Drains one batch as if the local hour were `hour`. Returns the number
    /// of deals posted; queue failures are logged and count as zero.
    pub async fn drain_at(&self, hour: u32) -> usize {
        match self.try_drain_at(hour).await {
            Ok(posted) => posted,
            Err(e) => {
                tracing::error!(error = %e, "send run failed");
                0
            }
        }
    }

    /// Drains one batch as if the local hour were `hour` and returns the
    /// number of deals posted.
    ///
    /// Does nothing when sending is disabled, `hour` is outside the
    /// configured window, or the queue is absent or empty. Otherwise the
    /// first `batch_size` entries are attempted in order and then removed
    /// from the queue whether or not their post succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the queue cannot be read or the
    /// remainder cannot be written back.
    pub async fn try_drain_at(&self, hour: u32) -> Result<usize, PipelineError> {
        let settings = load_settings(self.store.as_ref());
        if !settings.send_enabled {
            tracing::info!("sending disabled in settings; skipping run");
            return Ok(0);
        }
        if !settings.contains_hour(hour) {
            tracing::info!(
                hour,
                start = settings.start_hour,
                end = settings.end_hour,
                "outside send window; skipping run"
            );
            return Ok(0);
        }

        let queue = match load_queue(self.store.as_ref())? {
            Some(queue) if !queue.is_empty() => queue,
            _ => {
                tracing::info!("deal queue is empty; nothing to send");
                return Ok(0);
            }
        };

        let take = self.config.batch_size.min(queue.len());
        tracing::info!(queued = queue.len(), sending = take, "draining deal queue");

        let mut posted = 0;
        for (n, deal) in queue[..take].iter().enumerate() {
            let Some(attempted) = self.send_one(deal).await else {
                continue;
            };
            if attempted {
                posted += 1;
            }
            if n + 1 < take {
                tokio::time::sleep(self.config.post_pause).await;
            }
        }

        let remaining = &queue[take..];
        replace_queue(self.store.as_ref(), remaining)?;
        tracing::info!(posted, remaining = remaining.len(), "send run complete");
        Ok(posted)
    }

    /// `None` if the deal was skipped without a post attempt, otherwise
    /// whether the post succeeded.
    async fn send_one(&self, deal: &EnrichedDeal) -> Option<bool> {
        let Some(copy) = &deal.enriched else {
            tracing::warn!(item_id = %deal.item_id, "deal has no marketing copy; skipping");
            return None;
        };

        let caption = render_caption(copy, &self.config.promo_url);
        let image = Some(deal.image_url.as_str()).filter(|u| !u.is_empty());
        match self.channel.post(&caption, image, &deal.affiliate_url).await {
            Ok(message_id) => {
                tracing::info!(item_id = %deal.item_id, message_id, "deal posted");
            }
            Err(e) => {
                tracing::error!(item_id = %deal.item_id, error = %e, "failed to post deal");
                return Some(false);
            }
        }

        match self.ledger.mark_sent(&deal.item_id, &deal.title).await {
            Ok(()) => {}
            Err(PipelineError::Db(DbError::AlreadySent { item_id })) => {
                tracing::info!(item_id = %item_id, "deal was already recorded as sent");
            }
            Err(e) => {
                tracing::error!(item_id = %deal.item_id, error = %e, "failed to record sent deal");
            }
        }
        Some(true)
    }
}
