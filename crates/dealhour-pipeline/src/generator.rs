//! Daily deal generation: niche sweep, enrichment in batches, queue replace.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use dealhour_core::{
    clear_queue, replace_queue, CandidateDeal, DocumentStore, EnrichedDeal, MarketingCopy, Niche,
    NicheTag,
};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

use crate::affiliate::AffiliateLinker;
use crate::error::PipelineError;
use crate::strategy::strategy_for_niche;
use crate::traits::{DealSource, Enricher};

/// Knobs for one generation run. [`Default`] is the production schedule.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Niches swept first.
    pub niches_per_run: usize,
    /// Extra niches drawn from the unused pool when the target is missed.
    pub extra_niches: usize,
    pub deals_per_niche: usize,
    /// Daily supply ceiling.
    pub target_deals: usize,
    pub batch_size: usize,
    pub batch_pause: Duration,
    pub max_shipping_cost: Decimal,
    /// Runs persisting fewer deals than this log a warning.
    pub low_yield_threshold: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            niches_per_run: 13,
            extra_niches: 5,
            deals_per_niche: 5,
            target_deals: 39,
            batch_size: 13,
            batch_pause: Duration::from_secs(2),
            max_shipping_cost: Decimal::from(10),
            low_yield_threshold: 5,
        }
    }
}

pub struct DailyGenerator {
    source: Arc<dyn DealSource>,
    enricher: Arc<dyn Enricher>,
    linker: AffiliateLinker,
    store: Arc<dyn DocumentStore>,
    niches: Vec<Niche>,
    config: GeneratorConfig,
}

impl DailyGenerator {
    #[must_use]
    pub fn new(
        source: Arc<dyn DealSource>,
        enricher: Arc<dyn Enricher>,
        linker: AffiliateLinker,
        store: Arc<dyn DocumentStore>,
        niches: Vec<Niche>,
    ) -> Self {
        Self {
            source,
            enricher,
            linker,
            store,
            niches,
            config: GeneratorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one generation pass. Returns `true` iff at least one enriched
    /// deal was persisted; failures are logged.
    pub async fn run(&self) -> bool {
        match self.try_run().await {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::error!(error = %e, "generation run failed");
                false
            }
        }
    }

    /// Runs one generation pass and returns the number of deals persisted.
    ///
    /// The queue is reset first. Niches are swept one at a time; a niche
    /// whose fetch fails contributes nothing and the run continues. An empty
    /// result leaves the reset queue as is and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoNiches`] if the catalog is empty, or
    /// [`PipelineError::Store`] if the finished queue cannot be written.
    pub async fn try_run(&self) -> Result<usize, PipelineError> {
        if let Err(e) = clear_queue(self.store.as_ref()) {
            tracing::error!(error = %e, "failed to reset deal queue before generation");
        }

        if self.niches.is_empty() {
            return Err(PipelineError::NoNiches);
        }

        let order = self.niche_order();
        let split = self.config.niches_per_run.min(order.len());
        let (primary, unused) = order.split_at(split);
        tracing::info!(
            catalog = self.niches.len(),
            selected = primary.len(),
            "starting daily deal generation"
        );

        let mut pool = Vec::new();
        let mut seen = HashSet::new();
        for (n, &idx) in primary.iter().enumerate() {
            let niche = &self.niches[idx];
            tracing::info!(niche = %niche.name, position = n + 1, of = primary.len(), "sweeping niche");
            let found = self.collect_niche(niche).await;
            push_unique(&mut pool, &mut seen, found);
        }

        if pool.len() < self.config.target_deals {
            tracing::warn!(
                collected = pool.len(),
                target = self.config.target_deals,
                "below target; sweeping extra niches"
            );
            for &idx in unused.iter().take(self.config.extra_niches) {
                let niche = &self.niches[idx];
                tracing::info!(niche = %niche.name, "sweeping extra niche");
                let found = self.collect_niche(niche).await;
                push_unique(&mut pool, &mut seen, found);
                if pool.len() >= self.config.target_deals {
                    break;
                }
            }
        }

        pool.shuffle(&mut rand::rng());
        pool.truncate(self.config.target_deals);
        tracing::info!(count = pool.len(), "candidates selected for enrichment");

        let enriched = self.enrich_all(&pool).await;
        self.persist(&enriched)
    }

    fn niche_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.niches.len()).collect();
        order.shuffle(&mut rand::rng());
        order
    }

    async fn collect_niche(&self, niche: &Niche) -> Vec<CandidateDeal> {
        let strategy = strategy_for_niche(niche);
        let found = match self.source.fetch_deals(&strategy).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(niche = %niche.name, error = %e, "fetch failed; skipping niche");
                return Vec::new();
            }
        };
        if found.is_empty() {
            tracing::info!(niche = %niche.name, "no deals found for niche");
            return Vec::new();
        }

        let fetched = found.len();
        let mut affordable: Vec<CandidateDeal> = found
            .into_iter()
            .filter(|d| d.shipping_cost <= self.config.max_shipping_cost)
            .collect();
        affordable.shuffle(&mut rand::rng());
        affordable.truncate(self.config.deals_per_niche);
        tracing::info!(
            niche = %niche.name,
            fetched,
            kept = affordable.len(),
            "niche deals collected"
        );

        let tag = NicheTag::from(niche);
        affordable
            .into_iter()
            .map(|mut deal| {
                deal.niche = Some(tag.clone());
                deal
            })
            .collect()
    }

    async fn enrich_all(&self, pool: &[CandidateDeal]) -> Vec<EnrichedDeal> {
        let batch_size = self.config.batch_size.max(1);
        let batches = pool.len().div_ceil(batch_size);
        let mut enriched = Vec::with_capacity(pool.len());

        for (n, batch) in pool.chunks(batch_size).enumerate() {
            tracing::info!(batch = n + 1, of = batches, size = batch.len(), "enriching batch");
            let copies = self.enricher.enrich(batch).await;
            let before = enriched.len();
            enriched.extend(self.attach(batch, copies));
            tracing::info!(
                batch = n + 1,
                enriched = enriched.len() - before,
                "batch enriched"
            );

            if n + 1 < batches {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }
        enriched
    }

    /// Pairs each candidate with the copy carrying its `item_id`. Candidates
    /// without copy are dropped.
    fn attach(&self, batch: &[CandidateDeal], copies: Vec<MarketingCopy>) -> Vec<EnrichedDeal> {
        let mut by_id: HashMap<String, MarketingCopy> = HashMap::with_capacity(copies.len());
        for copy in copies {
            match copy.item_id.clone() {
                Some(id) => {
                    by_id.entry(id).or_insert(copy);
                }
                None => tracing::warn!("enrichment returned copy without item_id; dropped"),
            }
        }

        batch
            .iter()
            .filter_map(|deal| {
                let Some(copy) = by_id.remove(&deal.item_id) else {
                    tracing::warn!(item_id = %deal.item_id, "no copy for deal; skipping");
                    return None;
                };
                let link = self
                    .linker
                    .build_link(Some(&deal.item_url), Some(&deal.item_id));
                Some(EnrichedDeal::from_candidate(deal, link, copy))
            })
            .collect()
    }

    fn persist(&self, enriched: &[EnrichedDeal]) -> Result<usize, PipelineError> {
        if enriched.is_empty() {
            tracing::error!("no deals were enriched; queue not written");
            return Ok(0);
        }

        replace_queue(self.store.as_ref(), enriched)?;

        tracing::info!(count = enriched.len(), "deal queue persisted");
        if enriched.len() < self.config.low_yield_threshold {
            tracing::warn!(
                count = enriched.len(),
                "generation produced very few deals; check the eBay and enrichment upstreams"
            );
        }
        Ok(enriched.len())
    }
}

fn push_unique(pool: &mut Vec<CandidateDeal>, seen: &mut HashSet<String>, found: Vec<CandidateDeal>) {
    for deal in found {
        if seen.insert(deal.item_id.clone()) {
            pool.push(deal);
        } else {
            tracing::debug!(item_id = %deal.item_id, "duplicate item across niches; dropped");
        }
    }
}
