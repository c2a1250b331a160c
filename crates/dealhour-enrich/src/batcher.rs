//! Batch enrichment with per-item correlation and template fallback.

use dealhour_core::{CandidateDeal, MarketingCopy};

use crate::decode::{decode_reply, RawCopy};
use crate::gemini::GeminiClient;
use crate::prompt::build_prompt;
use crate::template::template_copy;

pub struct Batcher {
    backend: Option<GeminiClient>,
    promo_url: String,
}

impl Batcher {
    /// A batcher that asks `backend` for copy. `None` always uses the template.
    #[must_use]
    pub fn new(backend: Option<GeminiClient>, promo_url: impl Into<String>) -> Self {
        Self {
            backend,
            promo_url: promo_url.into(),
        }
    }

    /// Produces marketing copy for `deals`, never failing.
    ///
    /// Every returned copy carries the `item_id` of the deal it belongs to
    /// and the result is in input order. When the backend fails or its reply
    /// cannot be decoded, every deal gets template copy. When the reply is
    /// usable, entries are matched to deals by `item_id`, falling back to
    /// position for entries without one; a matched entry that fails
    /// validation is replaced by template copy, and deals with no matching
    /// entry are left out.
    pub async fn enrich(&self, deals: &[CandidateDeal]) -> Vec<MarketingCopy> {
        if deals.is_empty() {
            return Vec::new();
        }

        let Some(backend) = &self.backend else {
            tracing::info!(count = deals.len(), "no generative backend configured; using template copy");
            return self.template_all(deals);
        };

        let prompt = build_prompt(deals, &self.promo_url);
        let reply = match backend.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "generative backend failed; using template copy");
                return self.template_all(deals);
            }
        };

        let entries = match decode_reply(&reply) {
            Ok(entries) => entries,
            Err(e) => {
                let preview: String = reply.chars().take(200).collect();
                tracing::warn!(error = %e, reply = %preview, "unusable reply; using template copy");
                return self.template_all(deals);
            }
        };

        correlate(deals, entries)
            .into_iter()
            .zip(deals)
            .filter_map(|(entry, deal)| {
                let Some(raw) = entry else {
                    tracing::warn!(item_id = %deal.item_id, "no reply entry for deal; skipping");
                    return None;
                };
                Some(raw.into_copy(deal, &self.promo_url).unwrap_or_else(|e| {
                    tracing::warn!(item_id = %deal.item_id, error = %e, "invalid reply entry; using template copy");
                    template_copy(deal, &self.promo_url)
                }))
            })
            .collect()
    }

    fn template_all(&self, deals: &[CandidateDeal]) -> Vec<MarketingCopy> {
        deals
            .iter()
            .map(|deal| template_copy(deal, &self.promo_url))
            .collect()
    }
}

/// Assigns reply entries to deals.
///
/// Entries naming a known `item_id` claim that deal. Entries without an id
/// claim the deal at their own position if it is still free. Entries naming
/// an unknown id, or duplicating a claim, are dropped.
pub(crate) fn correlate(deals: &[CandidateDeal], entries: Vec<RawCopy>) -> Vec<Option<RawCopy>> {
    let mut slots: Vec<Option<RawCopy>> = vec![None; deals.len()];
    let mut positional = Vec::new();

    for (pos, entry) in entries.into_iter().enumerate() {
        let id = entry
            .item_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        match id {
            Some(id) => match deals.iter().position(|d| d.item_id == id) {
                Some(idx) if slots[idx].is_none() => slots[idx] = Some(entry),
                Some(_) => tracing::debug!(item_id = %id, "duplicate reply entry dropped"),
                None => tracing::warn!(item_id = %id, "reply entry names an unknown item; dropped"),
            },
            None => positional.push((pos, entry)),
        }
    }

    for (pos, entry) in positional {
        match slots.get_mut(pos) {
            Some(slot) if slot.is_none() => *slot = Some(entry),
            _ => tracing::debug!(position = pos, "positional reply entry has no free deal; dropped"),
        }
    }

    slots
}
