//! The persisted FIFO of enriched deals awaiting distribution.
//!
//! Generation replaces the queue wholesale; draining rewrites the remainder.
//! Nothing appends.

use crate::deals::EnrichedDeal;
use crate::store::{load_json, save_json, DocumentStore, StoreError, QUEUE_KEY};

/// Load the queue. `Ok(None)` means no queue document exists.
///
/// # Errors
///
/// Returns [`StoreError`] if the document cannot be read or decoded.
pub fn load_queue(store: &dyn DocumentStore) -> Result<Option<Vec<EnrichedDeal>>, StoreError> {
    load_json(store, QUEUE_KEY)
}

/// Replace the queue with `deals`.
///
/// # Errors
///
/// Returns [`StoreError`] if the document cannot be written.
pub fn replace_queue(store: &dyn DocumentStore, deals: &[EnrichedDeal]) -> Result<(), StoreError> {
    save_json(store, QUEUE_KEY, deals)
}

/// Reset the queue to an empty list. Safe when no queue exists yet.
///
/// # Errors
///
/// Returns [`StoreError`] if the document cannot be written.
pub fn clear_queue(store: &dyn DocumentStore) -> Result<(), StoreError> {
    replace_queue(store, &[])
}
