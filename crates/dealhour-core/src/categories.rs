//! The flattened category directory snapshot.

use crate::deals::Category;
use crate::store::{load_json, save_json, DocumentStore, StoreError, CATEGORIES_KEY};

/// Read the category snapshot. An absent snapshot is an empty directory.
///
/// # Errors
///
/// Returns [`StoreError`] if the document exists but cannot be read or decoded.
pub fn load_categories(store: &dyn DocumentStore) -> Result<Vec<Category>, StoreError> {
    Ok(load_json(store, CATEGORIES_KEY)?.unwrap_or_default())
}

/// Replace the category snapshot wholesale.
///
/// # Errors
///
/// Returns [`StoreError`] if the document cannot be written.
pub fn save_categories(store: &dyn DocumentStore, categories: &[Category]) -> Result<(), StoreError> {
    save_json(store, CATEGORIES_KEY, categories)
}
