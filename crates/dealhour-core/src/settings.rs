//! Send-window settings shared with the dashboard.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{load_json, save_json, DocumentStore, StoreError, SETTINGS_KEY};

/// Decoding is per field: a missing or malformed field takes its default
/// while the fields that are present and valid are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSettings")]
pub struct Settings {
    pub send_enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

#[derive(Deserialize)]
struct RawSettings {
    #[serde(default)]
    send_enabled: Option<Value>,
    #[serde(default)]
    start_hour: Option<Value>,
    #[serde(default)]
    end_hour: Option<Value>,
}

fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn hour(value: Option<&Value>) -> Option<u32> {
    let hour = match value? {
        Value::Number(n) => n.as_u64().and_then(|h| u32::try_from(h).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (hour <= 23).then_some(hour)
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let defaults = Self::default();
        Self {
            send_enabled: flag(raw.send_enabled.as_ref()).unwrap_or(defaults.send_enabled),
            start_hour: hour(raw.start_hour.as_ref()).unwrap_or(defaults.start_hour),
            end_hour: hour(raw.end_hour.as_ref()).unwrap_or(defaults.end_hour),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            send_enabled: true,
            start_hour: 9,
            end_hour: 21,
        }
    }
}

impl Settings {
    /// Whether `hour` (0-23) falls in the inclusive send window.
    #[must_use]
    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }
}

/// Read settings, falling back to [`Settings::default`] when the document is
/// absent or unreadable.
#[must_use]
pub fn load_settings(store: &dyn DocumentStore) -> Settings {
    match load_json::<Settings>(store, SETTINGS_KEY) {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            tracing::info!("settings document not found; using defaults");
            Settings::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read settings; using defaults");
            Settings::default()
        }
    }
}

/// Persist settings.
///
/// # Errors
///
/// Returns [`StoreError`] if the document cannot be written.
pub fn save_settings(store: &dyn DocumentStore, settings: &Settings) -> Result<(), StoreError> {
    save_json(store, SETTINGS_KEY, settings)
}
