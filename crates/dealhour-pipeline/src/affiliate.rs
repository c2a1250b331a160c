//! eBay Partner Network tracking links.

use std::sync::Arc;

use chrono::Utc;
use dealhour_core::store::AFFILIATE_LOG_KEY;
use dealhour_core::DocumentStore;
use dealhour_ebay::normalize::canonical_item_url;

pub const DEFAULT_CAMPAIGN_ID: &str = "5339105864";
const HOMEPAGE: &str = "https://www.ebay.com";
const LOG_CAPACITY: usize = 50;

/// Builds tracking links and keeps a short rolling log of what it built.
pub struct AffiliateLinker {
    campaign_id: String,
    store: Arc<dyn DocumentStore>,
}

impl AffiliateLinker {
    /// `campaign_id` falls back to [`DEFAULT_CAMPAIGN_ID`] when `None` or blank.
    #[must_use]
    pub fn new(campaign_id: Option<&str>, store: Arc<dyn DocumentStore>) -> Self {
        let campaign_id = campaign_id
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CAMPAIGN_ID)
            .to_string();
        Self { campaign_id, store }
    }

    #[must_use]
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// Returns the tracking link for an item. Never fails.
    ///
    /// Without an item id the URL is returned untouched, or the marketplace
    /// homepage when the URL is missing too. A missing or non-absolute URL is
    /// replaced by the canonical item URL.
    pub fn build_link(&self, item_url: Option<&str>, item_id: Option<&str>) -> String {
        let item_id = item_id.map(str::trim).filter(|id| !id.is_empty());
        let Some(item_id) = item_id else {
            return item_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(HOMEPAGE)
                .to_string();
        };

        let base = match item_url.map(str::trim) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.to_string()
            }
            _ => {
                tracing::debug!(item_id, "item URL missing or not absolute; using canonical URL");
                canonical_item_url(item_id)
            }
        };

        let separator = if base.contains('?') { '&' } else { '?' };
        let link = format!(
            "{base}{separator}mkevt=1&mkcid=1&mkrid=711-53200-19255-0&campid={}&toolid=10001&customid=telegram_bot",
            self.campaign_id
        );

        self.record(item_id, &base, &link);
        link
    }

    fn record(&self, item_id: &str, original: &str, link: &str) {
        let entry = format!(
            "[{}] ItemID: {item_id}\nOriginal: {original}\nAffiliate: {link}",
            Utc::now().to_rfc3339()
        );
        let existing = match self.store.read(AFFILIATE_LOG_KEY) {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                tracing::debug!(error = %e, "affiliate log unreadable; starting fresh");
                String::new()
            }
        };
        if let Err(e) = self.store.replace(AFFILIATE_LOG_KEY, &prepend_entry(&existing, &entry)) {
            tracing::debug!(error = %e, "failed to write affiliate log");
        }
    }
}

fn prepend_entry(existing: &str, entry: &str) -> String {
    let kept: Vec<&str> = std::iter::once(entry)
        .chain(
            existing
                .split("\n\n")
                .map(str::trim)
                .filter(|e| !e.is_empty()),
        )
        .take(LOG_CAPACITY)
        .collect();
    format!("{}\n\n", kept.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use dealhour_core::MemoryStore;

    use super::*;

    fn linker() -> (AffiliateLinker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (AffiliateLinker::new(Some("42"), store.clone()), store)
    }

    #[test]
    fn plain_url_gets_question_mark() {
        let (linker, _) = linker();
        let link = linker.build_link(Some("https://www.ebay.com/itm/123"), Some("123"));
        assert!(link.starts_with("https://www.ebay.com/itm/123?"));
        assert!(link.contains("campid=42"));
        assert!(link.ends_with("&toolid=10001&customid=telegram_bot"));
    }

    #[test]
    fn url_with_query_gets_ampersand() {
        let (linker, _) = linker();
        let link = linker.build_link(Some("https://www.ebay.com/itm/123?var=1"), Some("123"));
        assert!(link.starts_with("https://www.ebay.com/itm/123?var=1&mkevt=1"));
    }

    #[test]
    fn relative_or_missing_url_is_rebuilt_from_id() {
        let (linker, _) = linker();
        for url in [None, Some("/itm/9"), Some("")] {
            let link = linker.build_link(url, Some("9"));
            assert!(link.starts_with("https://www.ebay.com/itm/9?mkevt=1"), "{link}");
        }
    }

    #[test]
    fn missing_id_returns_url_or_homepage() {
        let (linker, store) = linker();
        assert_eq!(
            linker.build_link(Some("https://example.com/x"), None),
            "https://example.com/x"
        );
        assert_eq!(linker.build_link(None, None), "https://www.ebay.com");
        assert!(store.read(AFFILIATE_LOG_KEY).unwrap().is_none());
    }

    #[test]
    fn blank_campaign_uses_default() {
        let linker = AffiliateLinker::new(Some("  "), Arc::new(MemoryStore::new()));
        assert_eq!(linker.campaign_id(), DEFAULT_CAMPAIGN_ID);
    }

    #[test]
    fn log_keeps_newest_fifty_entries() {
        let (linker, store) = linker();
        for i in 0..55 {
            linker.build_link(None, Some(&i.to_string()));
        }

        let log = store.read(AFFILIATE_LOG_KEY).unwrap().unwrap();
        let entries: Vec<&str> = log.split("\n\n").filter(|e| !e.is_empty()).collect();
        assert_eq!(entries.len(), LOG_CAPACITY);
        assert!(entries[0].contains("ItemID: 54"));
        assert!(entries[49].contains("ItemID: 5\n"));
    }

    #[test]
    fn log_failure_does_not_break_link() {
        let linker = AffiliateLinker::new(None, Arc::new(MemoryStore::rejecting_writes()));
        let link = linker.build_link(Some("https://www.ebay.com/itm/1"), Some("1"));
        assert!(link.contains("campid=5339105864"));
    }
}
