//! Permissive decoding of the model's reply into typed marketing copy.
//!
//! Decoding happens in two steps. [`decode_reply`] turns raw text into
//! loosely typed [`RawCopy`] entries: fences are stripped, the text is
//! parsed as a JSON array, and failing that the first array-shaped
//! substring is parsed. Each element is decoded on its own, so one
//! malformed entry does not discard its siblings. [`RawCopy::into_copy`]
//! then validates one entry against its source deal.

use std::sync::LazyLock;

use dealhour_core::{CandidateDeal, MarketingCopy};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::EnrichError;

static ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\{[\s\S]*\}\s*\]").expect("valid regex"));

const BULLET_PREFIXES: &[char] = &['✨', '•', '-', '*'];

/// A string, or a list of strings; models emit both for list fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn into_lines(self) -> Vec<String> {
        match self {
            Self::Text(text) => text.lines().map(str::to_string).collect(),
            Self::List(items) => items,
        }
    }
}

/// One reply entry before validation. Every field is optional here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCopy {
    #[serde(default, deserialize_with = "lenient_text")]
    pub item_id: Option<String>,
    #[serde(default, alias = "title", deserialize_with = "lenient_text")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price_details: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub coupon: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub shipping: Option<String>,
    #[serde(default)]
    pub highlights: Option<TextOrList>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub purchase_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub channel_promotion: Option<String>,
    #[serde(default)]
    pub hashtags: Option<TextOrList>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts a string, number or bool for a text field; anything else is
/// treated as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// Decodes one array element. An element that still fails keeps only its
/// `item_id`, so it correlates to its deal and fails validation there.
fn decode_entry(value: Value) -> RawCopy {
    let item_id = value.get("item_id").cloned().and_then(scalar_text);
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, item_id = ?item_id, "reply entry has an unexpected shape");
        RawCopy {
            item_id,
            ..RawCopy::default()
        }
    })
}

/// Removes Markdown code fences such as ```` ```json ````.
#[must_use]
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Decodes a model reply into raw entries.
///
/// # Errors
///
/// Returns [`EnrichError::Parse`] if no non-empty JSON array of objects can
/// be recovered from `text`.
pub fn decode_reply(text: &str) -> Result<Vec<RawCopy>, EnrichError> {
    let cleaned = strip_fences(text);

    let values = match serde_json::from_str::<Vec<Value>>(&cleaned) {
        Ok(entries) => entries,
        Err(direct_err) => {
            tracing::debug!(error = %direct_err, "reply is not a bare JSON array; extracting");
            let Some(found) = ARRAY_RE.find(&cleaned) else {
                return Err(EnrichError::Parse(format!(
                    "no JSON array in reply ({direct_err})"
                )));
            };
            serde_json::from_str::<Vec<Value>>(found.as_str())
                .map_err(|e| EnrichError::Parse(e.to_string()))?
        }
    };

    if values.is_empty() {
        return Err(EnrichError::Parse("reply array is empty".to_string()));
    }
    Ok(values.into_iter().map(decode_entry).collect())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, EnrichError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(EnrichError::MissingField { field })
}

fn clean_bullet(line: &str) -> String {
    line.trim()
        .trim_start_matches(BULLET_PREFIXES)
        .trim()
        .trim_end_matches('.')
        .trim()
        .to_string()
}

fn clean_hashtag(tag: &str) -> Option<String> {
    let tag: String = tag.trim().trim_start_matches('#').split_whitespace().collect();
    (!tag.is_empty()).then(|| format!("#{tag}"))
}

impl RawCopy {
    /// Validates this entry for `deal`.
    ///
    /// Text fields the sender prints must be present and non-blank.
    /// Purchase link and channel promotion default from the deal and
    /// `promo_url`; an empty coupon becomes `None`. At most three highlights
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MissingField`] naming the first absent field.
    pub fn into_copy(
        self,
        deal: &CandidateDeal,
        promo_url: &str,
    ) -> Result<MarketingCopy, EnrichError> {
        let highlights: Vec<String> = self
            .highlights
            .map(TextOrList::into_lines)
            .unwrap_or_default()
            .iter()
            .map(|line| clean_bullet(line))
            .filter(|line| !line.is_empty())
            .take(3)
            .collect();
        if highlights.is_empty() {
            return Err(EnrichError::MissingField {
                field: "highlights",
            });
        }

        let hashtags: Vec<String> = match self.hashtags {
            Some(TextOrList::Text(text)) => {
                text.split_whitespace().filter_map(clean_hashtag).collect()
            }
            Some(TextOrList::List(tags)) => tags.iter().filter_map(|t| clean_hashtag(t)).collect(),
            None => Vec::new(),
        };

        Ok(MarketingCopy {
            item_id: Some(deal.item_id.clone()),
            headline: required(self.headline, "headline")?,
            product_title: required(self.product_title, "product_title")?,
            price_details: required(self.price_details, "price_details")?,
            coupon: self
                .coupon
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            shipping: required(self.shipping, "shipping")?,
            highlights,
            rating: required(self.rating, "rating")?,
            purchase_link: self
                .purchase_link
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| format!("🛒 Buy here: {}", deal.item_url)),
            channel_promotion: self
                .channel_promotion
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| crate::template::channel_promotion(promo_url)),
            hashtags,
        })
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
