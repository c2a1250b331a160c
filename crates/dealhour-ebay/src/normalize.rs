//! Normalization from Browse API item summaries to [`CandidateDeal`].

use std::str::FromStr;

use dealhour_core::CandidateDeal;
use rust_decimal::Decimal;

use crate::types::{Amount, ItemSummary};

/// Hosts whose URLs are tracking redirects rather than item pages.
const REDIRECT_HOSTS: &[&str] = &["rover.ebay", "pulsar.ebay"];

const UNTITLED: &str = "Untitled item";

/// The direct item page for `item_id`.
#[must_use]
pub fn canonical_item_url(item_id: &str) -> String {
    format!("https://www.ebay.com/itm/{item_id}")
}

/// The image-service gallery URL used when an item carries no image.
#[must_use]
pub fn gallery_image_url(item_id: &str) -> String {
    format!("https://i.ebayimg.com/images/g/{item_id}/s-l300.jpg")
}

/// Keep `raw` only if it is an absolute http(s) URL that is not a redirect.
#[must_use]
pub fn resolve_item_url(raw: Option<&str>, item_id: &str) -> String {
    match raw {
        Some(url)
            if url.starts_with("http")
                && !REDIRECT_HOSTS.iter().any(|host| url.contains(host)) =>
        {
            url.to_string()
        }
        _ => {
            tracing::debug!(item_id, "rebuilding item URL from item id");
            canonical_item_url(item_id)
        }
    }
}

fn resolve_image_url(item: &ItemSummary) -> String {
    item.thumbnail_images
        .first()
        .and_then(|image| image.image_url.as_deref())
        .or_else(|| item.image.as_ref().and_then(|image| image.image_url.as_deref()))
        .filter(|url| url.starts_with("http"))
        .map_or_else(|| gallery_image_url(&item.item_id), str::to_string)
}

/// Parse an upstream decimal string, treating garbage as absent.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

fn amount_value(amount: Option<&Amount>) -> Option<Decimal> {
    amount.and_then(|a| parse_decimal(&a.value))
}

/// Normalizes a raw [`ItemSummary`] into a [`CandidateDeal`].
///
/// Missing prices become zero and missing shipping becomes free.
#[must_use]
pub fn normalize_item(item: ItemSummary) -> CandidateDeal {
    let item_url = resolve_item_url(item.item_web_url.as_deref(), &item.item_id);
    let image_url = resolve_image_url(&item);

    let price = amount_value(item.price.as_ref()).unwrap_or_else(|| {
        tracing::debug!(item_id = %item.item_id, "item has no parseable price");
        Decimal::ZERO
    });
    let currency = item
        .price
        .as_ref()
        .and_then(|p| p.currency.clone())
        .unwrap_or_else(|| "USD".to_string());

    let (original_price, discount_percentage) = item
        .marketing_price
        .as_ref()
        .map_or((None, None), |mp| {
            (
                amount_value(mp.original_price.as_ref()),
                mp.discount_percentage.as_deref().and_then(parse_decimal),
            )
        });

    let shipping = item.shipping_options.first();
    let shipping_cost = shipping
        .and_then(|s| amount_value(s.shipping_cost.as_ref()))
        .unwrap_or(Decimal::ZERO);
    let shipping_currency = shipping
        .and_then(|s| s.shipping_cost.as_ref())
        .and_then(|c| c.currency.clone());
    let shipping_type = shipping.and_then(|s| s.shipping_cost_type.clone());

    let (seller, seller_feedback_score, seller_feedback_percentage) =
        item.seller.as_ref().map_or((None, None, None), |s| {
            (
                s.username.clone(),
                s.feedback_score,
                s.feedback_percentage.as_deref().and_then(parse_decimal),
            )
        });

    let category_id = item
        .categories
        .first()
        .map(|c| c.category_id.clone())
        .or_else(|| item.leaf_category_ids.first().cloned());

    CandidateDeal {
        title: item
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        item_url,
        image_url,
        price,
        currency,
        original_price,
        discount_percentage,
        seller,
        seller_feedback_score,
        seller_feedback_percentage,
        shipping_type,
        shipping_cost,
        shipping_currency,
        condition: item.condition,
        item_location: item.item_location.and_then(|l| l.country),
        category_id,
        niche: None,
        item_id: item.item_id,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
