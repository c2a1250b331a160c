//! Deterministic marketing copy built from raw deal fields.

use dealhour_core::{CandidateDeal, MarketingCopy};
use rust_decimal::{Decimal, RoundingStrategy};

const HEADLINE: &str = "🎯 Deal Hour | Finds worth grabbing:";
pub(crate) const DEFAULT_CATEGORY: &str = "Practical finds";
pub(crate) const DEFAULT_RELEVANCE: &str = "Great value compared to local prices";
const DEFAULT_DISCOUNT_PERCENT: i64 = 20;
const ESTIMATED_DELIVERY: &str = "14-21";
const TITLE_LIMIT: usize = 50;

/// Footer that points readers at the channel.
#[must_use]
pub fn channel_promotion(promo_url: &str) -> String {
    format!("📲 More deals and discounts on our channel:\n{promo_url}")
}

/// Renders an amount: whole shekels with `₪` for ILS, otherwise two
/// decimals followed by the currency code.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    if currency.eq_ignore_ascii_case("ILS") {
        let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("{whole} ₪")
    } else {
        let cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{cents:.2} {currency}")
    }
}

/// Shipping cost in the shipping currency, or the item currency when the
/// listing does not name one.
#[must_use]
pub fn format_shipping(deal: &CandidateDeal) -> String {
    format_amount(
        deal.shipping_cost,
        deal.shipping_currency.as_deref().unwrap_or(&deal.currency),
    )
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let short: String = title.chars().take(TITLE_LIMIT).collect();
        format!("{}...", short.trim_end())
    } else {
        title.to_string()
    }
}

fn category_hashtag(category: &str) -> String {
    let tag: String = category
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    format!("#{tag}")
}

/// Builds copy for `deal` without any model involvement.
///
/// Without an original price the deal is presented as 20% off an original
/// of `price * 1.2`. Delivery is estimated at 14-21 days.
#[must_use]
pub fn template_copy(deal: &CandidateDeal, promo_url: &str) -> MarketingCopy {
    let category = deal
        .niche
        .as_ref()
        .map_or(DEFAULT_CATEGORY, |n| n.name.as_str());
    let relevance = deal
        .niche
        .as_ref()
        .map(|n| n.why.trim())
        .filter(|why| !why.is_empty())
        .unwrap_or(DEFAULT_RELEVANCE);

    let price = format_amount(deal.price, &deal.currency);
    let original = format_amount(
        deal.original_price
            .unwrap_or_else(|| deal.price * Decimal::new(12, 1)),
        &deal.currency,
    );
    let discount = deal
        .discount_percentage
        .map_or_else(|| Decimal::from(DEFAULT_DISCOUNT_PERCENT), |d| d.normalize());

    let shipping_cost = if deal.shipping_cost.is_zero() {
        "Free! 🤩".to_string()
    } else {
        format_shipping(deal)
    };

    let rating = match (deal.seller_feedback_percentage, deal.seller_feedback_score) {
        (Some(pct), Some(score)) => {
            format!("⭐ {}% positive seller feedback ({score}+ ratings)", pct.normalize())
        }
        (Some(pct), None) => format!("⭐ {}% positive seller feedback", pct.normalize()),
        (None, Some(score)) if score > 0 => format!("⭐ Seller feedback score {score}"),
        _ => "⭐ No rating yet".to_string(),
    };

    MarketingCopy {
        item_id: Some(deal.item_id.clone()),
        headline: HEADLINE.to_string(),
        product_title: format!("{} - {category}", truncate_title(&deal.title)),
        price_details: format!("💰 Sale price: {price}\nInstead of {original}\n🔥 {discount}% off!"),
        coupon: None,
        shipping: format!(
            "📦 Shipping: {shipping_cost}. Estimated delivery: {ESTIMATED_DELIVERY} days."
        ),
        highlights: vec![
            format!("Quality pick from {category}"),
            relevance.trim_end_matches('.').to_string(),
            "Ships internationally".to_string(),
        ],
        rating,
        purchase_link: format!("🛒 Buy here: {}", deal.item_url),
        channel_promotion: channel_promotion(promo_url),
        hashtags: vec![
            category_hashtag(category),
            "#deals".to_string(),
            "#bargains".to_string(),
            "#ebayfinds".to_string(),
            "#shipsworldwide".to_string(),
        ],
    }
}
