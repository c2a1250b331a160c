use dealhour_core::CandidateDeal;
use serde::Serialize;

use crate::template::{format_amount, format_shipping, DEFAULT_CATEGORY, DEFAULT_RELEVANCE};

/// The per-deal facts handed to the model.
#[derive(Serialize)]
struct PromptDeal<'a> {
    item_id: &'a str,
    title: &'a str,
    price: String,
    currency: &'a str,
    original_price: Option<String>,
    discount_percentage: Option<String>,
    seller: Option<&'a str>,
    seller_feedback_percentage: Option<String>,
    seller_feedback_score: Option<i64>,
    shipping: String,
    url: &'a str,
    category: &'a str,
    relevance: &'a str,
}

impl<'a> From<&'a CandidateDeal> for PromptDeal<'a> {
    fn from(deal: &'a CandidateDeal) -> Self {
        Self {
            item_id: &deal.item_id,
            title: &deal.title,
            price: format_amount(deal.price, &deal.currency),
            currency: &deal.currency,
            original_price: deal
                .original_price
                .map(|p| format_amount(p, &deal.currency)),
            discount_percentage: deal.discount_percentage.map(|d| d.to_string()),
            seller: deal.seller.as_deref(),
            seller_feedback_percentage: deal.seller_feedback_percentage.map(|p| p.to_string()),
            seller_feedback_score: deal.seller_feedback_score,
            shipping: if deal.shipping_cost.is_zero() {
                "Free".to_string()
            } else {
                format_shipping(deal)
            },
            url: &deal.item_url,
            category: deal
                .niche
                .as_ref()
                .map_or(DEFAULT_CATEGORY, |n| n.name.as_str()),
            relevance: deal
                .niche
                .as_ref()
                .map_or(DEFAULT_RELEVANCE, |n| n.why.as_str()),
        }
    }
}

/// Builds the single prompt for a batch of deals.
///
/// The reply is requested as a JSON array with one object per deal that
/// echoes the deal's `item_id`.
#[must_use]
pub fn build_prompt(deals: &[CandidateDeal], promo_url: &str) -> String {
    let facts: Vec<PromptDeal<'_>> = deals.iter().map(PromptDeal::from).collect();
    let facts_json = serde_json::to_string_pretty(&facts).unwrap_or_else(|_| "[]".to_string());

    format!(
        r##"Below is a list of eBay products. Each product has a category and a short note on why it is relevant to our channel's audience.
Write short, upbeat marketing copy for every product.

Rules:
1. Reply with a JSON array only, one object per product, in the same order as the input.
2. Copy each product's "item_id" into its object unchanged.
3. Show prices and shipping exactly as given; do not convert or reformat amounts.
4. Work the category and relevance note into the copy.
5. "highlights" is an array of exactly 3 short selling points.
6. "hashtags" is an array of 3-5 hashtags, including one for the category.
7. Use the real discount percentage when present; otherwise estimate a fair one.
8. Every field is required. Do not rename fields.

Schema:
[
  {{
    "item_id": "<item_id from the input>",
    "headline": "🎯 Deal Hour | Finds worth grabbing:",
    "product_title": "short catchy product title",
    "price_details": "💰 Sale price: {{sale_price}}\nInstead of {{original_price}}\n🔥 {{discount}}% off!",
    "coupon": "🎁 Coupon: {{coupon_code}} or empty string",
    "shipping": "📦 Shipping: {{shipping_cost}}. Estimated delivery: {{estimated_days}} days.",
    "highlights": ["{{feature1}}", "{{feature2}}", "{{feature3}}"],
    "rating": "⭐ {{rating}} ({{reviews}} ratings)",
    "purchase_link": "🛒 Buy here: {{purchase_url}}",
    "channel_promotion": "📲 More deals and discounts on our channel:\n{promo_url}",
    "hashtags": ["#tag1", "#tag2", "#tag3"]
  }}
]

Products:
{facts_json}
"##
    )
}

#[cfg(test)]
mod tests {
    use dealhour_core::NicheTag;
    use rust_decimal::Decimal;

    use super::*;

    fn deal() -> CandidateDeal {
        CandidateDeal {
            item_id: "v1|42|0".to_string(),
            title: "Ceramic pour-over set".to_string(),
            item_url: "https://www.ebay.com/itm/42".to_string(),
            image_url: "https://i.ebayimg.com/42.jpg".to_string(),
            price: Decimal::new(1899, 2),
            currency: "USD".to_string(),
            original_price: None,
            discount_percentage: None,
            seller: Some("brewhaus".to_string()),
            seller_feedback_score: Some(812),
            seller_feedback_percentage: None,
            shipping_type: None,
            shipping_cost: Decimal::ZERO,
            shipping_currency: None,
            condition: Some("New".to_string()),
            item_location: None,
            category_id: None,
            niche: Some(NicheTag {
                name: "Kitchen and baking".to_string(),
                keywords: vec!["coffee accessories".to_string()],
                why: "Clever kitchen gadgets".to_string(),
            }),
        }
    }

    #[test]
    fn prompt_carries_item_ids_and_niche_rationale() {
        let prompt = build_prompt(&[deal()], "https://t.me/example");

        assert!(prompt.contains("\"item_id\": \"v1|42|0\""));
        assert!(prompt.contains("Kitchen and baking"));
        assert!(prompt.contains("Clever kitchen gadgets"));
        assert!(prompt.contains("18.99 USD"));
        assert!(prompt.contains("https://t.me/example"));
    }

    #[test]
    fn prompt_without_niche_uses_generic_category() {
        let mut d = deal();
        d.niche = None;
        let prompt = build_prompt(&[d], "https://t.me/example");
        assert!(prompt.contains(DEFAULT_CATEGORY));
        assert!(prompt.contains(DEFAULT_RELEVANCE));
    }

    #[test]
    fn ils_amounts_match_template_formatting() {
        let mut d = deal();
        d.currency = "ILS".to_string();
        d.price = Decimal::new(2550, 2);
        d.original_price = Some(Decimal::new(3990, 2));
        d.shipping_cost = Decimal::new(1249, 2);
        let prompt = build_prompt(&[d], "https://t.me/example");

        assert!(prompt.contains("\"price\": \"26 ₪\""));
        assert!(prompt.contains("\"original_price\": \"40 ₪\""));
        assert!(prompt.contains("\"shipping\": \"12 ₪\""));
        assert!(!prompt.contains("25.50"));
    }

    #[test]
    fn free_shipping_is_spelled_out() {
        let prompt = build_prompt(&[deal()], "https://t.me/example");
        assert!(prompt.contains("\"shipping\": \"Free\""));
    }
}
