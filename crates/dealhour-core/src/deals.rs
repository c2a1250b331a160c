//! Domain types that flow through the discovery, enrichment and send stages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::niches::Niche;

/// A bounded search specification consumed once by the deal fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub strategy_id: String,
    pub keywords: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub prefer_free_shipping: bool,
    /// Only the first id is sent upstream; the search API accepts one.
    pub category_ids: Vec<String>,
}

/// One entry of the flattened category directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// `"Top"` or `"Top > Child"`.
    pub path: String,
}

/// The niche a candidate was discovered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicheTag {
    pub name: String,
    pub keywords: Vec<String>,
    pub why: String,
}

impl From<&Niche> for NicheTag {
    fn from(niche: &Niche) -> Self {
        Self {
            name: niche.name.clone(),
            keywords: niche.keywords.clone(),
            why: niche.why.clone(),
        }
    }
}

/// A normalized marketplace search result before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDeal {
    pub item_id: String,
    pub title: String,
    pub item_url: String,
    pub image_url: String,
    pub price: Decimal,
    pub currency: String,
    pub original_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub seller: Option<String>,
    pub seller_feedback_score: Option<i64>,
    pub seller_feedback_percentage: Option<Decimal>,
    pub shipping_type: Option<String>,
    pub shipping_cost: Decimal,
    pub shipping_currency: Option<String>,
    pub condition: Option<String>,
    pub item_location: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub niche: Option<NicheTag>,
}

/// Structured marketing copy for one deal.
///
/// `item_id` correlates the payload with its source candidate; the
/// generative backend is asked to echo it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingCopy {
    #[serde(default)]
    pub item_id: Option<String>,
    pub headline: String,
    pub product_title: String,
    pub price_details: String,
    #[serde(default)]
    pub coupon: Option<String>,
    pub shipping: String,
    pub highlights: Vec<String>,
    pub rating: String,
    pub purchase_link: String,
    pub channel_promotion: String,
    pub hashtags: Vec<String>,
}

/// A queue entry: the candidate fields the sender needs plus its copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDeal {
    pub item_id: String,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub shipping_cost: Decimal,
    pub image_url: String,
    pub item_url: String,
    pub affiliate_url: String,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub niche: Option<NicheTag>,
    #[serde(default)]
    pub enriched: Option<MarketingCopy>,
}

impl EnrichedDeal {
    #[must_use]
    pub fn from_candidate(
        candidate: &CandidateDeal,
        affiliate_url: String,
        copy: MarketingCopy,
    ) -> Self {
        Self {
            item_id: candidate.item_id.clone(),
            title: candidate.title.clone(),
            price: candidate.price,
            currency: candidate.currency.clone(),
            shipping_cost: candidate.shipping_cost,
            image_url: candidate.image_url.clone(),
            item_url: candidate.item_url.clone(),
            affiliate_url,
            seller: candidate.seller.clone(),
            niche: candidate.niche.clone(),
            enriched: Some(copy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enriched_deal_without_copy_deserializes() {
        let json = r#"{
            "itemId": "v1|1|0",
            "title": "Lamp",
            "price": "12.50",
            "currency": "USD",
            "shippingCost": "0",
            "imageUrl": "https://i.ebayimg.com/x.jpg",
            "itemUrl": "https://www.ebay.com/itm/1",
            "affiliateUrl": "https://www.ebay.com/itm/1?campid=1"
        }"#;
        let deal: EnrichedDeal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.item_id, "v1|1|0");
        assert!(deal.enriched.is_none());
        assert!(deal.niche.is_none());
        assert_eq!(deal.price, Decimal::new(1250, 2));
    }

    #[test]
    fn niche_tag_copies_niche_fields() {
        let niche = Niche {
            name: "Pets".to_string(),
            keywords: vec!["cat toys".to_string()],
            categories: vec![],
            audience: "pet_owners".to_string(),
            why: "cheap".to_string(),
        };
        let tag = NicheTag::from(&niche);
        assert_eq!(tag.name, "Pets");
        assert_eq!(tag.keywords, vec!["cat toys".to_string()]);
        assert_eq!(tag.why, "cheap");
    }
}
