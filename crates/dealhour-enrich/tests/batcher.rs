//! Integration tests for `Batcher` against a wiremock Gemini endpoint.

use dealhour_core::CandidateDeal;
use dealhour_enrich::{Batcher, GeminiClient};
use rust_decimal::Decimal;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn batcher(base_url: &str) -> Batcher {
    let client = GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 5, base_url)
        .expect("client construction should not fail");
    Batcher::new(Some(client), "https://t.me/BestDealsHour")
}

fn deal(id: &str) -> CandidateDeal {
    CandidateDeal {
        item_id: id.to_string(),
        title: format!("Item {id}"),
        item_url: format!("https://www.ebay.com/itm/{id}"),
        image_url: format!("https://i.ebayimg.com/images/g/{id}/s-l300.jpg"),
        price: Decimal::new(1999, 2),
        currency: "USD".to_string(),
        original_price: None,
        discount_percentage: None,
        seller: Some("seller".to_string()),
        seller_feedback_score: Some(10),
        seller_feedback_percentage: Some(Decimal::new(990, 1)),
        shipping_type: None,
        shipping_cost: Decimal::ZERO,
        shipping_currency: None,
        condition: Some("New".to_string()),
        item_location: None,
        category_id: None,
        niche: None,
    }
}

fn reply_with_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

fn entry(id: &str) -> serde_json::Value {
    serde_json::json!({
        "item_id": id,
        "headline": "🎯 Deal Hour | Finds worth grabbing:",
        "product_title": format!("Model copy for {id}"),
        "price_details": "💰 Sale price: 19.99 USD",
        "coupon": "🎁 Coupon: SAVE5",
        "shipping": "📦 Shipping: Free",
        "highlights": ["one", "two", "three"],
        "rating": "⭐ 99%",
        "purchase_link": "🛒 Buy here",
        "channel_promotion": "📲 Join",
        "hashtags": ["#deals"]
    })
}

fn assert_complete(copy: &dealhour_core::MarketingCopy) {
    assert!(!copy.headline.is_empty());
    assert!(!copy.product_title.is_empty());
    assert!(!copy.price_details.is_empty());
    assert!(!copy.shipping.is_empty());
    assert!(!copy.highlights.is_empty());
    assert!(copy.highlights.iter().all(|h| !h.is_empty()));
    assert!(!copy.rating.is_empty());
    assert!(!copy.purchase_link.is_empty());
    assert!(!copy.channel_promotion.is_empty());
    assert!(!copy.hashtags.is_empty());
}

#[tokio::test]
async fn model_copy_is_matched_by_item_id() {
    let server = MockServer::start().await;
    let reply = serde_json::to_string(&vec![entry("b"), entry("a")]).unwrap();
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("\\\"item_id\\\": \\\"a\\\""))
        .respond_with(reply_with_text(&format!("```json\n{reply}\n```")))
        .expect(1)
        .mount(&server)
        .await;

    let copies = batcher(&server.uri()).enrich(&[deal("a"), deal("b")]).await;

    assert_eq!(copies.len(), 2);
    assert_eq!(copies[0].item_id.as_deref(), Some("a"));
    assert_eq!(copies[0].product_title, "Model copy for a");
    assert_eq!(copies[1].product_title, "Model copy for b");
    assert_eq!(copies[1].coupon.as_deref(), Some("🎁 Coupon: SAVE5"));
}

#[tokio::test]
async fn unparseable_reply_falls_back_to_template_for_every_deal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(reply_with_text("Sorry, I can't produce JSON today."))
        .mount(&server)
        .await;

    let deals: Vec<_> = (0..8).map(|i| deal(&format!("d{i}"))).collect();
    let copies = batcher(&server.uri()).enrich(&deals).await;

    assert_eq!(copies.len(), deals.len());
    for (copy, deal) in copies.iter().zip(&deals) {
        assert_eq!(copy.item_id.as_deref(), Some(deal.item_id.as_str()));
        assert_complete(copy);
    }
}

#[tokio::test]
async fn backend_error_falls_back_to_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let copies = batcher(&server.uri()).enrich(&[deal("x")]).await;

    assert_eq!(copies.len(), 1);
    assert_complete(&copies[0]);
    assert_eq!(copies[0].headline, "🎯 Deal Hour | Finds worth grabbing:");
}

#[tokio::test]
async fn invalid_entry_is_replaced_by_template_and_missing_entry_is_skipped() {
    let server = MockServer::start().await;
    let broken = serde_json::json!({ "item_id": "b", "headline": "only a headline" });
    let reply = serde_json::to_string(&vec![entry("a"), broken]).unwrap();
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(reply_with_text(&reply))
        .mount(&server)
        .await;

    let copies = batcher(&server.uri())
        .enrich(&[deal("a"), deal("b"), deal("c")])
        .await;

    let ids: Vec<_> = copies.iter().map(|c| c.item_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("a"), Some("b")]);
    assert_eq!(copies[0].product_title, "Model copy for a");
    assert!(copies[1].product_title.starts_with("Item b"));
    assert_complete(&copies[1]);
}

#[tokio::test]
async fn mistyped_entry_does_not_discard_model_copy_for_the_rest() {
    let server = MockServer::start().await;
    let mut numeric_rating = entry("a");
    numeric_rating["rating"] = serde_json::json!(4.8);
    let mut bad_highlights = entry("b");
    bad_highlights["highlights"] = serde_json::json!({ "first": "one" });
    let reply = serde_json::to_string(&vec![numeric_rating, bad_highlights, entry("c")]).unwrap();
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(reply_with_text(&reply))
        .mount(&server)
        .await;

    let copies = batcher(&server.uri())
        .enrich(&[deal("a"), deal("b"), deal("c")])
        .await;

    assert_eq!(copies.len(), 3);
    assert_eq!(copies[0].product_title, "Model copy for a");
    assert_eq!(copies[0].rating, "4.8");
    assert_eq!(copies[1].item_id.as_deref(), Some("b"));
    assert!(copies[1].product_title.starts_with("Item b"));
    assert_complete(&copies[1]);
    assert_eq!(copies[2].product_title, "Model copy for c");
}
