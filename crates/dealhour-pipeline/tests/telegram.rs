//! Integration tests for `TelegramChannel` against a wiremock Bot API.

use dealhour_pipeline::{ChannelError, TelegramChannel};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn channel(base_url: &str) -> TelegramChannel {
    TelegramChannel::with_base_url(TOKEN, "@deals", 5, base_url)
        .expect("client construction should not fail")
}

fn sent(message_id: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "ok": true,
        "result": { "message_id": message_id, "chat": { "id": -100 } }
    }))
}

fn rejected(description: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "ok": false,
        "error_code": 400,
        "description": description
    }))
}

#[tokio::test]
async fn photo_is_sent_with_caption_and_buy_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendPhoto")))
        .and(body_partial_json(serde_json::json!({
            "chat_id": "@deals",
            "photo": "https://i.ebayimg.com/1.jpg",
            "caption": "<b>Deal</b>",
            "parse_mode": "HTML",
            "reply_markup": { "inline_keyboard": [[{
                "text": "🛒 Buy securely",
                "url": "https://www.ebay.com/itm/1?campid=5"
            }]] }
        })))
        .respond_with(sent(77))
        .expect(1)
        .mount(&server)
        .await;

    let id = channel(&server.uri())
        .send_deal(
            "<b>Deal</b>",
            Some("https://i.ebayimg.com/1.jpg"),
            "https://www.ebay.com/itm/1?campid=5",
        )
        .await
        .unwrap();

    assert_eq!(id, 77);
}

#[tokio::test]
async fn missing_image_and_bad_link_use_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendPhoto")))
        .and(body_partial_json(serde_json::json!({
            "photo": "https://ir.ebaystatic.com/cr/v/c1/ebay-logo-1-1200x630-margin.png",
            "reply_markup": { "inline_keyboard": [[{
                "text": "🛒 Buy securely",
                "url": "https://www.ebay.com"
            }]] }
        })))
        .respond_with(sent(1))
        .expect(1)
        .mount(&server)
        .await;

    let id = channel(&server.uri())
        .send_deal("caption", None, "not-a-link")
        .await
        .unwrap();

    assert_eq!(id, 1);
}

#[tokio::test]
async fn rejected_photo_is_retried_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendPhoto")))
        .respond_with(rejected("Bad Request: wrong type of the web page content for photo"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(serde_json::json!({
            "chat_id": "@deals",
            "text": "caption",
            "parse_mode": "HTML"
        })))
        .respond_with(sent(9))
        .expect(1)
        .mount(&server)
        .await;

    let id = channel(&server.uri())
        .send_deal("caption", Some("https://broken.example/x.jpg"), "https://www.ebay.com/itm/1")
        .await
        .unwrap();

    assert_eq!(id, 9);
}

#[tokio::test]
async fn other_rejections_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendPhoto")))
        .respond_with(rejected("Bad Request: chat not found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(sent(1))
        .expect(0)
        .mount(&server)
        .await;

    let result = channel(&server.uri())
        .send_deal("caption", None, "https://www.ebay.com/itm/1")
        .await;

    assert!(matches!(
        result,
        Err(ChannelError::Rejected { status: 400, ref description }) if description.contains("chat not found")
    ));
}

#[tokio::test]
async fn long_caption_goes_straight_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(sent(3))
        .expect(1)
        .mount(&server)
        .await;

    let caption = "x".repeat(1500);
    let id = channel(&server.uri())
        .send_deal(&caption, None, "https://www.ebay.com/itm/1")
        .await
        .unwrap();

    assert_eq!(id, 3);
}
