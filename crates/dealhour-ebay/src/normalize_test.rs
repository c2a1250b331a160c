use rust_decimal::Decimal;

use super::*;

fn item_from_json(value: serde_json::Value) -> ItemSummary {
    serde_json::from_value(value).expect("fixture should deserialize")
}

#[test]
fn rover_url_is_rewritten_to_canonical_item_page() {
    let item = item_from_json(serde_json::json!({
        "itemId": "v1|1234|0",
        "title": "Desk lamp",
        "itemWebUrl": "https://rover.ebay.com/rover/1/711-53200-19255-0/1?ff3=2",
        "price": { "value": "12.00", "currency": "USD" }
    }));

    let deal = normalize_item(item);

    assert_eq!(deal.item_url, "https://www.ebay.com/itm/v1|1234|0");
}

#[test]
fn pulsar_and_relative_urls_are_rewritten() {
    assert_eq!(
        resolve_item_url(Some("https://pulsar.ebay.com/x"), "9"),
        "https://www.ebay.com/itm/9"
    );
    assert_eq!(resolve_item_url(Some("/itm/9"), "9"), "https://www.ebay.com/itm/9");
    assert_eq!(resolve_item_url(None, "9"), "https://www.ebay.com/itm/9");
}

#[test]
fn direct_url_is_kept() {
    assert_eq!(
        resolve_item_url(Some("https://www.ebay.com/itm/555"), "555"),
        "https://www.ebay.com/itm/555"
    );
}

#[test]
fn item_without_images_gets_gallery_url() {
    let item = item_from_json(serde_json::json!({
        "itemId": "777",
        "title": "No pictures",
        "price": { "value": "5.00", "currency": "USD" }
    }));

    let deal = normalize_item(item);

    assert_eq!(deal.image_url, "https://i.ebayimg.com/images/g/777/s-l300.jpg");
}

#[test]
fn thumbnail_is_preferred_over_primary_image() {
    let item = item_from_json(serde_json::json!({
        "itemId": "1",
        "thumbnailImages": [{ "imageUrl": "https://i.ebayimg.com/thumb.jpg" }],
        "image": { "imageUrl": "https://i.ebayimg.com/main.jpg" }
    }));
    assert_eq!(normalize_item(item).image_url, "https://i.ebayimg.com/thumb.jpg");

    let item = item_from_json(serde_json::json!({
        "itemId": "1",
        "image": { "imageUrl": "https://i.ebayimg.com/main.jpg" }
    }));
    assert_eq!(normalize_item(item).image_url, "https://i.ebayimg.com/main.jpg");
}

#[test]
fn prices_and_shipping_are_parsed() {
    let item = item_from_json(serde_json::json!({
        "itemId": "42",
        "title": "Tent",
        "price": { "value": "39.99", "currency": "ILS" },
        "marketingPrice": {
            "originalPrice": { "value": "49.99", "currency": "ILS" },
            "discountPercentage": "20"
        },
        "seller": { "username": "campco", "feedbackPercentage": "99.4", "feedbackScore": 1500 },
        "shippingOptions": [{
            "shippingCostType": "FIXED",
            "shippingCost": { "value": "4.50", "currency": "ILS" }
        }],
        "condition": "New",
        "itemLocation": { "country": "US" },
        "categories": [{ "categoryId": "179010" }]
    }));

    let deal = normalize_item(item);

    assert_eq!(deal.price, Decimal::new(3999, 2));
    assert_eq!(deal.currency, "ILS");
    assert_eq!(deal.original_price, Some(Decimal::new(4999, 2)));
    assert_eq!(deal.discount_percentage, Some(Decimal::new(20, 0)));
    assert_eq!(deal.shipping_cost, Decimal::new(450, 2));
    assert_eq!(deal.shipping_currency.as_deref(), Some("ILS"));
    assert_eq!(deal.shipping_type.as_deref(), Some("FIXED"));
    assert_eq!(deal.seller.as_deref(), Some("campco"));
    assert_eq!(deal.seller_feedback_score, Some(1500));
    assert_eq!(deal.seller_feedback_percentage, Some(Decimal::new(994, 1)));
    assert_eq!(deal.item_location.as_deref(), Some("US"));
    assert_eq!(deal.category_id.as_deref(), Some("179010"));
}

#[test]
fn missing_shipping_defaults_to_free() {
    let item = item_from_json(serde_json::json!({
        "itemId": "1",
        "price": { "value": "10.00", "currency": "USD" }
    }));

    let deal = normalize_item(item);

    assert_eq!(deal.shipping_cost, Decimal::ZERO);
    assert_eq!(deal.title, "Untitled item");
}
