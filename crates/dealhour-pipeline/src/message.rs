//! Telegram caption rendering.

use dealhour_core::MarketingCopy;
use dealhour_enrich::template::channel_promotion;

const PURCHASE_CTA: &str = "🛒 Buy on eBay";

/// Escapes the characters Telegram's HTML parse mode treats as markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the fixed caption layout for one deal.
///
/// Blocks are separated by blank lines; the coupon line appears only when
/// the copy has one. The purchase call-to-action and the promo footer are
/// fixed and do not come from the copy.
#[must_use]
pub fn render_caption(copy: &MarketingCopy, promo_url: &str) -> String {
    let mut price_block = vec![escape_html(&copy.price_details)];
    if let Some(coupon) = copy.coupon.as_deref().filter(|c| !c.trim().is_empty()) {
        price_block.push(escape_html(coupon));
    }
    price_block.push(escape_html(&copy.shipping));

    let highlights: Vec<String> = copy
        .highlights
        .iter()
        .map(|h| format!("✨ {}", escape_html(h)))
        .collect();

    let sections = [
        format!(
            "<b>{}</b>\n{}",
            escape_html(&copy.headline),
            escape_html(&copy.product_title)
        ),
        price_block.join("\n"),
        format!("{}\n{}", highlights.join("\n"), escape_html(&copy.rating)),
        PURCHASE_CTA.to_string(),
        escape_html(&copy.hashtags.join(" ")),
        escape_html(&channel_promotion(promo_url)),
    ];

    sections.join("\n\n")
}
