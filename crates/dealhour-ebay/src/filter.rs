//! Shipping-cost filtering and category-diverse sampling of search results.

use std::collections::HashSet;

use dealhour_core::CandidateDeal;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Shipping may cost at most this fraction of the item price (3%).
const MAX_SHIPPING_RATIO: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

/// Shipping at or below this absolute amount is always acceptable.
const MAX_ABSOLUTE_SHIPPING: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Result sets this small are never thinned by the shipping filter.
const SCARCE_RESULT_COUNT: usize = 10;

/// Keep admitting items until at least this many are accepted.
const MIN_ACCEPTED: usize = 3;

/// Free, at most 3% of a positive price, or at most 8 currency units.
#[must_use]
pub fn has_reasonable_shipping(deal: &CandidateDeal) -> bool {
    let shipping = deal.shipping_cost;
    shipping.is_zero()
        || (deal.price > Decimal::ZERO && shipping <= deal.price * MAX_SHIPPING_RATIO)
        || shipping <= MAX_ABSOLUTE_SHIPPING
}

/// Drops items with expensive shipping, in input order.
///
/// Under scarcity (at most 10 raw items, or fewer than 3 accepted so far)
/// items that fail the thresholds are admitted anyway.
#[must_use]
pub fn filter_by_shipping(items: Vec<CandidateDeal>) -> Vec<CandidateDeal> {
    let scarce = items.len() <= SCARCE_RESULT_COUNT;
    let raw_count = items.len();
    let mut accepted = Vec::with_capacity(raw_count);

    for item in items {
        if has_reasonable_shipping(&item) {
            accepted.push(item);
        } else if scarce || accepted.len() < MIN_ACCEPTED {
            tracing::debug!(
                item_id = %item.item_id,
                shipping = %item.shipping_cost,
                "admitting expensive shipping because results are scarce"
            );
            accepted.push(item);
        }
    }

    let dropped = raw_count - accepted.len();
    if dropped > 0 {
        tracing::info!(dropped, "filtered items with expensive shipping");
    }
    accepted
}

/// Shuffles `items` and picks up to `limit`, first one per distinct
/// category id, then filling remaining slots in shuffled order. No item id
/// is picked twice.
#[must_use]
pub fn select_diverse<R: Rng + ?Sized>(
    mut items: Vec<CandidateDeal>,
    limit: usize,
    rng: &mut R,
) -> Vec<CandidateDeal> {
    items.shuffle(rng);

    let order = pick_order(&items, limit);

    let mut slots: Vec<Option<CandidateDeal>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

fn pick_order(items: &[CandidateDeal], limit: usize) -> Vec<usize> {
    let mut taken = vec![false; items.len()];
    let mut picked_ids: HashSet<&str> = HashSet::new();
    let mut seen_categories: HashSet<Option<&str>> = HashSet::new();
    let mut order = Vec::with_capacity(limit);

    for (idx, item) in items.iter().enumerate() {
        if order.len() >= limit {
            break;
        }
        if picked_ids.contains(item.item_id.as_str()) {
            continue;
        }
        if seen_categories.insert(item.category_id.as_deref()) {
            picked_ids.insert(item.item_id.as_str());
            taken[idx] = true;
            order.push(idx);
        }
    }

    for (idx, item) in items.iter().enumerate() {
        if order.len() >= limit {
            break;
        }
        if !taken[idx] && picked_ids.insert(item.item_id.as_str()) {
            taken[idx] = true;
            order.push(idx);
        }
    }

    order
}
