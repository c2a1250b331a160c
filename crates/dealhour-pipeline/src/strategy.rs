//! Search strategies built from the niche catalog.

use dealhour_core::{Category, Niche, Strategy};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use rust_decimal::Decimal;

const MIN_NICHES: usize = 3;
const MAX_NICHES: usize = 5;
const MAX_KEYWORDS: usize = 6;
const MAX_CATEGORY_IDS: usize = 5;
const FREE_SHIPPING_PROBABILITY: f64 = 0.7;

const NICHE_MIN_PRICE: i64 = 3;
const NICHE_MAX_PRICE: i64 = 40;

/// A mixed-audience strategy drawn from 3 to 5 random niches.
///
/// Each chosen niche contributes one or two of its keywords, capped at six
/// overall. Category ids come from the snapshot entries whose path contains
/// one of the chosen niches' category fragments (case-insensitive), capped
/// at five. Price bounds and the free-shipping preference are randomized.
pub fn random_strategy<R: Rng + ?Sized>(
    niches: &[Niche],
    categories: &[Category],
    rng: &mut R,
) -> Strategy {
    let wanted = rng.random_range(MIN_NICHES..=MAX_NICHES);
    let chosen: Vec<&Niche> = niches.choose_multiple(rng, wanted).collect();

    let mut keywords = Vec::new();
    for niche in &chosen {
        let mut pool: Vec<&String> = niche
            .keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .collect();
        pool.shuffle(rng);
        let take: usize = rng.random_range(1..=2);
        keywords.extend(pool.into_iter().take(take).cloned());
    }
    keywords.truncate(MAX_KEYWORDS);

    let category_ids = match_categories(&chosen, categories);

    let max_price: i64 = rng.random_range(10..=39);
    let min_price: i64 = rng.random_range(1..=5);

    Strategy {
        strategy_id: "audience_mix".to_string(),
        keywords,
        min_price: Some(Decimal::from(min_price)),
        max_price: Some(Decimal::from(max_price)),
        prefer_free_shipping: rng.random_bool(FREE_SHIPPING_PROBABILITY),
        category_ids,
    }
}

fn match_categories(niches: &[&Niche], categories: &[Category]) -> Vec<String> {
    let fragments: Vec<String> = niches
        .iter()
        .flat_map(|n| n.categories.iter())
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    let mut ids: Vec<String> = Vec::new();
    for category in categories {
        if ids.len() == MAX_CATEGORY_IDS {
            break;
        }
        let path = category.path.to_lowercase();
        if fragments.iter().any(|f| path.contains(f.as_str())) && !ids.contains(&category.id) {
            ids.push(category.id.clone());
        }
    }
    ids
}

/// The fixed per-niche strategy used by daily generation: every keyword of
/// the niche, prices 3 to 40, free shipping preferred, no category filter.
#[must_use]
pub fn strategy_for_niche(niche: &Niche) -> Strategy {
    let slug: Vec<&str> = niche.name.split_whitespace().collect();
    Strategy {
        strategy_id: format!("daily_{}", slug.join("_")),
        keywords: niche.keywords.clone(),
        min_price: Some(Decimal::from(NICHE_MIN_PRICE)),
        max_price: Some(Decimal::from(NICHE_MAX_PRICE)),
        prefer_free_shipping: true,
        category_ids: Vec::new(),
    }
}
