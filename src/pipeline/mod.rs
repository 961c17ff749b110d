//! Pipeline orchestrator: ties extraction → filtering → ranking together.
//!
//! `run()` is synchronous and pure: it takes an already-fetched document and
//! produces an ordered result set. Per-listing problems never abort the batch:
//! a malformed container is skipped, a missing field becomes its placeholder,
//! an unparsable price becomes the +inf sentinel. An empty or unrecognizable
//! document yields an empty result with count 0; whether that means "no
//! results" or a broken fetch is the caller's call.

use crate::models::{Listing, SortOrder};
use crate::scraper::{cleaner, parsers};
use chrono::Utc;
use tracing::{info, warn};
use url::Url;

pub struct SearchPipeline {
    origin: Url,
}

/// Final, ordered result set of one pipeline run.
#[derive(Debug)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    pub count: usize,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            listings: Vec::new(),
            count: 0,
        }
    }
}

impl SearchPipeline {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    /// Extract → filter → rank one results page.
    pub fn run(&self, html: &str, excluded: &[String], order: SortOrder) -> SearchOutcome {
        let raw_cards = match parsers::parse_results_page(html) {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Extraction failed: {:#}", e);
                return SearchOutcome::empty();
            }
        };

        let now = Utc::now().naive_utc();
        let listings: Vec<Listing> = raw_cards
            .into_iter()
            .map(|card| cleaner::raw_to_listing(card, &self.origin, now))
            .collect();
        let extracted = listings.len();

        let kept = filter_excluded(listings, excluded);
        if kept.len() < extracted {
            info!("Excluded {} of {} listings by title", extracted - kept.len(), extracted);
        }

        let ranked = rank(kept, order);
        let count = ranked.len();
        info!("{} listings after filtering", count);

        SearchOutcome {
            listings: ranked,
            count,
        }
    }
}

// ── Exclusion filter ──────────────────────────────────────────────────────────

/// Drop listings whose title contains any excluded word, case-insensitive.
/// Substring containment, not word matching: "defekt" also drops a listing
/// titled "Displaydefekt". An empty exclusion set is the identity.
pub fn filter_excluded(listings: Vec<Listing>, excluded: &[String]) -> Vec<Listing> {
    if excluded.is_empty() {
        return listings;
    }

    let needles: Vec<String> = excluded.iter().map(|w| w.to_lowercase()).collect();

    listings
        .into_iter()
        .filter(|listing| {
            let title = listing.title.to_lowercase();
            !needles.iter().any(|needle| title.contains(needle))
        })
        .collect()
}

// ── Ranker ────────────────────────────────────────────────────────────────────

/// Attach sort keys and order the result set. The sort is stable: listings
/// with equal keys (the whole +inf bucket in particular) keep document order.
pub fn rank(mut listings: Vec<Listing>, order: SortOrder) -> Vec<Listing> {
    for listing in &mut listings {
        listing.price_value = cleaner::normalize_price(&listing.price_text);
    }

    match order {
        SortOrder::PriceAscending => {
            listings.sort_by(|a, b| a.price_value.total_cmp(&b.price_value));
        }
        SortOrder::PriceDescending => {
            listings.sort_by(|a, b| b.price_value.total_cmp(&a.price_value));
        }
        SortOrder::Unordered => {}
    }

    listings
}

// ── Tests ─────────────────────────────────────────────────────────────────────
