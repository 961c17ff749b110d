use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ── Listing ───────────────────────────────────────────────────────────────────

/// One cleaned advertisement from a results page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub title: String,
    /// Price exactly as shown on the page ("150 € VB", "Zu verschenken", …).
    pub price_text: String,
    /// Sort key derived from `price_text`; +inf for negotiable, on-request or
    /// unparsable prices, 0.0 for give-aways.
    pub price_value: f64,
    pub link: String,
    pub date: String,
    pub location: String,
    pub scraped_at: NaiveDateTime,
}

// ── Raw ad card ───────────────────────────────────────────────────────────────

/// Fields exactly as found in one listing container, before defaulting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAdCard {
    pub title: Option<String>,
    pub href: Option<String>,
    pub price_text: Option<String>,
    pub posted: Option<String>,
    pub location: Option<String>,
}

// ── Search query ──────────────────────────────────────────────────────────────

/// Parameters for one results-page request. Price bounds and radius only
/// shape the request URL; they are not applied locally.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub radius_km: Option<u32>,
}

// ── Sort order ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    #[value(name = "ascending-by-price")]
    PriceAscending,
    #[value(name = "descending-by-price")]
    PriceDescending,
    #[default]
    #[value(name = "unordered")]
    Unordered,
}
