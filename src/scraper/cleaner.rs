use crate::models::{Listing, RawAdCard};
use chrono::NaiveDateTime;
use url::Url;

// ── Placeholders ──────────────────────────────────────────────────────────────

// Shown verbatim when a card is missing the field.
pub const NO_TITLE: &str = "Kein Titel";
pub const NO_PRICE: &str = "Preis auf Anfrage";
pub const NOT_AVAILABLE: &str = "Nicht verfügbar";
pub const NO_LINK: &str = "#";

// ── Price normalization ───────────────────────────────────────────────────────

/// Collapse a free-form price into a totally ordered sort key.
/// "1.234,56 €" → 1234.56 | "150 € VB" → +inf | "Zu verschenken" → 0.0
///
/// +inf is the sentinel for "unknown/unbounded": ascending sort pushes such
/// listings to the end, descending to the front. No input ever errors here.
pub fn normalize_price(raw: &str) -> f64 {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return f64::INFINITY;
    }
    if text.contains("vb") {
        return f64::INFINITY;
    }
    if text.contains("zu verschenken") {
        return 0.0;
    }
    if text.contains("auf anfrage") {
        return f64::INFINITY;
    }

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    // Periods are thousands separators; the rightmost comma is the decimal
    // point ("1.234,56" → 1234.56).
    let cleaned = kept.replace('.', "");
    let cleaned = match cleaned.rfind(',') {
        Some(idx) => format!("{}.{}", cleaned[..idx].replace(',', ""), &cleaned[idx + 1..]),
        None => cleaned,
    };

    cleaned.parse().unwrap_or(f64::INFINITY)
}

// ── Raw card → Listing ────────────────────────────────────────────────────────

/// Fill defaults and resolve the detail link against the site origin.
/// `price_value` stays at the +inf sentinel until the ranker attaches it.
pub fn raw_to_listing(raw: RawAdCard, origin: &Url, now: NaiveDateTime) -> Listing {
    Listing {
        title: raw.title.unwrap_or_else(|| NO_TITLE.to_string()),
        price_text: raw.price_text.unwrap_or_else(|| NO_PRICE.to_string()),
        price_value: f64::INFINITY,
        link: raw
            .href
            .map(|h| resolve_link(origin, &h))
            .unwrap_or_else(|| NO_LINK.to_string()),
        date: raw.posted.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        location: raw.location.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        scraped_at: now,
    }
}

/// Relative hrefs are rewritten to absolute URLs against the fixed origin.
fn resolve_link(origin: &Url, href: &str) -> String {
    match origin.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => NO_LINK.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_price_sentinels() {
        assert_eq!(normalize_price(""), f64::INFINITY);
        assert_eq!(normalize_price("   "), f64::INFINITY);
        assert_eq!(normalize_price("150 € VB"), f64::INFINITY);
        assert_eq!(normalize_price("Zu verschenken"), 0.0);
        assert_eq!(normalize_price("Preis auf Anfrage"), f64::INFINITY);
    }

    #[test]
    fn test_normalize_price_amounts() {
        assert_eq!(normalize_price("50 €"), 50.0);
        assert_eq!(normalize_price("1.234,56 €"), 1234.56);
        assert_eq!(normalize_price("1.200 €"), 1200.0);
        assert_eq!(normalize_price("1,5 €"), 1.5);
    }

    #[test]
    fn test_normalize_price_unparsable() {
        assert_eq!(normalize_price("Tausche gegen Fahrrad"), f64::INFINITY);
        assert_eq!(normalize_price("€"), f64::INFINITY);
    }

    #[test]
    fn test_normalize_price_idempotent() {
        for raw in ["150 € VB", "1.234,56 €", "Zu verschenken", "kaputt"] {
            assert_eq!(normalize_price(raw), normalize_price(raw));
        }
    }

    #[test]
    fn test_raw_to_listing_defaults() {
        let origin = Url::parse("https://www.kleinanzeigen.de").unwrap();
        let listing = raw_to_listing(RawAdCard::default(), &origin, Utc::now().naive_utc());

        assert_eq!(listing.title, NO_TITLE);
        assert_eq!(listing.price_text, NO_PRICE);
        assert_eq!(listing.link, NO_LINK);
        assert_eq!(listing.date, NOT_AVAILABLE);
        assert_eq!(listing.location, NOT_AVAILABLE);
        // The placeholder itself normalizes to the on-request sentinel.
        assert_eq!(normalize_price(&listing.price_text), f64::INFINITY);
    }

    #[test]
    fn test_relative_link_resolution() {
        let origin = Url::parse("https://www.kleinanzeigen.de").unwrap();
        let raw = RawAdCard {
            href: Some("/s-anzeige/iphone-12/123-456".to_string()),
            ..Default::default()
        };
        let listing = raw_to_listing(raw, &origin, Utc::now().naive_utc());
        assert_eq!(listing.link, "https://www.kleinanzeigen.de/s-anzeige/iphone-12/123-456");
    }
}
