use crate::models::RawAdCard;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

// ── Selectors ─────────────────────────────────────────────────────────────────

// kleinanzeigen.de result-page markup, one `article.aditem` per advertisement.
const AD_CONTAINER: &str = "article.aditem";
const TITLE_LINK: &str = "h2.text-module-begin a";
const PRICE: &str = "p.aditem-main--middle--price-shipping--price";
const POSTED: &str = "div.aditem-main--top--right";
const LOCATION: &str = "div.aditem-main--top--left";

struct AdSelectors {
    container: Selector,
    title: Selector,
    price: Selector,
    posted: Selector,
    location: Selector,
}

impl AdSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            container: selector(AD_CONTAINER)?,
            title: selector(TITLE_LINK)?,
            price: selector(PRICE)?,
            posted: selector(POSTED)?,
            location: selector(LOCATION)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("selector {:?}: {}", css, e))
}

// ── Results page ──────────────────────────────────────────────────────────────

/// Extract one raw card per listing container, in document order.
///
/// A page with no containers is not an error; it yields an empty vec and the
/// caller decides what "no results" means. Containers without any recognizable
/// ad content are skipped without aborting the rest of the page.
pub fn parse_results_page(html: &str) -> Result<Vec<RawAdCard>> {
    let doc = Html::parse_document(html);
    let sels = AdSelectors::new()?;

    let mut cards = Vec::new();
    let mut skipped = 0usize;

    for ad in doc.select(&sels.container) {
        match parse_ad_card(ad, &sels) {
            Some(card) => cards.push(card),
            None => {
                warn!("Skipping unrecognizable listing container");
                skipped += 1;
            }
        }
    }

    debug!("Parsed {} ad cards ({} skipped)", cards.len(), skipped);
    Ok(cards)
}

/// One container → one raw card. Every field resolves independently, so a
/// missing price or date never blocks the other fields. A container exposing
/// neither title anchor nor price node is not an ad card and yields `None`.
fn parse_ad_card(ad: ElementRef, sels: &AdSelectors) -> Option<RawAdCard> {
    let title_node = ad.select(&sels.title).next();

    let title = title_node.and_then(|n| nonempty_text(n));
    let href = title_node
        .and_then(|n| n.value().attr("href"))
        .map(|h| h.to_string());
    let price_text = ad.select(&sels.price).next().and_then(nonempty_text);

    if title.is_none() && href.is_none() && price_text.is_none() {
        return None;
    }

    Some(RawAdCard {
        title,
        href,
        price_text,
        posted: ad.select(&sels.posted).next().and_then(nonempty_text),
        location: ad.select(&sels.location).next().and_then(nonempty_text),
    })
}

/// Trimmed inner text, `None` when the node holds only whitespace.
fn nonempty_text(node: ElementRef) -> Option<String> {
    let text = node.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <ul>
        <article class="aditem">
            <div class="aditem-main--top--left">10115 Berlin</div>
            <div class="aditem-main--top--right">Heute, 12:30</div>
            <h2 class="text-module-begin"><a href="/s-anzeige/iphone-12/123-456">iPhone 12</a></h2>
            <p class="aditem-main--middle--price-shipping--price">150 € VB</p>
        </article>
        <article class="aditem">
            <h2 class="text-module-begin"><a href="/s-anzeige/fahrrad/789-012">Fahrrad 28 Zoll</a></h2>
        </article>
        <article class="aditem">
            <div>Gesponsert</div>
        </article>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_page() {
        let cards = parse_results_page(PAGE).unwrap();
        assert_eq!(cards.len(), 2);

        assert_eq!(cards[0].title.as_deref(), Some("iPhone 12"));
        assert_eq!(cards[0].href.as_deref(), Some("/s-anzeige/iphone-12/123-456"));
        assert_eq!(cards[0].price_text.as_deref(), Some("150 € VB"));
        assert_eq!(cards[0].posted.as_deref(), Some("Heute, 12:30"));
        assert_eq!(cards[0].location.as_deref(), Some("10115 Berlin"));
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let cards = parse_results_page(PAGE).unwrap();
        let bike = &cards[1];
        assert_eq!(bike.title.as_deref(), Some("Fahrrad 28 Zoll"));
        assert_eq!(bike.price_text, None);
        assert_eq!(bike.posted, None);
        assert_eq!(bike.location, None);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_results_page("").unwrap().is_empty());
        assert!(parse_results_page("<html><body></body></html>").unwrap().is_empty());
    }
}
