pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::SearchQuery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use self::http_client::HttpClient;

const SEARCH_PATH: &str = "/s-suchanfrage.html";

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable results-page source abstraction.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_results_page(&self, query: &SearchQuery) -> Result<String>;
}

// ── kleinanzeigen.de scraper ──────────────────────────────────────────────────

pub struct KleinanzeigenScraper {
    client: HttpClient,
    base_url: Url,
}

impl KleinanzeigenScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: Url::parse(config.base_url.trim_end_matches('/'))
                .with_context(|| format!("Invalid base URL {:?}", config.base_url))?,
        })
    }

    /// Origin that relative detail links are resolved against.
    pub fn origin(&self) -> &Url {
        &self.base_url
    }

    /// URL for one search-results page. Price bounds and radius are request
    /// parameters only; filtering and ranking happen locally after the fetch.
    fn search_url(&self, query: &SearchQuery) -> Result<Url> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("keywords", &query.keywords);
            params.append_pair("locationStr", &query.location);
            if let Some(min) = query.min_price {
                params.append_pair("minPrice", &min.to_string());
            }
            if let Some(max) = query.max_price {
                params.append_pair("maxPrice", &max.to_string());
            }
            if let Some(radius) = query.radius_km {
                params.append_pair("radius", &radius.to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ListingSource for KleinanzeigenScraper {
    async fn fetch_results_page(&self, query: &SearchQuery) -> Result<String> {
        let url = self.search_url(query)?;
        info!("Fetching results page ({})", url);

        let html = self
            .client
            .get_text(url.as_str())
            .await
            .with_context(|| format!("Failed to fetch results for {:?}", query.keywords))?;

        debug!("Fetched {} bytes", html.len());
        Ok(html)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperConfig;

    fn scraper() -> KleinanzeigenScraper {
        let config = crate::config::AppConfig::default().scraper;
        KleinanzeigenScraper::new(&config).unwrap()
    }

    #[test]
    fn test_search_url_minimal() {
        let query = SearchQuery {
            keywords: "iphone 12".to_string(),
            location: "Berlin".to_string(),
            ..Default::default()
        };
        let url = scraper().search_url(&query).unwrap();

        assert_eq!(url.path(), "/s-suchanfrage.html");
        assert!(url.query().unwrap().contains("keywords=iphone+12"));
        assert!(url.query().unwrap().contains("locationStr=Berlin"));
        assert!(!url.query().unwrap().contains("minPrice"));
        assert!(!url.query().unwrap().contains("radius"));
    }

    #[test]
    fn test_search_url_with_bounds_and_radius() {
        let query = SearchQuery {
            keywords: "fahrrad".to_string(),
            location: "Hamburg".to_string(),
            min_price: Some(50),
            max_price: Some(300),
            radius_km: Some(10),
        };
        let url = scraper().search_url(&query).unwrap();
        let q = url.query().unwrap();

        assert!(q.contains("minPrice=50"));
        assert!(q.contains("maxPrice=300"));
        assert!(q.contains("radius=10"));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = ScraperConfig {
            base_url: "https://www.kleinanzeigen.de/".to_string(),
            ..crate::config::AppConfig::default().scraper
        };
        let scraper = KleinanzeigenScraper::new(&config).unwrap();
        assert_eq!(scraper.origin().as_str(), "https://www.kleinanzeigen.de/");
    }
}
