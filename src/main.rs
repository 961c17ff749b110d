mod config;
mod models;
mod pipeline;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::AppConfig;
use crate::models::{SearchQuery, SortOrder};
use crate::pipeline::{SearchOutcome, SearchPipeline};
use crate::scraper::{KleinanzeigenScraper, ListingSource};

#[derive(Parser)]
#[command(name = "kleinsuche", about = "kleinanzeigen.de search scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one results page and print the extracted listings
    Search {
        /// Search term, e.g. "iphone 12"
        #[arg(short, long)]
        term: String,

        /// Location string, e.g. "Berlin"
        #[arg(short, long, default_value = "")]
        location: String,

        /// Minimum price in € (request parameter only)
        #[arg(long)]
        min_price: Option<u32>,

        /// Maximum price in € (request parameter only)
        #[arg(long)]
        max_price: Option<u32>,

        /// Search radius in km
        #[arg(long)]
        radius: Option<u32>,

        /// Comma-separated words; listings whose title contains one are dropped
        #[arg(short, long)]
        exclude: Option<String>,

        #[arg(short, long, value_enum, default_value_t = SortOrder::Unordered)]
        sort: SortOrder,

        /// Print records as JSON instead of the table view
        #[arg(long)]
        json: bool,
    },

    /// Run the pipeline over a previously captured results page
    Parse {
        /// Path to a saved HTML dump (see capture.capture_raw)
        file: PathBuf,

        #[arg(short, long)]
        exclude: Option<String>,

        #[arg(short, long, value_enum, default_value_t = SortOrder::Unordered)]
        sort: SortOrder,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "kleinsuche=info,warn",
        1 => "kleinsuche=debug,info",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Search {
            term,
            location,
            min_price,
            max_price,
            radius,
            exclude,
            sort,
            json,
        } => {
            let _t = utils::Timer::start("Search");

            let scraper = KleinanzeigenScraper::new(&config.scraper)?;
            let query = SearchQuery {
                keywords: term,
                location,
                min_price,
                max_price,
                radius_km: radius,
            };

            let html = scraper.fetch_results_page(&query).await?;

            if config.capture.capture_raw {
                std::fs::write(&config.capture.capture_path, &html).with_context(|| {
                    format!("Could not write raw capture to {:?}", config.capture.capture_path)
                })?;
                info!("Raw response captured to {:?}", config.capture.capture_path);
            }

            let outcome = SearchPipeline::new(scraper.origin().clone()).run(
                &html,
                &parse_exclude(exclude.as_deref()),
                sort,
            );
            render(&outcome, json)?;
        }

        Command::Parse {
            file,
            exclude,
            sort,
            json,
        } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let origin = Url::parse(config.scraper.base_url.trim_end_matches('/'))
                .with_context(|| format!("Invalid base URL {:?}", config.scraper.base_url))?;

            let outcome =
                SearchPipeline::new(origin).run(&html, &parse_exclude(exclude.as_deref()), sort);
            render(&outcome, json)?;
        }
    }

    Ok(())
}

/// "defekt, kaputt" → ["defekt", "kaputt"]; empty tokens are dropped so a
/// stray comma never excludes everything.
fn parse_exclude(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn render(outcome: &SearchOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.listings)?);
        return Ok(());
    }

    if outcome.listings.is_empty() {
        println!("Keine Ergebnisse gefunden.");
        return Ok(());
    }

    println!("─────────────────────────────────────────────");
    println!("  {} Ergebnisse", outcome.count);
    println!("─────────────────────────────────────────────");
    for listing in &outcome.listings {
        println!("  {}", utils::truncate(&listing.title, 60));
        println!(
            "    {}  |  {}  |  {}",
            listing.price_text, listing.location, listing.date
        );
        println!("    {}", listing.link);
    }
    println!("─────────────────────────────────────────────");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exclude() {
        assert_eq!(parse_exclude(None), Vec::<String>::new());
        assert_eq!(parse_exclude(Some("defekt, kaputt")), vec!["defekt", "kaputt"]);
        assert_eq!(parse_exclude(Some("defekt,,")), vec!["defekt"]);
    }
}
