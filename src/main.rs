use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

mod config;
mod countries;
mod explainer;
mod models;
mod news;
mod orchestrator;
mod prompts;
mod rate_limiter;
mod storage;
mod trends_scraper;

use config::Config;
use countries::{COUNTRIES, LANGUAGES};
use explainer::{KeywordExplainer, OpenAiClient};
use news::NewsFetcher;
use orchestrator::Collector;
use rate_limiter::RateLimiter;
use storage::TrendsStore;
use trends_scraper::TrendsScraper;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = Config::from_env();

    // Read side: print stored snapshots (all countries, or one by code)
    // without running a collection cycle.
    if args.first().map(String::as_str) == Some("--dump") {
        let store = TrendsStore::connect(&config.mongodb_uri).await?;
        match args.get(1) {
            Some(code) => match store.find_by_country(code).await? {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => {
                    error!("No snapshot stored for {}", code.to_uppercase());
                    std::process::exit(1);
                }
            },
            None => {
                let documents = store.list_all().await?;
                println!("{}", serde_json::to_string_pretty(&documents)?);
            }
        }
        return Ok(());
    }

    let run_once = args.iter().any(|arg| arg == "--once");

    info!("Trending keyword collector starting");
    info!(
        "Countries: {}",
        COUNTRIES
            .iter()
            .map(|c| c.code)
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("Keywords per country: 10");
    info!(
        "Languages: {}",
        LANGUAGES
            .iter()
            .map(|l| l.code)
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Process-lifetime dependencies, constructed once and passed in.
    let store = TrendsStore::connect(&config.mongodb_uri).await?;
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_minute,
        config.rate_limit_day,
    ));
    let openai = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        rate_limiter,
    );
    let explainer = KeywordExplainer::new(openai, config.explainer_mode);

    let collector = Collector::new(TrendsScraper::new(), NewsFetcher::new(), explainer, store);

    if run_once {
        // Batch mode for external schedulers: one cycle, then exit. An
        // unexpected error propagates so the scheduler sees the failure.
        collector.collect_all().await;
        info!("Single collection cycle complete, exiting");
        return Ok(());
    }

    info!(
        "Scheduler started, collecting every {:?} (Ctrl-C to stop)",
        config.cycle_interval
    );

    tokio::select! {
        _ = collector.run_forever(config.cycle_interval) => {
            // run_forever only returns on an internal failure.
            error!("Collection loop ended unexpectedly");
            Err(anyhow::anyhow!("collection loop ended unexpectedly"))
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}
