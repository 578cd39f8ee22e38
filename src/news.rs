use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::countries::{news_language, Country};
use crate::models::NewsItem;

const MAX_ITEMS: usize = 5;
// Titles at or under this length are navigation junk or bare source names.
const MIN_TITLE_CHARS: usize = 10;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const NEWS_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(NEWS_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
}

/// Fetches recent news for a keyword from the Google News RSS search feed.
pub struct NewsFetcher {
    client: Client,
}

impl NewsFetcher {
    pub fn new() -> Self {
        let client = match build_client() {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    "HTTP client builder failed, continuing without the custom user agent: {}",
                    e
                );
                Client::new()
            }
        };
        Self { client }
    }

    /// Returns 0-5 news items for the keyword, searched in the language
    /// mapped from the country code. Every failure path degrades to an
    /// empty list; this never raises to the caller.
    pub async fn news_for_keyword(&self, keyword: &str, country: Country) -> Vec<NewsItem> {
        match self.fetch(keyword, country).await {
            Ok(items) => {
                info!("Found {} news items for '{}'", items.len(), keyword);
                items
            }
            Err(e) => {
                warn!("News fetch failed for '{}': {:?}", keyword, e);
                Vec::new()
            }
        }
    }

    async fn fetch(&self, keyword: &str, country: Country) -> Result<Vec<NewsItem>> {
        let language = news_language(country.code);
        let url = format!(
            "https://news.google.com/rss/search?q={}&hl={}&gl={}&ceid={}:{}",
            urlencoding::encode(keyword),
            language,
            country.code,
            country.code,
            language
        );

        // Request-level timeout so the contract holds even on the fallback
        // client.
        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "News feed returned status {}",
                response.status()
            ));
        }

        let content = response.bytes().await?;
        let channel = rss::Channel::read_from(&content[..])?;

        Ok(collect_items(&channel))
    }
}

fn collect_items(channel: &rss::Channel) -> Vec<NewsItem> {
    let mut items = Vec::new();

    for item in channel.items().iter().take(MAX_ITEMS) {
        let title = item.title().unwrap_or("").trim().to_string();
        if title.chars().count() <= MIN_TITLE_CHARS {
            continue;
        }

        items.push(NewsItem {
            title,
            description: item.description().unwrap_or("").trim().to_string(),
            published: item.pub_date().unwrap_or("").to_string(),
        });
    }

    items
}
