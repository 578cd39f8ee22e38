use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::countries::{Country, COUNTRIES};
use crate::explainer::KeywordExplainer;
use crate::models::{Explanations, KeywordEntry, NewsItem};
use crate::news::NewsFetcher;
use crate::storage::TrendsStore;
use crate::trends_scraper::TrendsScraper;

const MAX_KEYWORDS_PER_COUNTRY: usize = 10;
// Throttles outbound requests to the news feed and the LLM API.
const KEYWORD_DELAY: Duration = Duration::from_secs(1);
// Throttles page loads against the trends site.
const COUNTRY_DELAY: Duration = Duration::from_secs(3);
// Interval mode polls coarsely rather than arming a precise timer.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

// Seams between pipeline stages, so the collector can be exercised with
// fakes. Expected "no data" outcomes are empty values, not errors.

#[async_trait]
pub trait KeywordSource {
    async fn trending_keywords(&self, country: Country) -> Vec<String>;
}

#[async_trait]
pub trait NewsSource {
    async fn news_for_keyword(&self, keyword: &str, country: Country) -> Vec<NewsItem>;
}

#[async_trait]
pub trait ExplanationSource {
    async fn explain(&self, keyword: &str, news: &[NewsItem], country_name: &str) -> Explanations;
}

#[async_trait]
pub trait SnapshotSink {
    async fn replace_country(
        &self,
        country_code: &str,
        country_name: &str,
        keywords: Vec<KeywordEntry>,
    ) -> Result<()>;
}

#[async_trait]
impl KeywordSource for TrendsScraper {
    async fn trending_keywords(&self, country: Country) -> Vec<String> {
        TrendsScraper::trending_keywords(self, country).await
    }
}

#[async_trait]
impl NewsSource for NewsFetcher {
    async fn news_for_keyword(&self, keyword: &str, country: Country) -> Vec<NewsItem> {
        NewsFetcher::news_for_keyword(self, keyword, country).await
    }
}

#[async_trait]
impl ExplanationSource for KeywordExplainer {
    async fn explain(&self, keyword: &str, news: &[NewsItem], country_name: &str) -> Explanations {
        KeywordExplainer::explain(self, keyword, news, country_name).await
    }
}

#[async_trait]
impl SnapshotSink for TrendsStore {
    async fn replace_country(
        &self,
        country_code: &str,
        country_name: &str,
        keywords: Vec<KeywordEntry>,
    ) -> Result<()> {
        TrendsStore::replace_country(self, country_code, country_name, keywords).await
    }
}

/// Drives the whole pipeline: extract keywords, enrich each with news and
/// explanations, persist the country snapshot. Strictly sequential, one
/// country at a time, one keyword at a time in rank order.
pub struct Collector<K, N, E, S> {
    keywords: K,
    news: N,
    explainer: E,
    sink: S,
    keyword_delay: Duration,
    country_delay: Duration,
}

impl<K, N, E, S> Collector<K, N, E, S>
where
    K: KeywordSource,
    N: NewsSource,
    E: ExplanationSource,
    S: SnapshotSink,
{
    pub fn new(keywords: K, news: N, explainer: E, sink: S) -> Self {
        Self {
            keywords,
            news,
            explainer,
            sink,
            keyword_delay: KEYWORD_DELAY,
            country_delay: COUNTRY_DELAY,
        }
    }

    /// One country, start to finish. An empty keyword list skips the
    /// country for this cycle without an error; only a storage failure
    /// propagates, and the cycle loop logs and moves on.
    pub async fn collect_country(&self, country: Country) -> Result<()> {
        info!("Collecting {} ({})", country.name, country.code);

        let keywords = dedup_keywords(self.keywords.trending_keywords(country).await);
        if keywords.is_empty() {
            warn!("No keywords for {}, skipping this cycle", country.name);
            return Ok(());
        }

        let mut entries = Vec::new();
        let ranked = &keywords[..keywords.len().min(MAX_KEYWORDS_PER_COUNTRY)];
        for (index, keyword) in ranked.iter().enumerate() {
            let rank = (index + 1) as u32;
            info!("[{}/{}] Processing: {}", rank, ranked.len(), keyword);

            let news = self.news.news_for_keyword(keyword, country).await;
            tokio::time::sleep(self.keyword_delay).await;

            let explanations = self.explainer.explain(keyword, &news, country.name).await;

            entries.push(KeywordEntry {
                rank,
                keyword: keyword.clone(),
                explanations,
                news_count: news.len() as u32,
            });
        }

        self.sink
            .replace_country(country.code, country.name, entries)
            .await
    }

    /// One full pass over the configured countries. Per-country failures
    /// are contained here; sibling countries always get their turn.
    pub async fn collect_all(&self) {
        info!(
            "Starting collection cycle at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );

        for country in COUNTRIES {
            if let Err(e) = self.collect_country(*country).await {
                error!("Collection failed for {}: {:?}", country.name, e);
            }
            tokio::time::sleep(self.country_delay).await;
        }

        info!(
            "All countries collected at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    /// Run immediately, then repeat on a fixed wall-clock interval with a
    /// coarse polling loop. Only an external interrupt ends this.
    pub async fn run_forever(&self, interval: Duration) {
        loop {
            self.collect_all().await;

            info!("Next collection cycle in {:?}", interval);
            let next_run = Instant::now() + interval;
            while Instant::now() < next_run {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }
}

/// Case-insensitive dedup over the extractor's output, keeping first-seen
/// casing and order. The scraper already dedups its own candidates; this
/// guards the ranking against any keyword source that does not.
fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut unique = Vec::new();
    for keyword in keywords {
        let lowered = keyword.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
            unique.push(keyword);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explainer::placeholder_for_all;
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FakeKeywords {
        batches: Mutex<VecDeque<Vec<String>>>,
    }

    impl FakeKeywords {
        fn new(batches: Vec<Vec<&str>>) -> Self {
            Self {
                batches: Mutex::new(
                    batches
                        .into_iter()
                        .map(|batch| batch.into_iter().map(String::from).collect())
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl KeywordSource for FakeKeywords {
        async fn trending_keywords(&self, _country: Country) -> Vec<String> {
            self.batches.lock().unwrap().pop_front().unwrap_or_default()
        }
    }

    struct FakeNews {
        by_keyword: HashMap<String, usize>,
    }

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn news_for_keyword(&self, keyword: &str, _country: Country) -> Vec<NewsItem> {
            let count = self.by_keyword.get(keyword).copied().unwrap_or(0);
            (0..count)
                .map(|i| NewsItem {
                    title: format!("{} headline number {}", keyword, i),
                    description: "details".to_string(),
                    published: String::new(),
                })
                .collect()
        }
    }

    struct FakeExplainer;

    #[async_trait]
    impl ExplanationSource for FakeExplainer {
        async fn explain(
            &self,
            keyword: &str,
            news: &[NewsItem],
            _country_name: &str,
        ) -> Explanations {
            if news.is_empty() {
                placeholder_for_all(keyword)
            } else {
                crate::countries::LANGUAGES
                    .iter()
                    .map(|lang| {
                        (
                            lang.code.to_string(),
                            format!("{} explanation for {}", lang.name, keyword),
                        )
                    })
                    .collect()
            }
        }
    }

    #[derive(Default)]
    struct FakeSink {
        // country_code -> (country_name, entries); insert overwrites, which
        // is exactly the replace contract the real store provides.
        documents: Mutex<HashMap<String, (String, Vec<KeywordEntry>)>>,
    }

    #[async_trait]
    impl SnapshotSink for FakeSink {
        async fn replace_country(
            &self,
            country_code: &str,
            country_name: &str,
            keywords: Vec<KeywordEntry>,
        ) -> Result<()> {
            self.documents.lock().unwrap().insert(
                country_code.to_string(),
                (country_name.to_string(), keywords),
            );
            Ok(())
        }
    }

    fn us() -> Country {
        COUNTRIES[0]
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_ranks_news_counts_and_explanations() {
        // The duplicate "AI" is dropped by the collector's own dedup pass.
        let keywords = FakeKeywords::new(vec![vec!["AI", "Election", "AI"]]);

        let mut by_keyword = HashMap::new();
        by_keyword.insert("Election".to_string(), 3);
        let news = FakeNews { by_keyword };

        let collector = Collector::new(keywords, news, FakeExplainer, FakeSink::default());
        collector.collect_country(us()).await.unwrap();

        let documents = collector.sink.documents.lock().unwrap();
        let (name, entries) = &documents["US"];
        assert_eq!(name, "미국");
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].keyword, "AI");
        assert_eq!(entries[0].news_count, 0);
        assert_eq!(entries[0].explanations["en"], "Trending: AI");

        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].keyword, "Election");
        assert_eq!(entries[1].news_count, 3);
        assert_eq!(entries[1].explanations["en"], "English explanation for Election");
        assert_eq!(entries[1].explanations.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn second_collection_replaces_the_first_snapshot() {
        let keywords = FakeKeywords::new(vec![vec!["First Topic"], vec!["Second Topic"]]);
        let news = FakeNews {
            by_keyword: HashMap::new(),
        };

        let collector = Collector::new(keywords, news, FakeExplainer, FakeSink::default());
        collector.collect_country(us()).await.unwrap();
        collector.collect_country(us()).await.unwrap();

        let documents = collector.sink.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        let (_, entries) = &documents["US"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].keyword, "Second Topic");
    }

    #[test]
    fn dedup_keeps_first_seen_casing_and_order() {
        let deduped = dedup_keywords(vec![
            "AI".to_string(),
            "Election".to_string(),
            "ai".to_string(),
            "ELECTION".to_string(),
        ]);
        assert_eq!(deduped, vec!["AI".to_string(), "Election".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_extraction_skips_persistence() {
        let keywords = FakeKeywords::new(vec![vec![]]);
        let news = FakeNews {
            by_keyword: HashMap::new(),
        };

        let collector = Collector::new(keywords, news, FakeExplainer, FakeSink::default());
        collector.collect_country(us()).await.unwrap();

        assert!(collector.sink.documents.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn keyword_list_is_capped_at_ten() {
        let many: Vec<String> = (0..14).map(|i| format!("Topic number {}", i)).collect();
        let keywords = FakeKeywords::new(vec![many.iter().map(String::as_str).collect()]);
        let news = FakeNews {
            by_keyword: HashMap::new(),
        };

        let collector = Collector::new(keywords, news, FakeExplainer, FakeSink::default());
        collector.collect_country(us()).await.unwrap();

        let documents = collector.sink.documents.lock().unwrap();
        let (_, entries) = &documents["US"];
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[9].rank, 10);
    }
}
