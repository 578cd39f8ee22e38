use std::collections::BTreeMap;

use mongodb::bson;
use serde::{Deserialize, Serialize};

/// One news article used as context for an explanation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub published: String,
}

/// Per-language explanations, keyed by language code ("en", "ko", ...).
/// Always carries exactly the configured language set; languages the model
/// failed to produce hold the placeholder instead of being absent.
pub type Explanations = BTreeMap<String, String>;

/// The fallback explanation when no news context or LLM output is available.
pub fn placeholder_explanation(keyword: &str) -> String {
    format!("Trending: {}", keyword)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordEntry {
    pub rank: u32,
    pub keyword: String,
    pub explanations: Explanations,
    pub news_count: u32,
}

/// The per-country snapshot document. One per country code in the store,
/// fully replaced every collection cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryTrendsDocument {
    pub country_code: String,
    pub country_name: String,
    pub keywords: Vec<KeywordEntry>,
    pub updated_at: bson::DateTime,
    pub timestamp: String,
}

impl CountryTrendsDocument {
    pub fn new(country_code: &str, country_name: &str, keywords: Vec<KeywordEntry>) -> Self {
        let now = chrono::Utc::now();
        Self {
            country_code: country_code.to_string(),
            country_name: country_name.to_string(),
            keywords,
            updated_at: bson::DateTime::from_millis(now.timestamp_millis()),
            timestamp: now.to_rfc3339(),
        }
    }
}
