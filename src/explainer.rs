use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::ExplainerMode;
use crate::countries::LANGUAGES;
use crate::models::{placeholder_explanation, Explanations, NewsItem};
use crate::prompts;
use crate::rate_limiter::RateLimiter;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f64 = 0.1;
// Output caps: one combined response carries seven sections.
const MAX_TOKENS_PER_LANGUAGE: u32 = 250;
const MAX_TOKENS_COMBINED: u32 = 800;
// Breather between the seven calls in per-language mode.
const PER_LANGUAGE_DELAY: Duration = Duration::from_secs(1);
// A parsed section this short is marker debris, not an explanation.
const MIN_SECTION_BYTES: usize = 10;

/// Thin chat-completions client. Constructed once at startup and shared for
/// the process lifetime.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
            rate_limiter,
        }
    }

    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        self.rate_limiter.acquire().await?;

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "max_tokens": max_tokens,
            "temperature": TEMPERATURE
        });

        let response = self
            .client
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!(
                "Completion request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| anyhow::anyhow!("No completion text in API response"))?;

        Ok(content.trim().to_string())
    }
}

/// Turns a keyword plus its news context into per-language explanations.
pub struct KeywordExplainer {
    client: OpenAiClient,
    mode: ExplainerMode,
}

impl KeywordExplainer {
    pub fn new(client: OpenAiClient, mode: ExplainerMode) -> Self {
        Self { client, mode }
    }

    /// Always returns a map with exactly the configured language codes.
    /// With no news there is nothing factual to ground an explanation in,
    /// so the LLM is skipped entirely and every language gets the
    /// placeholder.
    pub async fn explain(
        &self,
        keyword: &str,
        news: &[NewsItem],
        country_name: &str,
    ) -> Explanations {
        if news.is_empty() {
            return placeholder_for_all(keyword);
        }

        let news_text = prompts::news_context(news);

        match self.mode {
            ExplainerMode::Combined => self.explain_combined(keyword, &news_text, country_name).await,
            ExplainerMode::PerLanguage => {
                self.explain_per_language(keyword, &news_text, country_name).await
            }
        }
    }

    async fn explain_combined(
        &self,
        keyword: &str,
        news_text: &str,
        country_name: &str,
    ) -> Explanations {
        let prompt = prompts::combined_prompt(keyword, news_text, country_name);
        match self
            .client
            .complete(prompts::COMBINED_SYSTEM_PROMPT, &prompt, MAX_TOKENS_COMBINED)
            .await
        {
            Ok(text) => parse_multilingual(&text, keyword),
            Err(e) => {
                warn!("Combined explanation failed for '{}': {:?}", keyword, e);
                placeholder_for_all(keyword)
            }
        }
    }

    async fn explain_per_language(
        &self,
        keyword: &str,
        news_text: &str,
        country_name: &str,
    ) -> Explanations {
        let mut explanations = Explanations::new();

        for lang in LANGUAGES {
            info!("Generating {} explanation for '{}'", lang.name, keyword);
            let system = prompts::per_language_system_prompt(lang.name);
            let prompt = prompts::per_language_prompt(lang.code, keyword, news_text, country_name);

            let value = match self
                .client
                .complete(&system, &prompt, MAX_TOKENS_PER_LANGUAGE)
                .await
            {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => placeholder_explanation(keyword),
                Err(e) => {
                    warn!("{} explanation failed for '{}': {:?}", lang.name, keyword, e);
                    placeholder_explanation(keyword)
                }
            };
            explanations.insert(lang.code.to_string(), value);

            tokio::time::sleep(PER_LANGUAGE_DELAY).await;
        }

        explanations
    }
}

pub fn placeholder_for_all(keyword: &str) -> Explanations {
    LANGUAGES
        .iter()
        .map(|lang| (lang.code.to_string(), placeholder_explanation(keyword)))
        .collect()
}

/// Split one combined completion into per-language sections by marker
/// offset. A section runs from its marker to whichever other configured
/// marker occurs next, or to the end of the text. Missing markers and
/// near-empty bodies map to the placeholder; the model omitting or
/// reordering sections must never fail the keyword.
pub fn parse_multilingual(text: &str, keyword: &str) -> Explanations {
    let mut explanations = Explanations::new();

    for lang in LANGUAGES {
        let parsed = text.find(lang.marker).and_then(|pos| {
            let rest = &text[pos + lang.marker.len()..];
            let end = LANGUAGES
                .iter()
                .filter(|other| other.marker != lang.marker)
                .filter_map(|other| rest.find(other.marker))
                .min()
                .unwrap_or(rest.len());
            let body = rest[..end].trim();
            if body.len() > MIN_SECTION_BYTES {
                Some(body.to_string())
            } else {
                None
            }
        });

        explanations.insert(
            lang.code.to_string(),
            parsed.unwrap_or_else(|| placeholder_explanation(keyword)),
        );
    }

    explanations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_bounded_by_the_next_marker() {
        let text = "ENGLISH:\nHello world today.\nKOREAN:\n안녕하세요 오늘.\n";
        let parsed = parse_multilingual(text, "AI");
        assert_eq!(parsed["en"], "Hello world today.");
        assert_eq!(parsed["ko"], "안녕하세요 오늘.");
    }

    #[test]
    fn missing_marker_falls_back_without_failing_the_rest() {
        let text = "ENGLISH:\nA long factual explanation here.\nGERMAN:\nEine sachliche Erklärung hier.\n";
        let parsed = parse_multilingual(text, "Wahl");
        assert_eq!(parsed["en"], "A long factual explanation here.");
        assert_eq!(parsed["de"], "Eine sachliche Erklärung hier.");
        assert_eq!(parsed["fr"], "Trending: Wahl");
        assert_eq!(parsed["sv"], "Trending: Wahl");
        assert_eq!(parsed.len(), LANGUAGES.len());
    }

    #[test]
    fn reordered_sections_still_parse() {
        let text = "SWEDISH:\nEn lång förklaring på svenska.\nENGLISH:\nAn explanation in English text.\n";
        let parsed = parse_multilingual(text, "Election");
        assert_eq!(parsed["sv"], "En lång förklaring på svenska.");
        assert_eq!(parsed["en"], "An explanation in English text.");
    }

    #[test]
    fn near_empty_section_becomes_placeholder() {
        let text = "ENGLISH:\nok\nKOREAN:\n충분히 긴 한국어 설명입니다.\n";
        let parsed = parse_multilingual(text, "AI");
        assert_eq!(parsed["en"], "Trending: AI");
        assert_eq!(parsed["ko"], "충분히 긴 한국어 설명입니다.");
    }

    #[test]
    fn every_language_code_is_always_present() {
        let parsed = parse_multilingual("no markers at all", "Storm");
        assert_eq!(parsed.len(), LANGUAGES.len());
        for lang in LANGUAGES {
            assert_eq!(parsed[lang.code], "Trending: Storm");
        }
    }

    #[tokio::test]
    async fn empty_news_skips_the_llm_and_returns_placeholders() {
        let limiter = Arc::new(RateLimiter::new(1, 1));
        let client = OpenAiClient::new("unused".to_string(), "gpt-4".to_string(), limiter);
        let explainer = KeywordExplainer::new(client, ExplainerMode::Combined);

        let explanations = explainer.explain("AI", &[], "미국").await;
        assert_eq!(explanations.len(), LANGUAGES.len());
        for lang in LANGUAGES {
            assert_eq!(explanations[lang.code], "Trending: AI");
        }
    }
}
