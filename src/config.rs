use std::env;
use std::time::Duration;

use tracing::{info, warn};

/// How explanations are generated for each keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainerMode {
    /// One completion per keyword; the model emits all seven languages in a
    /// single marker-sectioned response.
    Combined,
    /// One completion per language (seven per keyword), with an inter-call
    /// delay to respect upstream rate limits.
    PerLanguage,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub explainer_mode: ExplainerMode,
    /// Wall-clock interval between collection cycles in interval mode.
    pub cycle_interval: Duration,
    pub rate_limit_minute: u32,
    pub rate_limit_day: u32,
}

impl Config {
    /// Read configuration from the process environment, falling back to
    /// hard-coded defaults. Country, language, URL, selector and stopword
    /// tables are compiled in and not configurable.
    pub fn from_env() -> Self {
        let mongodb_uri = env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/".to_string());

        let openai_api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => {
                info!("OpenAI API key loaded from environment");
                key
            }
            _ => {
                warn!("OPENAI_API_KEY not set, explanations will fall back to placeholders");
                "YOUR_API_KEY_HERE".to_string()
            }
        };

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string());
        info!("Using completion model: {}", openai_model);

        let explainer_mode = match env::var("EXPLAINER_MODE").ok().as_deref() {
            Some("per-language") | Some("per_language") => ExplainerMode::PerLanguage,
            Some("combined") | None => ExplainerMode::Combined,
            Some(other) => {
                warn!("Unknown EXPLAINER_MODE '{}', defaulting to combined", other);
                ExplainerMode::Combined
            }
        };
        info!("Explainer mode: {:?}", explainer_mode);

        let interval_hours = env::var("COLLECT_INTERVAL_HOURS")
            .ok()
            .and_then(|hours| hours.parse::<u64>().ok())
            .unwrap_or(3);
        info!("Collection interval set to {} hours", interval_hours);

        let rate_limit_minute = env::var("OPENAI_RATE_LIMIT_MINUTE")
            .ok()
            .and_then(|limit| limit.parse::<u32>().ok())
            .unwrap_or(60);

        let rate_limit_day = env::var("OPENAI_RATE_LIMIT_DAY")
            .ok()
            .and_then(|limit| limit.parse::<u32>().ok())
            .unwrap_or(10000);

        info!(
            "Completion rate limits set to {} calls per minute and {} calls per day",
            rate_limit_minute, rate_limit_day
        );

        Self {
            mongodb_uri,
            openai_api_key,
            openai_model,
            explainer_mode,
            cycle_interval: Duration::from_secs(interval_hours * 3600),
            rate_limit_minute,
            rate_limit_day,
        }
    }
}
