use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use scraper::{Html, Selector};
use tracing::{error, info, warn};

use crate::countries::{trends_url, Country};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Tried in order against the rendered page; scanning stops as soon as ten
// raw candidates have been collected.
const SELECTORS: &[&str] = &[
    "div.mZ3RIc",
    "div[class*='title']",
    "a[class*='title']",
    "div.feed-item-header",
    "div.summary-text a",
];

// Navigation chrome and UI labels that leak into the selector matches.
const STOPWORDS: &[&str] = &[
    "Trends", "trending", "실시간 인기", "로그인", "Login", "Sign in",
    "location_on", "menu", "search", "Google", "▾", "더보기", "More",
    "Privacy", "Terms", "Help", "Settings", "Account", "All categories",
];

const MAX_KEYWORDS: usize = 10;
const RENDER_TIMEOUT: Duration = Duration::from_secs(10);
const SCROLL_SETTLE: Duration = Duration::from_secs(3);

/// Scrapes a country's trends page with a headless browser. One browser is
/// launched and torn down per call; nothing is shared between countries.
pub struct TrendsScraper {
    debug_dir: PathBuf,
}

impl TrendsScraper {
    pub fn new() -> Self {
        Self {
            debug_dir: PathBuf::from("debug_output"),
        }
    }

    /// Returns up to ten filtered, deduplicated keywords in rank order, or an
    /// empty list on any failure. Callers treat empty as "skip this country".
    pub async fn trending_keywords(&self, country: Country) -> Vec<String> {
        let debug_dir = self.debug_dir.clone();
        let result =
            tokio::task::spawn_blocking(move || scrape_country(country, &debug_dir)).await;

        match result {
            Ok(Ok(keywords)) => {
                info!(
                    "Collected {} trending keywords for {}",
                    keywords.len(),
                    country.code
                );
                keywords
            }
            Ok(Err(e)) => {
                error!("Trends scrape failed for {}: {:?}", country.code, e);
                Vec::new()
            }
            Err(e) => {
                error!("Trends scrape task panicked for {}: {:?}", country.code, e);
                Vec::new()
            }
        }
    }
}

fn scrape_country(country: Country, debug_dir: &PathBuf) -> Result<Vec<String>> {
    let url = trends_url(country.code)
        .ok_or_else(|| anyhow!("No trends URL configured for {}", country.code))?;

    info!("Launching browser for {}", country.code);
    let browser = Browser::new(LaunchOptions {
        headless: true,
        sandbox: false,
        window_size: Some((1920, 1080)),
        ..Default::default()
    })?;

    let tab = browser.new_tab()?;
    tab.set_user_agent(USER_AGENT, None, None)?;

    info!("Navigating to {}", url);
    tab.navigate_to(url)?;
    tab.wait_until_navigated()?;

    // Wait for the trend cards rather than sleeping blind; the page renders
    // client-side and the primary selector may simply never appear.
    if tab
        .wait_for_element_with_custom_timeout(SELECTORS[0], RENDER_TIMEOUT)
        .is_err()
    {
        warn!(
            "Primary selector did not appear for {} within {:?}, scraping anyway",
            country.code, RENDER_TIMEOUT
        );
    }

    // One scroll step to trigger lazy-loaded content, then a short settle.
    tab.evaluate("window.scrollTo(0, 1000);", false)?;
    std::thread::sleep(SCROLL_SETTLE);

    let html = tab.get_content()?;
    save_debug_artifacts(&tab, country.code, &html, debug_dir);

    let candidates = extract_candidates(&html);
    Ok(filter_keywords(candidates))
}

// Diagnostic side effect only; failures here never fail the scrape.
fn save_debug_artifacts(
    tab: &headless_chrome::Tab,
    country_code: &str,
    html: &str,
    debug_dir: &PathBuf,
) {
    if let Err(e) = fs::create_dir_all(debug_dir) {
        warn!("Could not create debug directory: {}", e);
        return;
    }

    let html_path = debug_dir.join(format!("{}_trends.html", country_code));
    match fs::write(&html_path, html) {
        Ok(_) => info!("Saved page markup to {}", html_path.display()),
        Err(e) => warn!("Could not save page markup: {}", e),
    }

    let png_path = debug_dir.join(format!("{}_trends.png", country_code));
    match tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true) {
        Ok(bytes) => match fs::write(&png_path, bytes) {
            Ok(_) => info!("Saved screenshot to {}", png_path.display()),
            Err(e) => warn!("Could not save screenshot: {}", e),
        },
        Err(e) => warn!("Could not capture screenshot: {}", e),
    }
}

/// Walk the selector fallback chain in order, accumulating visible text of
/// matched elements in document order. The first selectors that yield ten
/// raw candidates win; later selectors are not consulted.
pub fn extract_candidates(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut candidates: Vec<String> = Vec::new();

    for pattern in SELECTORS {
        let selector = match Selector::parse(pattern) {
            Ok(selector) => selector,
            Err(_) => continue,
        };

        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join("").trim().to_string();
            if text.chars().count() > 2 && !candidates.contains(&text) {
                candidates.push(text);
                if candidates.len() >= MAX_KEYWORDS {
                    return candidates;
                }
            }
        }
    }

    candidates
}

/// Filtering pipeline: drop short strings, drop UI-noise stopwords, then
/// deduplicate case-insensitively keeping first-seen casing and order, and
/// truncate to ten.
pub fn filter_keywords(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut keywords: Vec<String> = Vec::new();

    for candidate in raw {
        if candidate.chars().count() <= 2 {
            continue;
        }
        if STOPWORDS.contains(&candidate.as_str()) {
            continue;
        }
        let lowered = candidate.to_lowercase();
        if seen.contains(&lowered) {
            continue;
        }
        seen.push(lowered);
        keywords.push(candidate);
        if keywords.len() >= MAX_KEYWORDS {
            break;
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filter_drops_short_stopword_and_duplicate_entries() {
        let raw = strings(&["Google", "Foo", "foo", "Ba", "Bar Baz"]);
        assert_eq!(filter_keywords(raw), strings(&["Foo", "Bar Baz"]));
    }

    #[test]
    fn filter_keeps_first_seen_casing_and_order() {
        let raw = strings(&["Taylor Swift", "TAYLOR SWIFT", "election", "Election"]);
        assert_eq!(filter_keywords(raw), strings(&["Taylor Swift", "election"]));
    }

    #[test]
    fn filter_truncates_to_ten() {
        let raw: Vec<String> = (0..25).map(|i| format!("keyword {}", i)).collect();
        let filtered = filter_keywords(raw);
        assert_eq!(filtered.len(), 10);
        assert_eq!(filtered[0], "keyword 0");
        assert_eq!(filtered[9], "keyword 9");
    }

    #[test]
    fn filter_never_emits_stopwords() {
        let raw = strings(&["Privacy", "Terms", "Settings", "Actual Topic"]);
        assert_eq!(filter_keywords(raw), strings(&["Actual Topic"]));
    }

    #[test]
    fn candidates_come_from_first_matching_selector() {
        let html = r#"
            <html><body>
                <div class="mZ3RIc">First Topic</div>
                <div class="mZ3RIc">Second Topic</div>
                <div class="feed-item-header">Fallback Topic</div>
            </body></html>
        "#;
        let candidates = extract_candidates(html);
        assert!(candidates.contains(&"First Topic".to_string()));
        assert!(candidates.contains(&"Second Topic".to_string()));
    }

    #[test]
    fn fallback_selector_used_when_primary_matches_nothing() {
        let html = r#"
            <html><body>
                <div class="feed-item-header">Lazy Loaded Topic</div>
            </body></html>
        "#;
        let candidates = extract_candidates(html);
        assert_eq!(candidates, strings(&["Lazy Loaded Topic"]));
    }

    #[test]
    fn candidate_scan_stops_at_ten() {
        let mut html = String::from("<html><body>");
        for i in 0..15 {
            html.push_str(&format!("<div class=\"mZ3RIc\">Topic number {}</div>", i));
        }
        html.push_str("</body></html>");
        assert_eq!(extract_candidates(&html).len(), 10);
    }
}
