use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Sliding-window limiter for completion calls, enforcing both a per-minute
/// and a per-UTC-day budget. Usage is strictly sequential in this process,
/// so the limiter mostly guards against configuration mistakes and keeps us
/// polite to the upstream API.
#[derive(Clone)]
pub struct RateLimiter {
    minute_limit: u32,
    minute_calls: Arc<Mutex<VecDeque<Instant>>>,
    day_limit: u32,
    day_calls: Arc<Mutex<VecDeque<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(minute_limit: u32, day_limit: u32) -> Self {
        Self {
            minute_limit,
            minute_calls: Arc::new(Mutex::new(VecDeque::new())),
            day_limit,
            day_calls: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    async fn check(&self) -> Result<()> {
        // Daily budget resets at midnight UTC.
        let now_utc = Utc::now();
        let today_start = now_utc.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();

        let mut day_calls = self.day_calls.lock().await;
        while day_calls.front().is_some_and(|t| *t < today_start) {
            day_calls.pop_front();
        }
        if day_calls.len() >= self.day_limit as usize {
            let msg = format!("Daily completion budget reached ({} calls)", self.day_limit);
            warn!("{}", msg);
            return Err(anyhow!(msg));
        }
        drop(day_calls);

        let now = Instant::now();
        let mut minute_calls = self.minute_calls.lock().await;
        while minute_calls
            .front()
            .is_some_and(|t| now.duration_since(*t) > Duration::from_secs(60))
        {
            minute_calls.pop_front();
        }
        if minute_calls.len() >= self.minute_limit as usize {
            let msg = format!(
                "Per-minute completion limit reached ({} calls)",
                self.minute_limit
            );
            warn!("{}", msg);
            return Err(anyhow!(msg));
        }

        Ok(())
    }

    async fn record(&self) {
        self.minute_calls.lock().await.push_back(Instant::now());
        self.day_calls.lock().await.push_back(Utc::now());
    }

    /// Acquire a call slot, waiting out the per-minute window a few times
    /// before giving up. A spent daily budget fails immediately.
    pub async fn acquire(&self) -> Result<()> {
        const MAX_ATTEMPTS: u32 = 5;
        const RETRY_DELAY: Duration = Duration::from_secs(15);

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.check().await {
                Ok(()) => {
                    self.record().await;
                    return Ok(());
                }
                Err(e) if e.to_string().contains("Per-minute") => {
                    if attempts > MAX_ATTEMPTS {
                        return Err(anyhow!(
                            "Gave up waiting for a completion slot after {} attempts",
                            MAX_ATTEMPTS
                        ));
                    }
                    info!(
                        "Rate limit retry {}/{}: waiting {:?}",
                        attempts, MAX_ATTEMPTS, RETRY_DELAY
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_succeeds_under_the_limit() {
        let limiter = RateLimiter::new(5, 100);
        for _ in 0..5 {
            assert!(limiter.acquire().await.is_ok());
        }
    }

    #[tokio::test]
    async fn daily_budget_fails_without_retry() {
        let limiter = RateLimiter::new(10, 2);
        assert!(limiter.acquire().await.is_ok());
        assert!(limiter.acquire().await.is_ok());
        let err = limiter.acquire().await.unwrap_err();
        assert!(err.to_string().contains("Daily completion budget"));
    }
}
