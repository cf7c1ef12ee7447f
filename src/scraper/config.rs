use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the browser-driven scrape session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// How long to wait for the results feed to appear, in seconds (default: 20)
    pub feed_timeout_secs: u64,

    /// How long to wait for a listing's detail view to open, in seconds (default: 15)
    pub detail_timeout_secs: u64,

    /// Polling interval for bounded waits in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// Consecutive scrolls without new results before the feed counts as exhausted (default: 3)
    pub max_patience: u32,

    /// Target counts above this use the slower pacing tiers (default: 50)
    pub volume_threshold: usize,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Extra command-line arguments passed to Chrome
    pub chrome_args: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            feed_timeout_secs: 20,
            detail_timeout_secs: 15,
            poll_interval_ms: 250,
            max_patience: 3,
            volume_threshold: 50,
            user_agent: None,
            chrome_args: Vec::new(),
        }
    }
}

impl ScraperConfig {
    /// Get the results feed timeout as a Duration
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    /// Get the detail view timeout as a Duration
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
