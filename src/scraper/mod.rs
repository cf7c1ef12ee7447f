//! Browser-driven scrape session engine.
//!
//! This module walks a map-search results feed, opens each listing, extracts
//! a [`LeadRecord`](crate::domain::LeadRecord), and appends new leads to the
//! output file.
//!
//! # Architecture
//!
//! ```text
//! ScrapeSession → FeedPaginator (next entry) → Driver (open entry)
//!               → FieldExtractor (record) → DedupIndex → LeadStore
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use leadharvest::scraper::{spawn_session, ChromeLauncher, RunOptions, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let launcher = ChromeLauncher::new(config.clone());
//! let mut handle = spawn_session(launcher, config, options);
//!
//! while let Some(line) = handle.next_line().await {
//!     println!("{line}");
//! }
//! let report = handle.finish().await?;
//! ```

mod background;
mod chrome;
mod config;
mod extractor;
pub mod locators;
mod pacing;
mod pagination;
mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use background::{spawn_session, CancelFlag, ProgressSink, SessionHandle};
pub use chrome::{ChromeDriver, ChromeLauncher};
pub use config::ScraperConfig;
pub use extractor::{clean_text, clean_url, parse_review_blob, FieldExtractor};
pub use pacing::{DelayTier, PacingPolicy};
pub use pagination::{FeedPaginator, FeedState, ScrollResult, Step};
pub use session::{
    search_url, RunOptions, ScrapeSession, SessionOutcome, SessionReport, FINISHED_MESSAGE,
    STOPPED_MESSAGE,
};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Faults reported by a browser driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Element reference is stale")]
    Stale,

    #[error("Browser error: {0}")]
    Browser(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Primitive page operations the session engine needs from a browser.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Reference to an element on the current page
    type Handle: Send + Sync;

    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// All elements matching `locator`, in document order
    async fn find_all(&self, locator: &str) -> DriverResult<Vec<Self::Handle>>;

    async fn read_text(&self, handle: &Self::Handle) -> DriverResult<String>;

    async fn read_attribute(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> DriverResult<Option<String>>;

    /// Move the pointer over an element
    async fn hover(&self, handle: &Self::Handle) -> DriverResult<()>;

    async fn click(&self, handle: &Self::Handle) -> DriverResult<()>;

    /// Scroll a container to its end so the page loads more content
    async fn scroll_to_end(&self, container: &Self::Handle) -> DriverResult<()>;

    /// Shut the browser down
    async fn quit(&mut self) -> DriverResult<()>;

    /// First element matching `locator`
    async fn find(&self, locator: &str) -> DriverResult<Self::Handle> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound(locator.to_string()))
    }

    /// Poll for an element until it appears or `timeout` elapses
    async fn wait_for_element(
        &self,
        locator: &str,
        timeout: Duration,
        poll: Duration,
    ) -> DriverResult<Self::Handle> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.find(locator).await {
                Ok(handle) => return Ok(handle),
                Err(DriverError::NotFound(_)) | Err(DriverError::Stale) => {}
                Err(e) => return Err(e),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DriverError::Timeout(locator.to_string()));
            }
            tokio::time::sleep(poll).await;
        }
    }
}

/// Starts a fresh browser for one session.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    type Driver: Driver;

    async fn launch(&self, headless: bool) -> DriverResult<Self::Driver>;
}
