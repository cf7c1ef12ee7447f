use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::app::{HarvestError, Result};
use crate::domain::LeadRecord;
use crate::scraper::background::{CancelFlag, ProgressSink};
use crate::scraper::extractor::FieldExtractor;
use crate::scraper::locators;
use crate::scraper::pacing::{DelayTier, PacingPolicy};
use crate::scraper::pagination::{FeedPaginator, ScrollResult, Step};
use crate::scraper::{Driver, DriverError, DriverLauncher, DriverResult, ScraperConfig};
use crate::store::{CsvLeadWriter, DedupIndex, LeadStore};

pub const STOPPED_MESSAGE: &str = "-> Scraping stopped by user.";
pub const FINISHED_MESSAGE: &str = "Scraping Session Finished.";

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// Map-search URL for a free-text query.
pub fn search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", SEARCH_BASE, encoded)
}

/// Inputs for one scrape run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub keyword: String,
    pub location: String,
    pub country: String,
    /// Number of new leads to collect
    pub target: usize,
    pub headless: bool,
    pub output: PathBuf,
    /// Addresses already present in the output file
    pub known: DedupIndex,
}

impl RunOptions {
    pub fn query(&self) -> String {
        format!("{} in {}, {}", self.keyword, self.location, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    TargetReached,
    Exhausted,
    Cancelled,
    /// Setup failed or the run hit an unrecoverable error
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

enum EntryOutcome {
    Accepted,
    Duplicate,
    Unlabeled,
}

/// Per-entry faults; none of them ends the run.
#[derive(Debug, PartialEq, Eq)]
enum EntryFault {
    StaleHandle,
    DetailTimeout(String),
    Unexpected(String),
}

impl EntryFault {
    fn classify(err: &HarvestError) -> Self {
        match err.driver_fault() {
            Some(DriverError::Stale) => EntryFault::StaleHandle,
            Some(DriverError::Timeout(what)) => EntryFault::DetailTimeout(what.clone()),
            _ => EntryFault::Unexpected(err.to_string()),
        }
    }
}

/// Drives one run: opens the search, walks the feed, extracts and stores leads.
pub struct ScrapeSession<L: DriverLauncher> {
    launcher: L,
    config: ScraperConfig,
    options: RunOptions,
    known: DedupIndex,
    pacing: PacingPolicy,
    extractor: FieldExtractor,
    progress: ProgressSink,
    cancel: CancelFlag,
    accepted: usize,
    duplicates: usize,
    skipped: usize,
}

impl<L: DriverLauncher> ScrapeSession<L> {
    pub fn new(
        launcher: L,
        config: ScraperConfig,
        mut options: RunOptions,
        progress: ProgressSink,
        cancel: CancelFlag,
    ) -> Self {
        let pacing = PacingPolicy::for_target(options.target, config.volume_threshold);
        let known = std::mem::take(&mut options.known);
        Self {
            launcher,
            config,
            options,
            known,
            pacing,
            extractor: FieldExtractor::new(),
            progress,
            cancel,
            accepted: 0,
            duplicates: 0,
            skipped: 0,
        }
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run to completion. Always ends with [`FINISHED_MESSAGE`] on the progress sink.
    pub async fn run(mut self) -> SessionReport {
        let started_at = Utc::now();

        let outcome = if self.options.target == 0 {
            info!("Target is zero, nothing to scrape");
            SessionOutcome::TargetReached
        } else {
            match CsvLeadWriter::open(&self.options.output) {
                Ok(mut writer) => self.run_with_store(&mut writer).await,
                Err(e) => self.fail(e),
            }
        };

        info!(
            "Session ended ({:?}): {} accepted, {} duplicates, {} skipped",
            outcome, self.accepted, self.duplicates, self.skipped
        );
        self.progress.emit(FINISHED_MESSAGE);

        SessionReport {
            outcome,
            accepted: self.accepted,
            duplicates: self.duplicates,
            skipped: self.skipped,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Launch the browser, walk the feed into `store`, and always shut the browser down.
    pub async fn run_with_store<S: LeadStore + Send>(&mut self, store: &mut S) -> SessionOutcome {
        if self.cancel.is_cancelled() {
            self.progress.emit(STOPPED_MESSAGE);
            return SessionOutcome::Cancelled;
        }

        if self.options.headless {
            self.progress.emit("-> Running in headless mode.");
        }

        let mut driver = match self.launcher.launch(self.options.headless).await {
            Ok(driver) => driver,
            Err(e) => return self.fail(e.into()),
        };

        let result = self.walk_feed(&driver, store).await;

        if let Err(e) = driver.quit().await {
            warn!("Failed to close browser cleanly: {}", e);
        }

        result.unwrap_or_else(|e| self.fail(e))
    }

    fn fail(&self, err: HarvestError) -> SessionOutcome {
        error!("Scrape session failed: {}", err);
        self.progress.emit(format!(
            "An unexpected error occurred in the main process: {}",
            err
        ));
        SessionOutcome::Failed(err.to_string())
    }

    async fn walk_feed<S: LeadStore + Send>(
        &mut self,
        driver: &L::Driver,
        store: &mut S,
    ) -> Result<SessionOutcome> {
        let url = search_url(&self.options.query());
        self.progress.emit(format!("Navigating to: {}", url));
        driver.navigate(&url).await?;

        let feed = driver
            .wait_for_element(
                locators::RESULTS_FEED,
                self.config.feed_timeout(),
                self.config.poll_interval(),
            )
            .await?;

        let mut paginator = FeedPaginator::new(self.config.max_patience);

        loop {
            if self.accepted >= self.options.target {
                info!("Reached target of {} leads", self.options.target);
                return Ok(SessionOutcome::TargetReached);
            }
            if self.cancel.is_cancelled() {
                self.progress.emit(STOPPED_MESSAGE);
                return Ok(SessionOutcome::Cancelled);
            }

            let entries = driver.find_all(locators::ENTRY_LINK).await?;

            match paginator.next_step(entries.len()) {
                Step::Visit(index) => {
                    if let Err(err) = self.visit(driver, &entries[index], store).await {
                        self.absorb(EntryFault::classify(&err), &mut paginator);
                    }
                }
                Step::LoadMore => {
                    self.progress
                        .emit("-> All visible businesses processed, scrolling to load more...");
                    driver.scroll_to_end(&feed).await?;
                    self.pacing.delay(DelayTier::Medium).await;

                    let visible = driver.find_all(locators::ENTRY_LINK).await?.len();
                    match paginator.after_scroll(visible) {
                        ScrollResult::Grew => debug!("Feed grew to {} entries", visible),
                        ScrollResult::Stalled { patience } => {
                            self.report_stall(patience, &paginator)
                        }
                        ScrollResult::Exhausted => {
                            self.report_stall(paginator.patience(), &paginator);
                            self.progress.emit("-> Reached the end of all search results.");
                            return Ok(SessionOutcome::Exhausted);
                        }
                    }
                }
                Step::Exhausted => return Ok(SessionOutcome::Exhausted),
            }
        }
    }

    fn report_stall(&self, patience: u32, paginator: &FeedPaginator) {
        self.progress.emit(format!(
            "  -> Scroll did not reveal new results. Patience: {}/{}",
            patience,
            paginator.max_patience()
        ));
    }

    fn absorb(&mut self, fault: EntryFault, paginator: &mut FeedPaginator) {
        match fault {
            EntryFault::StaleHandle => {
                self.progress
                    .emit("  -> Stale element detected. Re-evaluating page.");
                paginator.reset();
            }
            EntryFault::DetailTimeout(what) => {
                warn!("Detail view did not open: {}", what);
                self.skipped += 1;
                self.progress
                    .emit(format!("  -> Timed out waiting for details of {}. Skipping.", what));
            }
            EntryFault::Unexpected(msg) => {
                warn!("Entry failed: {}", msg);
                self.skipped += 1;
                self.progress
                    .emit(format!("  -> An unexpected error occurred: {}", msg));
            }
        }
    }

    async fn visit<S: LeadStore + Send>(
        &mut self,
        driver: &L::Driver,
        entry: &<L::Driver as Driver>::Handle,
        store: &mut S,
    ) -> Result<EntryOutcome> {
        let label = driver
            .read_attribute(entry, locators::ENTRY_LABEL_ATTR)
            .await?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let Some(label) = label else {
            debug!("Skipping entry without a label");
            return Ok(EntryOutcome::Unlabeled);
        };

        driver.hover(entry).await?;
        self.pacing.delay(DelayTier::Short).await;
        driver.click(entry).await?;
        self.await_detail(driver, &label).await?;

        let record = self.extractor.extract(driver).await?;
        self.admit(record, store)
    }

    /// Poll the detail heading until it shows `label` or the detail timeout elapses.
    async fn await_detail(&self, driver: &L::Driver, label: &str) -> DriverResult<()> {
        let deadline = Instant::now() + self.config.detail_timeout();
        loop {
            match driver.find(locators::DETAIL_HEADING).await {
                Ok(heading) => match driver.read_text(&heading).await {
                    Ok(text) if text.contains(label) => return Ok(()),
                    Ok(_) | Err(DriverError::Stale) => {}
                    Err(e) => return Err(e),
                },
                Err(DriverError::NotFound(_)) | Err(DriverError::Stale) => {}
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(label.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    fn admit<S: LeadStore>(&mut self, record: LeadRecord, store: &mut S) -> Result<EntryOutcome> {
        if self.known.is_duplicate(&record) {
            self.duplicates += 1;
            self.progress.emit(format!(
                "  -> Duplicate found (already in CSV): {}. Skipping.",
                record.display_name()
            ));
            return Ok(EntryOutcome::Duplicate);
        }

        store.append(&record)?;
        self.known.accept(&record);
        self.accepted += 1;
        self.progress.emit(format!(
            "  -> Lead #{}: {}",
            self.accepted,
            record.display_name()
        ));
        Ok(EntryOutcome::Accepted)
    }
}
