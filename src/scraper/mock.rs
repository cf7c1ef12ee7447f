//! In-memory driver simulating a lazily-loaded results feed.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::app::{HarvestError, Result};
use crate::domain::LeadRecord;
use crate::scraper::background::CancelFlag;
use crate::scraper::locators;
use crate::scraper::{Driver, DriverError, DriverLauncher, DriverResult};
use crate::store::LeadStore;

#[derive(Debug, Clone)]
pub struct MockListing {
    label: Option<String>,
    name: String,
    fields: HashMap<String, String>,
    faults: HashMap<String, DriverError>,
    website: Option<String>,
    opens: bool,
}

impl MockListing {
    pub fn new(name: &str) -> Self {
        Self {
            label: Some(name.to_string()),
            name: name.to_string(),
            fields: HashMap::new(),
            faults: HashMap::new(),
            website: None,
            opens: true,
        }
    }

    pub fn with(mut self, locator: &str, text: &str) -> Self {
        self.fields.insert(locator.to_string(), text.to_string());
        self
    }

    /// The first read of this field fails with `err`; later reads see it as absent.
    pub fn with_fault(mut self, locator: &str, err: DriverError) -> Self {
        self.faults.insert(locator.to_string(), err);
        self
    }

    pub fn with_website(mut self, href: &str) -> Self {
        self.website = Some(href.to_string());
        self
    }

    pub fn unlabeled(mut self) -> Self {
        self.label = None;
        self
    }

    /// Clicking this entry leaves the previous detail view on screen.
    pub fn never_opens(mut self) -> Self {
        self.opens = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockHandle {
    Feed,
    Entry(usize),
    Heading,
    Field(String),
}

#[derive(Default)]
struct MockState {
    listings: Vec<MockListing>,
    visible: usize,
    growth: VecDeque<usize>,
    has_feed: bool,
    open: Option<usize>,
    stale_clicks: HashSet<usize>,
    clicks: Vec<usize>,
    scrolls: usize,
    launched: bool,
    quit: bool,
    cancel_after: Option<(usize, CancelFlag)>,
}

impl MockState {
    fn take_fault(&mut self, handle: &MockHandle) -> Option<DriverError> {
        let (MockHandle::Field(locator), Some(open)) = (handle, self.open) else {
            return None;
        };
        self.listings[open].faults.remove(locator)
    }
}

/// Cloning shares the underlying page state.
#[derive(Clone)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new(listings: Vec<MockListing>, visible: usize) -> Self {
        let visible = visible.min(listings.len());
        Self {
            state: Arc::new(Mutex::new(MockState {
                listings,
                visible,
                has_feed: true,
                ..Default::default()
            })),
        }
    }

    /// A page with a single listing whose detail view is already open.
    pub fn with_open_listing(listing: MockListing) -> Self {
        let driver = Self::new(vec![listing], 1);
        driver.state().open = Some(0);
        driver
    }

    /// Visible entry counts after each successive scroll.
    pub fn with_growth(self, counts: Vec<usize>) -> Self {
        self.state().growth = counts.into();
        self
    }

    /// The first click on this entry reports a stale handle.
    pub fn with_stale_click(self, index: usize) -> Self {
        self.state().stale_clicks.insert(index);
        self
    }

    pub fn without_feed(self) -> Self {
        self.state().has_feed = false;
        self
    }

    pub fn cancel_after_clicks(&self, clicks: usize, flag: CancelFlag) {
        self.state().cancel_after = Some((clicks, flag));
    }

    pub fn clicks(&self) -> Vec<usize> {
        self.state().clicks.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state().scrolls
    }

    pub fn was_launched(&self) -> bool {
        self.state().launched
    }

    pub fn was_quit(&self) -> bool {
        self.state().quit
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Handle = MockHandle;

    async fn navigate(&self, _url: &str) -> DriverResult<()> {
        Ok(())
    }

    async fn find_all(&self, locator: &str) -> DriverResult<Vec<MockHandle>> {
        let state = self.state();
        let handles = match locator {
            locators::RESULTS_FEED if state.has_feed => vec![MockHandle::Feed],
            locators::RESULTS_FEED => Vec::new(),
            locators::ENTRY_LINK => (0..state.visible).map(MockHandle::Entry).collect(),
            locators::DETAIL_HEADING => state.open.map(|_| MockHandle::Heading).into_iter().collect(),
            _ => match state.open.map(|i| &state.listings[i]) {
                Some(l) if locator == locators::WEBSITE && l.website.is_some() => {
                    vec![MockHandle::Field(locator.to_string())]
                }
                Some(l) if l.fields.contains_key(locator) || l.faults.contains_key(locator) => {
                    vec![MockHandle::Field(locator.to_string())]
                }
                _ => Vec::new(),
            },
        };
        Ok(handles)
    }

    async fn read_text(&self, handle: &MockHandle) -> DriverResult<String> {
        let mut state = self.state();
        if let Some(err) = state.take_fault(handle) {
            return Err(err);
        }
        let open = state.open.map(|i| &state.listings[i]);
        match (handle, open) {
            (MockHandle::Heading, Some(l)) => Ok(l.name.clone()),
            (MockHandle::Field(locator), Some(l)) => l
                .fields
                .get(locator)
                .cloned()
                .ok_or_else(|| DriverError::NotFound(locator.clone())),
            (MockHandle::Entry(i), _) => Ok(state.listings[*i].name.clone()),
            _ => Err(DriverError::Stale),
        }
    }

    async fn read_attribute(&self, handle: &MockHandle, name: &str) -> DriverResult<Option<String>> {
        let mut state = self.state();
        if let Some(err) = state.take_fault(handle) {
            return Err(err);
        }
        match handle {
            MockHandle::Entry(i) if name == locators::ENTRY_LABEL_ATTR => {
                Ok(state.listings[*i].label.clone())
            }
            MockHandle::Field(locator) if locator == locators::WEBSITE && name == "href" => {
                Ok(state.open.and_then(|i| state.listings[i].website.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn hover(&self, _handle: &MockHandle) -> DriverResult<()> {
        Ok(())
    }

    async fn click(&self, handle: &MockHandle) -> DriverResult<()> {
        let mut state = self.state();
        let MockHandle::Entry(index) = *handle else {
            return Ok(());
        };

        if state.stale_clicks.remove(&index) {
            return Err(DriverError::Stale);
        }

        state.clicks.push(index);
        if state.listings[index].opens {
            state.open = Some(index);
        }

        let clicks = state.clicks.len();
        if let Some((after, flag)) = &state.cancel_after {
            if clicks >= *after {
                flag.cancel();
            }
        }
        Ok(())
    }

    async fn scroll_to_end(&self, _container: &MockHandle) -> DriverResult<()> {
        let mut state = self.state();
        state.scrolls += 1;
        if let Some(count) = state.growth.pop_front() {
            state.visible = count.min(state.listings.len());
        }
        Ok(())
    }

    async fn quit(&mut self) -> DriverResult<()> {
        self.state().quit = true;
        Ok(())
    }
}

pub struct MockLauncher {
    driver: Option<MockDriver>,
}

impl MockLauncher {
    pub fn new(driver: MockDriver) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    pub fn failing() -> Self {
        Self { driver: None }
    }
}

#[async_trait]
impl DriverLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self, _headless: bool) -> DriverResult<MockDriver> {
        let driver = self
            .driver
            .clone()
            .ok_or_else(|| DriverError::Browser("no browser available".into()))?;
        driver.state().launched = true;
        Ok(driver)
    }
}

/// Collects leads in memory; the first `fail_first` appends fail.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Vec<LeadRecord>,
    fail_first: usize,
}

impl MemoryStore {
    pub fn failing_first(count: usize) -> Self {
        Self {
            records: Vec::new(),
            fail_first: count,
        }
    }
}

impl LeadStore for MemoryStore {
    fn append(&mut self, record: &LeadRecord) -> Result<()> {
        if self.fail_first > 0 {
            self.fail_first -= 1;
            return Err(HarvestError::Other("disk full".into()));
        }
        self.records.push(record.clone());
        Ok(())
    }
}
