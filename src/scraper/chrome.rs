use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::scraper::config::ScraperConfig;
use crate::scraper::{Driver, DriverError, DriverLauncher, DriverResult};

const CLICK_FN: &str = "function() { this.click(); }";
const SCROLL_TO_END_FN: &str = "function() { this.scrollTop = this.scrollHeight; }";

/// CDP messages that mean the node behind an element handle is gone.
const STALE_MARKERS: [&str; 4] = [
    "Could not find node",
    "No node with given id",
    "Node is detached",
    "does not belong to the document",
];

fn is_stale_message(msg: &str) -> bool {
    STALE_MARKERS.iter().any(|m| msg.contains(m))
}

fn map_cdp(err: CdpError) -> DriverError {
    let msg = err.to_string();
    if is_stale_message(&msg) {
        DriverError::Stale
    } else {
        DriverError::Browser(msg)
    }
}

/// Launches Chrome via chromiumoxide
pub struct ChromeLauncher {
    config: ScraperConfig,
}

impl ChromeLauncher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self, headless: bool) -> DriverResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--start-maximized")
            .arg("--disable-blink-features=AutomationControlled");

        if headless {
            builder = builder.window_size(1920, 1080);
        } else {
            builder = builder.with_head();
        }

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg.as_str());
        }

        builder
            .build()
            .map_err(|e| DriverError::Browser(format!("Failed to build browser config: {}", e)))
    }
}

#[async_trait]
impl DriverLauncher for ChromeLauncher {
    type Driver = ChromeDriver;

    async fn launch(&self, headless: bool) -> DriverResult<ChromeDriver> {
        info!("Launching browser (headless={})", headless);
        let browser_config = self.browser_config(headless)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            DriverError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| DriverError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(ChromeDriver {
            browser,
            page,
            handler_task,
        })
    }
}

/// Chrome-backed [`Driver`] operating on a single tab
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl Driver for ChromeDriver {
    type Handle = Element;

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(map_cdp)?;
        self.page.wait_for_navigation().await.map_err(map_cdp)?;
        Ok(())
    }

    async fn find_all(&self, locator: &str) -> DriverResult<Vec<Element>> {
        self.page.find_elements(locator).await.map_err(map_cdp)
    }

    async fn read_text(&self, handle: &Element) -> DriverResult<String> {
        Ok(handle
            .inner_text()
            .await
            .map_err(map_cdp)?
            .unwrap_or_default())
    }

    async fn read_attribute(&self, handle: &Element, name: &str) -> DriverResult<Option<String>> {
        handle.attribute(name).await.map_err(map_cdp)
    }

    async fn hover(&self, handle: &Element) -> DriverResult<()> {
        handle.hover().await.map_err(map_cdp)?;
        Ok(())
    }

    async fn click(&self, handle: &Element) -> DriverResult<()> {
        // Script click: overlays in the feed swallow synthetic mouse clicks
        handle.call_js_fn(CLICK_FN, false).await.map_err(map_cdp)?;
        Ok(())
    }

    async fn scroll_to_end(&self, container: &Element) -> DriverResult<()> {
        container
            .call_js_fn(SCROLL_TO_END_FN, false)
            .await
            .map_err(map_cdp)?;
        Ok(())
    }

    async fn quit(&mut self) -> DriverResult<()> {
        info!("Closing browser");
        let closed = self.browser.close().await.map_err(map_cdp);
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }
}
