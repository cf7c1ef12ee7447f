use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::{HarvestError, Result};
use crate::scraper::session::{RunOptions, ScrapeSession, SessionReport};
use crate::scraper::{DriverLauncher, ScraperConfig};

/// Shared stop request, set by the caller and polled by the session.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fire-and-forget progress lines, delivered in emission order.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ProgressSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, line: impl Into<String>) {
        let line = line.into();
        debug!(target: "leadharvest::progress", "{}", line);
        if self.tx.send(line).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}

/// Handle to a session running on its own task
pub struct SessionHandle {
    cancel: CancelFlag,
    progress: mpsc::UnboundedReceiver<String>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    /// Ask the session to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Next progress line; `None` once the session has finished and all lines are read
    pub async fn next_line(&mut self) -> Option<String> {
        self.progress.recv().await
    }

    /// Wait for the session to finish
    pub async fn finish(self) -> Result<SessionReport> {
        self.task
            .await
            .map_err(|e| HarvestError::Other(format!("Scrape task failed: {}", e)))
    }
}

/// Spawn a scrape session as a tokio task
pub fn spawn_session<L>(launcher: L, config: ScraperConfig, options: RunOptions) -> SessionHandle
where
    L: DriverLauncher + 'static,
    L::Driver: 'static,
{
    let (progress, rx) = ProgressSink::channel();
    let cancel = CancelFlag::new();

    info!(
        "Starting scrape session for '{}' (target {})",
        options.query(),
        options.target
    );
    let session = ScrapeSession::new(launcher, config, options, progress, cancel.clone());
    let task = tokio::spawn(session.run());

    SessionHandle {
        cancel,
        progress: rx,
        task,
    }
}
