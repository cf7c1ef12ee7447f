//! Walks a lazily-loaded results feed.
//!
//! The feed only renders part of its entries at a time; scrolling to its
//! end may load more. Whether new entries appeared is checked explicitly
//! after every scroll, and a patience counter separates slow loading from
//! the real end of the results.
//!
//! ```text
//!            cursor < visible
//!          ┌──────────────────┐
//!          ▼                  │
//!     Scanning ── cursor == visible ──▶ LoadingMore
//!          ▲                              │   │
//!          └────────── grew ──────────────┘   │ stalled `max_patience` times
//!                                             ▼
//!                                         Exhausted
//! ```

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Scanning,
    LoadingMore,
    Exhausted,
}

/// What the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Open the entry at this index.
    Visit(usize),
    /// Scroll the feed, pause, then report the new entry count via [`FeedPaginator::after_scroll`].
    LoadMore,
    /// No more entries will appear.
    Exhausted,
}

/// Result of re-measuring the feed after a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollResult {
    Grew,
    Stalled { patience: u32 },
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct FeedPaginator {
    cursor: usize,
    patience: u32,
    max_patience: u32,
    state: FeedState,
}

impl FeedPaginator {
    pub fn new(max_patience: u32) -> Self {
        Self {
            cursor: 0,
            patience: 0,
            max_patience: max_patience.max(1),
            state: FeedState::Scanning,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn patience(&self) -> u32 {
        self.patience
    }

    pub fn max_patience(&self) -> u32 {
        self.max_patience
    }

    /// Decide the next step given how many entries the feed currently shows.
    pub fn next_step(&mut self, visible: usize) -> Step {
        if self.state == FeedState::Exhausted {
            return Step::Exhausted;
        }

        if self.cursor < visible {
            let index = self.cursor;
            self.cursor += 1;
            self.state = FeedState::Scanning;
            Step::Visit(index)
        } else {
            self.state = FeedState::LoadingMore;
            Step::LoadMore
        }
    }

    /// Record the entry count measured after a scroll-to-load.
    pub fn after_scroll(&mut self, visible: usize) -> ScrollResult {
        if self.state == FeedState::Exhausted {
            return ScrollResult::Exhausted;
        }

        if visible > self.cursor {
            self.patience = 0;
            self.state = FeedState::Scanning;
            return ScrollResult::Grew;
        }

        self.patience += 1;
        debug!(
            "Feed did not grow past {} entries ({}/{})",
            self.cursor, self.patience, self.max_patience
        );

        if self.patience >= self.max_patience {
            self.state = FeedState::Exhausted;
            ScrollResult::Exhausted
        } else {
            ScrollResult::Stalled {
                patience: self.patience,
            }
        }
    }

    /// Restart the scan from the first entry after the feed re-rendered.
    pub fn reset(&mut self) {
        if self.state != FeedState::Exhausted {
            self.cursor = 0;
            self.state = FeedState::Scanning;
        }
    }
}
