//! Detail-view paging: turning page changes into article ids.

use std::time::{Duration, Instant};

/// Maps settled pager positions to article ids.
///
/// The pager has no id per page. The id to fetch is the opening article's id
/// offset by the distance moved since the last settled page. With
/// `cumulative` set, the offset is applied to the last fetched id instead,
/// so ids drift by the total number of pages swiped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeTracker {
    initial_id: i64,
    current_id: i64,
    previous_page: usize,
    cumulative: bool,
}

impl SwipeTracker {
    pub fn new(start_id: i64, start_page: usize) -> Self {
        Self {
            initial_id: start_id,
            current_id: start_id,
            previous_page: start_page,
            cumulative: false,
        }
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn initial_id(&self) -> i64 {
        self.initial_id
    }

    /// Last id handed out, or the opening id.
    pub fn current_id(&self) -> i64 {
        self.current_id
    }

    pub fn previous_page(&self) -> usize {
        self.previous_page
    }

    /// Id to fetch once the pager has settled on `page`, if any.
    ///
    /// Settling on the same page again yields nothing. A negative id yields
    /// nothing either, but the page still counts as settled.
    pub fn on_page_settled(&mut self, page: usize) -> Option<i64> {
        if page == self.previous_page {
            return None;
        }
        let delta = page as i64 - self.previous_page as i64;
        let base = if self.cumulative {
            self.current_id
        } else {
            self.initial_id
        };
        self.previous_page = page;

        let next_id = base + delta;
        if next_id < 0 {
            return None;
        }
        self.current_id = next_id;
        Some(next_id)
    }
}

/// Holds the latest value until it has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Release the pending value if it has been quiet long enough.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Pager state for the detail screen.
///
/// Each swipe moves the visible page immediately; the article fetch is only
/// requested once the pager has stopped moving for the debounce period.
#[derive(Debug, Clone)]
pub struct SwipeController {
    tracker: SwipeTracker,
    debouncer: Debouncer<usize>,
    page: usize,
    page_count: usize,
}

impl SwipeController {
    /// `page_count` is the number of articles the list reported; it bounds the pager.
    pub fn new(start_id: i64, start_page: usize, page_count: usize, debounce: Duration) -> Self {
        let page_count = page_count.max(start_page + 1);
        Self {
            tracker: SwipeTracker::new(start_id, start_page),
            debouncer: Debouncer::new(debounce),
            page: start_page,
            page_count,
        }
    }

    /// Derive ids from the last fetched article rather than the opening one.
    pub fn with_cumulative_ids(mut self, cumulative: bool) -> Self {
        self.tracker = self.tracker.cumulative(cumulative);
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Id of the article last requested by the pager.
    pub fn current_id(&self) -> i64 {
        self.tracker.current_id()
    }

    pub fn is_settling(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Move the pager by `delta` pages, clamped to `[0, page_count)`.
    ///
    /// Returns false when the pager is already at the edge.
    pub fn swipe(&mut self, delta: i64, now: Instant) -> bool {
        let max = self.page_count.saturating_sub(1) as i64;
        let target = (self.page as i64 + delta).clamp(0, max) as usize;
        if target == self.page {
            return false;
        }
        self.page = target;
        self.debouncer.push(target, now);
        true
    }

    /// Article id to fetch, once the pager has settled.
    pub fn poll(&mut self, now: Instant) -> Option<i64> {
        let page = self.debouncer.poll(now)?;
        self.tracker.on_page_settled(page)
    }
}
