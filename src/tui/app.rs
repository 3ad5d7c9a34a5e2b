use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::browse::{PageRequest, PaginationState, SwipeController};
use crate::domain::{Article, FetchOutcome, SideSignal};

pub const PAGE_SIZE: usize = 10;

/// How long a toast stays in the status bar.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
    Preferences,
}

/// State of the single-article pager.
pub struct DetailView {
    pub pager: SwipeController,
    pub article: Option<Article>,
    /// Error detail shown in place of the article.
    pub message: Option<String>,
    pub scroll: u16,
}

impl DetailView {
    pub fn new(pager: SwipeController, article: Option<Article>) -> Self {
        Self {
            pager,
            article,
            message: None,
            scroll: 0,
        }
    }

    /// Apply the result of fetching article `id`.
    ///
    /// Results for anything but the id the pager is on are dropped. An error
    /// replaces the article so the screen never shows one under another's id.
    pub fn apply_outcome(&mut self, id: i64, outcome: Option<FetchOutcome<Article>>) {
        if self.pager.current_id() != id {
            return;
        }
        match outcome {
            Some(FetchOutcome::Success(article)) => {
                self.article = Some(article);
                self.message = None;
                self.scroll = 0;
            }
            Some(FetchOutcome::Error(message)) => {
                self.article = None;
                self.message = Some(message);
                self.scroll = 0;
            }
            None => {}
        }
    }
}

/// News-site picker.
pub struct PreferenceView {
    pub sites: Vec<String>,
    pub filter: String,
    pub editing: bool,
    pub index: usize,
    pub selected: Option<String>,
    pub list_state: ListState,
}

impl PreferenceView {
    pub fn new(sites: Vec<String>, selected: Option<String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            sites,
            filter: String::new(),
            editing: false,
            index: 0,
            selected,
            list_state,
        }
    }

    /// Sites matching the filter, case-insensitively.
    pub fn visible(&self) -> Vec<&str> {
        let needle = self.filter.to_lowercase();
        self.sites
            .iter()
            .filter(|site| site.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn move_up(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.list_state.select(Some(self.index));
        }
    }

    pub fn move_down(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.index < len - 1 {
            self.index += 1;
            self.list_state.select(Some(self.index));
        }
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.reset_cursor();
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.index = 0;
        self.list_state.select(Some(0));
    }

    /// Select the highlighted site, or clear the selection if it already is.
    pub fn toggle(&mut self) {
        let Some(site) = self.visible().get(self.index).map(|s| s.to_string()) else {
            return;
        };
        if self.selected.as_deref() == Some(site.as_str()) {
            self.selected = None;
        } else {
            self.selected = Some(site);
        }
    }
}

pub struct TuiApp {
    pub screen: Screen,
    pub pagination: PaginationState,
    pub item_index: usize,
    pub list_state: ListState,
    pub search: String,
    pub editing_search: bool,
    pub sites: Vec<String>,
    pub chip_index: usize,
    pub selected_chip: Option<usize>,
    pub detail: Option<DetailView>,
    pub preferences: Option<PreferenceView>,
    pub loaders: usize,
    pub toast: Option<(String, Instant)>,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(pagination: PaginationState) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            screen: Screen::List,
            pagination,
            item_index: 0,
            list_state,
            search: String::new(),
            editing_search: false,
            sites: Vec::new(),
            chip_index: 0,
            selected_chip: None,
            detail: None,
            preferences: None,
            loaders: 0,
            toast: None,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn items(&self) -> &[Article] {
        self.pagination.items()
    }

    pub fn selected_item(&self) -> Option<&Article> {
        self.items().get(self.item_index)
    }

    pub fn is_loading(&self) -> bool {
        self.loaders > 0
    }

    /// Cursor is on the last loaded article.
    pub fn at_end(&self) -> bool {
        !self.items().is_empty() && self.item_index + 1 >= self.items().len()
    }

    pub fn move_up(&mut self) {
        if self.item_index > 0 {
            self.item_index -= 1;
            self.list_state.select(Some(self.item_index));
        }
    }

    pub fn move_down(&mut self) {
        let len = self.items().len();
        if len > 0 && self.item_index < len - 1 {
            self.item_index += 1;
            self.list_state.select(Some(self.item_index));
        }
    }

    pub fn next_page(&mut self) {
        let max_index = self.items().len().saturating_sub(1);
        self.item_index = (self.item_index + PAGE_SIZE).min(max_index);
        self.list_state.select(Some(self.item_index));
    }

    pub fn prev_page(&mut self) {
        self.item_index = self.item_index.saturating_sub(PAGE_SIZE);
        self.list_state.select(Some(self.item_index));
    }

    /// Keep the cursor inside the list after it was replaced or shrunk.
    pub fn clamp_cursor(&mut self, replaced: bool) {
        if replaced {
            self.item_index = 0;
        }
        let len = self.items().len();
        if self.item_index >= len {
            self.item_index = len.saturating_sub(1);
        }
        self.list_state.select(Some(self.item_index));
    }

    pub fn push_search(&mut self, c: char) -> Option<PageRequest> {
        self.search.push(c);
        PageRequest::for_search_text(&self.search)
    }

    pub fn pop_search(&mut self) -> Option<PageRequest> {
        self.search.pop()?;
        PageRequest::for_search_text(&self.search)
    }

    pub fn next_chip(&mut self) {
        if !self.sites.is_empty() {
            self.chip_index = (self.chip_index + 1) % self.sites.len();
        }
    }

    pub fn prev_chip(&mut self) {
        if !self.sites.is_empty() {
            self.chip_index = (self.chip_index + self.sites.len() - 1) % self.sites.len();
        }
    }

    /// Toggle the focused chip and build the request that reflects it.
    pub fn toggle_chip(&mut self) -> Option<PageRequest> {
        let site = self.sites.get(self.chip_index)?.clone();
        if self.selected_chip == Some(self.chip_index) {
            self.selected_chip = None;
            Some(PageRequest::for_site(None))
        } else {
            self.selected_chip = Some(self.chip_index);
            Some(PageRequest::for_site(Some(site)))
        }
    }

    /// Point the chip selection at `site` if it is one of the chips.
    pub fn select_chip_by_name(&mut self, site: Option<&str>) {
        self.selected_chip = site.and_then(|name| self.sites.iter().position(|s| s == name));
        if let Some(index) = self.selected_chip {
            self.chip_index = index;
        }
    }

    pub fn apply_signal(&mut self, signal: SideSignal, now: Instant) {
        match &signal {
            SideSignal::ShowLoader => self.loaders += 1,
            SideSignal::DismissLoader => self.loaders = self.loaders.saturating_sub(1),
            SideSignal::Unauthorized => {
                // The stored preference is gone; drop the filters derived from it.
                self.selected_chip = None;
                self.search.clear();
                self.editing_search = false;
            }
            SideSignal::ShowNetworkAlert | SideSignal::ShowToast(_) => {}
        }
        if let Some(message) = signal.message() {
            self.show_toast(message, now);
        }
    }

    pub fn show_toast(&mut self, message: String, now: Instant) {
        self.toast = Some((message, now));
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if let Some((_, shown_at)) = &self.toast {
            if now.saturating_duration_since(*shown_at) >= TOAST_DURATION {
                self.toast = None;
            }
        }
    }

    pub fn toast_message(&self) -> Option<&str> {
        self.toast.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new(PaginationState::new())
    }
}
