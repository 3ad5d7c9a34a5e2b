//! Offset bookkeeping for the article list.

use futures::StreamExt;

use crate::domain::{Article, ArticlesPage, FetchOutcome};
use crate::pipeline::NewsRepository;

/// Number of articles the API returns per page.
pub const PAGE_SIZE: usize = 10;

/// Offset the first continuation starts from.
pub const INITIAL_OFFSET: usize = 10;

/// Searches shorter than this are ignored while typing.
pub const MIN_SEARCH_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: Option<usize>,
    pub search: Option<String>,
}

impl PageRequest {
    /// First page without any filter.
    pub fn fresh() -> Self {
        Self {
            offset: Some(0),
            search: None,
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            offset: None,
            search: Some(term.into()),
        }
    }

    pub fn continuation(offset: usize) -> Self {
        Self {
            offset: Some(offset),
            search: None,
        }
    }

    /// Request for a news-site chip: select searches by it, deselect resets.
    pub fn for_site(site: Option<String>) -> Self {
        match site {
            Some(site) => Self::search(site),
            None => Self::fresh(),
        }
    }

    /// Request for the current search-box text, if it should trigger one.
    pub fn for_search_text(text: &str) -> Option<Self> {
        let len = text.chars().count();
        if len >= MIN_SEARCH_LEN {
            Some(Self::search(text))
        } else if len == 0 {
            Some(Self::fresh())
        } else {
            None
        }
    }

    /// Paging further into the current result set.
    pub fn is_continuation(&self) -> bool {
        self.search.is_none() && matches!(self.offset, Some(offset) if offset > 0)
    }

    /// The response replaces the accumulated list instead of extending it.
    pub fn replaces(&self) -> bool {
        self.offset == Some(0) || self.search.is_some()
    }
}

/// Handle for one in-flight list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    request: PageRequest,
    title_contains: Option<String>,
}

impl PageTicket {
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn offset(&self) -> Option<usize> {
        self.request.offset
    }

    /// Title filter to send with the request.
    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }
}

/// What completing a request did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUpdate {
    /// The request was not started (already loading, or nothing more to load).
    Skipped,
    /// A newer request superseded this one; its response was ignored.
    Stale,
    Applied { added: usize },
    Failed(String),
    /// The pipeline ended without an outcome (offline, unauthorized, ...).
    NoOutcome,
}

#[derive(Debug, Clone)]
pub struct PaginationState {
    offset: usize,
    items: Vec<Article>,
    is_loading: bool,
    has_more: bool,
    count: Option<i64>,
    active_search: Option<String>,
    generation: u64,
    sequence_requests: bool,
}

impl PaginationState {
    pub fn new() -> Self {
        Self {
            offset: INITIAL_OFFSET,
            items: Vec::new(),
            is_loading: false,
            has_more: true,
            count: None,
            active_search: None,
            generation: 0,
            sequence_requests: true,
        }
    }

    /// With sequencing off, every response is applied in arrival order.
    pub fn with_sequencing(mut self, enabled: bool) -> Self {
        self.sequence_requests = enabled;
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn items(&self) -> &[Article] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Total reported by the most recent page.
    pub fn count(&self) -> Option<i64> {
        self.count
    }

    /// Search term the current list was built from.
    pub fn active_search(&self) -> Option<&str> {
        self.active_search.as_deref()
    }

    /// Start a request, or `None` when a continuation is not allowed right now.
    ///
    /// Fresh requests always start and supersede whatever is in flight.
    pub fn begin(&mut self, request: PageRequest) -> Option<PageTicket> {
        let continuation = request.is_continuation();
        if continuation && (self.is_loading || !self.has_more) {
            return None;
        }

        let title_contains = match &request.search {
            Some(term) => Some(term.clone()),
            None if continuation => self.active_search.clone(),
            None => None,
        };

        self.generation += 1;
        self.is_loading = true;

        Some(PageTicket {
            generation: self.generation,
            request,
            title_contains,
        })
    }

    /// Continue after the last loaded item, as when the list is scrolled to the end.
    pub fn begin_next_page(&mut self) -> Option<PageTicket> {
        if self.is_loading || !self.has_more {
            return None;
        }
        let offset = self.offset.max(self.items.len());
        if offset == 0 {
            return None;
        }
        self.begin(PageRequest::continuation(offset))
    }

    /// Record the result of a request started with [`begin`](Self::begin).
    pub fn complete(
        &mut self,
        ticket: &PageTicket,
        outcome: Option<FetchOutcome<ArticlesPage>>,
    ) -> PageUpdate {
        if ticket.generation != self.generation {
            if self.sequence_requests {
                tracing::debug!(
                    "Ignoring response for superseded request {} (current {})",
                    ticket.generation,
                    self.generation
                );
                return PageUpdate::Stale;
            }
        } else {
            self.is_loading = false;
        }

        match outcome {
            Some(FetchOutcome::Success(page)) => {
                let added = page.items.len();
                self.apply_page(&ticket.request, page);
                PageUpdate::Applied { added }
            }
            Some(FetchOutcome::Error(message)) => PageUpdate::Failed(message),
            None => PageUpdate::NoOutcome,
        }
    }

    fn apply_page(&mut self, request: &PageRequest, page: ArticlesPage) {
        let added = page.items.len();

        if request.replaces() {
            self.items.clear();
            self.offset = 0;
        }
        self.items.extend(page.items);

        if request.search.is_none() {
            if let Some(offset) = request.offset {
                self.offset = offset + added;
            }
        }

        self.has_more = added == PAGE_SIZE;
        if page.count.is_some() {
            self.count = page.count;
        }

        match &request.search {
            Some(term) => self.active_search = Some(term.clone()),
            None if request.offset == Some(0) => self.active_search = None,
            None => {}
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one list request to completion against `state`.
pub async fn request_page(
    repo: &NewsRepository,
    state: &mut PaginationState,
    request: PageRequest,
) -> PageUpdate {
    let Some(ticket) = state.begin(request) else {
        return PageUpdate::Skipped;
    };
    fetch_ticket(repo, state, ticket).await
}

/// Load the page after the last loaded item.
pub async fn load_next_page(repo: &NewsRepository, state: &mut PaginationState) -> PageUpdate {
    let Some(ticket) = state.begin_next_page() else {
        return PageUpdate::Skipped;
    };
    fetch_ticket(repo, state, ticket).await
}

async fn fetch_ticket(
    repo: &NewsRepository,
    state: &mut PaginationState,
    ticket: PageTicket,
) -> PageUpdate {
    let outcome = repo
        .articles(ticket.offset(), ticket.title_contains().map(String::from))
        .next()
        .await;
    state.complete(&ticket, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(ids: std::ops::Range<i64>) -> Vec<Article> {
        ids.map(|id| Article {
            id,
            ..Article::default()
        })
        .collect()
    }

    fn page(ids: std::ops::Range<i64>) -> Option<FetchOutcome<ArticlesPage>> {
        Some(FetchOutcome::Success(ArticlesPage {
            count: Some(500),
            items: articles(ids),
            ..ArticlesPage::default()
        }))
    }

    fn ids(state: &PaginationState) -> Vec<i64> {
        state.items().iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = PaginationState::new();
        assert_eq!(state.offset(), INITIAL_OFFSET);
        assert!(state.items().is_empty());
        assert!(state.has_more());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_fresh_full_page_replaces() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::fresh()).unwrap();
        assert!(state.is_loading());

        let update = state.complete(&ticket, page(0..10));

        assert_eq!(update, PageUpdate::Applied { added: 10 });
        assert_eq!(ids(&state), (0..10).collect::<Vec<_>>());
        assert!(state.has_more());
        assert!(!state.is_loading());
        assert_eq!(state.offset(), 10);
        assert_eq!(state.count(), Some(500));
    }

    #[test]
    fn test_short_page_ends_paging() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::fresh()).unwrap();
        state.complete(&ticket, page(0..7));

        assert!(!state.has_more());
        assert!(state.begin_next_page().is_none());
        assert!(state.begin(PageRequest::continuation(7)).is_none());
    }

    #[test]
    fn test_continuation_appends_and_advances() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::fresh()).unwrap();
        state.complete(&ticket, page(0..10));

        let ticket = state.begin_next_page().unwrap();
        assert_eq!(ticket.offset(), Some(10));
        let update = state.complete(&ticket, page(10..20));

        assert_eq!(update, PageUpdate::Applied { added: 10 });
        assert_eq!(state.items().len(), 20);
        assert_eq!(state.offset(), 20);
        assert!(state.has_more());
    }

    #[test]
    fn test_search_replaces_and_resets_offset() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::fresh()).unwrap();
        state.complete(&ticket, page(0..10));

        let request = PageRequest {
            offset: Some(40),
            search: Some("space".into()),
        };
        let ticket = state.begin(request).unwrap();
        assert_eq!(ticket.title_contains(), Some("space"));
        state.complete(&ticket, page(100..103));

        assert_eq!(ids(&state), vec![100, 101, 102]);
        assert_eq!(state.offset(), 0);
        assert!(!state.has_more());
        assert_eq!(state.active_search(), Some("space"));
    }

    #[test]
    fn test_continuation_keeps_search_term() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::search("mars")).unwrap();
        state.complete(&ticket, page(0..10));
        assert_eq!(state.offset(), 0);

        let ticket = state.begin_next_page().unwrap();
        assert_eq!(ticket.offset(), Some(10));
        assert_eq!(ticket.title_contains(), Some("mars"));
        state.complete(&ticket, page(10..14));

        assert_eq!(state.items().len(), 14);
        assert_eq!(state.offset(), 14);
        assert_eq!(state.active_search(), Some("mars"));
    }

    #[test]
    fn test_fresh_request_clears_search_term() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::search("mars")).unwrap();
        state.complete(&ticket, page(0..10));

        let ticket = state.begin(PageRequest::fresh()).unwrap();
        assert_eq!(ticket.title_contains(), None);
        state.complete(&ticket, page(50..60));
        assert_eq!(state.active_search(), None);
    }

    #[test]
    fn test_continuation_blocked_while_loading() {
        let mut state = PaginationState::new();
        let first = state.begin_next_page().unwrap();
        assert!(state.begin_next_page().is_none());

        state.complete(&first, page(10..20));
        assert!(state.begin_next_page().is_some());
    }

    #[test]
    fn test_fresh_request_supersedes_in_flight() {
        let mut state = PaginationState::new();
        let old = state.begin(PageRequest::search("moon")).unwrap();
        let new = state.begin(PageRequest::search("mars")).unwrap();

        assert_eq!(state.complete(&new, page(0..3)), PageUpdate::Applied { added: 3 });
        assert_eq!(state.complete(&old, page(50..60)), PageUpdate::Stale);

        assert_eq!(ids(&state), vec![0, 1, 2]);
        assert_eq!(state.active_search(), Some("mars"));
    }

    #[test]
    fn test_unsequenced_last_response_wins() {
        let mut state = PaginationState::new().with_sequencing(false);
        let old = state.begin(PageRequest::search("moon")).unwrap();
        let new = state.begin(PageRequest::search("mars")).unwrap();

        state.complete(&new, page(0..3));
        state.complete(&old, page(50..60));

        assert_eq!(ids(&state), (50..60).collect::<Vec<_>>());
        assert_eq!(state.active_search(), Some("moon"));
    }

    #[test]
    fn test_error_and_missing_outcome_keep_items() {
        let mut state = PaginationState::new();
        let ticket = state.begin(PageRequest::fresh()).unwrap();
        state.complete(&ticket, page(0..10));

        let ticket = state.begin_next_page().unwrap();
        let update = state.complete(&ticket, Some(FetchOutcome::Error("boom".into())));
        assert_eq!(update, PageUpdate::Failed("boom".into()));
        assert_eq!(state.items().len(), 10);
        assert!(!state.is_loading());

        let ticket = state.begin_next_page().unwrap();
        assert_eq!(state.complete(&ticket, None), PageUpdate::NoOutcome);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_search_text_triggers() {
        assert_eq!(
            PageRequest::for_search_text("spa"),
            Some(PageRequest::search("spa"))
        );
        assert_eq!(PageRequest::for_search_text(""), Some(PageRequest::fresh()));
        assert_eq!(PageRequest::for_search_text("sp"), None);
        // Counted in characters, not bytes.
        assert_eq!(PageRequest::for_search_text("éé"), None);
    }

    #[test]
    fn test_site_chip_requests() {
        assert_eq!(
            PageRequest::for_site(Some("NASA".into())),
            PageRequest::search("NASA")
        );
        assert_eq!(PageRequest::for_site(None), PageRequest::fresh());
    }
}
