//! Browsing state shared by the CLI and the TUI.

pub mod pagination;
pub mod swipe;

pub use pagination::{
    load_next_page, request_page, PageRequest, PageTicket, PageUpdate, PaginationState,
    INITIAL_OFFSET, MIN_SEARCH_LEN, PAGE_SIZE,
};
pub use swipe::{Debouncer, SwipeController, SwipeTracker};
