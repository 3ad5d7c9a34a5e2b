pub mod article;
pub mod preference;
pub mod signal;

pub use article::{Article, ArticlesPage, EventRef, LaunchRef};
pub use preference::{ErrorBody, PreferenceList};
pub use signal::{FetchOutcome, SideSignal, NETWORK_ALERT};
