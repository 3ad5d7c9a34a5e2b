pub mod connectivity;
pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Article, ArticlesPage, PreferenceList};

pub use connectivity::{Connectivity, StaticConnectivity, SystemProbe};
pub use http_fetcher::HttpFetcher;

/// Full round-trip result of one API call.
///
/// `body` is only set for 2xx responses, `error_body` only for the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub status: u16,
    pub reason: String,
    pub body: Option<T>,
    pub error_body: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(status: u16, body: T) -> Self {
        Self {
            status,
            reason: reason_phrase(status),
            body: Some(body),
            error_body: None,
        }
    }

    pub fn failure(status: u16, error_body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason_phrase(status),
            body: None,
            error_body: Some(error_body.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status line text, e.g. `"204 No Content"`.
    pub fn status_message(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

/// The three fixed endpoints of the news API.
///
/// An `Err` means the call never produced a response (I/O failure, timeout,
/// undecodable body); application-level failures come back as an [`Envelope`].
#[async_trait]
pub trait NewsApi {
    async fn fetch_articles(
        &self,
        offset: Option<usize>,
        title_contains: Option<&str>,
    ) -> Result<Envelope<ArticlesPage>>;

    async fn fetch_article(&self, id: i64) -> Result<Envelope<Article>>;

    async fn fetch_preferences(&self) -> Result<Envelope<PreferenceList>>;
}
