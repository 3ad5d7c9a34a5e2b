use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One page of `GET /v4/articles/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlesPage {
    /// Total number of articles matching the query, across all pages.
    pub count: Option<i64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    #[serde(rename = "results")]
    pub items: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: i64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub news_site: Option<String>,
    pub summary: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub featured: Option<bool>,
    pub events: Vec<EventRef>,
    pub launches: Vec<LaunchRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRef {
    pub event_id: Option<i64>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchRef {
    pub launch_id: Option<String>,
    pub provider: Option<String>,
}

impl Article {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    pub fn display_site(&self) -> &str {
        self.news_site.as_deref().unwrap_or("")
    }

    /// Summary with HTML entities decoded.
    pub fn display_summary(&self) -> String {
        self.summary
            .as_deref()
            .map(|s| html_escape::decode_html_entities(s).trim().to_string())
            .unwrap_or_default()
    }

    /// Publication date as `MMM dd, yyyy` in local time.
    ///
    /// Falls back to the raw value when it is not RFC 3339.
    pub fn published_label(&self) -> Option<String> {
        self.published_at.as_deref().map(format_date)
    }
}

pub fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%b %d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
