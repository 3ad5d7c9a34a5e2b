use serde::{Deserialize, Serialize};

/// Body of `GET /v4/info/`: the news sites usable as filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceList {
    pub version: Option<String>,
    pub news_sites: Vec<Option<String>>,
}

impl PreferenceList {
    /// Site labels in server order, `null` entries dropped.
    pub fn sites(&self) -> Vec<String> {
        self.news_sites.iter().flatten().cloned().collect()
    }

    /// Sites whose name contains `query`, ignoring case. An empty query keeps all.
    pub fn filter(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.news_sites
            .iter()
            .flatten()
            .filter(|site| query.is_empty() || site.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

/// Structured error body returned by the API on failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Parse a raw error body, returning the detail when present and non-empty.
    pub fn detail_of(raw: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|body| body.detail)
            .filter(|detail| !detail.is_empty())
    }
}
