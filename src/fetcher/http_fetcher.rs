use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::Result;
use crate::config::ApiConfig;
use crate::domain::{Article, ArticlesPage, PreferenceList};
use crate::fetcher::{Envelope, NewsApi};

pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    log_bodies: bool,
}

impl HttpFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            log_bodies: config.log_bodies(),
        })
    }

    pub fn articles_url(&self, offset: Option<usize>, title_contains: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.join("v4/articles/")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(offset) = offset {
                query.append_pair("offset", &offset.to_string());
            }
            if let Some(title) = title_contains {
                query.append_pair("title_contains", title);
            }
        }
        // An empty query string would leave a trailing '?'.
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    pub fn article_url(&self, id: i64) -> Result<Url> {
        Ok(self.base_url.join(&format!("v4/articles/{}", id))?)
    }

    pub fn preferences_url(&self) -> Result<Url> {
        Ok(self.base_url.join("v4/info/")?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Envelope<T>> {
        if self.log_bodies {
            tracing::debug!(target: "liftoff::http", "--> GET {}", url);
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let bytes = response.bytes().await?;

        if self.log_bodies {
            tracing::debug!(
                target: "liftoff::http",
                "<-- {} {} ({} bytes)\n{}",
                status.as_u16(),
                url,
                bytes.len(),
                String::from_utf8_lossy(&bytes)
            );
        }

        if status.is_success() {
            let body: T = serde_json::from_slice(&bytes)?;
            Ok(Envelope {
                status: status.as_u16(),
                reason,
                body: Some(body),
                error_body: None,
            })
        } else {
            Ok(Envelope {
                status: status.as_u16(),
                reason,
                body: None,
                error_body: Some(String::from_utf8_lossy(&bytes).into_owned()),
            })
        }
    }
}

#[async_trait]
impl NewsApi for HttpFetcher {
    async fn fetch_articles(
        &self,
        offset: Option<usize>,
        title_contains: Option<&str>,
    ) -> Result<Envelope<ArticlesPage>> {
        let url = self.articles_url(offset, title_contains)?;
        self.get(url).await
    }

    async fn fetch_article(&self, id: i64) -> Result<Envelope<Article>> {
        let url = self.article_url(id)?;
        self.get(url).await
    }

    async fn fetch_preferences(&self) -> Result<Envelope<PreferenceList>> {
        let url = self.preferences_url()?;
        self.get(url).await
    }
}
