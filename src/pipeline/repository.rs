use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};

use crate::domain::{Article, ArticlesPage, FetchOutcome, PreferenceList};
use crate::fetcher::NewsApi;
use crate::pipeline::{FetchOptions, Pipeline};

/// The news API endpoints, each bound to the fetch pipeline.
#[derive(Clone)]
pub struct NewsRepository {
    api: Arc<dyn NewsApi + Send + Sync>,
    pipeline: Pipeline,
}

impl NewsRepository {
    pub fn new(api: Arc<dyn NewsApi + Send + Sync>, pipeline: Pipeline) -> Self {
        Self { api, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn articles(
        &self,
        offset: Option<usize>,
        title_contains: Option<String>,
    ) -> BoxStream<'static, FetchOutcome<ArticlesPage>> {
        let api = self.api.clone();
        self.pipeline.execute(
            move || async move { api.fetch_articles(offset, title_contains.as_deref()).await },
            self.pipeline.defaults(),
        )
    }

    pub fn article(&self, id: i64) -> BoxStream<'static, FetchOutcome<Article>> {
        let api = self.api.clone();
        self.pipeline.execute(
            move || async move { api.fetch_article(id).await },
            self.pipeline.defaults(),
        )
    }

    pub fn preferences(&self) -> BoxStream<'static, FetchOutcome<PreferenceList>> {
        let api = self.api.clone();
        self.pipeline.execute(
            move || async move { api.fetch_preferences().await },
            self.pipeline.defaults(),
        )
    }

    /// Named news sites only, fetched with the caller's options.
    ///
    /// Used for background loads that should not drive the loader.
    pub fn site_names(
        &self,
        options: FetchOptions,
    ) -> BoxStream<'static, FetchOutcome<Vec<String>>> {
        let api = self.api.clone();
        self.pipeline
            .execute(move || async move { api.fetch_preferences().await }, options)
            .map(|outcome| outcome.map(|list| list.sites()))
            .boxed()
    }
}
