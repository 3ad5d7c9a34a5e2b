use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;

use liftoff::app::{AppContext, LiftoffError, Result};
use liftoff::browse::{
    load_next_page, request_page, PageRequest, PageUpdate, PaginationState, SwipeController,
};
use liftoff::config::Config;
use liftoff::domain::{Article, ArticlesPage, FetchOutcome, PreferenceList, SideSignal};
use liftoff::fetcher::{Envelope, NewsApi, StaticConnectivity};
use liftoff::pipeline::{drain_signals, INTERNAL_SERVER_ERROR};

/// Serves a catalogue of `total` articles with ids `0..total`.
struct FakeApi {
    total: i64,
    calls: Mutex<Vec<(Option<usize>, Option<String>)>>,
    article_status: u16,
}

impl FakeApi {
    fn new(total: i64) -> Self {
        Self {
            total,
            calls: Mutex::new(Vec::new()),
            article_status: 200,
        }
    }

    fn calls(&self) -> Vec<(Option<usize>, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn article(id: i64, title: &str) -> Article {
        Article {
            id,
            title: Some(title.to_string()),
            news_site: Some("NASA".to_string()),
            ..Article::default()
        }
    }
}

#[async_trait]
impl NewsApi for FakeApi {
    async fn fetch_articles(
        &self,
        offset: Option<usize>,
        title_contains: Option<&str>,
    ) -> Result<Envelope<ArticlesPage>> {
        self.calls
            .lock()
            .unwrap()
            .push((offset, title_contains.map(String::from)));

        let matching: Vec<Article> = (0..self.total)
            .map(|id| {
                let title = if id % 4 == 0 { "Mars rover" } else { "Moon lander" };
                Self::article(id, title)
            })
            .filter(|a| match title_contains {
                Some(term) => a.display_title().to_lowercase().contains(&term.to_lowercase()),
                None => true,
            })
            .collect();

        let start = offset.unwrap_or(0).min(matching.len());
        let end = (start + 10).min(matching.len());
        Ok(Envelope::success(
            200,
            ArticlesPage {
                count: Some(matching.len() as i64),
                items: matching[start..end].to_vec(),
                ..ArticlesPage::default()
            },
        ))
    }

    async fn fetch_article(&self, id: i64) -> Result<Envelope<Article>> {
        match self.article_status {
            200 if id < self.total => Ok(Envelope::success(200, Self::article(id, "Detail"))),
            200 => Ok(Envelope::failure(
                404,
                r#"{"detail":"No Article matches the given query."}"#,
            )),
            401 => Ok(Envelope::failure(401, r#"{"detail":"Invalid token."}"#)),
            500 => Ok(Envelope::failure(500, "<h1>Server Error (500)</h1>")),
            _ => Err(LiftoffError::Transport("connection reset".into())),
        }
    }

    async fn fetch_preferences(&self) -> Result<Envelope<PreferenceList>> {
        Ok(Envelope::success(
            200,
            PreferenceList {
                version: Some("4.0".into()),
                news_sites: vec![Some("NASA".into()), None, Some("SpaceNews".into())],
            },
        ))
    }
}

fn context(api: Arc<FakeApi>, online: bool) -> AppContext {
    AppContext::with_parts(Config::default(), api, Arc::new(StaticConnectivity(online)))
        .expect("context")
}

fn ids(state: &PaginationState) -> Vec<i64> {
    state.items().iter().map(|a| a.id).collect()
}

#[tokio::test]
async fn test_scroll_then_search_then_clear() {
    let api = Arc::new(FakeApi::new(25));
    let ctx = context(api.clone(), true);
    let mut state = PaginationState::new();

    let update = request_page(&ctx.repository, &mut state, PageRequest::fresh()).await;
    assert_eq!(update, PageUpdate::Applied { added: 10 });
    assert_eq!(state.offset(), 10);

    assert_eq!(
        load_next_page(&ctx.repository, &mut state).await,
        PageUpdate::Applied { added: 10 }
    );
    assert_eq!(
        load_next_page(&ctx.repository, &mut state).await,
        PageUpdate::Applied { added: 5 }
    );
    assert_eq!(ids(&state), (0..25).collect::<Vec<_>>());
    assert!(!state.has_more());
    assert_eq!(
        load_next_page(&ctx.repository, &mut state).await,
        PageUpdate::Skipped
    );

    let search = PageRequest::for_search_text("mars").unwrap();
    request_page(&ctx.repository, &mut state, search).await;
    assert_eq!(ids(&state), vec![0, 4, 8, 12, 16, 20, 24]);
    assert_eq!(state.offset(), 0);

    let cleared = PageRequest::for_search_text("").unwrap();
    request_page(&ctx.repository, &mut state, cleared).await;
    assert_eq!(ids(&state), (0..10).collect::<Vec<_>>());
    assert_eq!(state.active_search(), None);

    assert_eq!(
        api.calls(),
        vec![
            (Some(0), None),
            (Some(10), None),
            (Some(20), None),
            (None, Some("mars".to_string())),
            (Some(0), None),
        ]
    );
}

#[tokio::test]
async fn test_search_continuation_keeps_filter() {
    let api = Arc::new(FakeApi::new(100));
    let ctx = context(api.clone(), true);
    let mut state = PaginationState::new();

    request_page(&ctx.repository, &mut state, PageRequest::search("moon")).await;
    assert_eq!(state.items().len(), 10);
    load_next_page(&ctx.repository, &mut state).await;

    assert_eq!(state.items().len(), 20);
    assert!(state
        .items()
        .iter()
        .all(|a| a.display_title() == "Moon lander"));
    assert_eq!(api.calls()[1], (Some(10), Some("moon".to_string())));
}

#[tokio::test]
async fn test_out_of_order_responses_keep_latest_request() {
    let api = Arc::new(FakeApi::new(40));
    let ctx = context(api, true);
    let mut state = PaginationState::new();

    let older = state.begin(PageRequest::search("moon")).unwrap();
    let newer = state.begin(PageRequest::search("mars")).unwrap();

    let newer_outcome = ctx
        .repository
        .articles(newer.offset(), newer.title_contains().map(String::from))
        .next()
        .await;
    let older_outcome = ctx
        .repository
        .articles(older.offset(), older.title_contains().map(String::from))
        .next()
        .await;

    assert!(matches!(
        state.complete(&newer, newer_outcome),
        PageUpdate::Applied { .. }
    ));
    assert_eq!(state.complete(&older, older_outcome), PageUpdate::Stale);
    assert!(state
        .items()
        .iter()
        .all(|a| a.display_title() == "Mars rover"));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn test_offline_request_is_not_sent() {
    let api = Arc::new(FakeApi::new(40));
    let ctx = context(api.clone(), false);
    let mut signals = ctx.signals().subscribe();
    let mut state = PaginationState::new();

    let update = request_page(&ctx.repository, &mut state, PageRequest::search("mars")).await;

    assert_eq!(update, PageUpdate::NoOutcome);
    assert!(api.calls().is_empty());
    assert!(state.items().is_empty());
    assert_eq!(drain_signals(&mut signals), vec![SideSignal::ShowNetworkAlert]);
}

#[tokio::test]
async fn test_unauthorized_clears_stored_preference() {
    let mut api = FakeApi::new(40);
    api.article_status = 401;
    let ctx = context(Arc::new(api), true);
    ctx.preferences().set_selected("SpaceNews").unwrap();
    let mut signals = ctx.signals().subscribe();

    let outcome = ctx.repository.article(3).next().await;

    assert!(outcome.is_none());
    assert_eq!(ctx.preferences().selected().unwrap(), "");
    assert_eq!(
        drain_signals(&mut signals).last(),
        Some(&SideSignal::Unauthorized)
    );
}

#[tokio::test]
async fn test_malformed_error_is_silent() {
    let mut api = FakeApi::new(40);
    api.article_status = 500;
    let ctx = context(Arc::new(api), true);
    let mut signals = ctx.signals().subscribe();

    let outcome = ctx.repository.article(3).next().await;

    assert!(outcome.is_none());
    assert_eq!(
        drain_signals(&mut signals),
        vec![SideSignal::ShowLoader, SideSignal::DismissLoader]
    );
}

#[tokio::test]
async fn test_transport_fault_reports_internal_error() {
    let mut api = FakeApi::new(40);
    api.article_status = 0;
    let ctx = context(Arc::new(api), true);
    let mut signals = ctx.signals().subscribe();

    let outcome = ctx.repository.article(3).next().await;

    assert_eq!(
        outcome,
        Some(FetchOutcome::Error(INTERNAL_SERVER_ERROR.to_string()))
    );
    assert!(drain_signals(&mut signals)
        .contains(&SideSignal::ShowToast(INTERNAL_SERVER_ERROR.to_string())));
}

#[tokio::test]
async fn test_swipe_fetches_settled_article() {
    let api = Arc::new(FakeApi::new(40));
    let ctx = context(api, true);
    let start = Instant::now();
    let debounce = Duration::from_millis(300);
    let mut pager = SwipeController::new(7, 7, 40, debounce);

    pager.swipe(1, start);
    pager.swipe(1, start + Duration::from_millis(100));
    assert_eq!(pager.poll(start + Duration::from_millis(200)), None);

    let id = pager
        .poll(start + Duration::from_millis(400))
        .expect("settled id");
    assert_eq!(id, 9);

    match ctx.repository.article(id).next().await {
        Some(FetchOutcome::Success(article)) => assert_eq!(article.id, 9),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_article_error_detail() {
    let api = Arc::new(FakeApi::new(5));
    let ctx = context(api, true);
    let mut signals = ctx.signals().subscribe();

    let outcome = ctx.repository.article(99).next().await;

    let detail = "No Article matches the given query.".to_string();
    assert_eq!(outcome, Some(FetchOutcome::Error(detail.clone())));
    assert!(drain_signals(&mut signals).contains(&SideSignal::ShowToast(detail)));
}

#[test]
fn test_sites_skip_missing_names() {
    let api = Arc::new(FakeApi::new(5));
    let ctx = context(api, true);

    let outcome = tokio_test::block_on(async { ctx.repository.preferences().next().await });

    match outcome {
        Some(FetchOutcome::Success(list)) => {
            assert_eq!(list.sites(), vec!["NASA", "SpaceNews"]);
            assert_eq!(list.filter("space"), vec!["SpaceNews"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_prefer_site_round_trip() {
    let api = Arc::new(FakeApi::new(5));
    let ctx = context(api, true);

    tokio_test::assert_ok!(liftoff::cli::commands::prefer_site(&ctx, Some("NASA"), false));
    assert_eq!(ctx.preferences().selected().unwrap(), "NASA");

    tokio_test::assert_ok!(liftoff::cli::commands::prefer_site(&ctx, None, true));
    assert_eq!(ctx.preferences().selected().unwrap(), "");
}
