//! Network-bound fetch pipeline.
//!
//! Every API call goes through [`Pipeline::execute`], which checks
//! connectivity, brackets the request with loader signals, runs it on a
//! background task and turns the resulting [`Envelope`] into at most one
//! [`FetchOutcome`]. Loader, toast, network-alert and unauthorized
//! notifications are published separately on a [`SignalSink`].
//!
//! ```text
//! connectivity? ──no──▶ ShowNetworkAlert (no outcome)
//!      │yes
//! ShowLoader ─▶ dispatch ─▶ DismissLoader ─▶ classify ─▶ outcome + signals
//!                  │fault
//!                  └──▶ DismissLoader ─▶ Error("internal server error") + toast
//! ```

pub mod classify;
pub mod repository;

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;

use crate::app::Result;
use crate::config::PipelineConfig;
use crate::domain::{FetchOutcome, SideSignal};
use crate::fetcher::{Connectivity, Envelope};
use crate::store::{PreferenceStore, Preferences};

pub use classify::{classify, Classification};
pub use repository::NewsRepository;

/// Message used for every transport fault.
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub show_progress: bool,
    pub show_error_toast: bool,
    pub surface_malformed_errors: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_error_toast: true,
            surface_malformed_errors: false,
        }
    }
}

impl From<&PipelineConfig> for FetchOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            show_progress: config.show_progress,
            show_error_toast: config.show_error_toast,
            surface_malformed_errors: config.surface_malformed_errors,
        }
    }
}

/// Publish side of the side-signal broadcast channel.
///
/// Signals sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct SignalSink {
    tx: broadcast::Sender<SideSignal>,
}

impl SignalSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SideSignal> {
        self.tx.subscribe()
    }

    pub fn emit(&self, signal: SideSignal) {
        tracing::trace!(?signal, "side signal");
        let _ = self.tx.send(signal);
    }
}

/// Take every signal currently queued on `rx` without waiting.
pub fn drain_signals(rx: &mut broadcast::Receiver<SideSignal>) -> Vec<SideSignal> {
    let mut signals = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(signal) => signals.push(signal),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Signal receiver lagged, {} signals lost", skipped);
            }
            Err(_) => break,
        }
    }
    signals
}

/// Aborts the dispatched request when the consumer stops polling.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone)]
pub struct Pipeline {
    connectivity: Arc<dyn Connectivity + Send + Sync>,
    store: Arc<dyn PreferenceStore + Send + Sync>,
    signals: SignalSink,
    defaults: FetchOptions,
}

impl Pipeline {
    pub fn new(
        connectivity: Arc<dyn Connectivity + Send + Sync>,
        store: Arc<dyn PreferenceStore + Send + Sync>,
        signals: SignalSink,
    ) -> Self {
        Self {
            connectivity,
            store,
            signals,
            defaults: FetchOptions::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: FetchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Options applied by callers that don't pass their own.
    pub fn defaults(&self) -> FetchOptions {
        self.defaults
    }

    pub fn signals(&self) -> &SignalSink {
        &self.signals
    }

    /// Lazily run `call` through the pipeline.
    ///
    /// Nothing happens until the returned stream is polled. It yields at most
    /// one outcome: offline, unauthorized and malformed-error paths end the
    /// stream without one. Dropping the stream cancels the request.
    pub fn execute<T, F, Fut>(
        &self,
        call: F,
        options: FetchOptions,
    ) -> BoxStream<'static, FetchOutcome<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Envelope<T>>> + Send + 'static,
    {
        let pipeline = self.clone();
        stream::once(async move { pipeline.run(call, options).await })
            .filter_map(|outcome| async move { outcome })
            .boxed()
    }

    /// Eager form of [`execute`](Self::execute).
    pub async fn run<T, F, Fut>(&self, call: F, options: FetchOptions) -> Option<FetchOutcome<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Envelope<T>>> + Send + 'static,
    {
        if !self.connectivity.has_connection() {
            tracing::info!("No network connection, request not sent");
            self.signals.emit(SideSignal::ShowNetworkAlert);
            return None;
        }

        if options.show_progress {
            self.signals.emit(SideSignal::ShowLoader);
        }

        tracing::debug!("Dispatching request");
        let task = tokio::spawn(call());
        let _guard = AbortOnDrop(task.abort_handle());

        let envelope = match task.await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(e)) => return Some(self.fault(&e.to_string(), options)),
            Err(e) => return Some(self.fault(&e.to_string(), options)),
        };

        if options.show_progress {
            self.signals.emit(SideSignal::DismissLoader);
        }

        let classification = classify(envelope, &options);
        if classification.clear_preferences {
            tracing::info!("Unauthorized response, clearing stored preferences");
            let store: &(dyn PreferenceStore + Send + Sync) = self.store.as_ref();
            if let Err(e) = Preferences::new(store).clear_all() {
                tracing::warn!("Failed to clear preferences: {}", e);
            }
        }
        for signal in classification.signals {
            self.signals.emit(signal);
        }

        classification.outcome
    }

    fn fault<T>(&self, reason: &str, options: FetchOptions) -> FetchOutcome<T> {
        tracing::warn!("Request failed: {}", reason);
        if options.show_progress {
            self.signals.emit(SideSignal::DismissLoader);
        }
        self.signals
            .emit(SideSignal::ShowToast(INTERNAL_SERVER_ERROR.to_string()));
        FetchOutcome::Error(INTERNAL_SERVER_ERROR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::app::LiftoffError;
    use crate::fetcher::StaticConnectivity;
    use crate::store::SqlitePreferenceStore;

    fn pipeline(online: bool) -> (Pipeline, Arc<SqlitePreferenceStore>) {
        let store = Arc::new(SqlitePreferenceStore::in_memory().unwrap());
        let pipeline = Pipeline::new(
            Arc::new(StaticConnectivity(online)),
            store.clone(),
            SignalSink::new(16),
        );
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_success_is_bracketed_by_loader() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();

        let outcomes: Vec<_> = pipeline
            .execute(|| async { Ok(Envelope::success(200, 7)) }, FetchOptions::default())
            .collect()
            .await;

        assert_eq!(outcomes, vec![FetchOutcome::Success(7)]);
        assert_eq!(
            drain_signals(&mut rx),
            vec![SideSignal::ShowLoader, SideSignal::DismissLoader]
        );
    }

    #[tokio::test]
    async fn test_progress_disabled() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();
        let options = FetchOptions {
            show_progress: false,
            ..FetchOptions::default()
        };

        let outcome = pipeline
            .run(|| async { Ok(Envelope::success(201, "created")) }, options)
            .await;

        assert_eq!(outcome, Some(FetchOutcome::Success("created")));
        assert!(drain_signals(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_offline_skips_dispatch() {
        let (pipeline, _) = pipeline(false);
        let mut rx = pipeline.signals().subscribe();
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let outcome = pipeline
            .run(
                move || async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(Envelope::success(200, ()))
                },
                FetchOptions::default(),
            )
            .await;

        assert!(outcome.is_none());
        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(drain_signals(&mut rx), vec![SideSignal::ShowNetworkAlert]);
    }

    #[tokio::test]
    async fn test_execute_is_lazy() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let stream = pipeline.execute(
            move || async move {
                flag.store(true, Ordering::SeqCst);
                Ok(Envelope::success(200, ()))
            },
            FetchOptions::default(),
        );
        tokio::task::yield_now().await;
        assert!(!called.load(Ordering::SeqCst));
        assert!(drain_signals(&mut rx).is_empty());

        drop(stream);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropping_stream_cancels_inflight_call() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let mut stream = pipeline.execute(
            move || async move {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(Envelope::success(200, ()))
            },
            FetchOptions::default(),
        );
        let first =
            tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
        assert!(first.is_err());

        drop(stream);
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;

        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(drain_signals(&mut rx), vec![SideSignal::ShowLoader]);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_store() {
        let (pipeline, store) = pipeline(true);
        Preferences::new(store.as_ref()).set_selected("NASA").unwrap();
        let mut rx = pipeline.signals().subscribe();

        let outcome = pipeline
            .run(
                || async { Ok(Envelope::<()>::failure(401, r#"{"detail":"expired"}"#)) },
                FetchOptions::default(),
            )
            .await;

        assert!(outcome.is_none());
        assert_eq!(Preferences::new(store.as_ref()).selected().unwrap(), "");
        assert_eq!(
            drain_signals(&mut rx),
            vec![
                SideSignal::ShowLoader,
                SideSignal::DismissLoader,
                SideSignal::Unauthorized
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_fault() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();

        let outcome = pipeline
            .run(
                || async { Err::<Envelope<()>, _>(LiftoffError::Transport("reset".into())) },
                FetchOptions::default(),
            )
            .await;

        assert_eq!(outcome, Some(FetchOutcome::Error(INTERNAL_SERVER_ERROR.into())));
        assert_eq!(
            drain_signals(&mut rx),
            vec![
                SideSignal::ShowLoader,
                SideSignal::DismissLoader,
                SideSignal::ShowToast(INTERNAL_SERVER_ERROR.into())
            ]
        );
    }

    #[tokio::test]
    async fn test_fault_toast_ignores_toast_option() {
        let (pipeline, _) = pipeline(true);
        let mut rx = pipeline.signals().subscribe();
        let options = FetchOptions {
            show_progress: false,
            show_error_toast: false,
            ..FetchOptions::default()
        };

        let outcome = pipeline
            .run(
                || async { Err::<Envelope<()>, _>(LiftoffError::Other("boom".into())) },
                options,
            )
            .await;

        assert_eq!(outcome, Some(FetchOutcome::Error(INTERNAL_SERVER_ERROR.into())));
        assert_eq!(
            drain_signals(&mut rx),
            vec![SideSignal::ShowToast(INTERNAL_SERVER_ERROR.into())]
        );
    }

    #[tokio::test]
    async fn test_panicking_call_is_a_fault() {
        let (pipeline, _) = pipeline(true);

        let outcome: Option<FetchOutcome<()>> = pipeline
            .run(
                || async { Option::<Result<Envelope<()>>>::None.expect("transport exploded") },
                FetchOptions::default(),
            )
            .await;

        assert_eq!(outcome, Some(FetchOutcome::Error(INTERNAL_SERVER_ERROR.into())));
    }

    #[tokio::test]
    async fn test_signals_without_subscribers_are_dropped() {
        let (pipeline, _) = pipeline(true);
        let outcome = pipeline
            .run(|| async { Ok(Envelope::success(200, 1)) }, FetchOptions::default())
            .await;
        assert_eq!(outcome, Some(FetchOutcome::Success(1)));
    }
}
