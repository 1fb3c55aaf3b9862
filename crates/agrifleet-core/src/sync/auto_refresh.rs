// ── Auto-refresh wrapper ──
//
// Composes a fallible async fetch with the poller, exposing the fetch
// lifecycle (data / loading / error / last-updated) as watch channels.
// At most one fetch is in flight per instance: the poller serializes its
// own ticks, and manual `refresh()` calls try-lock an in-flight guard
// and skip instead of overlapping.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::debug;

use super::poller::{DEFAULT_POLL_INTERVAL, Poller, PollerOptions};
use crate::error::CoreError;

/// Construction options for [`AutoRefresh`].
#[derive(Debug, Clone, Copy)]
pub struct AutoRefreshOptions {
    pub interval: Duration,
    /// Start polling on construction. Requires a Tokio runtime.
    pub enabled: bool,
}

impl Default for AutoRefreshOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            enabled: true,
        }
    }
}

type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&CoreError) + Send + Sync>;

/// A periodically refreshed value with observable fetch state.
pub struct AutoRefresh<T: Clone + Send + Sync + 'static> {
    inner: Arc<AutoRefreshInner<T>>,
    poller: Poller,
}

struct AutoRefreshInner<T> {
    fetch: FetchFn<T>,
    on_error: Option<ErrorHook>,
    data: watch::Sender<Option<T>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<Arc<CoreError>>>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    in_flight: tokio::sync::Mutex<()>,
}

impl<T: Clone + Send + Sync + 'static> AutoRefresh<T> {
    pub fn new<F>(fetch: F, options: AutoRefreshOptions) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync + 'static,
    {
        Self::build(Arc::new(fetch), None, options)
    }

    /// Like [`new`](Self::new), with a hook invoked on every failed fetch.
    pub fn with_error_hook<F, H>(fetch: F, on_error: H, options: AutoRefreshOptions) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync + 'static,
        H: Fn(&CoreError) + Send + Sync + 'static,
    {
        Self::build(Arc::new(fetch), Some(Arc::new(on_error)), options)
    }

    fn build(fetch: FetchFn<T>, on_error: Option<ErrorHook>, options: AutoRefreshOptions) -> Self {
        let (data, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        let (last_updated, _) = watch::channel(None);

        let inner = Arc::new(AutoRefreshInner {
            fetch,
            on_error,
            data,
            loading,
            error,
            last_updated,
            in_flight: tokio::sync::Mutex::new(()),
        });

        let tick_inner = Arc::clone(&inner);
        let poller = Poller::new(
            PollerOptions {
                interval: options.interval,
                immediate: true,
                enabled: options.enabled,
            },
            move || {
                let inner = Arc::clone(&tick_inner);
                Box::pin(async move {
                    inner.run_refresh().await;
                })
            },
        );

        Self { inner, poller }
    }

    /// Run one fetch now, outside the schedule. Skipped if a fetch is
    /// already in flight.
    pub async fn refresh(&self) {
        self.inner.run_refresh().await;
    }

    // ── Observable state ─────────────────────────────────────────────

    /// Last successful result, or `None` before the first success.
    pub fn data(&self) -> watch::Receiver<Option<T>> {
        self.inner.data.subscribe()
    }

    /// `true` only while a fetch is in flight.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    /// Last failure; cleared at the start of each attempt.
    pub fn error(&self) -> watch::Receiver<Option<Arc<CoreError>>> {
        self.inner.error.subscribe()
    }

    /// When the last successful fetch completed.
    pub fn last_updated(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_updated.subscribe()
    }

    // ── Schedule control ─────────────────────────────────────────────

    pub fn start(&self) {
        self.poller.start();
    }

    pub fn stop(&self) {
        self.poller.stop();
    }

    pub fn restart(&self) {
        self.poller.restart();
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }
}

impl<T: Clone + Send + Sync + 'static> AutoRefreshInner<T> {
    async fn run_refresh(&self) {
        // Skip semantics: a refresh arriving while one is in flight is
        // dropped, never queued behind it.
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("refresh skipped: previous fetch still in flight");
            return;
        };

        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match (*self.fetch)().await {
            Ok(value) => {
                let _ = self.data.send(Some(value));
                let _ = self.last_updated.send(Some(Utc::now()));
            }
            Err(err) => {
                if let Some(hook) = &self.on_error {
                    (**hook)(&err);
                }
                let _ = self.error.send(Some(Arc::new(err)));
            }
        }

        let _ = self.loading.send(false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn disabled(interval_ms: u64) -> AutoRefreshOptions {
        AutoRefreshOptions {
            interval: Duration::from_millis(interval_ms),
            enabled: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_stores_data_and_timestamp() {
        let refresh = AutoRefresh::new(|| Box::pin(async { Ok(7u32) }), disabled(100));

        refresh.refresh().await;

        assert_eq!(*refresh.data().borrow(), Some(7));
        assert!(refresh.last_updated().borrow().is_some());
        assert!(refresh.error().borrow().is_none());
        assert!(!*refresh.loading().borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_data_and_sets_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let refresh = AutoRefresh::new(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        Ok(7u32)
                    } else {
                        Err(CoreError::OperationFailed {
                            message: "backend gone".into(),
                        })
                    }
                })
            },
            disabled(100),
        );

        refresh.refresh().await;
        refresh.refresh().await;

        // Stale-but-valid data stays visible next to the error flag.
        assert_eq!(*refresh.data().borrow(), Some(7));
        assert!(refresh.error().borrow().is_some());
        assert!(!*refresh.loading().borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn error_is_cleared_at_the_start_of_each_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let refresh = AutoRefresh::new(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        Err(CoreError::OperationFailed {
                            message: "flaky".into(),
                        })
                    } else {
                        Ok(1u32)
                    }
                })
            },
            disabled(100),
        );

        refresh.refresh().await;
        assert!(refresh.error().borrow().is_some());

        refresh.refresh().await;
        assert!(refresh.error().borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn error_hook_fires_on_failure() {
        let hook_hits = Arc::new(AtomicU32::new(0));
        let hits = Arc::clone(&hook_hits);
        let refresh = AutoRefresh::<u32>::with_error_hook(
            || {
                Box::pin(async {
                    Err(CoreError::OperationFailed {
                        message: "nope".into(),
                    })
                })
            },
            move |_err| {
                hits.fetch_add(1, Ordering::SeqCst);
            },
            disabled(100),
        );

        refresh.refresh().await;
        assert_eq!(hook_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refresh_is_skipped() {
        let fetches = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fetches);
        let refresh = Arc::new(AutoRefresh::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(1u32)
                })
            },
            disabled(100),
        ));

        let first = Arc::clone(&refresh);
        let handle = tokio::spawn(async move { first.refresh().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second call lands mid-fetch and must be dropped.
        refresh.refresh().await;
        handle.await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_refreshes_on_schedule() {
        let fetches = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&fetches);
        let refresh = AutoRefresh::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(1u32) })
            },
            disabled(100),
        );

        refresh.start();
        tokio::time::sleep(Duration::from_millis(210)).await;
        refresh.stop();

        // Immediate tick plus two scheduled ones.
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }
}
