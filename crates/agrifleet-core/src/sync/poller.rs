// ── Timer-driven poller ──
//
// Generic repeating-invocation primitive. One timer per instance, ever:
// `start` is idempotent while running, `stop` cancels future ticks only.
// The callback is held behind an `ArcSwap` and re-read at every tick, so
// swapping it between ticks takes effect without a restart.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default tick interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Construction options for a [`Poller`].
#[derive(Debug, Clone, Copy)]
pub struct PollerOptions {
    /// Time between ticks.
    pub interval: Duration,
    /// Run the callback once right after `start()` instead of waiting a
    /// full interval first.
    pub immediate: bool,
    /// Start the poller on construction. Requires a Tokio runtime.
    pub enabled: bool,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            immediate: true,
            enabled: true,
        }
    }
}

impl PollerOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/// Boxed callback invoked at each tick.
struct PollCallback(Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>);

/// A fixed-interval repeating poller.
///
/// Cheaply cloneable; all clones share the same timer and callback. Ticks
/// are serialized per instance: the loop awaits the callback before
/// selecting the next tick, and missed ticks are skipped rather than
/// bursting. The poller never interprets callback failures -- callbacks
/// catch and report their own errors.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    interval: Duration,
    immediate: bool,
    callback: ArcSwap<PollCallback>,
    /// Token for the currently running tick loop, if any. The Option is
    /// the at-most-one-timer invariant.
    running: Mutex<Option<CancellationToken>>,
}

impl Poller {
    /// Create a poller. With `options.enabled` the tick loop starts
    /// immediately (must be called within a Tokio runtime).
    pub fn new<F>(options: PollerOptions, callback: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let poller = Self {
            inner: Arc::new(PollerInner {
                interval: options.interval,
                immediate: options.immediate,
                callback: ArcSwap::from_pointee(PollCallback(Box::new(callback))),
                running: Mutex::new(None),
            }),
        };
        if options.enabled {
            poller.start();
        }
        poller
    }

    /// Replace the callback. The next tick invokes the new one; no
    /// restart needed.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.inner
            .callback
            .store(Arc::new(PollCallback(Box::new(callback))));
    }

    /// Start the tick loop. No-op if already running.
    pub fn start(&self) {
        let mut running = self.inner.running.lock().expect("poller state poisoned");
        if running.is_some() {
            return;
        }
        let token = CancellationToken::new();
        *running = Some(token.clone());
        drop(running);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(inner.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            if !inner.immediate {
                // An interval's first tick resolves instantly; consume it
                // so the first real invocation waits a full period.
                ticker.tick().await;
            }
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let callback = inner.callback.load_full();
                        (callback.0)().await;
                    }
                }
            }
            debug!("poller loop stopped");
        });
    }

    /// Cancel future ticks. No-op if already stopped. A callback that is
    /// mid-flight finishes; its effects must be harmless after stop.
    pub fn stop(&self) {
        let mut running = self.inner.running.lock().expect("poller state poisoned");
        if let Some(token) = running.take() {
            token.cancel();
        }
    }

    /// Stop, then start.
    pub fn restart(&self) {
        self.stop();
        self.start();
    }

    /// Start or stop according to `enabled`.
    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .running
            .lock()
            .expect("poller state poisoned")
            .is_some()
    }
}
