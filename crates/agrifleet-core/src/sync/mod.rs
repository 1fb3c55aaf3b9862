// ── Real-time sync layer ──
//
// Simulated live updates over plain REST: a repeating-timer primitive
// (`Poller`), a fetch wrapper with observable state (`AutoRefresh`), a
// typed in-process pub/sub registry (`Dispatcher`), and the four poll
// loops feeding it (`RealtimeSync`).

pub mod auto_refresh;
pub mod dispatcher;
pub mod poller;
pub mod realtime;

pub use auto_refresh::{AutoRefresh, AutoRefreshOptions};
pub use dispatcher::{Dispatcher, Subscription, Topic, Update};
pub use poller::{Poller, PollerOptions};
pub use realtime::{RealtimeSync, SyncIntervals};
