// ── Real-time sync loops ──
//
// Four independently scheduled poll loops, each fetching one read surface
// and publishing to its topic on success. Failures are logged and
// swallowed at the poll level: this is a best-effort sync layer, not a
// guaranteed-delivery channel. The loops are not synchronized with each
// other, so updates for a shared entity can arrive out of order across
// topics; stores tolerate that with last-write-wins per field group.

use std::time::Duration;

use tracing::warn;

use super::dispatcher::{Dispatcher, Update};
use super::poller::{Poller, PollerOptions};
use crate::services::RealtimeService;

/// Poll cadence per topic.
#[derive(Debug, Clone, Copy)]
pub struct SyncIntervals {
    pub robots: Duration,
    pub telemetry: Duration,
    pub alerts: Duration,
    pub missions: Duration,
}

impl Default for SyncIntervals {
    fn default() -> Self {
        Self {
            robots: Duration::from_secs(2),
            telemetry: Duration::from_secs(1),
            alerts: Duration::from_secs(5),
            missions: Duration::from_secs(3),
        }
    }
}

/// Owner of the four poll loops feeding the [`Dispatcher`].
pub struct RealtimeSync {
    robots: Poller,
    telemetry: Poller,
    alerts: Poller,
    missions: Poller,
}

impl RealtimeSync {
    pub fn new(service: RealtimeService, dispatcher: Dispatcher) -> Self {
        Self::with_intervals(service, dispatcher, SyncIntervals::default())
    }

    pub fn with_intervals(
        service: RealtimeService,
        dispatcher: Dispatcher,
        intervals: SyncIntervals,
    ) -> Self {
        // The loops wait a full interval before their first fetch and stay
        // stopped until `start()`.
        let options = |interval| PollerOptions {
            interval,
            immediate: false,
            enabled: false,
        };

        let robots = {
            let service = service.clone();
            let dispatcher = dispatcher.clone();
            Poller::new(options(intervals.robots), move || {
                let service = service.clone();
                let dispatcher = dispatcher.clone();
                Box::pin(async move {
                    match service.robot_status().await {
                        Ok(robots) => dispatcher.publish(&Update::Robots(robots)),
                        Err(err) => warn!(error = %err, "robot status poll failed"),
                    }
                })
            })
        };

        let telemetry = {
            let service = service.clone();
            let dispatcher = dispatcher.clone();
            Poller::new(options(intervals.telemetry), move || {
                let service = service.clone();
                let dispatcher = dispatcher.clone();
                Box::pin(async move {
                    match service.latest_telemetry().await {
                        Ok(snapshots) => {
                            for snapshot in snapshots {
                                dispatcher.publish(&Update::Telemetry(Box::new(snapshot)));
                            }
                        }
                        Err(err) => warn!(error = %err, "telemetry poll failed"),
                    }
                })
            })
        };

        let alerts = {
            let service = service.clone();
            let dispatcher = dispatcher.clone();
            Poller::new(options(intervals.alerts), move || {
                let service = service.clone();
                let dispatcher = dispatcher.clone();
                Box::pin(async move {
                    match service.recent_alerts().await {
                        Ok(alerts) => {
                            for alert in alerts {
                                dispatcher.publish(&Update::Alert(Box::new(alert)));
                            }
                        }
                        Err(err) => warn!(error = %err, "alert poll failed"),
                    }
                })
            })
        };

        let missions = {
            let dispatcher = dispatcher.clone();
            Poller::new(options(intervals.missions), move || {
                let service = service.clone();
                let dispatcher = dispatcher.clone();
                Box::pin(async move {
                    match service.active_missions().await {
                        Ok(missions) => dispatcher.publish(&Update::Missions(missions)),
                        Err(err) => warn!(error = %err, "mission poll failed"),
                    }
                })
            })
        };

        Self {
            robots,
            telemetry,
            alerts,
            missions,
        }
    }

    /// Start all four loops. Idempotent per loop.
    pub fn start(&self) {
        self.robots.start();
        self.telemetry.start();
        self.alerts.start();
        self.missions.start();
    }

    /// Cancel future ticks on all loops. Responses already in flight land
    /// harmlessly.
    pub fn stop(&self) {
        self.robots.stop();
        self.telemetry.stop();
        self.alerts.stop();
        self.missions.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.robots.is_running()
            || self.telemetry.is_running()
            || self.alerts.is_running()
            || self.missions.is_running()
    }
}
