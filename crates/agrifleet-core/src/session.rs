// ── Session composition root ──
//
// One `FleetSession` per application, constructed at startup and passed
// by handle to consumers. It owns the API client, domain services,
// dispatcher, sync loops, and every store -- there are no module-level
// singletons, and init/teardown is the caller's explicit responsibility.

use std::sync::Arc;

use agrifleet_api::{ApiClient, SessionState, TokenStore, TransportConfig};
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

use crate::error::CoreError;
use crate::services::{
    AlertsService, BatchService, FieldsService, MissionsService, RealtimeService, RobotsService,
    StatusService,
};
use crate::store::{AlertStore, FieldStore, MissionStore, RobotStore, SystemStore};
use crate::sync::{Dispatcher, RealtimeSync, SyncIntervals};

/// Connection settings for a fleet backend.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Backend base URL, e.g. `http://localhost:5000`.
    pub base_url: Url,
    pub transport: TransportConfig,
    /// Poll cadence for the real-time loops.
    pub intervals: SyncIntervals,
}

impl FleetConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport: TransportConfig::default(),
            intervals: SyncIntervals::default(),
        }
    }
}

/// The application's handle to the whole data layer.
///
/// [`start`](Self::start) wires store subscriptions and begins polling;
/// [`shutdown`](Self::shutdown) reverses both. Dropping the session
/// without `shutdown` leaks nothing persistent, but in-flight poll ticks
/// may still land.
pub struct FleetSession {
    api: Arc<ApiClient>,
    dispatcher: Dispatcher,
    realtime: RealtimeSync,
    batch: BatchService,
    robots: Arc<RobotStore>,
    missions: Arc<MissionStore>,
    alerts: Arc<AlertStore>,
    fields: Arc<FieldStore>,
    system: Arc<SystemStore>,
}

impl FleetSession {
    /// Build the full service/store graph. Does not start polling.
    pub fn new(config: &FleetConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let api = Arc::new(ApiClient::new(
            config.base_url.as_str(),
            &config.transport,
            tokens,
        )?);

        let dispatcher = Dispatcher::new();
        let realtime_service = RealtimeService::new(Arc::clone(&api));
        let realtime = RealtimeSync::with_intervals(
            realtime_service.clone(),
            dispatcher.clone(),
            config.intervals,
        );

        let robots = Arc::new(RobotStore::new(
            RobotsService::new(Arc::clone(&api)),
            realtime_service,
        ));
        let missions = Arc::new(MissionStore::new(MissionsService::new(Arc::clone(&api))));
        let alerts = Arc::new(AlertStore::new(AlertsService::new(Arc::clone(&api))));
        let fields = Arc::new(FieldStore::new(FieldsService::new(Arc::clone(&api))));
        let system = Arc::new(SystemStore::new(StatusService::new(Arc::clone(&api))));
        let batch = BatchService::new(Arc::clone(&api));

        Ok(Self {
            api,
            dispatcher,
            realtime,
            batch,
            robots,
            missions,
            alerts,
            fields,
            system,
        })
    }

    /// Subscribe the stores to their topics and start the poll loops.
    /// Must run within a Tokio runtime. Idempotent per poll loop; calling
    /// twice without `shutdown` does not double-subscribe the stores.
    pub fn start(&self) {
        if self.realtime.is_polling() {
            debug!("session already started");
            return;
        }

        Arc::clone(&self.robots).subscribe_updates(&self.dispatcher);
        Arc::clone(&self.missions).subscribe_updates(&self.dispatcher);
        Arc::clone(&self.alerts).subscribe_updates(&self.dispatcher);
        self.realtime.start();
        info!("real-time updates started (REST polling)");
    }

    /// Unsubscribe the stores and cancel future poll ticks. Responses
    /// already in flight apply harmlessly.
    pub fn shutdown(&self) {
        self.realtime.stop();
        self.robots.unsubscribe_updates();
        self.missions.unsubscribe_updates();
        self.alerts.unsubscribe_updates();
        info!("real-time updates stopped");
    }

    /// Fetch every resource once, concurrently. Convenient right after
    /// `start` so the UI has data before the first poll ticks land.
    pub async fn prime(&self) {
        let mission_filter = crate::services::MissionFilter::default();
        let alert_filter = crate::services::AlertFilter::default();
        let (robots, missions, alerts, fields, status) = futures_util::join!(
            self.robots.fetch_robots(),
            self.missions.fetch_missions(&mission_filter),
            self.alerts.fetch_alerts(&alert_filter),
            self.fields.fetch_fields(),
            self.system.fetch_status(),
        );
        // Failures already set the per-store error flags.
        for outcome in [robots, missions, alerts, fields, status] {
            if let Err(err) = outcome {
                debug!(error = %err, "initial load incomplete");
            }
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn robots(&self) -> &Arc<RobotStore> {
        &self.robots
    }

    pub fn missions(&self) -> &Arc<MissionStore> {
        &self.missions
    }

    pub fn alerts(&self) -> &Arc<AlertStore> {
        &self.alerts
    }

    pub fn fields(&self) -> &Arc<FieldStore> {
        &self.fields
    }

    pub fn system(&self) -> &Arc<SystemStore> {
        &self.system
    }

    pub fn batch(&self) -> &BatchService {
        &self.batch
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether the poll loops are running.
    pub fn is_polling(&self) -> bool {
        self.realtime.is_polling()
    }

    /// Watch for credential expiry (401 from any request). The embedding
    /// application routes to its login boundary when this flips.
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.api.session_state()
    }

    /// Mark the session active again after storing a fresh token.
    pub fn reset_session(&self) {
        self.api.reset_session();
    }
}
