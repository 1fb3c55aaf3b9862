// ── System store ──
//
// Session-level state: the signed-in user, backend connectivity, and the
// latest status snapshot. Persisted settings live in `agrifleet-config`;
// this store only tracks runtime state.

use tokio::sync::watch;
use tracing::warn;

use crate::error::CoreError;
use crate::model::{HealthCheck, PingResult, SystemStatus, User};
use crate::services::StatusService;

/// Runtime system state for the dashboard session.
pub struct SystemStore {
    service: StatusService,
    user: watch::Sender<Option<User>>,
    connected: watch::Sender<bool>,
    status: watch::Sender<Option<SystemStatus>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl SystemStore {
    pub fn new(service: StatusService) -> Self {
        let (user, _) = watch::channel(None);
        let (connected, _) = watch::channel(true);
        let (status, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);

        Self {
            service,
            user,
            connected,
            status,
            loading,
            error,
        }
    }

    // ── User & connectivity ──────────────────────────────────────────

    pub fn set_user(&self, user: Option<User>) {
        let _ = self.user.send(user);
    }

    pub fn user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    pub fn set_connection_status(&self, connected: bool) {
        let _ = self.connected.send(connected);
    }

    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    // ── Status snapshots ─────────────────────────────────────────────

    pub async fn fetch_status(&self) -> Result<(), CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match self.service.system_status().await {
            Ok(status) => {
                let _ = self.status.send(Some(status));
                let _ = self.connected.send(true);
                let _ = self.loading.send(false);
                Ok(())
            }
            Err(err) => {
                let _ = self.connected.send(false);
                let _ = self.loading.send(false);
                Err(self.fail("Failed to fetch system status", err.into()))
            }
        }
    }

    pub fn status(&self) -> watch::Receiver<Option<SystemStatus>> {
        self.status.subscribe()
    }

    pub async fn health(&self) -> Result<Vec<HealthCheck>, CoreError> {
        self.service.health().await.map_err(CoreError::from)
    }

    /// Ping the backend, updating the connected flag from the outcome.
    pub async fn ping(&self) -> Result<PingResult, CoreError> {
        match self.service.ping().await {
            Ok(result) => {
                let _ = self.connected.send(true);
                Ok(result)
            }
            Err(err) => {
                let _ = self.connected.send(false);
                Err(self.fail("Backend ping failed", err.into()))
            }
        }
    }

    /// Probe one of the backend's configured endpoints.
    pub async fn test_connection(&self, endpoint: &str) -> Result<bool, CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        let outcome = self.service.test_connection(endpoint).await;
        let _ = self.loading.send(false);

        match outcome {
            Ok(reachable) => {
                if !reachable {
                    let _ = self
                        .error
                        .send(Some(format!("Failed to connect to {endpoint}")));
                }
                Ok(reachable)
            }
            Err(err) => {
                let err = CoreError::from(err);
                let _ = self
                    .error
                    .send(Some(format!("Connection test failed for {endpoint}: {err}")));
                warn!(error = %err, endpoint, "connection test failed");
                Err(err)
            }
        }
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    fn fail(&self, context: &str, err: CoreError) -> CoreError {
        warn!(error = %err, "{context}");
        let _ = self.error.send(Some(format!("{context}: {err}")));
        err
    }
}
