// ── Alert store ──
//
// The unacknowledged count is always recomputed from the collection,
// never incremented or decremented independently -- acknowledging the
// same alert twice cannot drive it below the true count.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::warn;

use super::collection::EntityCollection;
use crate::command::AlertDraft;
use crate::error::CoreError;
use crate::model::Alert;
use crate::services::{AlertFilter, AlertsService};
use crate::sync::{Dispatcher, Subscription, Topic, Update};

/// Authoritative client-side state for alerts.
pub struct AlertStore {
    service: AlertsService,
    alerts: EntityCollection<Alert>,
    unacknowledged: watch::Sender<usize>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AlertStore {
    pub fn new(service: AlertsService) -> Self {
        let (unacknowledged, _) = watch::channel(0);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);

        Self {
            service,
            alerts: EntityCollection::new(),
            unacknowledged,
            loading,
            error,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────

    pub async fn fetch_alerts(&self, filter: &AlertFilter) -> Result<(), CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match self.service.list(filter).await {
            Ok(page) => {
                self.alerts.replace_all(page.data, |alert| alert.id.clone());
                self.recount_unacknowledged();
                let _ = self.loading.send(false);
                Ok(())
            }
            Err(err) => {
                let _ = self.loading.send(false);
                Err(self.fail("Failed to fetch alerts", err.into()))
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Acknowledge an alert. Idempotent: acknowledging an already
    /// acknowledged alert changes nothing.
    pub async fn acknowledge_alert(&self, alert_id: &str) -> Result<(), CoreError> {
        self.alerts.update(alert_id, |alert| {
            alert.acknowledged = true;
        });
        self.recount_unacknowledged();

        match self.service.acknowledge(alert_id).await {
            Ok(alert) => {
                self.alerts.upsert(alert.id.clone(), alert);
                self.recount_unacknowledged();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to acknowledge alert", err.into())),
        }
    }

    /// Resolve an alert. Resolution implies acknowledgement.
    pub async fn resolve_alert(
        &self,
        alert_id: &str,
        resolution: Option<&str>,
    ) -> Result<(), CoreError> {
        self.alerts.update(alert_id, Alert::resolve);
        self.recount_unacknowledged();

        match self.service.resolve(alert_id, resolution).await {
            Ok(alert) => {
                self.alerts.upsert(alert.id.clone(), alert);
                self.recount_unacknowledged();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to resolve alert", err.into())),
        }
    }

    pub async fn delete_alert(&self, alert_id: &str) -> Result<(), CoreError> {
        self.alerts.remove(alert_id);
        self.recount_unacknowledged();

        match self.service.delete(alert_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to delete alert", err.into())),
        }
    }

    /// Raise a local alert (client-side notifications); never sent to the
    /// backend.
    pub fn add_alert(&self, draft: AlertDraft) -> String {
        let alert = draft.into_alert();
        let id = alert.id.clone();
        self.alerts.prepend(id.clone(), alert);
        self.recount_unacknowledged();
        id
    }

    // ── Real-time subscriptions ──────────────────────────────────────

    pub fn subscribe_updates(self: Arc<Self>, dispatcher: &Dispatcher) {
        let store = Arc::clone(&self);
        let sub = dispatcher.subscribe(Topic::Alerts, move |update| {
            if let Update::Alert(alert) = update {
                store.apply_alert((**alert).clone());
            }
        });
        self.subscriptions
            .lock()
            .expect("subscription lock poisoned")
            .push(sub);
    }

    pub fn unsubscribe_updates(&self) {
        self.subscriptions
            .lock()
            .expect("subscription lock poisoned")
            .clear();
    }

    // ── Observable state ─────────────────────────────────────────────

    pub fn alerts(&self) -> Arc<Vec<Alert>> {
        self.alerts.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Alert>>> {
        self.alerts.subscribe()
    }

    pub fn alert_by_id(&self, id: &str) -> Option<Alert> {
        self.alerts.get(id)
    }

    pub fn unacknowledged_count(&self) -> usize {
        *self.unacknowledged.borrow()
    }

    pub fn subscribe_unacknowledged(&self) -> watch::Receiver<usize> {
        self.unacknowledged.subscribe()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Merge one polled alert: an already known id is updated in place,
    /// a new one is prepended (newest first). The poll window overlaps
    /// between ticks, so repeats are the normal case.
    fn apply_alert(&self, alert: Alert) {
        if self.alerts.contains(&alert.id) {
            let incoming = alert.clone();
            self.alerts.update(&alert.id, move |existing| *existing = incoming);
        } else {
            self.alerts.prepend(alert.id.clone(), alert);
        }
        self.recount_unacknowledged();
    }

    fn recount_unacknowledged(&self) {
        let count = self
            .alerts
            .snapshot()
            .iter()
            .filter(|alert| !alert.acknowledged)
            .count();
        let _ = self.unacknowledged.send(count);
    }

    fn fail(&self, context: &str, err: CoreError) -> CoreError {
        warn!(error = %err, "{context}");
        let _ = self.error.send(Some(format!("{context}: {err}")));
        err
    }
}
