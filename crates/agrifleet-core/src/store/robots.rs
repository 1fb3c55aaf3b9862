// ── Robot store ──

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::collection::EntityCollection;
use crate::command::{RobotCommand, RobotUpdate};
use crate::error::CoreError;
use crate::model::{Position, Robot, RobotStatus, Telemetry};
use crate::services::{RealtimeService, RobotsService};
use crate::sync::{Dispatcher, Subscription, Topic, Update};

/// Authoritative client-side state for the robot fleet.
///
/// Robots are backend-owned: the store never deletes them on its own;
/// `delete_robot` exists for explicit operator action only.
pub struct RobotStore {
    service: RobotsService,
    realtime: RealtimeService,
    robots: EntityCollection<Robot>,
    selected_id: RwLock<Option<String>>,
    selected: watch::Sender<Option<String>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl RobotStore {
    pub fn new(service: RobotsService, realtime: RealtimeService) -> Self {
        let (selected, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        let (last_updated, _) = watch::channel(None);

        Self {
            service,
            realtime,
            robots: EntityCollection::new(),
            selected_id: RwLock::new(None),
            selected,
            loading,
            error,
            last_updated,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Full fetch with visible loading state.
    pub async fn fetch_robots(&self) -> Result<(), CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match self.service.list().await {
            Ok(robots) => {
                self.apply_robots(robots);
                let _ = self.loading.send(false);
                Ok(())
            }
            Err(err) => {
                let _ = self.loading.send(false);
                Err(self.fail("Failed to fetch robots", err.into()))
            }
        }
    }

    /// Lightweight refresh outside the poll cadence. Does not toggle the
    /// loading flag and does not set the store error on failure -- prior
    /// data simply stays current.
    pub async fn refresh_robots(&self) -> Result<(), CoreError> {
        match self.realtime.refresh_robots().await {
            Ok(robots) => {
                self.apply_robots(robots);
                Ok(())
            }
            Err(err) => {
                let err = CoreError::from(err);
                warn!(error = %err, "robot refresh failed");
                Err(err)
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Point the selection at a robot, or clear it. Selecting an unknown
    /// id clears the selection.
    pub fn select_robot(&self, robot_id: Option<&str>) {
        let resolved = robot_id.filter(|id| self.robots.contains(id));
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        *selected = resolved.map(str::to_owned);
        let _ = self.selected.send(selected.clone());
    }

    /// The selected robot, resolved by id lookup at read time.
    pub fn selected_robot(&self) -> Option<Robot> {
        let selected = self.selected_id.read().expect("selection lock poisoned");
        selected.as_deref().and_then(|id| self.robots.get(id))
    }

    /// Watch the selected robot id.
    pub fn selected_id(&self) -> watch::Receiver<Option<String>> {
        self.selected.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Optimistic update, re-pointed to the server's copy when the
    /// response carries one.
    pub async fn update_robot(&self, robot_id: &str, updates: RobotUpdate) -> Result<(), CoreError> {
        self.robots.update(robot_id, |robot| {
            updates.apply_to(robot);
            robot.last_update = Utc::now();
        });

        match self.service.update(robot_id, &updates).await {
            Ok(robot) => {
                self.robots.upsert(robot.id.clone(), robot);
                self.resync_selection();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to update robot", err.into())),
        }
    }

    /// Local-only position update (dispatcher-fed).
    pub fn update_robot_position(&self, robot_id: &str, position: Position) {
        self.robots.update(robot_id, |robot| {
            robot.position = position;
            robot.last_update = Utc::now();
        });
    }

    /// Apply a telemetry snapshot: replaces the embedded telemetry and
    /// lets battery and position follow.
    pub fn apply_telemetry(&self, telemetry: Telemetry) {
        let robot_id = telemetry.robot_id.clone();
        let applied = self
            .robots
            .update(&robot_id, |robot| robot.apply_telemetry(telemetry));
        if !applied {
            debug!(robot_id, "telemetry for unknown robot dropped");
        }
    }

    /// Send a command and mirror its effect on local status.
    pub async fn send_command(
        &self,
        robot_id: &str,
        command: RobotCommand,
    ) -> Result<(), CoreError> {
        // Optimistic status effect; a later poll snapshot corrects it if
        // the robot disagrees.
        let status_effect = match command {
            RobotCommand::Arm => Some(RobotStatus::Active),
            RobotCommand::Disarm => Some(RobotStatus::Idle),
            RobotCommand::EmergencyStop => Some(RobotStatus::Error),
            _ => None,
        };
        if let Some(status) = status_effect {
            self.robots.update(robot_id, |robot| {
                robot.status = status;
                robot.last_update = Utc::now();
            });
        }

        match self.service.send_command(robot_id, &command).await {
            Ok(_) => Ok(()),
            Err(err) => Err(self.fail("Failed to send command", err.into())),
        }
    }

    /// Explicit operator-initiated removal.
    pub async fn delete_robot(&self, robot_id: &str) -> Result<(), CoreError> {
        self.robots.remove(robot_id);
        self.clear_selection_if(robot_id);

        match self.service.delete(robot_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to delete robot", err.into())),
        }
    }

    // ── Real-time subscriptions ──────────────────────────────────────

    /// Register this store's handlers with the dispatcher. Must be paired
    /// with [`unsubscribe_updates`](Self::unsubscribe_updates) on
    /// teardown.
    pub fn subscribe_updates(self: Arc<Self>, dispatcher: &Dispatcher) {
        let store = Arc::clone(&self);
        let robots_sub = dispatcher.subscribe(Topic::Robots, move |update| {
            if let Update::Robots(robots) = update {
                store.apply_robots(robots.clone());
            }
        });

        let store = Arc::clone(&self);
        let telemetry_sub = dispatcher.subscribe(Topic::Telemetry, move |update| {
            if let Update::Telemetry(snapshot) = update {
                store.apply_telemetry((**snapshot).clone());
            }
        });

        let mut subs = self.subscriptions.lock().expect("subscription lock poisoned");
        subs.push(robots_sub);
        subs.push(telemetry_sub);
    }

    /// Drop the dispatcher-held callback references.
    pub fn unsubscribe_updates(&self) {
        self.subscriptions
            .lock()
            .expect("subscription lock poisoned")
            .clear();
    }

    // ── Observable state ─────────────────────────────────────────────

    pub fn robots(&self) -> Arc<Vec<Robot>> {
        self.robots.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Robot>>> {
        self.robots.subscribe()
    }

    pub fn robot_by_id(&self, id: &str) -> Option<Robot> {
        self.robots.get(id)
    }

    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    pub fn last_updated(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_updated.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn apply_robots(&self, robots: Vec<Robot>) {
        self.robots.replace_all(robots, |robot| robot.id.clone());
        self.resync_selection();
        let _ = self.last_updated.send(Some(Utc::now()));
    }

    /// Selection must stay consistent with the collection after every
    /// mutation: a vanished id clears it.
    fn resync_selection(&self) {
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        if let Some(id) = selected.as_deref() {
            if !self.robots.contains(id) {
                *selected = None;
                let _ = self.selected.send(None);
            }
        }
    }

    fn clear_selection_if(&self, robot_id: &str) {
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        if selected.as_deref() == Some(robot_id) {
            *selected = None;
            let _ = self.selected.send(None);
        }
    }

    fn fail(&self, context: &str, err: CoreError) -> CoreError {
        warn!(error = %err, "{context}");
        let _ = self.error.send(Some(format!("{context}: {err}")));
        err
    }
}
