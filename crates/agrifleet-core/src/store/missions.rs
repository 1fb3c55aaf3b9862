// ── Mission store ──
//
// Owns the mission collection and enforces the status workflow: every
// store-level transition goes through the `MissionStatus` table and
// illegal ones return `CoreError::InvalidTransition` without touching
// state.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::collection::EntityCollection;
use crate::command::{MissionDraft, MissionUpdate, WaypointDraft, WaypointOrder, WaypointUpdate};
use crate::error::CoreError;
use crate::model::{Mission, MissionStatus, Waypoint};
use crate::services::{MissionFilter, MissionsService};
use crate::sync::{Dispatcher, Subscription, Topic, Update};

/// Authoritative client-side state for missions and their waypoints.
pub struct MissionStore {
    service: MissionsService,
    missions: EntityCollection<Mission>,
    templates: RwLock<Vec<Mission>>,
    selected_id: RwLock<Option<String>>,
    selected: watch::Sender<Option<String>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl MissionStore {
    pub fn new(service: MissionsService) -> Self {
        let (selected, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        let (last_updated, _) = watch::channel(None);

        Self {
            service,
            missions: EntityCollection::new(),
            templates: RwLock::new(Vec::new()),
            selected_id: RwLock::new(None),
            selected,
            loading,
            error,
            last_updated,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────

    pub async fn fetch_missions(&self, filter: &MissionFilter) -> Result<(), CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match self.service.list(filter).await {
            Ok(page) => {
                self.apply_missions(page.data);
                let _ = self.loading.send(false);
                Ok(())
            }
            Err(err) => {
                let _ = self.loading.send(false);
                Err(self.fail("Failed to fetch missions", err.into()))
            }
        }
    }

    pub async fn fetch_templates(&self) -> Result<(), CoreError> {
        match self.service.templates().await {
            Ok(templates) => {
                *self.templates.write().expect("template lock poisoned") = templates;
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to fetch templates", err.into())),
        }
    }

    pub fn templates(&self) -> Vec<Mission> {
        self.templates
            .read()
            .expect("template lock poisoned")
            .clone()
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn select_mission(&self, mission_id: Option<&str>) {
        let resolved = mission_id.filter(|id| self.missions.contains(id));
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        *selected = resolved.map(str::to_owned);
        let _ = self.selected.send(selected.clone());
    }

    pub fn selected_mission(&self) -> Option<Mission> {
        let selected = self.selected_id.read().expect("selection lock poisoned");
        selected.as_deref().and_then(|id| self.missions.get(id))
    }

    pub fn selected_id(&self) -> watch::Receiver<Option<String>> {
        self.selected.subscribe()
    }

    // ── CRUD ─────────────────────────────────────────────────────────

    /// Create a mission: materialized locally first, re-pointed to the
    /// server's copy (fresh id included) when the response arrives.
    pub async fn create_mission(&self, draft: MissionDraft) -> Result<String, CoreError> {
        let optimistic = draft.clone().into_mission();
        let local_id = optimistic.id.clone();
        self.missions.upsert(local_id.clone(), optimistic);

        match self.service.create(&draft).await {
            Ok(mission) => {
                let id = mission.id.clone();
                if id != local_id {
                    self.missions.remove(&local_id);
                }
                self.missions.upsert(id.clone(), mission);
                Ok(id)
            }
            Err(err) => Err(self.fail("Failed to create mission", err.into())),
        }
    }

    pub async fn update_mission(
        &self,
        mission_id: &str,
        updates: MissionUpdate,
    ) -> Result<(), CoreError> {
        self.missions
            .update(mission_id, |mission| updates.apply_to(mission));

        match self.service.update(mission_id, &updates).await {
            Ok(mission) => {
                self.missions.upsert(mission.id.clone(), mission);
                self.resync_selection();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to update mission", err.into())),
        }
    }

    pub async fn delete_mission(&self, mission_id: &str) -> Result<(), CoreError> {
        self.missions.remove(mission_id);
        self.resync_selection();

        match self.service.delete(mission_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to delete mission", err.into())),
        }
    }

    /// Clone a mission into a fresh draft with the given name.
    pub async fn clone_mission(&self, mission_id: &str, name: &str) -> Result<String, CoreError> {
        let Some(original) = self.missions.get(mission_id) else {
            let err = CoreError::NotFound {
                entity: "mission",
                id: mission_id.to_owned(),
            };
            return Err(self.fail("Failed to clone mission", err));
        };

        let copy = original.clone_as(name);
        let local_id = copy.id.clone();
        self.missions.upsert(local_id.clone(), copy);

        match self.service.clone_mission(mission_id, name).await {
            Ok(mission) => {
                let id = mission.id.clone();
                if id != local_id {
                    self.missions.remove(&local_id);
                }
                self.missions.upsert(id.clone(), mission);
                Ok(id)
            }
            Err(err) => Err(self.fail("Failed to clone mission", err.into())),
        }
    }

    // ── Waypoint management ──────────────────────────────────────────

    pub async fn add_waypoint(
        &self,
        mission_id: &str,
        draft: WaypointDraft,
    ) -> Result<(), CoreError> {
        let optimistic = draft.clone().into_waypoint();
        let local_id = optimistic.id.clone();
        self.missions
            .update(mission_id, |mission| mission.waypoints.push(optimistic));

        match self.service.add_waypoint(mission_id, &draft).await {
            Ok(waypoint) => {
                // Re-point the optimistic waypoint at the server's copy.
                self.missions.update(mission_id, |mission| {
                    if let Some(wp) = mission.waypoints.iter_mut().find(|wp| wp.id == local_id) {
                        *wp = waypoint;
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to add waypoint", err.into())),
        }
    }

    pub async fn update_waypoint(
        &self,
        mission_id: &str,
        waypoint_id: &str,
        updates: WaypointUpdate,
    ) -> Result<(), CoreError> {
        self.missions.update(mission_id, |mission| {
            if let Some(wp) = mission.waypoints.iter_mut().find(|wp| wp.id == waypoint_id) {
                updates.apply_to(wp);
            }
        });

        match self
            .service
            .update_waypoint(mission_id, waypoint_id, &updates)
            .await
        {
            Ok(waypoint) => {
                self.missions.update(mission_id, |mission| {
                    if let Some(wp) = mission.waypoints.iter_mut().find(|wp| wp.id == waypoint_id)
                    {
                        *wp = waypoint;
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to update waypoint", err.into())),
        }
    }

    pub async fn delete_waypoint(
        &self,
        mission_id: &str,
        waypoint_id: &str,
    ) -> Result<(), CoreError> {
        self.missions.update(mission_id, |mission| {
            mission.waypoints.retain(|wp| wp.id != waypoint_id);
        });

        match self.service.delete_waypoint(mission_id, waypoint_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to delete waypoint", err.into())),
        }
    }

    /// Apply new order values and re-sort the sequence ascending.
    pub async fn reorder_waypoints(
        &self,
        mission_id: &str,
        orders: Vec<WaypointOrder>,
    ) -> Result<(), CoreError> {
        let pairs: Vec<(String, u32)> = orders
            .iter()
            .map(|order| (order.id.clone(), order.order))
            .collect();
        self.missions
            .update(mission_id, |mission| mission.reorder_waypoints(&pairs));

        match self.service.reorder_waypoints(mission_id, &orders).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to reorder waypoints", err.into())),
        }
    }

    pub fn waypoints(&self, mission_id: &str) -> Option<Vec<Waypoint>> {
        self.missions.get(mission_id).map(|m| m.waypoints)
    }

    // ── Mission control (state machine) ──────────────────────────────

    /// draft/scheduled -> active, assigning the robot and stamping the
    /// start time.
    pub async fn start_mission(&self, mission_id: &str, robot_id: &str) -> Result<(), CoreError> {
        self.check_transition(mission_id, MissionStatus::Active)?;

        self.missions.update(mission_id, |mission| {
            mission.status = MissionStatus::Active;
            mission.assigned_robot = Some(robot_id.to_owned());
            mission.started_at = Some(Utc::now());
        });

        match self.service.start(mission_id, robot_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to start mission", err.into())),
        }
    }

    /// active -> paused.
    pub async fn pause_mission(&self, mission_id: &str) -> Result<(), CoreError> {
        self.check_transition(mission_id, MissionStatus::Paused)?;

        self.missions.update(mission_id, |mission| {
            mission.status = MissionStatus::Paused;
        });

        match self.service.pause(mission_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to pause mission", err.into())),
        }
    }

    /// paused -> active. Resuming anything else (a draft, a completed
    /// mission) is rejected.
    pub async fn resume_mission(&self, mission_id: &str) -> Result<(), CoreError> {
        let current = self.status_of(mission_id)?;
        if current != MissionStatus::Paused {
            let err = CoreError::InvalidTransition {
                from: current,
                to: MissionStatus::Active,
            };
            return Err(self.fail("Cannot resume mission", err));
        }

        self.missions.update(mission_id, |mission| {
            mission.status = MissionStatus::Active;
        });

        match self.service.resume(mission_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to resume mission", err.into())),
        }
    }

    /// active/paused -> completed, stamping the completion time.
    pub async fn stop_mission(&self, mission_id: &str) -> Result<(), CoreError> {
        self.check_transition(mission_id, MissionStatus::Completed)?;

        self.missions.update(mission_id, |mission| {
            mission.status = MissionStatus::Completed;
            mission.completed_at = Some(Utc::now());
        });

        match self.service.stop(mission_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to stop mission", err.into())),
        }
    }

    // ── Real-time subscriptions ──────────────────────────────────────

    pub fn subscribe_updates(self: Arc<Self>, dispatcher: &Dispatcher) {
        let store = Arc::clone(&self);
        let sub = dispatcher.subscribe(Topic::Missions, move |update| {
            if let Update::Missions(missions) = update {
                store.apply_active_missions(missions.clone());
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

    pub fn missions(&self) -> Arc<Vec<Mission>> {
        self.missions.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Mission>>> {
        self.missions.subscribe()
    }

    pub fn mission_by_id(&self, id: &str) -> Option<Mission> {
        self.missions.get(id)
    }

    /// Missions currently executing, derived from the collection.
    pub fn active_missions(&self) -> Vec<Mission> {
        self.missions
            .snapshot()
            .iter()
            .filter(|m| m.status == MissionStatus::Active)
            .cloned()
            .collect()
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

    fn apply_missions(&self, missions: Vec<Mission>) {
        self.missions
            .replace_all(missions, |mission| mission.id.clone());
        self.resync_selection();
        let _ = self.last_updated.send(Some(Utc::now()));
    }

    /// Merge the active-mission poll snapshot. Only the polled missions
    /// are replaced; draft and finished missions stay as fetched.
    fn apply_active_missions(&self, missions: Vec<Mission>) {
        for mission in missions {
            self.missions.upsert(mission.id.clone(), mission);
        }
        let _ = self.last_updated.send(Some(Utc::now()));
    }

    fn status_of(&self, mission_id: &str) -> Result<MissionStatus, CoreError> {
        self.missions
            .get(mission_id)
            .map(|mission| mission.status)
            .ok_or_else(|| CoreError::NotFound {
                entity: "mission",
                id: mission_id.to_owned(),
            })
    }

    /// Reject transitions the workflow table does not allow, before any
    /// state is touched.
    fn check_transition(&self, mission_id: &str, to: MissionStatus) -> Result<(), CoreError> {
        let from = self.status_of(mission_id)?;
        if from.can_transition(to) {
            Ok(())
        } else {
            let err = CoreError::InvalidTransition { from, to };
            debug!(mission_id, %from, %to, "rejected mission transition");
            let _ = self.error.send(Some(err.to_string()));
            Err(err)
        }
    }

    fn resync_selection(&self) {
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        if let Some(id) = selected.as_deref() {
            if !self.missions.contains(id) {
                *selected = None;
                let _ = self.selected.send(None);
            }
        }
    }

    fn fail(&self, context: &str, err: CoreError) -> CoreError {
        warn!(error = %err, "{context}");
        let _ = self.error.send(Some(format!("{context}: {err}")));
        err
    }
}
