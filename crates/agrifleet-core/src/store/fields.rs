// ── Field store ──

use std::sync::RwLock;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::collection::EntityCollection;
use crate::command::{FieldDraft, FieldUpdate};
use crate::error::CoreError;
use crate::geo;
use crate::model::{Field, Position};
use crate::services::FieldsService;

/// Authoritative client-side state for managed fields.
pub struct FieldStore {
    service: FieldsService,
    fields: EntityCollection<Field>,
    selected_id: RwLock<Option<String>>,
    selected: watch::Sender<Option<String>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
}

impl FieldStore {
    pub fn new(service: FieldsService) -> Self {
        let (selected, _) = watch::channel(None);
        let (loading, _) = watch::channel(false);
        let (error, _) = watch::channel(None);

        Self {
            service,
            fields: EntityCollection::new(),
            selected_id: RwLock::new(None),
            selected,
            loading,
            error,
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────

    pub async fn fetch_fields(&self) -> Result<(), CoreError> {
        let _ = self.loading.send(true);
        let _ = self.error.send(None);

        match self.service.list().await {
            Ok(fields) => {
                self.fields.replace_all(fields, |field| field.id.clone());
                self.resync_selection();
                let _ = self.loading.send(false);
                Ok(())
            }
            Err(err) => {
                let _ = self.loading.send(false);
                Err(self.fail("Failed to fetch fields", err.into()))
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn select_field(&self, field_id: Option<&str>) {
        let resolved = field_id.filter(|id| self.fields.contains(id));
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        *selected = resolved.map(str::to_owned);
        let _ = self.selected.send(selected.clone());
    }

    pub fn selected_field(&self) -> Option<Field> {
        let selected = self.selected_id.read().expect("selection lock poisoned");
        selected.as_deref().and_then(|id| self.fields.get(id))
    }

    pub fn selected_id(&self) -> watch::Receiver<Option<String>> {
        self.selected.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create_field(&self, draft: FieldDraft) -> Result<String, CoreError> {
        let optimistic = draft.clone().into_field();
        let local_id = optimistic.id.clone();
        self.fields.upsert(local_id.clone(), optimistic);

        match self.service.create(&draft).await {
            Ok(field) => {
                let id = field.id.clone();
                if id != local_id {
                    self.fields.remove(&local_id);
                }
                self.fields.upsert(id.clone(), field);
                Ok(id)
            }
            Err(err) => Err(self.fail("Failed to create field", err.into())),
        }
    }

    pub async fn update_field(&self, field_id: &str, updates: FieldUpdate) -> Result<(), CoreError> {
        self.fields
            .update(field_id, |field| updates.apply_to(field));

        match self.service.update(field_id, &updates).await {
            Ok(field) => {
                self.fields.upsert(field.id.clone(), field);
                self.resync_selection();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to update field", err.into())),
        }
    }

    pub async fn delete_field(&self, field_id: &str) -> Result<(), CoreError> {
        self.fields.remove(field_id);
        self.resync_selection();

        match self.service.delete(field_id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail("Failed to delete field", err.into())),
        }
    }

    pub async fn update_boundaries(
        &self,
        field_id: &str,
        boundaries: Vec<Position>,
    ) -> Result<(), CoreError> {
        self.fields.update(field_id, |field| {
            field.boundaries.clone_from(&boundaries);
        });

        match self.service.update_boundaries(field_id, &boundaries).await {
            Ok(field) => {
                self.fields.upsert(field.id.clone(), field);
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to update field boundaries", err.into())),
        }
    }

    /// Area of a boundary polygon in hectares. Asks the backend first and
    /// falls back to the local shoelace formula when it is unreachable.
    pub async fn calculate_area(&self, boundaries: &[Position]) -> f64 {
        match self.service.calculate_area(boundaries).await {
            Ok(area) => area,
            Err(err) => {
                debug!(error = %err, "server area calculation unavailable, using local formula");
                geo::polygon_area_hectares(boundaries)
            }
        }
    }

    // ── Observable state ─────────────────────────────────────────────

    pub fn fields(&self) -> std::sync::Arc<Vec<Field>> {
        self.fields.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<std::sync::Arc<Vec<Field>>> {
        self.fields.subscribe()
    }

    pub fn field_by_id(&self, id: &str) -> Option<Field> {
        self.fields.get(id)
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn resync_selection(&self) {
        let mut selected = self.selected_id.write().expect("selection lock poisoned");
        if let Some(id) = selected.as_deref() {
            if !self.fields.contains(id) {
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
