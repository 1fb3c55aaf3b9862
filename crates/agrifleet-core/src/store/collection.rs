// ── Ordered reactive entity collection ──
//
// Id-keyed, insertion-ordered storage with push-based change notification
// via a `watch` snapshot channel. Every mutation rebuilds the snapshot
// that subscribers receive; stores are single-writer, so a plain RwLock
// around an IndexMap is enough.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tokio::sync::watch;

pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    entries: RwLock<IndexMap<String, T>>,
    snapshot: watch::Sender<Arc<Vec<T>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            entries: RwLock::new(IndexMap::new()),
            snapshot,
        }
    }

    /// Insert or update an entity. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: String, entity: T) -> bool {
        let mut entries = self.entries.write().expect("collection lock poisoned");
        let is_new = entries.insert(id, entity).is_none();
        self.rebuild_snapshot(&entries);
        is_new
    }

    /// Insert at the front of the collection (newest-first listings).
    pub(crate) fn prepend(&self, id: String, entity: T) {
        let mut entries = self.entries.write().expect("collection lock poisoned");
        entries.shift_insert(0, id, entity);
        self.rebuild_snapshot(&entries);
    }

    /// Remove an entity by id, preserving the order of the rest.
    pub(crate) fn remove(&self, id: &str) -> Option<T> {
        let mut entries = self.entries.write().expect("collection lock poisoned");
        let removed = entries.shift_remove(id);
        if removed.is_some() {
            self.rebuild_snapshot(&entries);
        }
        removed
    }

    /// Mutate an entity in place. Returns `false` if the id is absent.
    pub(crate) fn update(&self, id: &str, mutate: impl FnOnce(&mut T)) -> bool {
        let mut entries = self.entries.write().expect("collection lock poisoned");
        let Some(entity) = entries.get_mut(id) else {
            return false;
        };
        mutate(entity);
        self.rebuild_snapshot(&entries);
        true
    }

    /// Replace the whole collection with a fresh listing.
    pub(crate) fn replace_all(&self, items: Vec<T>, id_of: impl Fn(&T) -> String) {
        let mut entries = self.entries.write().expect("collection lock poisoned");
        *entries = items
            .into_iter()
            .map(|item| (id_of(&item), item))
            .collect();
        self.rebuild_snapshot(&entries);
    }

    pub(crate) fn get(&self, id: &str) -> Option<T> {
        self.entries
            .read()
            .expect("collection lock poisoned")
            .get(id)
            .cloned()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .expect("collection lock poisoned")
            .contains_key(id)
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<T>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().expect("collection lock poisoned").len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild and broadcast the snapshot. Called with the write guard
    /// held so snapshots always reflect a consistent ordering.
    fn rebuild_snapshot(&self, entries: &IndexMap<String, T>) {
        let values: Vec<T> = entries.values().cloned().collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
