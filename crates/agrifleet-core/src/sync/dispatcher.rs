// ── Typed pub/sub dispatcher ──
//
// In-process topic registry decoupling "data arrived" from "who consumes
// it". Topics are a closed enum with payload types bound per variant, so
// a subscriber can never typo a topic name or receive the wrong payload
// shape.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::warn;

use crate::model::{Alert, Mission, Robot, Telemetry};

/// Subscription topics, one per poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Robots,
    Telemetry,
    Alerts,
    Missions,
}

/// A published payload, tagged by topic.
#[derive(Debug, Clone)]
pub enum Update {
    /// Full robot status snapshot.
    Robots(Vec<Robot>),
    /// One telemetry snapshot for one robot.
    Telemetry(Box<Telemetry>),
    /// One newly seen alert.
    Alert(Box<Alert>),
    /// Current set of active missions.
    Missions(Vec<Mission>),
}

impl Update {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Robots(_) => Topic::Robots,
            Self::Telemetry(_) => Topic::Telemetry,
            Self::Alert(_) => Topic::Alerts,
            Self::Missions(_) => Topic::Missions,
        }
    }
}

type Callback = Arc<dyn Fn(&Update) + Send + Sync>;

/// Topic-keyed multi-subscriber registry.
///
/// Callbacks run synchronously in registration order on the publisher's
/// task. A panicking callback is isolated and logged; its siblings still
/// run. Cheaply cloneable; clones share one registry.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    subscribers: DashMap<Topic, Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a topic. Dropping (or explicitly
    /// unsubscribing) the returned [`Subscription`] removes exactly this
    /// callback; other subscribers on the topic are unaffected.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&Update) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .entry(topic)
            .or_default()
            .push((id, Arc::new(callback)));

        Subscription {
            registry: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Deliver an update to every subscriber of its topic, in
    /// registration order.
    pub fn publish(&self, update: &Update) {
        let topic = update.topic();
        // Clone the callback list out so a callback that subscribes or
        // unsubscribes reentrantly cannot deadlock the registry shard.
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .get(&topic)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in callbacks {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| (*callback)(update)));
            if outcome.is_err() {
                warn!(?topic, "subscriber panicked during publish");
            }
        }
    }

    /// Number of live subscribers on a topic.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .subscribers
            .get(&topic)
            .map_or(0, |subs| subs.len())
    }
}

/// Handle to one registered callback. Removing it (by drop or
/// [`unsubscribe`](Subscription::unsubscribe)) releases the
/// dispatcher-held callback reference.
pub struct Subscription {
    registry: Weak<DispatcherInner>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// Remove the callback now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Some(mut subs) = registry.subscribers.get_mut(&self.topic) {
                subs.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn robots_update() -> Update {
        Update::Robots(Vec::new())
    }

    #[test]
    fn publish_reaches_all_subscribers_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _sub_a = dispatcher.subscribe(Topic::Robots, move |_| {
            first.lock().unwrap().push("a");
        });
        let second = Arc::clone(&order);
        let _sub_b = dispatcher.subscribe(Topic::Robots, move |_| {
            second.lock().unwrap().push("b");
        });

        dispatcher.publish(&robots_update());

        assert_eq!(*order.lock().unwrap(), ["a", "b"]);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_callback() {
        let dispatcher = Dispatcher::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&hits);
        let sub_a = dispatcher.subscribe(Topic::Robots, move |_| {
            first.lock().unwrap().push("a");
        });
        let second = Arc::clone(&hits);
        let _sub_b = dispatcher.subscribe(Topic::Robots, move |_| {
            second.lock().unwrap().push("b");
        });

        sub_a.unsubscribe();
        dispatcher.publish(&robots_update());

        assert_eq!(*hits.lock().unwrap(), ["b"]);
        assert_eq!(dispatcher.subscriber_count(Topic::Robots), 1);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let dispatcher = Dispatcher::new();
        let hits = Arc::new(Mutex::new(0u32));

        {
            let counter = Arc::clone(&hits);
            let _sub = dispatcher.subscribe(Topic::Missions, move |_| {
                *counter.lock().unwrap() += 1;
            });
            dispatcher.publish(&Update::Missions(Vec::new()));
        }

        dispatcher.publish(&Update::Missions(Vec::new()));
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(dispatcher.subscriber_count(Topic::Missions), 0);
    }

    #[test]
    fn updates_route_only_to_their_topic() {
        let dispatcher = Dispatcher::new();
        let robot_hits = Arc::new(Mutex::new(0u32));
        let mission_hits = Arc::new(Mutex::new(0u32));

        let counter = Arc::clone(&robot_hits);
        let _sub_r = dispatcher.subscribe(Topic::Robots, move |_| {
            *counter.lock().unwrap() += 1;
        });
        let counter = Arc::clone(&mission_hits);
        let _sub_m = dispatcher.subscribe(Topic::Missions, move |_| {
            *counter.lock().unwrap() += 1;
        });

        dispatcher.publish(&robots_update());
        dispatcher.publish(&robots_update());
        dispatcher.publish(&Update::Missions(Vec::new()));

        assert_eq!(*robot_hits.lock().unwrap(), 2);
        assert_eq!(*mission_hits.lock().unwrap(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_block_siblings() {
        let dispatcher = Dispatcher::new();
        let hits = Arc::new(Mutex::new(0u32));

        let _sub_bad = dispatcher.subscribe(Topic::Robots, |_| {
            panic!("subscriber bug");
        });
        let counter = Arc::clone(&hits);
        let _sub_good = dispatcher.subscribe(Topic::Robots, move |_| {
            *counter.lock().unwrap() += 1;
        });

        dispatcher.publish(&robots_update());

        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
