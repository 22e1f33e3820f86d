//! Change notification channel.
//!
//! Writes through the event store adapter broadcast the changed collection
//! key so every open view recomputes from the same logs. Subscribers get
//! the key only, never a payload: a notification means "recompute", and
//! because every consumer recomputes pure derived state, duplicate
//! notifications are idempotent no-ops.
//!
//! [`RevisionPoller`] is the fixed-interval fallback for writes that bypass
//! the in-process hub (another process sharing the database). It compares
//! stored per-collection revisions against the last ones it saw and
//! publishes on movement, so running it concurrently with hub-triggered
//! recomputation cannot double-count: a revision moves at most once per
//! write.

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;

use crate::storage::store::EventStore;

type Handler = Box<dyn Fn(&str)>;

/// Single-threaded publish/subscribe hub keyed by collection name.
#[derive(Default)]
pub struct ChangeHub {
    subscribers: RefCell<Vec<Handler>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler invoked with the collection key on every publish.
    pub fn subscribe(&self, handler: impl Fn(&str) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(handler));
    }

    /// Broadcast a collection change to every subscriber.
    pub fn publish(&self, collection_key: &str) {
        for handler in self.subscribers.borrow().iter() {
            handler(collection_key);
        }
    }
}

/// Polling fallback: detects collection writes that did not pass through
/// this process's hub by watching stored revision counters.
pub struct RevisionPoller {
    watched: Vec<String>,
    last_seen: RefCell<HashMap<String, u64>>,
}

impl RevisionPoller {
    pub fn new(watched: Vec<String>) -> Self {
        Self {
            watched,
            last_seen: RefCell::new(HashMap::new()),
        }
    }

    /// Prime the baseline without publishing, so pre-existing data does not
    /// fire a spurious notification on the first poll.
    pub fn prime(&self, store: &dyn EventStore) {
        let mut seen = self.last_seen.borrow_mut();
        for key in &self.watched {
            let rev = store.revision(key).unwrap_or(0);
            seen.insert(key.clone(), rev);
        }
    }

    /// Compare stored revisions against the last observed ones and publish
    /// every key that moved. Returns the changed keys.
    pub fn poll(&self, store: &dyn EventStore, hub: &ChangeHub) -> Vec<String> {
        let mut changed = Vec::new();
        let mut seen = self.last_seen.borrow_mut();
        for key in &self.watched {
            // A read failure here is not a change; skip and retry next poll.
            let rev = match store.revision(key) {
                Ok(rev) => rev,
                Err(e) => {
                    debug!("revision poll for '{key}' failed: {e}");
                    continue;
                }
            };
            let last = seen.get(key).copied().unwrap_or(0);
            if rev != last {
                seen.insert(key.clone(), rev);
                changed.push(key.clone());
            }
        }
        for key in &changed {
            hub.publish(key);
        }
        changed
    }
}
