//! Event store adapter.
//!
//! [`EventStore`] is the narrow seam to the persistence engine: named
//! collections of JSON records plus a small kv surface for derived state.
//! [`WellnessStore`] layers typed access on top and broadcasts a change
//! notification after every collection write.
//!
//! Absence of a collection is a normal state (new user), and a collection
//! that fails to parse degrades to empty with a logged diagnostic --
//! analytics must never block on storage damage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::model::{GuidedSessionRecord, HabitRecord, JournalRecord, MoodRecord};
use crate::notify::ChangeHub;

/// Typed read/write access to named collections of records.
///
/// `read` returning `None` means the collection does not exist yet, which
/// callers treat identically to an empty collection.
pub trait EventStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Monotonic per-collection revision, bumped on every write.
    /// Collections never written have revision 0.
    fn revision(&self, key: &str) -> Result<u64, StoreError>;
    /// Derived/engine state (streak aggregates, the persisted driver).
    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Deterministic per-user collection keys.
///
/// Every collection, mood included, is user-scoped; these functions are the
/// only place keys are built.
pub mod collection {
    pub fn mood(user: &str) -> String {
        format!("mood:{user}")
    }

    pub fn journal(user: &str) -> String {
        format!("journal:{user}")
    }

    pub fn habits(user: &str) -> String {
        format!("habits:{user}")
    }

    pub fn sessions(user: &str) -> String {
        format!("sessions:{user}")
    }

    /// All four collection keys for one user, for poller registration.
    pub fn all(user: &str) -> Vec<String> {
        vec![mood(user), journal(user), habits(user), sessions(user)]
    }
}

/// In-process store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    collections: RefCell<HashMap<String, (String, u64)>>,
    kv: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.collections.borrow().get(key).map(|(v, _)| v.clone()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.collections.borrow_mut();
        let rev = map.get(key).map(|(_, r)| *r).unwrap_or(0) + 1;
        map.insert(key.to_string(), (value.to_string(), rev));
        Ok(())
    }

    fn revision(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.collections.borrow().get(key).map(|(_, r)| *r).unwrap_or(0))
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.kv.borrow().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed adapter over an [`EventStore`] plus the change hub.
///
/// All writes go through here so that every mutation publishes its
/// collection key.
pub struct WellnessStore {
    store: Box<dyn EventStore>,
    hub: Rc<ChangeHub>,
}

impl WellnessStore {
    pub fn new(store: Box<dyn EventStore>, hub: Rc<ChangeHub>) -> Self {
        Self { store, hub }
    }

    pub fn hub(&self) -> &Rc<ChangeHub> {
        &self.hub
    }

    pub fn inner(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    /// Read a collection, degrading to empty on absence or damage.
    pub fn read_records<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("failed to read collection '{key}': {e}; treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("collection '{key}' is malformed: {e}; treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace a collection and publish the change.
    pub fn write_records<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.store.write(key, &json)?;
        self.hub.publish(key);
        Ok(())
    }

    // ── Typed collections ────────────────────────────────────────────

    pub fn moods(&self, user: &str) -> Vec<MoodRecord> {
        self.read_records(&collection::mood(user))
    }

    /// Upsert today's mood: a second log on the same calendar day replaces
    /// the earlier record instead of appending.
    pub fn log_mood(&self, user: &str, record: MoodRecord) -> Result<(), StoreError> {
        let day = record.timestamp.date_naive();
        let mut moods = self.moods(user);
        if let Some(existing) = moods.iter_mut().find(|m| m.timestamp.date_naive() == day) {
            *existing = record;
        } else {
            moods.push(record);
        }
        self.write_records(&collection::mood(user), &moods)
    }

    pub fn journals(&self, user: &str) -> Vec<JournalRecord> {
        self.read_records(&collection::journal(user))
    }

    pub fn add_journal(&self, user: &str, record: JournalRecord) -> Result<(), StoreError> {
        let mut entries = self.journals(user);
        entries.push(record);
        self.write_records(&collection::journal(user), &entries)
    }

    pub fn habits(&self, user: &str) -> Vec<HabitRecord> {
        self.read_records(&collection::habits(user))
    }

    /// Record one calendar day's status for a habit. Logging the same habit
    /// twice on the same day mutates the existing record (undo is a record
    /// mutation, not a delete event).
    pub fn log_habit(&self, user: &str, record: HabitRecord) -> Result<(), StoreError> {
        let day = record.timestamp.date_naive();
        let mut habits = self.habits(user);
        if let Some(existing) = habits
            .iter_mut()
            .find(|h| h.habit_name == record.habit_name && h.timestamp.date_naive() == day)
        {
            *existing = record;
        } else {
            habits.push(record);
        }
        self.write_records(&collection::habits(user), &habits)
    }

    pub fn sessions(&self, user: &str) -> Vec<GuidedSessionRecord> {
        self.read_records(&collection::sessions(user))
    }

    pub fn append_session(&self, user: &str, record: GuidedSessionRecord) -> Result<(), StoreError> {
        let mut sessions = self.sessions(user);
        sessions.push(record);
        self.write_records(&collection::sessions(user), &sessions)
    }

    /// Sessions whose timestamp falls within the half-open window
    /// `[start, end)`.
    pub fn sessions_between(
        &self,
        user: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<GuidedSessionRecord> {
        self.sessions(user)
            .into_iter()
            .filter(|s| s.timestamp >= start && s.timestamp < end)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoodValue;
    use chrono::TimeZone;

    fn store() -> WellnessStore {
        WellnessStore::new(Box::new(MemoryStore::new()), Rc::new(ChangeHub::new()))
    }

    #[test]
    fn missing_collection_reads_empty() {
        let store = store();
        assert!(store.moods("nobody").is_empty());
        assert!(store.sessions("nobody").is_empty());
    }

    #[test]
    fn malformed_collection_degrades_to_empty() {
        let store = store();
        store.inner().write(&collection::mood("alice"), "not json").unwrap();
        assert!(store.moods("alice").is_empty());
    }

    #[test]
    fn mood_upserts_on_same_day() {
        let store = store();
        let morning = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap();

        store
            .log_mood("alice", MoodRecord::new(morning, MoodValue::Okay, None))
            .unwrap();
        store
            .log_mood("alice", MoodRecord::new(evening, MoodValue::Good, None))
            .unwrap();

        let moods = store.moods("alice");
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].value, MoodValue::Good);
    }

    #[test]
    fn mood_appends_on_new_day() {
        let store = store();
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2026, 3, 3, 8, 0, 0).unwrap();

        store
            .log_mood("alice", MoodRecord::new(monday, MoodValue::Okay, None))
            .unwrap();
        store
            .log_mood("alice", MoodRecord::new(tuesday, MoodValue::Good, None))
            .unwrap();
        assert_eq!(store.moods("alice").len(), 2);
    }

    #[test]
    fn habit_same_day_mutates_in_place() {
        let store = store();
        let noon = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

        store
            .log_habit("alice", HabitRecord::new(noon, "meditate", true, 5))
            .unwrap();
        // Un-toggle.
        store
            .log_habit("alice", HabitRecord::new(noon, "meditate", false, 5))
            .unwrap();

        let habits = store.habits("alice");
        assert_eq!(habits.len(), 1);
        assert!(!habits[0].completed);
    }

    #[test]
    fn writes_publish_collection_key() {
        let hub = Rc::new(ChangeHub::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        hub.subscribe(move |key| seen_clone.borrow_mut().push(key.to_string()));

        let store = WellnessStore::new(Box::new(MemoryStore::new()), Rc::clone(&hub));
        store
            .log_mood("alice", MoodRecord::new(Utc::now(), MoodValue::Good, None))
            .unwrap();

        assert_eq!(seen.borrow().as_slice(), [collection::mood("alice")]);
    }

    #[test]
    fn sessions_between_is_half_open() {
        use crate::model::{ExerciseType, GuidedSessionRecord};

        let store = store();
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();
        for ts in [start - chrono::Duration::seconds(1), start, end - chrono::Duration::seconds(1), end] {
            store
                .append_session(
                    "alice",
                    GuidedSessionRecord::new(ts, "box-breathing", ExerciseType::Breathing, 5),
                )
                .unwrap();
        }

        let inside = store.sessions_between("alice", start, end);
        assert_eq!(inside.len(), 2);
        assert!(inside.iter().all(|s| s.timestamp >= start && s.timestamp < end));
    }

    #[test]
    fn collections_are_user_scoped() {
        let store = store();
        store
            .log_mood("alice", MoodRecord::new(Utc::now(), MoodValue::Good, None))
            .unwrap();
        assert!(store.moods("bob").is_empty());
    }
}
