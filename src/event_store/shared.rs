//! Thread-safe handle around the [`EventStore`]
//!
//! One `RwLock` guards the whole store. Writers (append, append + persist)
//! take it exclusively, so concurrent appends never lose an update even when
//! their timestamps collide. Readers share it and get copies, so they never
//! observe a half-applied append. Persisting holds the lock for the whole
//! write to capture a consistent snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::error;

use super::store::{EventStore, EventStoreResult};
use crate::types::Event;

/// Cloneable, concurrency-safe handle to a single [`EventStore`]
#[derive(Clone)]
pub struct SharedEventStore {
    inner: Arc<RwLock<EventStore>>,
}

impl SharedEventStore {
    pub fn new(store: EventStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Append in memory only
    pub fn append(&self, event_type: &str, payload: &str) -> Event {
        self.inner.write().append(event_type, payload)
    }

    /// Append and flush the full store to disk as one committed write
    ///
    /// If persisting fails the append is rolled back before the lock is
    /// released and the error is returned.
    pub fn append_and_persist(&self, event_type: &str, payload: &str) -> EventStoreResult<Event> {
        let mut store = self.inner.write();
        let event = store.append(event_type, payload);

        if let Err(e) = store.persist() {
            error!(error = %e, event_type, "persist failed, rolling back append");
            store.rollback_last();
            return Err(e);
        }

        Ok(event)
    }

    /// Write a snapshot of the current state to the data file
    pub fn persist(&self) -> EventStoreResult<()> {
        self.inner.read().persist()
    }

    pub fn all_events(&self) -> Vec<Event> {
        self.inner.read().all_events()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<Event> {
        self.inner.read().events_of_type(event_type)
    }

    pub fn events_from(&self, from: DateTime<Utc>) -> Vec<Event> {
        self.inner.read().events_from(from)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use crate::utils::time::{FixedClock, IncrementingClock};
    use chrono::TimeZone;
    use std::thread;
    use tempfile::TempDir;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_concurrent_appends_with_colliding_timestamps() {
        let shared = SharedEventStore::new(EventStore::new(Arc::new(FixedClock(start()))));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        shared.append("A", &format!("{}-{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let events = shared.all_events();
        assert_eq!(events.len(), 400);

        // Each thread's own appends keep their relative order within the bucket
        for t in 0..8 {
            let prefix = format!("{}-", t);
            let mine: Vec<_> = events
                .iter()
                .filter(|e| e.payload().starts_with(&prefix))
                .map(|e| e.payload().to_string())
                .collect();
            let expected: Vec<_> = (0..50).map(|i| format!("{}-{}", t, i)).collect();
            assert_eq!(mine, expected);
        }
    }

    #[test]
    fn test_append_and_persist_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = EventStoreConfig::new(temp_dir.path().join(".eventstore"));
        let store = EventStore::with_config(config.clone(), Arc::new(IncrementingClock::new(start())));
        let shared = SharedEventStore::new(store);

        shared.append_and_persist("A", "data").unwrap();

        let content = std::fs::read_to_string(config.data_file()).unwrap();
        assert_eq!(content, "2024-03-01T10:00:00Z,A,data\n");
    }

    #[test]
    fn test_persist_snapshots_in_memory_appends() {
        let temp_dir = TempDir::new().unwrap();
        let config = EventStoreConfig::new(temp_dir.path().join(".eventstore"));
        let store = EventStore::with_config(config.clone(), Arc::new(IncrementingClock::new(start())));
        let shared = SharedEventStore::new(store);

        shared.append("A", "one");
        shared.append("B", "two");
        assert!(!config.data_file().exists());

        shared.persist().unwrap();

        let content = std::fs::read_to_string(config.data_file()).unwrap();
        assert_eq!(
            content,
            "2024-03-01T10:00:00Z,A,one\n2024-03-01T10:00:01Z,B,two\n"
        );
    }

    #[test]
    fn test_failed_persist_rolls_back_append() {
        let temp_dir = TempDir::new().unwrap();
        // A directory squatting on the temp path makes the write fail
        std::fs::create_dir(temp_dir.path().join(".eventstore.tmp")).unwrap();
        let config = EventStoreConfig::new(temp_dir.path().join(".eventstore"));
        let store = EventStore::with_config(config, Arc::new(IncrementingClock::new(start())));
        let shared = SharedEventStore::new(store);

        let result = shared.append_and_persist("A", "data");

        assert!(result.is_err());
        assert!(shared.is_empty());
    }
}
