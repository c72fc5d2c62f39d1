//! Event Store - timestamp-ordered, append-only event collection
//!
//! Events live in an arena (`Vec<Event>`) in append order. A sorted index maps
//! each exact timestamp to its bucket: the arena positions of the events
//! sharing that timestamp, in insertion order. Walking the index therefore
//! yields events by non-decreasing timestamp, ties broken by append order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::record;
use crate::types::Event;
use crate::utils::atomic::{atomic_write_with, cleanup_temp_file, AtomicError};
use crate::utils::time::Clock;

/// Default name of the backing file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = ".eventstore";

/// Configuration for the EventStore
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Path to the flat file holding one record per event
    pub data_file: PathBuf,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl EventStoreConfig {
    /// Create config with a custom data file
    pub fn new<P: AsRef<Path>>(data_file: P) -> Self {
        Self {
            data_file: data_file.as_ref().to_path_buf(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Result type for EventStore operations
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Errors that can occur in EventStore operations
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid data file: {0}")]
    InvalidDataFile(String),
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("Invalid timestamp at line {line}: {value:?}")]
    InvalidTimestamp { line: usize, value: String },
}

impl From<AtomicError> for EventStoreError {
    fn from(e: AtomicError) -> Self {
        match e {
            AtomicError::Io(e) => EventStoreError::Io(e),
            AtomicError::NotAFile(path) => EventStoreError::InvalidDataFile(path),
        }
    }
}

/// The EventStore owns every event and keeps them in timestamp order
pub struct EventStore {
    config: EventStoreConfig,
    clock: Arc<dyn Clock>,
    /// Arena of events, in append order
    events: Vec<Event>,
    /// Timestamp -> arena positions sharing that timestamp
    index: BTreeMap<DateTime<Utc>, Vec<usize>>,
}

impl EventStore {
    /// Create an empty store with the default config
    ///
    /// Nothing is read from disk; see [`EventStore::open`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(EventStoreConfig::default(), clock)
    }

    /// Create an empty store with custom config
    pub fn with_config(config: EventStoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            events: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Open the store, rehydrating it from the configured data file
    ///
    /// A missing file is an empty store. Any other read failure, and any
    /// malformed record, is returned as an error.
    pub fn open(config: EventStoreConfig, clock: Arc<dyn Clock>) -> EventStoreResult<Self> {
        let data_file = config.data_file.clone();
        let mut store = Self::with_config(config, clock);

        if cleanup_temp_file(&data_file)? {
            warn!(path = %data_file.display(), "removed leftover temp file from an interrupted write");
        }

        let file = match File::open(&data_file) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %data_file.display(), "no data file, starting with an empty event store");
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        let loaded = store.load(BufReader::new(file))?;
        info!(path = %data_file.display(), events = loaded, "loaded event store");

        Ok(store)
    }

    pub fn config(&self) -> &EventStoreConfig {
        &self.config
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append a new event stamped with the clock's current instant
    ///
    /// Returns a copy of the stored event.
    pub fn append(&mut self, event_type: &str, payload: &str) -> Event {
        let event = Event::new(self.clock.now(), event_type, payload);
        self.insert(event.clone());
        event
    }

    /// All events, by timestamp then append order
    pub fn all_events(&self) -> Vec<Event> {
        self.ordered().cloned().collect()
    }

    /// Events whose type equals `event_type` exactly
    pub fn events_of_type(&self, event_type: &str) -> Vec<Event> {
        self.ordered()
            .filter(|event| event.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Events stamped at or after `from`
    pub fn events_from(&self, from: DateTime<Utc>) -> Vec<Event> {
        self.index
            .range(from..)
            .flat_map(|(_, bucket)| bucket.iter())
            .map(|&position| &self.events[position])
            .cloned()
            .collect()
    }

    /// Read records from `source` and merge them into the store
    ///
    /// Records are inserted in file order, so events sharing a timestamp keep
    /// the order they were written in. Blank lines are ignored. Returns the
    /// number of events read.
    pub fn load<R: BufRead>(&mut self, source: R) -> EventStoreResult<usize> {
        let mut loaded = 0;

        // Split on '\n' only so a payload ending in '\r' is kept intact
        for (line_idx, line_result) in source.split(b'\n').enumerate() {
            let line_number = line_idx + 1;
            let line = String::from_utf8(line_result?).map_err(|_| {
                EventStoreError::MalformedRecord {
                    line: line_number,
                    reason: "invalid UTF-8".to_string(),
                }
            })?;

            if line.is_empty() {
                continue;
            }

            self.insert(record::decode(&line, line_number)?);
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Write every event to `sink`, one record per line, in timestamp order
    pub fn persist_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for event in self.ordered() {
            writeln!(sink, "{}", record::encode(event))?;
        }
        sink.flush()
    }

    /// Replace the data file with a full snapshot of the store
    pub fn persist(&self) -> EventStoreResult<()> {
        atomic_write_with(&self.config.data_file, |out| self.persist_to(out))?;
        debug!(path = %self.config.data_file.display(), events = self.len(), "persisted event store");
        Ok(())
    }

    /// Undo the most recent [`EventStore::append`]
    ///
    /// Only used to back out an append whose persist failed.
    pub(crate) fn rollback_last(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        let position = self.events.len();

        if let Some(bucket) = self.index.get_mut(&event.timestamp()) {
            bucket.retain(|&p| p != position);
            if bucket.is_empty() {
                self.index.remove(&event.timestamp());
            }
        }

        Some(event)
    }

    fn insert(&mut self, event: Event) {
        let position = self.events.len();
        self.index
            .entry(event.timestamp())
            .or_default()
            .push(position);
        self.events.push(event);
    }

    fn ordered(&self) -> impl Iterator<Item = &Event> {
        self.index
            .values()
            .flat_map(|bucket| bucket.iter())
            .map(|&position| &self.events[position])
    }
}
