//! Event Store Module
//!
//! - `EventStore`: the timestamp-ordered collection of events, with load and
//!   persist against the flat data file
//! - `SharedEventStore`: the lock-guarded handle the HTTP layer talks to
//! - `record`: the one-line-per-event on-disk format
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐    ┌────────────────┐    ┌───────────────────┐
//! │ POST     │───►│ append to      │───►│ rewrite data file │
//! │ /events/t│    │ timestamp index│    │ (tmp + rename)    │
//! └──────────┘    └────────────────┘    └───────────────────┘
//!
//! Read Path (Startup):
//! ┌────────────────┐    ┌─────────────────┐
//! │ Read data file │───►│ Rebuild buckets │───► Ready!
//! │ (.eventstore)  │    │ in file order   │
//! └────────────────┘    └─────────────────┘
//! ```

pub mod record;
mod shared;
mod store;

pub use shared::SharedEventStore;
pub use store::{
    EventStore, EventStoreConfig, EventStoreError, EventStoreResult, DEFAULT_DATA_FILE,
};
