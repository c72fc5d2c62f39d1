//! Event Log Server
//!
//! An append-only event log over HTTP: clients append typed, timestamped
//! events and query them by type or by a starting instant.
//!
//! # Modules
//!
//! - `codec`: JSON string escaping of the seven special characters
//! - `types`: The immutable `Event` record
//! - `event_store`: Timestamp-ordered store, flat-file persistence, locking
//! - `api`: Axum router, Basic authentication, JSON rendering
//! - `config`: Environment-based server configuration
//! - `utils`: Clock abstraction and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use event_log::{EventStore, EventStoreConfig, SharedEventStore, SystemClock};
//!
//! let store = EventStore::open(EventStoreConfig::default(), Arc::new(SystemClock)).unwrap();
//! let shared = SharedEventStore::new(store);
//!
//! shared.append_and_persist("com.example.userCreated", "{\"id\": 1}").unwrap();
//! assert_eq!(shared.events_of_type("com.example.userCreated").len(), 1);
//! ```

pub mod api;
pub mod codec;
pub mod config;
pub mod event_store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::ServerConfig;
pub use event_store::{EventStore, EventStoreConfig, EventStoreError, SharedEventStore};
pub use types::Event;
pub use utils::time::{Clock, FixedClock, IncrementingClock, SystemClock};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
