//! Shared application state

use std::sync::Arc;

use super::auth::{BasicAuth, SharedBasicAuth};
use crate::event_store::SharedEventStore;

/// State shared by every request handler
pub struct AppState {
    /// The event store
    pub store: SharedEventStore,
    /// Credential check run before routing
    pub auth: SharedBasicAuth,
}

impl AppState {
    pub fn new(store: SharedEventStore, auth: BasicAuth) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
        }
    }
}
