//! API module for the HTTP boundary
//!
//! Translates requests into event store calls and formats the replies.

pub mod auth;
pub mod http;
pub mod rest;
pub mod state;

pub use auth::BasicAuth;
pub use http::{create_router, serve};
pub use state::AppState;
