//! Data types for the event log

mod event;

pub use event::Event;
