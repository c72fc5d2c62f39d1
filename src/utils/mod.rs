//! Utility functions and helpers
//!
//! This module contains the clock abstraction and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write_with, cleanup_temp_file, temp_path_for, AtomicError, AtomicResult};
pub use time::{format_instant, parse_instant, Clock, FixedClock, IncrementingClock, SystemClock};
