//! Shared utilities.
//!
//! This module provides:
//! - Timestamp formatting and duration serialization
//! - Filesystem-safe naming helpers

mod naming;
mod timestamps;

pub use naming::sanitize_component;
pub use timestamps::{duration_millis, iso_timestamp, Timestamp};
