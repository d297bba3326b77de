//! Database module for HostPulse.
//!
//! Provides SQLite storage for host records and the event sink.

mod models;
mod store;

pub use models::*;
pub use store::*;
