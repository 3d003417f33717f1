//! Command handlers
//!
//! Boundary functions invoked by the front ends (the `daily-log` binary and
//! any embedding UI). Each one works on the shared [`AppState`](crate::AppState)
//! and reports failures as plain strings.

pub mod config;
pub mod entries;
pub mod import;
pub mod reminder;

// Re-export all command functions for easy access
pub use config::*;
pub use entries::*;
pub use import::*;
pub use reminder::*;
