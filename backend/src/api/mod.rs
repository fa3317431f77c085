//! HTTP API module.
//!
//! This module provides the HTTP server, API types and the log stream
//! for the pool configuration backend.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, start_server, AppState, SharedState};
pub use types::*;
pub use logs::*;
