// feedview library root.
// Exposes the API client, query cache, view state, and TUI for the binary and tests.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod query;
pub mod state;
pub mod telemetry;
pub mod ui;
