//! Logging setup shared by the stackhook binaries.
//!
//! Installs a global `tracing` subscriber in one of three output formats
//! (text, JSON, journald) filtered by an `EnvFilter` expression.
mod logger;
pub use logger::*;
