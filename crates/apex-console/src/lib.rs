//! Apex incident console
//!
//! Command implementations behind the `apex-console` binary.

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;

pub use config::ConsoleConfig;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
