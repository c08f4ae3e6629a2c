//! Shared runtime plumbing for the userdir binaries: layered
//! configuration loading and tracing/logging initialization.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingSection, ServerConfig};
