//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the sync tool:
//! - Logging and tracing infrastructure
//! - Run configuration with fail-fast validation
//!
//! Every other crate logs through `tracing` and reads its settings from
//! [`config::AppConfig`]; only the binary calls [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, AppConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
