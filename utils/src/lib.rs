//! Shared utilities for the Verity engine.

pub mod logging;

pub use logging::{init_tracing, LogConfig, LogFormat, LoggingError};
