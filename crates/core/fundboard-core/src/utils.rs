//! Utility functions and helpers

pub mod logger;

pub use self::logger::{init_logging, init_logging_with_level, resolve_log_filter};
