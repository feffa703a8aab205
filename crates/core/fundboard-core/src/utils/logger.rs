//! Logging bootstrap

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor `FUNDBOARD_LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Pick the filter directive: `RUST_LOG`, then the fallback level, then `info`
pub fn resolve_log_filter(rust_log: Option<&str>, fallback: Option<&str>) -> String {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|s| !s.is_empty())
    }
    non_blank(rust_log)
        .or_else(|| non_blank(fallback))
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// Initialize the global logging system from the environment
pub fn init_logging() {
    let level = std::env::var("FUNDBOARD_LOG_LEVEL").ok();
    init_logging_with_level(level.as_deref());
}

/// Initialize logging with an explicit fallback level
///
/// `RUST_LOG` still wins when set. Calling this twice is harmless.
pub fn init_logging_with_level(level: Option<&str>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = resolve_log_filter(rust_log.as_deref(), level);
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        eprintln!("Invalid log filter '{}', using '{}'", directive, DEFAULT_LOG_LEVEL);
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
