//! Structured logging setup using the `tracing` ecosystem.
//!
//! Logs always go to stderr. `-v`/`-q` set this crate's level explicitly;
//! without them `RUST_LOG` decides, and without either the level is INFO.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for this crate's own events, when given on the command line
    pub level: Option<Level>,
    /// One JSON object per line instead of human-readable output
    pub use_json: bool,
}

impl LoggingConfig {
    /// Level from the `-v`/`-q` flags: quiet wins over verbose.
    pub fn from_flags(verbose: bool, quiet: bool, use_json: bool) -> Self {
        let level = if quiet {
            Some(Level::WARN)
        } else if verbose {
            Some(Level::DEBUG)
        } else {
            None
        };
        Self { level, use_json }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty());
        let filter = build_filter(config.level, rust_log.as_deref());

        let registry = tracing_subscriber::registry().with(filter);
        if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    });
}

/// Filter from the command-line level and the `RUST_LOG` value.
///
/// An explicit level overrides any `nanosdoc=` directive from `RUST_LOG`;
/// other `RUST_LOG` directives are kept.
fn build_filter(level: Option<Level>, rust_log: Option<&str>) -> EnvFilter {
    let mut filter = match rust_log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("ureq=warn"),
    };

    let crate_level = match (level, rust_log) {
        (Some(level), _) => Some(level),
        (None, None) => Some(Level::INFO),
        (None, Some(_)) => None,
    };
    if let Some(level) = crate_level {
        if let Ok(directive) = format!("nanosdoc={}", level).parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
