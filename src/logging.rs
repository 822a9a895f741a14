//! Structured logging setup.
//!
//! `tracing` with `tracing-subscriber`, filtered through `PROMOCAST_LOG`
//! (or `RUST_LOG`) and formatted per `PROMOCAST_LOG_FORMAT`:
//!
//! ```bash
//! # Debug logging for promocast, warn for everything else
//! PROMOCAST_LOG=promocast=debug,warn promocast run summer_sale
//!
//! # Single-line JSON for scheduled unattended runs
//! PROMOCAST_LOG_FORMAT=json promocast run summer_sale
//! ```

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "promocast=info,warn";

/// Record encoding selected by `PROMOCAST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, for a human at a terminal
    #[default]
    Pretty,
    /// One record per line
    Compact,
    /// JSON lines for collectors
    Json,
}

impl LogFormat {
    /// Case-insensitive token lookup; anything unrecognised means pretty.
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("json") {
            Self::Json
        } else if token.eq_ignore_ascii_case("compact") {
            Self::Compact
        } else {
            Self::Pretty
        }
    }
}

/// Subscriber settings assembled before [`init`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Env-filter directives, e.g. "promocast=debug,warn"
    pub filter: String,
    /// Record encoding for the fmt layer
    pub format: LogFormat,
    /// Annotate records with the file and line of the call site
    pub call_sites: bool,
    /// Annotate records with the emitting module path
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.into(),
            format: LogFormat::default(),
            call_sites: false,
            targets: true,
        }
    }
}

impl LogConfig {
    /// Read `PROMOCAST_LOG` / `RUST_LOG` and `PROMOCAST_LOG_FORMAT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(directives) =
            std::env::var("PROMOCAST_LOG").or_else(|_| std::env::var("RUST_LOG"))
        {
            config.filter = directives;
        }
        if let Ok(token) = std::env::var("PROMOCAST_LOG_FORMAT") {
            config.format = LogFormat::parse(&token);
        }
        config
    }

    /// Preset behind `--verbose`: debug-level records with call-site locations.
    pub fn debug() -> Self {
        Self {
            filter: "promocast=debug,info".into(),
            call_sites: true,
            ..Self::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup; later calls are ignored.
pub fn init(config: LogConfig) {
    let env_filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer = fmt::layer()
        .with_file(config.call_sites)
        .with_line_number(config.call_sites)
        .with_target(config.targets);

    let registry = tracing_subscriber::registry().with(env_filter);
    let _ = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(registry.with(layer.json())),
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(registry.with(layer.compact()))
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(registry.with(layer.pretty())),
    };
}

/// [`init`] with environment-based configuration.
pub fn init_from_env() {
    init(LogConfig::from_env());
}
