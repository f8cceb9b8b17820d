//! Logger factory.
//!
//! A [`Logger`] owns its own `tracing` dispatch, so building one never touches
//! the process-wide subscriber. Output is either pino-compatible JSON lines or
//! the human-readable `tracing-subscriber` format, and error events can be
//! forwarded to a Sentry DSN.

mod fields;
mod format;
mod sentry;

pub use sentry::Dsn;

use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::dispatcher::{self, Dispatch, SetGlobalDefaultError};
use tracing::level_filters::LevelFilter;
use tracing::{Level, event};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::Env;
use format::PinoJsonFormat;
use sentry::ErrorReportLayer;

/// Event field carrying the logger's scope name.
pub(crate) const NAME_FIELD: &str = "logger";

/// Logger construction error.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid SENTRY_DSN: {0}")]
    InvalidDsn(String),
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Settings the logger factory consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Level name, see [`level_filter`].
    pub level: String,
    /// Output format; `None` means pretty.
    pub format: Option<LogFormat>,
    /// Render the level as its name instead of pino's number (JSON only).
    pub level_in_string: bool,
    /// JSON key holding the log message.
    pub message_key: String,
    /// Sentry DSN error events are reported to.
    pub sentry_dsn: Option<String>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: None,
            level_in_string: false,
            message_key: "msg".to_string(),
            sentry_dsn: None,
        }
    }
}

impl LogOptions {
    /// Reads logger settings from an environment that already carries the defaults.
    ///
    /// `level` wins over `LOG_LEVEL` when given.
    pub fn from_env(env: &Env, level: Option<&str>) -> Self {
        let defaults = LogOptions::default();
        Self {
            level: level
                .or_else(|| env.get("LOG_LEVEL"))
                .map(str::to_string)
                .unwrap_or(defaults.level),
            format: env.get("LOG_FORMAT").and_then(LogFormat::parse),
            level_in_string: env.get("LOG_LEVEL_IN_STRING") == Some("true"),
            message_key: env
                .get("LOG_MESSAGE_KEY")
                .map(str::to_string)
                .unwrap_or(defaults.message_key),
            sentry_dsn: env.non_empty("SENTRY_DSN").map(str::to_string),
        }
    }
}

/// Maps a level name to a filter. Unknown names fall back to info.
pub fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" | "fatal" => LevelFilter::ERROR,
        "silent" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Scoped logger. Children share the parent's output and differ only in name.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    options: Arc<LogOptions>,
    name: Option<String>,
}

impl Logger {
    /// Creates a logger writing to stdout.
    pub fn new(options: LogOptions) -> Result<Self, LogError> {
        Self::with_writer(options, io::stdout)
    }

    /// Creates a stdout logger that never reports errors, whatever `sentry_dsn` says.
    pub fn without_reporting(options: LogOptions) -> Self {
        Self::assemble(options, io::stdout, None)
    }

    /// Creates a logger writing through `writer`.
    pub fn with_writer<W>(options: LogOptions, writer: W) -> Result<Self, LogError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let reporter = match options.sentry_dsn.as_deref() {
            Some(dsn) => ErrorReportLayer::spawn(Dsn::parse(dsn)?)?,
            None => None,
        };
        let reporting_skipped = options.sentry_dsn.is_some() && reporter.is_none();

        let logger = Self::assemble(options, writer, reporter);
        if reporting_skipped {
            logger.warn("SENTRY_DSN is set but no async runtime is running, error reporting disabled");
        }

        Ok(logger)
    }

    fn assemble<W>(options: LogOptions, writer: W, reporter: Option<ErrorReportLayer>) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let output: Box<dyn Layer<Registry> + Send + Sync> = match options.format.unwrap_or_default() {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .event_format(PinoJsonFormat::new(
                    options.message_key.clone(),
                    options.level_in_string,
                ))
                .with_writer(writer)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(writer)
                .boxed(),
        };
        let filter = EnvFilter::new(level_filter(&options.level).to_string());

        let subscriber = tracing_subscriber::registry()
            .with(output)
            .with(reporter)
            .with(filter);

        Self {
            dispatch: Dispatch::new(subscriber),
            options: Arc::new(options),
            name: None,
        }
    }

    /// Returns a logger with the same output, tagged `name`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            options: Arc::clone(&self.options),
            name: Some(name.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `f` with this logger as the default, so plain `tracing` macros use it.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Makes this logger the process-wide default. Only the first call succeeds.
    pub fn install_global(&self) -> Result<(), SetGlobalDefaultError> {
        dispatcher::set_global_default(self.dispatch.clone())
    }

    /// Log a message at the given level.
    pub fn log(&self, level: Level, message: &str) {
        let name = self.name.as_deref();

        macro_rules! emit {
            ($lvl:expr) => {
                match name {
                    Some(name) => event!($lvl, logger = name, "{}", message),
                    None => event!($lvl, "{}", message),
                }
            };
        }

        self.in_scope(|| match level {
            Level::TRACE => emit!(Level::TRACE),
            Level::DEBUG => emit!(Level::DEBUG),
            Level::INFO => emit!(Level::INFO),
            Level::WARN => emit!(Level::WARN),
            _ => emit!(Level::ERROR),
        });
    }

    pub fn trace(&self, msg: &str) {
        self.log(Level::TRACE, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::DEBUG, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::INFO, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::WARN, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::ERROR, msg);
    }

    /// Fatal has no tracing level of its own; it is logged as an error.
    pub fn fatal(&self, msg: &str) {
        self.log(Level::ERROR, msg);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
