//! # Logging Utilities
//!
//! Logging infrastructure for Dissector using `tracing`.
//!
//! Two setups are provided:
//! - [`init_logging`] / [`init_logging_with_level`] for the command line tool
//!   (console output, optional file)
//! - [`init_logging_for_tweak`] for the injected library, which has no
//!   console and writes to a dated file instead
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=dissector_core=debug`)
//! - `DISSECTOR_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `DISSECTOR_LOG_FILE`: Optional path to a log file
//!
//! ## Example
//!
//! ```rust,no_run
//! use dissector_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! init_logging_with_level(LogLevel::Debug, LogFormat::Pretty).expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Local;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Directory the injected library logs to on a device.
pub const DEVICE_LOG_DIR: &str = "/var/mobile/Library/Logs/Dissector";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output format of the console and file layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if s.eq_ignore_ascii_case("pretty") || s.eq_ignore_ascii_case("text") {
            Ok(Self::Pretty)
        } else {
            Err(format!("expected 'pretty' or 'json', got '{s}'"))
        }
    }
}

/// Verbosity, mirrors [`tracing::Level`] so the CLI can parse it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel
{
    Error,
    Warn,
    /// Default
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    /// Accepts whatever `tracing` accepts (`warn`, `WARN`, `2`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let level = Level::from_str(s).map_err(|_| format!("expected error, warn, info, debug or trace, got '{s}'"))?;
        Ok(match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            _ => Self::Trace,
        })
    }
}

/// Initialize logging with default settings
///
/// Reads `RUST_LOG`, `DISSECTOR_LOG_FORMAT`, and `DISSECTOR_LOG_FILE`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file
/// directory cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("DISSECTOR_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    init_console(format, Level::INFO, None)
}

/// Initialize logging with explicit level and format
///
/// An explicit level wins over `RUST_LOG`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file
/// directory cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_console(format, level.into(), Some(level.into()))
}

/// Initialize logging for the injected library (file only)
///
/// The file is `DISSECTOR_LOG_FILE` if set, otherwise
/// `/var/mobile/Library/Logs/Dissector/YYYY-MM-DD-dissector.log`, falling
/// back to `/tmp` when that directory cannot be created (sandboxed apps).
///
/// Returns the path being written to.
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_for_tweak(level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let log_file = match env::var("DISSECTOR_LOG_FILE") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => tweak_log_file(Path::new(DEVICE_LOG_DIR)),
    };

    let filter = build_filter(Level::INFO, level.map(Into::into));
    let layers = vec![file_layer(&log_file, LogFormat::Pretty, filter)?];
    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
    Ok(log_file)
}

/// Dated log file inside `dir`, or inside `/tmp` if `dir` is not writable.
fn tweak_log_file(dir: &Path) -> PathBuf
{
    let name = format!("{}-dissector.log", Local::now().format("%Y-%m-%d"));
    if fs::create_dir_all(dir).is_ok() {
        dir.join(name)
    } else {
        env::temp_dir().join(name)
    }
}

/// Priority: explicit level, then `RUST_LOG` (module filters allowed), then the default.
fn build_filter(default_level: Level, explicit_level: Option<Level>) -> EnvFilter
{
    if let Some(level) = explicit_level {
        EnvFilter::new(level.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
    }
}

fn init_console(format: LogFormat, default_level: Level, explicit_level: Option<Level>) -> Result<(), LoggingError>
{
    let filter = || build_filter(default_level, explicit_level);

    let console_layer: BoxedLayer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stderr)
            .with_filter(filter())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_writer(io::stderr)
            .with_filter(filter())
            .boxed(),
    };

    let mut layers = vec![console_layer];
    if let Some(path) = env::var("DISSECTOR_LOG_FILE").ok().filter(|p| !p.is_empty()) {
        layers.push(file_layer(Path::new(&path), format, filter())?);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

fn file_layer(path: &Path, format: LogFormat, filter: EnvFilter) -> Result<BoxedLayer, LoggingError>
{
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;

    // The date is already part of the file name
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    // Logging lives as long as the process; keep the worker running
    std::mem::forget(guard);

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok(layer)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// The log file path has no file name
    #[error("Invalid log file path: {0}")]
    InvalidPath(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_format_names()
    {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("syslog".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_level_names_follow_tracing()
    {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert!(LogLevel::Error < LogLevel::Trace);
    }

    #[test]
    fn test_tweak_log_file_falls_back()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = tweak_log_file(dir.path());
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.to_string_lossy().ends_with("-dissector.log"));

        // A directory under a regular file can never be created
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let path = tweak_log_file(&blocker.join("nested"));
        assert!(path.starts_with(env::temp_dir()));
    }
}
