//! Structured logging for the seismic activity monitoring service
//!
//! Provides context-rich logging with component and region identifiers,
//! timestamps, and severity levels. Supports both console output
//! and file-based logging for long-running service operation.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::QuakeError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = QuakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(QuakeError::ConfigError(format!("unknown log level '{}'", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Loader,
    Cache,
    Swarm,
    Episode,
    Aggregate,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Loader => write!(f, "LOADER"),
            Component::Cache => write!(f, "CACHE"),
            Component::Swarm => write!(f, "SWARM"),
            Component::Episode => write!(f, "EPISODE"),
            Component::Aggregate => write!(f, "AGG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. a feed window with no events in it
    Expected,
    /// Unexpected failure - indicates a broken feed file or configuration
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut guard) = LOGGER.lock() {
            *guard = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: Component, region: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = format_entry(level, component, region, message);
        let region_part = region.map(|r| format!(" [{}]", r)).unwrap_or_default();

        // Console output (stderr, so report JSON on stdout stays clean)
        if self.console_timestamps {
            eprintln!("{}", entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, region_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, region_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// One log line as written to the log file.
pub fn format_entry(level: LogLevel, component: Component, region: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let region_part = region.map(|r| format!(" [{}]", r)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, region_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, component: Component, region: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, region, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, region: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, region, message);
}

/// Log a warning message
pub fn warn(component: Component, region: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, region, message);
}

/// Log an error message
pub fn error(component: Component, region: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, region, message);
}

/// Log a debug message
pub fn debug(component: Component, region: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, region, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an event-load failure.
pub fn classify_load_failure(err: &QuakeError) -> FailureType {
    match err {
        // A feed window with no events is routine during quiet periods.
        QuakeError::EmptyFeed(_) => FailureType::Expected,
        QuakeError::Io(_) | QuakeError::ParseError(_) | QuakeError::ConfigError(_) => {
            FailureType::Unexpected
        }
        QuakeError::LoaderFailed(_) => FailureType::Unknown,
    }
}

/// Log a loader failure with automatic classification
pub fn log_load_failure(operation: &str, err: &QuakeError) {
    let failure_type = classify_load_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Loader, None, &message),
        FailureType::Unexpected => error(Component::Loader, None, &message),
        FailureType::Unknown => warn(Component::Loader, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of a snapshot refresh
pub fn log_refresh_summary(event_count: usize, unknown_region: usize, elapsed_ms: i64) {
    let message = format!(
        "Snapshot refreshed: {} events ({} outside known regions) in {} ms",
        event_count, unknown_region, elapsed_ms
    );
    if event_count == 0 {
        warn(Component::Cache, None, &message);
    } else {
        info(Component::Cache, None, &message);
    }
}

/// Log how many structures an analysis pass produced for a region
pub fn log_analysis_summary(component: Component, region: Option<&str>, input: usize, found: usize) {
    let message = format!("{} events analysed, {} found", input, found);
    debug(component, region, &message);
}
