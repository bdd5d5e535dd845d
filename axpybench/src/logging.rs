use std::env;
use std::fmt::Arguments;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Console verbosity selected through `AXPYBENCH_TRACE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Basic,
    Full,
}

const LOG_ENV: &str = "AXPYBENCH_TRACE";

const COLOR_WARNING: &str = "33";
const COLOR_ERROR: &str = "91";
const COLOR_CRITICAL: &str = "31";
const COLOR_TRACE: &str = "34";

static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Parse a log level value; anything unrecognized disables logging.
pub fn parse_log_level(value: &str) -> LogLevel {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "basic" => LogLevel::Basic,
        "full" => LogLevel::Full,
        _ => LogLevel::Off,
    }
}

pub fn log_level() -> LogLevel {
    *LOG_LEVEL.get_or_init(|| {
        env::var(LOG_ENV)
            .ok()
            .as_deref()
            .map(parse_log_level)
            .unwrap_or(LogLevel::Off)
    })
}

pub(crate) fn full_enabled() -> bool {
    matches!(log_level(), LogLevel::Full)
}

fn basic_enabled() -> bool {
    matches!(log_level(), LogLevel::Full | LogLevel::Basic)
}

fn timestamp_hms() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        % 86_400;
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn emit(kind: &str, color: &str, args: Arguments) {
    let ts = timestamp_hms();
    if color.is_empty() {
        eprintln!("{ts} [{kind}] -- {args}");
    } else {
        eprintln!("{ts} [\u{001b}[{color}m{kind}\u{001b}[0m] -- {args}");
    }
}

/// Emit a warning message when the log level allows it.
pub fn emit_warning(args: Arguments) {
    if basic_enabled() {
        emit("WARNING", COLOR_WARNING, args);
    }
}

/// Emit an error message when the log level allows it.
pub fn emit_error(args: Arguments) {
    if basic_enabled() {
        emit("ERROR", COLOR_ERROR, args);
    }
}

/// Emit a critical message unconditionally.
pub fn emit_critical(args: Arguments) {
    emit("CRITICAL", COLOR_CRITICAL, args);
}

/// Emit a trace message at full verbosity.
pub fn emit_trace(args: Arguments) {
    if full_enabled() {
        emit("TRACE", COLOR_TRACE, args);
    }
}

/// Emit a warning message via the logging subsystem.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::logging::emit_warning(format_args!($($arg)*))
    };
}

/// Emit an error message via the logging subsystem.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logging::emit_error(format_args!($($arg)*))
    };
}

/// Emit a critical message via the logging subsystem.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)*) => {
        $crate::logging::emit_critical(format_args!($($arg)*))
    };
}

/// Emit a trace message via the logging subsystem.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::logging::emit_trace(format_args!($($arg)*))
    };
}

/// Emit a raw console line using `println!`.
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!($($arg)*)
    };
}
