//! Structured logging for codec entry points
//!
//! Records are written to stderr as
//! `[timestamp] LEVEL [module] message | key=value ...`. Debug records are
//! dropped unless [`enable_debug`] has been called. Byte-valued fields
//! (calldata, topics, log data) are abbreviated so a multi-kilobyte payload
//! does not flood the log.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide debug switch. Only gates log output.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Longest field value printed verbatim
const MAX_FIELD_LEN: usize = 74;

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (long hex payloads are abbreviated)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = abbreviate(&value.to_string());
        self.fields.push((key, value));
        self
    }

    /// Render without emitting; `None` when the entry would be filtered
    pub fn render(&self) -> Option<String> {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return None;
        }

        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");

        Some(if fields_str.is_empty() {
            format!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message)
        } else {
            format!(
                "[{}] {} [{}] {} | {}",
                timestamp, self.level, self.module, self.message, fields_str
            )
        })
    }

    /// Log the entry
    pub fn log(self) {
        if let Some(line) = self.render() {
            eprintln!("{}", line);
        }
    }
}

/// Shorten long hex strings to prefix...suffix with their byte length
fn abbreviate(value: &str) -> String {
    if value.len() <= MAX_FIELD_LEN {
        return value.to_string();
    }

    let is_hex = value.starts_with("0x") && value[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if is_hex {
        let bytes = (value.len() - 2) / 2;
        format!("{}...{} ({} bytes)", &value[..10], &value[value.len() - 8..], bytes)
    } else {
        let mut cut = MAX_FIELD_LEN;
        while !value.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &value[..cut])
    }
}

/// Convenience macro for debug logging.
///
/// Fields are only evaluated when debug logging is enabled, so a field
/// may hex-encode a payload without costing anything in normal operation.
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        if $crate::utils::logging::is_debug_enabled() {
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Debug,
                $module,
                $msg
            ).log()
        }
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        if $crate::utils::logging::is_debug_enabled() {
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::Debug,
                $module,
                $msg
            )
            $(.field(stringify!($key), &$value))*
            .log()
        }
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}
