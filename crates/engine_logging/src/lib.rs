#![deny(missing_docs)]
//! Shared logging utilities for the expander workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the label of the derived query currently being worked on,
//! so a long log of a multi-day session stays readable.

use std::sync::RwLock;

/// Process-wide label of the active derived query. Empty between queries.
static QUERY_LABEL: RwLock<String> = RwLock::new(String::new());

/// Sets the label of the derived query being processed, e.g. `q3/12`.
/// This should be called by the scheduler whenever it starts a query.
pub fn set_query_label(label: impl Into<String>) {
    if let Ok(mut guard) = QUERY_LABEL.write() {
        *guard = label.into();
    }
}

/// Clears the active query label.
pub fn clear_query_label() {
    if let Ok(mut guard) = QUERY_LABEL.write() {
        guard.clear();
    }
}

/// Returns the prefix inserted in front of every log line: `[label] `,
/// or an empty string when no query is active.
pub fn label_prefix() -> String {
    match QUERY_LABEL.read() {
        Ok(guard) if !guard.is_empty() => format!("[{}] ", guard.as_str()),
        _ => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::label_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::label_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::label_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::label_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::label_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
