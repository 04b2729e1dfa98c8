//! Logging initialization for the query expander.
//!
//! Log lines go to the terminal and are appended to `./expander.log` in the
//! current working directory, so the log of an interrupted session continues
//! across runs.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./expander.log";

/// Installs the terminal logger and, when the log file can be opened, the
/// file logger. Safe to call more than once; later calls are no-ops.
pub fn initialize(level: LevelFilter) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    match open_log_file(Path::new(LOG_FILE)) {
        Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
        Err(err) => eprintln!("Warning: could not open log file {LOG_FILE}: {err}"),
    }

    if CombinedLogger::init(loggers).is_ok() {
        log::info!(
            "==== query-expander {} started ====",
            env!("CARGO_PKG_VERSION")
        );
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("hyper")
        .build()
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
