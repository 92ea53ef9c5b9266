//! Logging initialization
//!
//! Installs a combined logger writing to the terminal and to a log file.

use anyhow::Result;
use simplelog::*;
use std::fs::{File, OpenOptions};

/// Initialize logger for both console and file output
///
/// The log file is opened in append mode so restarts keep earlier history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the log file or a logger is already installed
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = open_log_file(log_file_path)?;

    let config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Opens (or creates) the log file for appending.
fn open_log_file(log_file_path: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))
}
