//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the configuration the bot will run with

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// Secrets are never printed: the admin code and token only show whether
/// they were taken from the environment.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN / TELOXIDE_TOKEN: not set");
    } else {
        log::info!("✅ BOT_TOKEN: set");
    }

    if std::env::var("ADMIN_CODE").is_ok() {
        log::info!("✅ ADMIN_CODE: set");
    } else {
        log::warn!("⚠️  ADMIN_CODE: not set, using the built-in default");
    }

    log::info!("Channel: {}", config::CHANNEL_ID.as_str());
    log::info!("Snapshot file: {}", config::DATA_FILE.as_str());
    log::info!("Broadcast pacing: {} ms", *config::broadcast::PACING_MS);
    match *config::storage::DAILY_RETENTION_DAYS {
        0 => log::info!("Daily activity retention: unlimited"),
        days => log::info!("Daily activity retention: {} days", days),
    }
    match config::WEBHOOK_URL.as_deref() {
        Some(url) => log::info!("Webhook URL: {}", url),
        None => log::info!("Webhook URL: not set (long polling only)"),
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
