use thiserror::Error;

use crate::storage::snapshot::SnapshotError;

/// Centralized error types for the application
///
/// Most failures inside a conversation are recovered locally (validation,
/// wrong code, failed delivery) and never reach this type. `AppError` is what
/// surfaces at the edges: startup, persistence, and the Telegram adapter.
///
/// # Example
///
/// ```no_run
/// use yukcore::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     log::error!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Snapshot load/save errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Configuration errors (missing token, bad address, ...)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
