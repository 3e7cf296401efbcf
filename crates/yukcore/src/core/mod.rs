//! Core utilities, configuration, and common functionality

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use config::FlowSettings;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_startup_configuration};
pub use types::{FileKind, FileRef, Lang, UserId};
