//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.

mod schema;
mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
