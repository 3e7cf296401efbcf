//! Telegram adapter: bot setup, update conversion, delivery and the handler tree

pub mod bot;
pub mod events;
pub mod handlers;
pub mod transport;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use transport::TeloxideTransport;

/// Bot type used across the adapter
pub type Bot = teloxide::Bot;
