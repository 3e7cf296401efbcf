//! Yukbot - Telegram front end of the PBS IMPEX bot
//!
//! Turns teloxide updates into `yukcore` events and delivers the resulting
//! actions back through the Bot API.

pub mod cli;
pub mod telegram;
