//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use yukcore::config;
use yukcore::{AppError, AppResult};
use yukcore::BotCommand;

use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Buyruqlar:")]
pub enum Command {
    #[command(description = "botni ishga tushirish")]
    Start,
    #[command(description = "tilni o'zgartirish")]
    Lang,
    #[command(description = "admin paneli")]
    Admin,
}

impl From<Command> for BotCommand {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => BotCommand::Start,
            Command::Lang => BotCommand::Lang,
            Command::Admin => BotCommand::Admin,
        }
    }
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(AppError::Config)` - Missing token, invalid URL or HTTP client failure
pub fn create_bot() -> AppResult<Bot> {
    build_bot(config::BOT_TOKEN.as_str(), config::BOT_API_URL.as_deref())
}

fn build_bot(token: &str, api_url: Option<&str>) -> AppResult<Bot> {
    if token.is_empty() {
        return Err(AppError::Config("BOT_TOKEN environment variable not set".to_string()));
    }

    let client = ClientBuilder::new()
        .timeout(config::network::timeout())
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
    let bot = Bot::with_client(token, client);

    let bot = match api_url {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url)
                .map_err(|e| AppError::Config(format!("Invalid BOT_API_URL: {}", e)))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(AppError::Telegram)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> AppResult<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
