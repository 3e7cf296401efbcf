//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::events;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first, then plain messages from private chats, then
/// inline button presses.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(message_handler(deps.clone()))
        .branch(callback_handler(deps))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .branch(dptree::entry().filter_command::<Command>().endpoint(
            move |msg: Message, cmd: Command| {
                let deps = deps.clone();
                async move {
                    log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                    deps.process(events::from_command(&msg, cmd)).await;
                    Ok(())
                }
            },
        ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                match events::from_message(&msg) {
                    Some(event) => deps.process(event).await,
                    None => log::debug!("Ignoring unsupported message {} in chat {}", msg.id.0, msg.chat.id),
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the button spinner before doing any work
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::error!("Failed to answer callback query {:?}: {}", q.id, e);
            }

            if let Some(event) = events::from_callback(&q) {
                deps.process(event).await;
            }
            Ok(())
        }
    })
}
