//! Bot API implementation of the core delivery trait

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    ParseMode, Recipient as ChatRecipient, ReplyMarkup,
};

use yukcore::core::types::FileRef;
use yukcore::transport::{DeliveryError, Keyboard, Recipient, TextFormat, Transport};

use crate::telegram::Bot;

/// Sends messages through a teloxide [`Bot`]
#[derive(Clone)]
pub struct TeloxideTransport {
    bot: Bot,
}

impl TeloxideTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Numeric channel ids go by id, anything else by `@username`
pub fn chat_recipient(to: &Recipient) -> ChatRecipient {
    match to {
        Recipient::User(id) => ChatRecipient::Id(ChatId(id.0)),
        Recipient::Channel(channel) => match channel.trim().parse::<i64>() {
            Ok(id) => ChatRecipient::Id(ChatId(id)),
            Err(_) => ChatRecipient::ChannelUsername(channel.trim().to_string()),
        },
    }
}

pub fn reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Reply(rows) => {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::new(label.as_str())).collect::<Vec<_>>());
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
        Keyboard::Inline(rows) => {
            let rows = rows.iter().map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.tag()))
                    .collect::<Vec<_>>()
            });
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

fn input_file(file: &FileRef) -> InputFile {
    InputFile::file_id(FileId(file.as_str().to_string()))
}

#[async_trait]
impl Transport for TeloxideTransport {
    async fn send_text(
        &self,
        to: &Recipient,
        text: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        let mut request = self.bot.send_message(chat_recipient(to), text);
        if format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        to: &Recipient,
        photo: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        let mut request = self.bot.send_photo(chat_recipient(to), input_file(photo));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_video(
        &self,
        to: &Recipient,
        video: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        let mut request = self.bot.send_video(chat_recipient(to), input_file(video));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_document(
        &self,
        to: &Recipient,
        document: &FileRef,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let mut request = self.bot.send_document(chat_recipient(to), input_file(document));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        request.await?;
        Ok(())
    }
}
