//! Outbound delivery abstraction
//!
//! The conversation engine and the broadcast dispatcher never talk to Telegram
//! directly. They describe what to send (text, media, keyboards) and hand it to
//! a [`Transport`]. The bot crate implements it on top of teloxide; tests use a
//! recording implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::menu::CallbackAction;
use crate::core::types::{FileRef, UserId};

/// Where a message goes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// A user's private chat
    User(UserId),
    /// A channel, by `@username` or numeric id in string form
    Channel(String),
}

impl From<UserId> for Recipient {
    fn from(user: UserId) -> Self {
        Self::User(user)
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {}", id),
            Self::Channel(name) => write!(f, "channel {}", name),
        }
    }
}

/// Text markup mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

/// A button attached to a message; pressing it produces a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: CallbackAction,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Keyboard attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; each button sends its label back as text
    Reply(Vec<Vec<String>>),
    /// Buttons attached to the message itself
    Inline(Vec<Vec<InlineButton>>),
    /// Removes a previously shown reply keyboard
    Remove,
}

impl Keyboard {
    /// All visible labels, row by row
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Reply(rows) => rows.iter().flatten().cloned().collect(),
            Self::Inline(rows) => rows.iter().flatten().map(|b| b.label.clone()).collect(),
            Self::Remove => Vec::new(),
        }
    }
}

/// Failure to deliver one message to one recipient
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient blocked the bot or deleted the chat
    #[error("recipient unavailable: {0}")]
    Unavailable(String),

    /// Any other API or network failure
    #[error("delivery failed: {0}")]
    Failed(String),
}

#[cfg(feature = "telegram")]
impl From<teloxide::RequestError> for DeliveryError {
    fn from(err: teloxide::RequestError) -> Self {
        use teloxide::{ApiError, RequestError};

        match err {
            RequestError::Api(ApiError::BotBlocked)
            | RequestError::Api(ApiError::UserDeactivated)
            | RequestError::Api(ApiError::ChatNotFound) => Self::Unavailable(err.to_string()),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Sends messages on behalf of the bot.
///
/// Every call is independent: an error affects only that one recipient.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        to: &Recipient,
        text: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError>;

    async fn send_photo(
        &self,
        to: &Recipient,
        photo: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError>;

    async fn send_video(
        &self,
        to: &Recipient,
        video: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError>;

    async fn send_document(
        &self,
        to: &Recipient,
        document: &FileRef,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError>;
}
