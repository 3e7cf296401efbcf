//! Inbound events, already stripped of transport details

use crate::conversation::menu::CallbackAction;
use crate::core::types::{FileRef, UserId};

/// Slash commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Lang,
    Admin,
}

/// A file sent by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Photo(FileRef),
    Video(FileRef),
    Document { file: FileRef, mime_type: Option<String> },
}

impl Attachment {
    pub fn file(&self) -> &FileRef {
        match self {
            Self::Photo(file) | Self::Video(file) | Self::Document { file, .. } => file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(BotCommand),
    Text(String),
    Attachment(Attachment),
    Callback(CallbackAction),
}

/// One thing a user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user: UserId,
    /// Public username without `@`, when the user has one
    pub username: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(user: UserId, kind: EventKind) -> Self {
        Self {
            user,
            username: None,
            kind,
        }
    }

    pub fn command(user: UserId, command: BotCommand) -> Self {
        Self::new(user, EventKind::Command(command))
    }

    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self::new(user, EventKind::Text(text.into()))
    }

    pub fn attachment(user: UserId, attachment: Attachment) -> Self {
        Self::new(user, EventKind::Attachment(attachment))
    }

    pub fn callback(user: UserId, action: CallbackAction) -> Self {
        Self::new(user, EventKind::Callback(action))
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }
}
