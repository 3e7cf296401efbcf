//! Outbound intents produced by the state machine

use crate::broadcast::Post;
use crate::core::types::{FileRef, Lang, UserId};
use crate::transport::{Keyboard, Recipient, TextFormat};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text { text: String, format: TextFormat },
    Photo { file: FileRef, caption: Option<String> },
    Video { file: FileRef, caption: Option<String> },
    Document { file: FileRef, caption: Option<String> },
}

impl Payload {
    /// Visible text: the message body or the caption
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text.as_str()),
            Self::Photo { caption, .. } | Self::Video { caption, .. } | Self::Document { caption, .. } => {
                caption.as_deref()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    /// Deliver one message
    Send {
        to: Recipient,
        payload: Payload,
        keyboard: Option<Keyboard>,
    },
    /// Fan a confirmed post out to every eligible user, then report back to `admin`
    Broadcast { admin: UserId, lang: Lang, post: Post },
}

impl OutboundAction {
    pub fn text(to: impl Into<Recipient>, text: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self::Send {
            to: to.into(),
            payload: Payload::Text {
                text: text.into(),
                format: TextFormat::Plain,
            },
            keyboard,
        }
    }

    pub fn html(to: impl Into<Recipient>, text: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self::Send {
            to: to.into(),
            payload: Payload::Text {
                text: text.into(),
                format: TextFormat::Html,
            },
            keyboard,
        }
    }

    pub fn recipient(&self) -> Option<&Recipient> {
        match self {
            Self::Send { to, .. } => Some(to),
            Self::Broadcast { .. } => None,
        }
    }
}
