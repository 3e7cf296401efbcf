//! Recording transport for conversation tests
//!
//! Captures every outbound call instead of talking to Telegram, and can be told
//! to fail deliveries to specific users to simulate blocked recipients.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use yukcore::core::types::{FileRef, UserId};
use yukcore::transport::{DeliveryError, Keyboard, Recipient, TextFormat, Transport};

/// What kind of call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKind {
    Text(TextFormat),
    Photo,
    Video,
    Document,
}

/// One recorded delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: Recipient,
    pub kind: SentKind,
    /// Message text or caption
    pub text: Option<String>,
    pub file: Option<FileRef>,
    pub keyboard: Option<Keyboard>,
    pub delivered: bool,
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<HashSet<UserId>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery to `user` fails from now on
    pub fn fail_for(&self, user: UserId) {
        self.failing.lock().unwrap().insert(user);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Drains the recorded calls
    pub fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Successful deliveries to one user
    pub fn delivered_to(&self, user: UserId) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.delivered && m.to == Recipient::User(user))
            .collect()
    }

    /// Texts (or captions) of successful deliveries to one user
    pub fn texts_to(&self, user: UserId) -> Vec<String> {
        self.delivered_to(user).into_iter().filter_map(|m| m.text).collect()
    }

    fn record(
        &self,
        to: &Recipient,
        kind: SentKind,
        text: Option<&str>,
        file: Option<&FileRef>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        let fails = match to {
            Recipient::User(id) => self.failing.lock().unwrap().contains(id),
            Recipient::Channel(_) => false,
        };

        self.sent.lock().unwrap().push(SentMessage {
            to: to.clone(),
            kind,
            text: text.map(str::to_string),
            file: file.cloned(),
            keyboard: keyboard.cloned(),
            delivered: !fails,
        });

        if fails {
            Err(DeliveryError::Unavailable(format!("{} blocked the bot", to)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(
        &self,
        to: &Recipient,
        text: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        self.record(to, SentKind::Text(format), Some(text), None, keyboard)
    }

    async fn send_photo(
        &self,
        to: &Recipient,
        photo: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        self.record(to, SentKind::Photo, caption, Some(photo), keyboard)
    }

    async fn send_video(
        &self,
        to: &Recipient,
        video: &FileRef,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DeliveryError> {
        self.record(to, SentKind::Video, caption, Some(video), keyboard)
    }

    async fn send_document(
        &self,
        to: &Recipient,
        document: &FileRef,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        self.record(to, SentKind::Document, caption, Some(document), None)
    }
}
