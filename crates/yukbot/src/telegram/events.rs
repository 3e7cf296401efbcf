//! Conversion of Telegram updates into core events

use teloxide::types::{CallbackQuery, Message};

use yukcore::conversation::{Attachment, InboundEvent};
use yukcore::core::types::FileRef;
use yukcore::{CallbackAction, UserId};

use crate::telegram::bot::Command;

/// Sender identity of a private-chat message
fn sender(msg: &Message) -> (UserId, Option<String>) {
    let username = msg.from.as_ref().and_then(|u| u.username.clone());
    (UserId(msg.chat.id.0), username)
}

pub fn from_command(msg: &Message, cmd: Command) -> InboundEvent {
    let (user, username) = sender(msg);
    InboundEvent::command(user, cmd.into()).with_username(username)
}

/// Text wins over media; photos use the largest size
///
/// Returns `None` for updates the bot has no use for (stickers, contacts, ...).
pub fn from_message(msg: &Message) -> Option<InboundEvent> {
    let (user, username) = sender(msg);

    let event = if let Some(text) = msg.text() {
        InboundEvent::text(user, text)
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        InboundEvent::attachment(user, Attachment::Photo(FileRef::new(photo.file.id.0.clone())))
    } else if let Some(video) = msg.video() {
        InboundEvent::attachment(user, Attachment::Video(FileRef::new(video.file.id.0.clone())))
    } else if let Some(doc) = msg.document() {
        let mime_type = doc.mime_type.as_ref().map(mime_essence);
        InboundEvent::attachment(
            user,
            Attachment::Document {
                file: FileRef::new(doc.file.id.0.clone()),
                mime_type,
            },
        )
    } else {
        return None;
    };

    Some(event.with_username(username))
}

pub fn from_callback(q: &CallbackQuery) -> Option<InboundEvent> {
    let user = UserId(i64::try_from(q.from.id.0).ok()?);
    let action = parse_callback_data(q.data.as_deref())?;
    Some(InboundEvent::callback(user, action).with_username(q.from.username.clone()))
}

fn parse_callback_data(data: Option<&str>) -> Option<CallbackAction> {
    let data = data?;
    let action = CallbackAction::from_tag(data);
    if action.is_none() {
        log::debug!("Ignoring unknown callback data: {}", data);
    }
    action
}

/// `application/pdf; charset=binary` becomes `application/pdf`
fn mime_essence(mime: &mime::Mime) -> String {
    mime.essence_str().to_string()
}
