//! Shared helpers for integration tests
//!
//! Builds an engine around an in-memory snapshot store, a seeded code
//! generator and a zero-delay broadcast dispatcher.

#![allow(dead_code)]

use std::time::Duration;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use yukcore::conversation::{Attachment, BotCommand, CallbackAction, InboundEvent};
use yukcore::core::types::{FileRef, Lang, UserId};
use yukcore::storage::SnapshotStore;
use yukcore::{BroadcastDispatcher, Conversation, Engine, FlowSettings, UserRegistry, VerificationCodes};

use crate::mocks::RecordingTransport;

pub const ADMIN_CODE: &str = "let-me-in";
pub const CHANNEL: &str = "@collaborators";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

pub fn engine_with_registry(registry: UserRegistry) -> Engine {
    let conversation = Conversation::new(
        registry,
        VerificationCodes::with_rng(StdRng::seed_from_u64(42)),
        FlowSettings::new(ADMIN_CODE, CHANNEL),
    );
    Engine::new(conversation, BroadcastDispatcher::new(Duration::ZERO))
}

pub fn engine() -> Engine {
    engine_with_registry(UserRegistry::new(SnapshotStore::in_memory(), 0))
}

/// Drives one event through the engine on the fixed test date
pub async fn send(engine: &mut Engine, transport: &RecordingTransport, event: InboundEvent) {
    engine.process_on(event, today(), transport).await;
}

pub async fn text(engine: &mut Engine, transport: &RecordingTransport, user: UserId, text: &str) {
    send(engine, transport, InboundEvent::text(user, text)).await;
}

pub async fn press(engine: &mut Engine, transport: &RecordingTransport, user: UserId, action: CallbackAction) {
    send(engine, transport, InboundEvent::callback(user, action)).await;
}

pub async fn command(engine: &mut Engine, transport: &RecordingTransport, user: UserId, command: BotCommand) {
    send(engine, transport, InboundEvent::command(user, command)).await;
}

pub async fn upload(engine: &mut Engine, transport: &RecordingTransport, user: UserId, attachment: Attachment) {
    send(engine, transport, InboundEvent::attachment(user, attachment)).await;
}

pub fn photo(id: &str) -> Attachment {
    Attachment::Photo(FileRef::new(id))
}

pub fn document(id: &str, mime: &str) -> Attachment {
    Attachment::Document {
        file: FileRef::new(id),
        mime_type: Some(mime.to_string()),
    }
}

/// Runs a user through language pick, name, phone and code (English)
pub async fn register(engine: &mut Engine, transport: &RecordingTransport, user: UserId) {
    command(engine, transport, user, BotCommand::Start).await;
    press(engine, transport, user, CallbackAction::Language(Lang::En)).await;
    text(engine, transport, user, "John").await;
    text(engine, transport, user, "998901234567").await;
    let code = engine
        .conversation()
        .codes()
        .pending(user)
        .map(str::to_string)
        .unwrap();
    text(engine, transport, user, &code).await;
    assert!(engine.conversation().registry().is_registered(user));
}

/// Opens the admin panel for `user`
pub async fn login_admin(engine: &mut Engine, transport: &RecordingTransport, user: UserId) {
    command(engine, transport, user, BotCommand::Admin).await;
    text(engine, transport, user, ADMIN_CODE).await;
}
