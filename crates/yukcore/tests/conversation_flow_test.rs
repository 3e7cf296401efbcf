//! End-to-end conversation flows through the engine with a recording transport

mod common;
mod mocks;

use common::*;
use fluent_templates::fluent_bundle::FluentArgs;
use mocks::{RecordingTransport, SentKind};
use pretty_assertions::assert_eq;
use yukcore::conversation::keyboards;
use yukcore::conversation::{BotCommand, CallbackAction, MenuAction};
use yukcore::core::types::{FileKind, Lang, UserId};
use yukcore::i18n::{t, t_args};
use yukcore::session::{AdminStage, FlowKind, Session};
use yukcore::transport::{Recipient, TextFormat};

fn texts(messages: &[mocks::SentMessage]) -> Vec<String> {
    messages.iter().filter_map(|m| m.text.clone()).collect()
}

fn session(engine: &yukcore::Engine, user: UserId) -> Option<Session> {
    engine.conversation().sessions().get(user).cloned()
}

#[tokio::test]
async fn scenario_a_fresh_user_registers_with_code() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(100);

    command(&mut engine, &transport, user, BotCommand::Start).await;
    let sent = transport.take();
    assert_eq!(texts(&sent), vec![t(Lang::Uz, "start")]);
    assert_eq!(sent[0].keyboard, Some(keyboards::language_menu()));

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::En)).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "welcome"), t(Lang::En, "question-name")]);
    assert_eq!(engine.conversation().registry().language(user), Lang::En);

    text(&mut engine, &transport, user, "John").await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "question-phone")]);
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(1));

    text(&mut engine, &transport, user, "998901234567").await;
    let code = engine.conversation().codes().pending(user).map(str::to_string).unwrap();
    assert_eq!(code.len(), 4);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    let sent = transport.take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.as_deref().unwrap().contains(&code));

    text(&mut engine, &transport, user, &code).await;
    let sent = transport.take();
    assert_eq!(texts(&sent), vec![t(Lang::En, "code-correct")]);
    assert_eq!(sent[0].keyboard, Some(keyboards::main_menu(Lang::En)));

    let registry = engine.conversation().registry();
    assert!(registry.is_registered(user));
    let answers = registry.registration(user).unwrap();
    assert_eq!(answers["name"], "John");
    assert_eq!(answers["phone"], "998901234567");
    assert!(session(&engine, user).is_none());
    assert!(engine.conversation().codes().pending(user).is_none());
}

#[tokio::test]
async fn scenario_b_invalid_phone_keeps_step() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(101);

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::En)).await;
    text(&mut engine, &transport, user, "John").await;
    transport.take();

    text(&mut engine, &transport, user, "abc").await;
    assert_eq!(
        texts(&transport.take()),
        vec![t(Lang::En, "error-phone"), t(Lang::En, "question-phone")]
    );
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(1));

    text(&mut engine, &transport, user, "12345").await;
    assert_eq!(texts(&transport.take())[0], t(Lang::En, "error-phone-length"));
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(1));
    assert!(engine.conversation().codes().pending(user).is_none());
}

#[tokio::test]
async fn invalid_name_is_rejected() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(102);

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::Ru)).await;
    transport.take();

    text(&mut engine, &transport, user, "Ali99").await;
    assert_eq!(texts(&transport.take())[0], t(Lang::Ru, "error-no-digits"));
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(0));
}

#[tokio::test]
async fn wrong_code_can_be_retried() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(103);

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::En)).await;
    text(&mut engine, &transport, user, "John").await;
    text(&mut engine, &transport, user, "901234567").await;
    let code = engine.conversation().codes().pending(user).map(str::to_string).unwrap();
    let wrong = if code == "1000" { "1001" } else { "1000" };
    transport.take();

    for _ in 0..3 {
        text(&mut engine, &transport, user, wrong).await;
        assert_eq!(texts(&transport.take()), vec![t(Lang::En, "code-incorrect")]);
        assert_eq!(engine.conversation().codes().pending(user), Some(code.as_str()));
        assert!(!engine.conversation().registry().is_registered(user));
    }

    text(&mut engine, &transport, user, &code).await;
    assert!(engine.conversation().registry().is_registered(user));
}

#[tokio::test]
async fn home_abandons_flow_and_code() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(104);

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::En)).await;
    text(&mut engine, &transport, user, "John").await;
    text(&mut engine, &transport, user, "901234567").await;
    assert!(engine.conversation().codes().pending(user).is_some());
    transport.take();

    text(&mut engine, &transport, user, &MenuAction::Home.label(Lang::En)).await;
    let sent = transport.take();
    assert_eq!(texts(&sent), vec![t(Lang::En, "welcome")]);
    assert_eq!(sent[0].keyboard, Some(keyboards::main_menu(Lang::En)));
    assert!(session(&engine, user).is_none());
    assert!(engine.conversation().codes().pending(user).is_none());
}

#[tokio::test]
async fn unregistered_user_cannot_upload_documents() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(105);

    text(&mut engine, &transport, user, &MenuAction::Registration.label(Lang::Uz)).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "error-not-registered")]);
    assert!(session(&engine, user).is_none());
}

#[tokio::test]
async fn scenario_c_document_upload_and_publication() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(106);
    register(&mut engine, &transport, user).await;
    transport.take();

    text(&mut engine, &transport, user, &MenuAction::Registration.label(Lang::En)).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "document-passport")]);
    assert_eq!(session(&engine, user).map(|s| s.flow_kind()), Some(FlowKind::DocumentUpload));

    upload(&mut engine, &transport, user, document("zip-1", "application/zip")).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "error-invalid-file")]);
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(0));

    upload(&mut engine, &transport, user, document("png-1", "image/png")).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "document-tech-passport")]);
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(1));

    upload(&mut engine, &transport, user, photo("photo-2")).await;
    upload(&mut engine, &transport, user, document("pdf-3", "application/pdf")).await;
    let sent = transport.take();
    let summary = sent.last().unwrap();
    assert!(summary.text.as_deref().unwrap().starts_with(&t(Lang::En, "documents-summary")));
    assert_eq!(
        summary.keyboard,
        Some(keyboards::confirm_retry(
            Lang::En,
            CallbackAction::DocsConfirm,
            CallbackAction::DocsRetry
        ))
    );
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(3));

    // Cursor stays at the bound once complete
    upload(&mut engine, &transport, user, photo("extra")).await;
    assert!(transport.take().is_empty());
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(3));

    send(
        &mut engine,
        &transport,
        yukcore::InboundEvent::callback(user, CallbackAction::DocsConfirm).with_username(Some("johnny".into())),
    )
    .await;

    let sent = transport.take();
    let channel = Recipient::Channel(CHANNEL.to_string());
    let to_channel: Vec<_> = sent.iter().filter(|m| m.to == channel).collect();
    assert_eq!(to_channel.len(), 4);
    assert_eq!(to_channel[0].kind, SentKind::Document);
    assert_eq!(to_channel[0].text.as_deref(), Some(t(Lang::Uz, "document-passport").as_str()));
    assert_eq!(to_channel[1].kind, SentKind::Photo);
    assert_eq!(to_channel[2].kind, SentKind::Document);
    let profile = to_channel[3].text.as_deref().unwrap();
    assert!(profile.contains("@johnny"));
    assert!(profile.contains("John"));
    assert!(profile.contains("998901234567"));

    assert_eq!(texts(&transport.delivered_to(user)), vec![t(Lang::En, "received")]);
    assert!(session(&engine, user).is_none());

    let documents = engine.conversation().registry().documents(user).unwrap();
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[1].kind, FileKind::Photo);
}

#[tokio::test]
async fn document_retry_resets_cursor() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(107);
    register(&mut engine, &transport, user).await;

    text(&mut engine, &transport, user, &MenuAction::Registration.label(Lang::En)).await;
    upload(&mut engine, &transport, user, photo("a")).await;
    upload(&mut engine, &transport, user, photo("b")).await;
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(2));
    transport.take();

    press(&mut engine, &transport, user, CallbackAction::DocsRetry).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "document-passport")]);
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(0));

    // Confirmation before completion is ignored
    press(&mut engine, &transport, user, CallbackAction::DocsConfirm).await;
    assert!(transport.take().is_empty());
    assert_eq!(session(&engine, user).map(|s| s.step()), Some(0));
}

#[tokio::test]
async fn cursor_never_leaves_bounds() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(108);
    register(&mut engine, &transport, user).await;
    text(&mut engine, &transport, user, &MenuAction::Registration.label(Lang::En)).await;

    let events = [
        photo("1"),
        document("x", "text/plain"),
        photo("2"),
        photo("3"),
        photo("4"),
        photo("5"),
    ];
    for attachment in events {
        upload(&mut engine, &transport, user, attachment).await;
        let current = session(&engine, user).unwrap();
        assert!(current.step() <= current.bound());
    }
    assert!(session(&engine, user).unwrap().is_complete());
}

#[tokio::test]
async fn profile_shows_answers_and_edit_restarts_questions() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(109);
    register(&mut engine, &transport, user).await;
    transport.take();

    text(&mut engine, &transport, user, &MenuAction::Profile.label(Lang::En)).await;
    let sent = transport.take();
    let card = sent[0].text.as_deref().unwrap();
    assert!(card.contains("John"));
    assert!(card.contains("998901234567"));

    press(&mut engine, &transport, user, CallbackAction::ProfileEdit).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "question-name")]);
    assert_eq!(session(&engine, user).map(|s| s.flow_kind()), Some(FlowKind::InitialInfo));
}

#[tokio::test]
async fn operator_and_services_use_html() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(110);

    text(&mut engine, &transport, user, &MenuAction::Operator.label(Lang::Uz)).await;
    let sent = transport.take();
    assert_eq!(sent[0].kind, SentKind::Text(TextFormat::Html));
    assert_eq!(sent[0].text, Some(t(Lang::Uz, "operator-info")));

    text(&mut engine, &transport, user, &MenuAction::Services.label(Lang::Uz)).await;
    let sent = transport.take();
    assert_eq!(sent[0].keyboard, Some(keyboards::services(Lang::Uz)));

    text(&mut engine, &transport, user, &MenuAction::Customs.label(Lang::Uz)).await;
    let sent = transport.take();
    assert_eq!(sent[0].text, Some(t(Lang::Uz, "service-customs-text")));
    assert_eq!(sent[0].kind, SentKind::Text(TextFormat::Html));
}

#[tokio::test]
async fn wrong_admin_code_ends_attempt() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(200);

    command(&mut engine, &transport, user, BotCommand::Admin).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "admin-code-prompt")]);
    assert_eq!(session(&engine, user), Some(Session::AdminAuth));

    text(&mut engine, &transport, user, "guess").await;
    let sent = transport.take();
    assert_eq!(texts(&sent), vec![t(Lang::Uz, "not-admin")]);
    assert_eq!(sent[0].keyboard, Some(keyboards::main_menu(Lang::Uz)));
    assert!(session(&engine, user).is_none());

    // The correct code no longer helps without a new /admin
    text(&mut engine, &transport, user, ADMIN_CODE).await;
    assert!(session(&engine, user).is_none());
}

#[tokio::test]
async fn admin_stats_and_post_composition() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let admin = UserId(201);
    command(&mut engine, &transport, UserId(1), BotCommand::Start).await;
    command(&mut engine, &transport, UserId(2), BotCommand::Start).await;

    login_admin(&mut engine, &transport, admin).await;
    let sent = transport.take();
    assert_eq!(sent.last().unwrap().text, Some(t(Lang::Uz, "admin-welcome")));
    assert_eq!(session(&engine, admin), Some(Session::admin_menu()));

    text(&mut engine, &transport, admin, &MenuAction::AdminStats.label(Lang::Uz)).await;
    let mut args = FluentArgs::new();
    args.set("total", "3");
    args.set("blocked", "0");
    args.set("daily", "3");
    assert_eq!(texts(&transport.take()), vec![t_args(Lang::Uz, "stats", &args)]);

    text(&mut engine, &transport, admin, &MenuAction::AdminPost.label(Lang::Uz)).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "post-prompt")]);

    // Confirming an empty post is refused
    press(&mut engine, &transport, admin, CallbackAction::PostConfirm).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "post-empty")]);

    text(&mut engine, &transport, admin, "Sale!").await;
    let mut args = FluentArgs::new();
    args.set("post", "Sale!");
    assert_eq!(texts(&transport.take()), vec![t_args(Lang::Uz, "post-confirm", &args)]);

    upload(&mut engine, &transport, admin, photo("banner")).await;
    let sent = transport.take();
    assert_eq!(sent[0].kind, SentKind::Photo);
    match session(&engine, admin) {
        Some(Session::AdminPost {
            stage: AdminStage::Composing(post),
        }) => {
            assert_eq!(post.text.as_deref(), Some("Sale!"));
            assert!(post.photo.is_some());
        }
        other => panic!("unexpected session {:?}", other),
    }

    press(&mut engine, &transport, admin, CallbackAction::PostRetry).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "post-prompt")]);
    match session(&engine, admin) {
        Some(Session::AdminPost {
            stage: AdminStage::Composing(post),
        }) => assert!(post.is_empty()),
        other => panic!("unexpected session {:?}", other),
    }

    text(&mut engine, &transport, admin, &MenuAction::Back.label(Lang::Uz)).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::Uz, "admin-welcome")]);
    assert_eq!(session(&engine, admin), Some(Session::admin_menu()));

    text(&mut engine, &transport, admin, &MenuAction::Home.label(Lang::Uz)).await;
    assert!(session(&engine, admin).is_none());
}

#[tokio::test]
async fn start_shows_main_menu_to_registered_users() {
    let mut engine = engine();
    let transport = RecordingTransport::new();
    let user = UserId(111);
    register(&mut engine, &transport, user).await;
    transport.take();

    command(&mut engine, &transport, user, BotCommand::Start).await;
    assert_eq!(texts(&transport.take()), vec![t(Lang::En, "start"), t(Lang::En, "welcome")]);

    press(&mut engine, &transport, user, CallbackAction::Language(Lang::Ru)).await;
    let sent = transport.take();
    assert_eq!(texts(&sent), vec![t(Lang::Ru, "welcome")]);
    assert_eq!(sent[0].keyboard, Some(keyboards::main_menu(Lang::Ru)));
    assert!(session(&engine, user).is_none());
}
