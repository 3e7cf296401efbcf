//! Per-user conversation state machine
//!
//! [`Conversation::handle_event`] consumes one [`InboundEvent`], updates the
//! session store, verification codes and registry, and returns the messages to
//! send as [`OutboundAction`]s. It performs no I/O of its own; the
//! [`Engine`](crate::engine::Engine) delivers the actions.
//!
//! Flows:
//! - language pick, then name and phone questions, then a 4-digit code
//! - document upload (three slots) with confirm/retry, published to the channel
//! - `/admin` code entry, admin menu, post composition and broadcast
//!
//! "Home" abandons any flow. "Back" inside the admin panel returns to the admin
//! menu and behaves like "Home" everywhere else.

pub mod action;
pub mod event;
pub mod keyboards;
pub mod menu;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fluent_templates::fluent_bundle::FluentArgs;

pub use action::{OutboundAction, Payload};
pub use event::{Attachment, BotCommand, EventKind, InboundEvent};
pub use menu::{CallbackAction, DocumentSlot, MenuAction, Question, DOCUMENT_SLOTS, QUESTIONS};

use crate::broadcast::{BroadcastOutcome, Post};
use crate::core::config::FlowSettings;
use crate::core::types::{FileKind, Lang, UserId};
use crate::core::validation::validate_attachment;
use crate::i18n;
use crate::registry::{UserRegistry, NAME_LABEL, PHONE_LABEL};
use crate::session::{AdminStage, Session, SessionStore};
use crate::storage::snapshot::StoredDocument;
use crate::transport::{Keyboard, Recipient};
use crate::verification::VerificationCodes;

/// Messages to the collaborator channel are always written in this language
const CHANNEL_LANG: Lang = Lang::Uz;

/// Everything the state machine owns
#[derive(Debug)]
pub struct Conversation {
    registry: UserRegistry,
    sessions: SessionStore,
    codes: VerificationCodes,
    settings: FlowSettings,
}

/// The user being served and the replies collected so far
struct Turn {
    user: UserId,
    username: Option<String>,
    lang: Lang,
    out: Vec<OutboundAction>,
}

impl Turn {
    fn say(&mut self, key: &str, keyboard: Option<Keyboard>) {
        let text = i18n::t(self.lang, key);
        self.say_text(text, keyboard);
    }

    fn say_text(&mut self, text: String, keyboard: Option<Keyboard>) {
        self.out.push(OutboundAction::text(self.user, text, keyboard));
    }

    fn say_html(&mut self, key: &str, keyboard: Option<Keyboard>) {
        self.out
            .push(OutboundAction::html(self.user, i18n::t(self.lang, key), keyboard));
    }
}

impl Conversation {
    pub fn new(registry: UserRegistry, codes: VerificationCodes, settings: FlowSettings) -> Self {
        Self {
            registry,
            sessions: SessionStore::new(),
            codes,
            settings,
        }
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut UserRegistry {
        &mut self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn codes(&self) -> &VerificationCodes {
        &self.codes
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Processes one event and returns the resulting outbound actions.
    ///
    /// `today` is the local calendar date used for daily activity and stats.
    pub fn handle_event(&mut self, event: InboundEvent, today: NaiveDate) -> Vec<OutboundAction> {
        let InboundEvent { user, username, kind } = event;
        self.registry.record_contact(user, today);

        let mut turn = Turn {
            user,
            username,
            lang: self.registry.language(user),
            out: Vec::new(),
        };

        match kind {
            EventKind::Command(command) => self.on_command(&mut turn, command),
            EventKind::Text(text) => self.on_text(&mut turn, &text, today),
            EventKind::Attachment(attachment) => self.on_attachment(&mut turn, attachment),
            EventKind::Callback(action) => self.on_callback(&mut turn, action),
        }

        turn.out
    }

    /// Report sent to the admin after a broadcast has run
    pub fn finish_broadcast(&mut self, admin: UserId, lang: Lang, outcome: &BroadcastOutcome) -> Vec<OutboundAction> {
        let mut args = FluentArgs::new();
        args.set("count", outcome.sent_count.to_string());
        vec![OutboundAction::text(
            admin,
            i18n::t_args(lang, "post-sent", &args),
            Some(keyboards::admin_menu(lang)),
        )]
    }

    fn restore(&mut self, user: UserId, session: Option<Session>) {
        if let Some(session) = session {
            self.sessions.start(user, session);
        }
    }

    /// Drops the session and any pending code
    fn abandon(&mut self, user: UserId) {
        self.sessions.clear(user);
        self.codes.discard(user);
    }

    fn go_home(&mut self, turn: &mut Turn) {
        self.abandon(turn.user);
        turn.say("welcome", Some(keyboards::main_menu(turn.lang)));
    }

    fn go_back(&mut self, turn: &mut Turn) {
        if let Some(Session::AdminPost { stage }) = self.sessions.get_mut(turn.user) {
            *stage = AdminStage::Menu;
            turn.say("admin-welcome", Some(keyboards::admin_menu(turn.lang)));
        } else {
            self.go_home(turn);
        }
    }

    fn on_command(&mut self, turn: &mut Turn, command: BotCommand) {
        log::info!("User {} sent {:?}", turn.user, command);
        match command {
            BotCommand::Start => {
                self.abandon(turn.user);
                turn.say("start", Some(keyboards::language_menu()));
                if self.registry.is_registered(turn.user) {
                    turn.say("welcome", Some(keyboards::main_menu(turn.lang)));
                }
            }
            BotCommand::Lang => turn.say("start", Some(keyboards::language_menu())),
            BotCommand::Admin => {
                self.codes.discard(turn.user);
                self.sessions.start(turn.user, Session::AdminAuth);
                turn.say("admin-code-prompt", Some(keyboards::navigation(turn.lang)));
            }
        }
    }

    fn on_text(&mut self, turn: &mut Turn, text: &str, today: NaiveDate) {
        let action = MenuAction::parse(turn.lang, text);
        match action {
            Some(MenuAction::Home) => return self.go_home(turn),
            Some(MenuAction::Back) => return self.go_back(turn),
            _ => {}
        }

        match self.sessions.clear(turn.user) {
            Some(Session::InitialInfo {
                answers,
                awaiting_code: true,
                ..
            }) => self.on_code(turn, answers, text),
            Some(Session::InitialInfo { step, answers, .. }) => self.on_answer(turn, step, answers, text),
            Some(Session::AdminAuth) => self.on_admin_code(turn, text),
            Some(Session::AdminPost {
                stage: AdminStage::Menu,
            }) => self.on_admin_menu(turn, action, today),
            Some(Session::AdminPost {
                stage: AdminStage::Composing(mut post),
            }) => {
                post.text = Some(text.to_string());
                self.preview_post(turn, post);
            }
            Some(upload @ Session::DocumentUpload { .. }) => match action {
                // A main menu button leaves the upload
                Some(action) if !action.is_admin() => self.on_menu(turn, action),
                _ => {
                    if let Some(slot) = DOCUMENT_SLOTS.get(upload.step()) {
                        turn.say(slot.prompt_key(), Some(keyboards::navigation(turn.lang)));
                    }
                    self.sessions.start(turn.user, upload);
                }
            },
            None => match action {
                Some(action) => self.on_menu(turn, action),
                None => log::debug!("Ignoring free text from idle user {}", turn.user),
            },
        }
    }

    fn ask_first_question(&mut self, turn: &mut Turn) {
        self.codes.discard(turn.user);
        self.sessions.start(turn.user, Session::initial_info());
        if let Some(question) = QUESTIONS.first() {
            turn.say(question.prompt_key(), Some(Keyboard::Remove));
        }
    }

    fn on_answer(&mut self, turn: &mut Turn, step: usize, mut answers: BTreeMap<String, String>, text: &str) {
        let Some(question) = QUESTIONS.get(step).copied() else {
            return self.restore(
                turn.user,
                Some(Session::InitialInfo {
                    step,
                    answers,
                    awaiting_code: true,
                }),
            );
        };

        if let Err(e) = question.validate(text) {
            log::debug!("User {} gave an invalid {} answer: {}", turn.user, question.label(), e);
            turn.say(e.message_key(), None);
            turn.say(question.prompt_key(), None);
            self.sessions.start(
                turn.user,
                Session::InitialInfo {
                    step,
                    answers,
                    awaiting_code: false,
                },
            );
            return;
        }

        answers.insert(question.label().to_string(), text.trim().to_string());
        let step = step + 1;

        let awaiting_code = match QUESTIONS.get(step) {
            Some(next) => {
                turn.say(next.prompt_key(), Some(Keyboard::Remove));
                false
            }
            None => {
                let code = self.codes.issue(turn.user);
                log::info!("Issued verification code to user {}", turn.user);
                let mut args = FluentArgs::new();
                args.set("code", code);
                turn.say_text(i18n::t_args(turn.lang, "verify-code", &args), None);
                true
            }
        };

        self.sessions.start(
            turn.user,
            Session::InitialInfo {
                step,
                answers,
                awaiting_code,
            },
        );
    }

    fn on_code(&mut self, turn: &mut Turn, answers: BTreeMap<String, String>, text: &str) {
        if self.codes.check(turn.user, text) {
            self.registry.commit_registration(turn.user, answers);
            turn.say("code-correct", Some(keyboards::main_menu(turn.lang)));
        } else {
            turn.say("code-incorrect", None);
            self.sessions.start(
                turn.user,
                Session::InitialInfo {
                    step: QUESTIONS.len(),
                    answers,
                    awaiting_code: true,
                },
            );
        }
    }

    fn on_admin_code(&mut self, turn: &mut Turn, text: &str) {
        if text == self.settings.admin_code {
            log::info!("User {} entered the admin panel", turn.user);
            self.sessions.start(turn.user, Session::admin_menu());
            turn.say("admin-welcome", Some(keyboards::admin_menu(turn.lang)));
        } else {
            log::warn!("User {} failed admin authentication", turn.user);
            turn.say("not-admin", Some(keyboards::main_menu(turn.lang)));
        }
    }

    fn on_admin_menu(&mut self, turn: &mut Turn, action: Option<MenuAction>, today: NaiveDate) {
        match action {
            Some(MenuAction::AdminStats) => {
                let mut args = FluentArgs::new();
                args.set("total", self.registry.total_users().to_string());
                args.set("blocked", self.registry.blocked_count().to_string());
                args.set("daily", self.registry.active_count(today).to_string());
                turn.say_text(
                    i18n::t_args(turn.lang, "stats", &args),
                    Some(keyboards::admin_menu(turn.lang)),
                );
                self.sessions.start(turn.user, Session::admin_menu());
            }
            Some(MenuAction::AdminPost) => {
                self.sessions.start(
                    turn.user,
                    Session::AdminPost {
                        stage: AdminStage::Composing(Post::default()),
                    },
                );
                turn.say("post-prompt", Some(keyboards::navigation(turn.lang)));
            }
            _ => self.sessions.start(turn.user, Session::admin_menu()),
        }
    }

    fn preview_post(&mut self, turn: &mut Turn, post: Post) {
        let keyboard = Some(keyboards::confirm_retry(
            turn.lang,
            CallbackAction::PostConfirm,
            CallbackAction::PostRetry,
        ));

        let mut args = FluentArgs::new();
        let body = post.text.clone().unwrap_or_else(|| i18n::t(turn.lang, "post-no-text"));
        args.set("post", body);
        let preview = i18n::t_args(turn.lang, "post-confirm", &args);

        let to = Recipient::User(turn.user);
        if let Some(photo) = &post.photo {
            turn.out.push(OutboundAction::Send {
                to,
                payload: Payload::Photo {
                    file: photo.clone(),
                    caption: Some(preview),
                },
                keyboard,
            });
        } else if let Some(video) = &post.video {
            turn.out.push(OutboundAction::Send {
                to,
                payload: Payload::Video {
                    file: video.clone(),
                    caption: Some(preview),
                },
                keyboard,
            });
        } else if post.text.is_some() {
            turn.say_text(preview, keyboard);
        } else {
            turn.say("post-empty", Some(keyboards::navigation(turn.lang)));
        }

        self.sessions.start(
            turn.user,
            Session::AdminPost {
                stage: AdminStage::Composing(post),
            },
        );
    }

    fn on_attachment(&mut self, turn: &mut Turn, attachment: Attachment) {
        match self.sessions.clear(turn.user) {
            Some(Session::DocumentUpload { documents }) => self.on_document(turn, documents, attachment),
            Some(Session::AdminPost {
                stage: AdminStage::Composing(mut post),
            }) => match attachment {
                Attachment::Photo(file) => {
                    post.photo = Some(file);
                    self.preview_post(turn, post);
                }
                Attachment::Video(file) => {
                    post.video = Some(file);
                    self.preview_post(turn, post);
                }
                Attachment::Document { .. } => {
                    turn.say("post-prompt", Some(keyboards::navigation(turn.lang)));
                    self.sessions.start(
                        turn.user,
                        Session::AdminPost {
                            stage: AdminStage::Composing(post),
                        },
                    );
                }
            },
            other => {
                log::debug!("Ignoring attachment from user {} outside an upload", turn.user);
                self.restore(turn.user, other);
            }
        }
    }

    fn on_document(&mut self, turn: &mut Turn, mut documents: Vec<StoredDocument>, attachment: Attachment) {
        if documents.len() >= DOCUMENT_SLOTS.len() {
            log::debug!("User {} sent an extra document after completing the upload", turn.user);
            return self.sessions.start(turn.user, Session::DocumentUpload { documents });
        }

        match validate_attachment(&attachment) {
            Ok(kind) => {
                documents.push(StoredDocument {
                    file: attachment.file().clone(),
                    kind,
                });
                match DOCUMENT_SLOTS.get(documents.len()) {
                    Some(next) => turn.say(next.prompt_key(), Some(keyboards::navigation(turn.lang))),
                    None => self.show_documents_summary(turn),
                }
            }
            Err(e) => {
                log::debug!("User {} uploaded an unsupported file: {}", turn.user, e);
                turn.say(e.message_key(), None);
            }
        }

        self.sessions.start(turn.user, Session::DocumentUpload { documents });
    }

    fn show_documents_summary(&self, turn: &mut Turn) {
        let mut summary = i18n::t(turn.lang, "documents-summary");
        for slot in DOCUMENT_SLOTS {
            summary.push('\n');
            summary.push_str(&i18n::t(turn.lang, slot.prompt_key()));
        }
        let keyboard = keyboards::confirm_retry(turn.lang, CallbackAction::DocsConfirm, CallbackAction::DocsRetry);
        turn.say_text(summary, Some(keyboard));
    }

    fn start_document_upload(&mut self, turn: &mut Turn) {
        self.sessions.start(turn.user, Session::document_upload());
        if let Some(slot) = DOCUMENT_SLOTS.first() {
            turn.say(slot.prompt_key(), Some(keyboards::navigation(turn.lang)));
        }
    }

    fn on_callback(&mut self, turn: &mut Turn, action: CallbackAction) {
        log::debug!("User {} pressed {}", turn.user, action.tag());
        match action {
            CallbackAction::Language(lang) => {
                self.registry.set_language(turn.user, lang);
                turn.lang = lang;
                if self.registry.is_registered(turn.user) {
                    self.go_home(turn);
                } else {
                    turn.say("welcome", None);
                    self.ask_first_question(turn);
                }
            }
            CallbackAction::DocsConfirm => self.confirm_documents(turn),
            CallbackAction::DocsRetry => {
                if matches!(self.sessions.get(turn.user), Some(Session::DocumentUpload { .. })) {
                    self.start_document_upload(turn);
                }
            }
            CallbackAction::ProfileConfirm => turn.say("welcome", Some(keyboards::main_menu(turn.lang))),
            CallbackAction::ProfileEdit => self.ask_first_question(turn),
            CallbackAction::PostConfirm => self.confirm_post(turn),
            CallbackAction::PostRetry => {
                if let Some(Session::AdminPost { stage }) = self.sessions.get_mut(turn.user) {
                    if matches!(stage, AdminStage::Composing(_)) {
                        *stage = AdminStage::Composing(Post::default());
                        turn.say("post-prompt", Some(keyboards::navigation(turn.lang)));
                    }
                }
            }
        }
    }

    fn confirm_documents(&mut self, turn: &mut Turn) {
        let documents = match self.sessions.clear(turn.user) {
            Some(Session::DocumentUpload { documents }) if documents.len() == DOCUMENT_SLOTS.len() => documents,
            other => {
                log::debug!("Ignoring stale document confirmation from user {}", turn.user);
                return self.restore(turn.user, other);
            }
        };

        let channel = Recipient::Channel(self.settings.channel.clone());
        for (slot, document) in DOCUMENT_SLOTS.iter().zip(&documents) {
            let caption = Some(i18n::t(CHANNEL_LANG, slot.prompt_key()));
            let file = document.file.clone();
            let payload = match document.kind {
                FileKind::Photo => Payload::Photo { file, caption },
                FileKind::Document => Payload::Document { file, caption },
            };
            turn.out.push(OutboundAction::Send {
                to: channel.clone(),
                payload,
                keyboard: None,
            });
        }

        let unknown = i18n::t(CHANNEL_LANG, "profile-unknown");
        let registration = self.registry.registration(turn.user);
        let field = |label: &str| {
            registration
                .and_then(|answers| answers.get(label))
                .cloned()
                .unwrap_or_else(|| unknown.clone())
        };
        let mut args = FluentArgs::new();
        args.set(
            "username",
            turn.username
                .as_deref()
                .map_or_else(|| unknown.clone(), |name| format!("@{}", name)),
        );
        args.set("name", field(NAME_LABEL));
        args.set("phone", field(PHONE_LABEL));
        turn.out.push(OutboundAction::text(
            channel,
            i18n::t_args(CHANNEL_LANG, "channel-new-user", &args),
            None,
        ));

        log::info!("Publishing documents of user {} to {}", turn.user, self.settings.channel);
        self.registry.commit_documents(turn.user, documents);
        turn.say("received", Some(keyboards::main_menu(turn.lang)));
    }

    fn confirm_post(&mut self, turn: &mut Turn) {
        match self.sessions.clear(turn.user) {
            Some(Session::AdminPost {
                stage: AdminStage::Composing(post),
            }) => {
                if post.is_empty() {
                    turn.say("post-empty", Some(keyboards::navigation(turn.lang)));
                    self.sessions.start(
                        turn.user,
                        Session::AdminPost {
                            stage: AdminStage::Composing(post),
                        },
                    );
                    return;
                }
                log::info!("Admin {} confirmed a broadcast", turn.user);
                self.sessions.start(turn.user, Session::admin_menu());
                turn.out.push(OutboundAction::Broadcast {
                    admin: turn.user,
                    lang: turn.lang,
                    post,
                });
            }
            other => {
                log::debug!("Ignoring stale post confirmation from user {}", turn.user);
                self.restore(turn.user, other);
            }
        }
    }

    fn on_menu(&mut self, turn: &mut Turn, action: MenuAction) {
        match action {
            MenuAction::Registration => {
                if self.registry.is_registered(turn.user) {
                    self.start_document_upload(turn);
                } else {
                    turn.say("error-not-registered", Some(keyboards::main_menu(turn.lang)));
                }
            }
            MenuAction::Operator => turn.say_html("operator-info", Some(keyboards::main_menu(turn.lang))),
            MenuAction::Services => turn.say("services", Some(keyboards::services(turn.lang))),
            MenuAction::Profile => self.show_profile(turn),
            MenuAction::Home | MenuAction::Back => self.go_home(turn),
            MenuAction::Logistics | MenuAction::Customs | MenuAction::Administrative | MenuAction::Certification => {
                if let Some(key) = action.service_text_key() {
                    turn.say_html(key, Some(keyboards::services(turn.lang)));
                }
            }
            MenuAction::AdminStats | MenuAction::AdminPost => {
                log::debug!("Ignoring admin menu button from user {} outside the admin panel", turn.user);
            }
        }
    }

    fn show_profile(&self, turn: &mut Turn) {
        let Some(answers) = self.registry.registration(turn.user) else {
            return turn.say("error-not-registered", Some(keyboards::main_menu(turn.lang)));
        };

        let unknown = i18n::t(turn.lang, "profile-unknown");
        let mut args = FluentArgs::new();
        args.set("name", answers.get(NAME_LABEL).cloned().unwrap_or_else(|| unknown.clone()));
        args.set("phone", answers.get(PHONE_LABEL).cloned().unwrap_or(unknown));
        let keyboard = keyboards::confirm_retry(turn.lang, CallbackAction::ProfileConfirm, CallbackAction::ProfileEdit);
        turn.say_text(i18n::t_args(turn.lang, "profile", &args), Some(keyboard));
    }
}
