//! Yukcore - conversation core of the PBS IMPEX Telegram bot
//!
//! Everything here is transport-agnostic: the bot crate turns Telegram updates
//! into [`InboundEvent`]s and implements [`Transport`] for delivery.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, shared types and validation rules
//! - `conversation`: the per-user state machine and its vocabulary
//! - `session`: in-flight flow state
//! - `verification`: one-time registration codes
//! - `registry`: known, registered and blocked users
//! - `storage`: JSON snapshot persistence
//! - `broadcast`: admin post fan-out
//! - `engine`: event processing and delivery
//! - `i18n`: Fluent message catalogs (uz, ru, en)

pub mod broadcast;
pub mod conversation;
pub mod core;
pub mod engine;
pub mod i18n;
pub mod registry;
pub mod session;
pub mod storage;
pub mod transport;
pub mod verification;

// Re-export commonly used types for convenience
pub use broadcast::{BroadcastDispatcher, BroadcastOutcome, Post};
pub use conversation::{Attachment, BotCommand, CallbackAction, Conversation, EventKind, InboundEvent, OutboundAction};
pub use crate::core::{config, AppError, AppResult, FlowSettings, Lang, UserId};
pub use engine::Engine;
pub use registry::UserRegistry;
pub use storage::SnapshotStore;
pub use transport::{DeliveryError, Keyboard, Recipient, TextFormat, Transport};
pub use verification::VerificationCodes;
