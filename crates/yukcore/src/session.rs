//! Per-user in-flight conversation state
//!
//! A user has at most one live [`Session`]. Starting a flow replaces whatever
//! was there before; reaching a terminal outcome removes it. Flow-specific data
//! lives inside the variant, so a document-upload session can never carry
//! half-answered registration questions and vice versa.

use std::collections::{BTreeMap, HashMap};

use crate::broadcast::Post;
use crate::conversation::menu::{DOCUMENT_SLOTS, QUESTIONS};
use crate::core::types::UserId;
use crate::storage::snapshot::StoredDocument;

/// Which flow a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    InitialInfo,
    DocumentUpload,
    AdminAuth,
    AdminPost,
}

/// Admin session stage after a successful code entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminStage {
    /// Showing the admin menu
    Menu,
    /// Collecting content for a broadcast post
    Composing(Post),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Name/phone questions, then the verification code
    InitialInfo {
        step: usize,
        answers: BTreeMap<String, String>,
        awaiting_code: bool,
    },
    /// Required documents collected so far; the cursor is `documents.len()`
    DocumentUpload { documents: Vec<StoredDocument> },
    /// Waiting for the admin code
    AdminAuth,
    /// Authenticated admin
    AdminPost { stage: AdminStage },
}

impl Session {
    pub fn initial_info() -> Self {
        Self::InitialInfo {
            step: 0,
            answers: BTreeMap::new(),
            awaiting_code: false,
        }
    }

    pub fn document_upload() -> Self {
        Self::DocumentUpload { documents: Vec::new() }
    }

    pub fn admin_menu() -> Self {
        Self::AdminPost { stage: AdminStage::Menu }
    }

    pub fn flow_kind(&self) -> FlowKind {
        match self {
            Self::InitialInfo { .. } => FlowKind::InitialInfo,
            Self::DocumentUpload { .. } => FlowKind::DocumentUpload,
            Self::AdminAuth => FlowKind::AdminAuth,
            Self::AdminPost { .. } => FlowKind::AdminPost,
        }
    }

    /// Step cursor, always within `0..=bound()`
    pub fn step(&self) -> usize {
        match self {
            Self::InitialInfo { step, .. } => *step,
            Self::DocumentUpload { documents } => documents.len(),
            Self::AdminAuth | Self::AdminPost { .. } => 0,
        }
    }

    /// Number of items the flow collects; `step() == bound()` means complete
    pub fn bound(&self) -> usize {
        match self {
            Self::InitialInfo { .. } => QUESTIONS.len(),
            Self::DocumentUpload { .. } => DOCUMENT_SLOTS.len(),
            Self::AdminAuth | Self::AdminPost { .. } => 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step() == self.bound()
    }
}

/// Live sessions keyed by user
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    pub fn get_mut(&mut self, user: UserId) -> Option<&mut Session> {
        self.sessions.get_mut(&user)
    }

    /// Starts a flow, discarding any previous session for the user
    pub fn start(&mut self, user: UserId, session: Session) {
        if let Some(previous) = self.sessions.insert(user, session) {
            log::debug!("User {} abandoned {:?} flow", user, previous.flow_kind());
        }
    }

    pub fn clear(&mut self, user: UserId) -> Option<Session> {
        self.sessions.remove(&user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
