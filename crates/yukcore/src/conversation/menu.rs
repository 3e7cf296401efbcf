//! Menu labels, callback tags, registration questions and document slots

use std::str::FromStr;

use strum::{EnumIter, IntoEnumIterator};

use crate::core::types::Lang;
use crate::core::validation::{validate_name, validate_phone, ValidationError};
use crate::i18n;
use crate::registry::{NAME_LABEL, PHONE_LABEL};

/// Reply-keyboard buttons the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MenuAction {
    Registration,
    Operator,
    Services,
    Profile,
    Home,
    Back,
    Logistics,
    Customs,
    Administrative,
    Certification,
    AdminStats,
    AdminPost,
}

impl MenuAction {
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Registration => "menu-registration",
            Self::Operator => "menu-operator",
            Self::Services => "menu-services",
            Self::Profile => "menu-profile",
            Self::Home => "button-home",
            Self::Back => "button-back",
            Self::Logistics => "service-logistics",
            Self::Customs => "service-customs",
            Self::Administrative => "service-administrative",
            Self::Certification => "service-certification",
            Self::AdminStats => "admin-menu-stats",
            Self::AdminPost => "admin-menu-post",
        }
    }

    pub fn label(self, lang: Lang) -> String {
        i18n::t(lang, self.label_key())
    }

    /// Matches a message against the labels of `lang` (exact match after trimming)
    pub fn parse(lang: Lang, text: &str) -> Option<Self> {
        let text = text.trim();
        Self::iter().find(|action| action.label(lang) == text)
    }

    /// Buttons that only mean something inside the admin panel
    pub fn is_admin(self) -> bool {
        matches!(self, Self::AdminStats | Self::AdminPost)
    }

    /// Description shown for a service item
    pub fn service_text_key(self) -> Option<&'static str> {
        match self {
            Self::Logistics => Some("service-logistics-text"),
            Self::Customs => Some("service-customs-text"),
            Self::Administrative => Some("service-administrative-text"),
            Self::Certification => Some("service-certification-text"),
            _ => None,
        }
    }
}

/// Inline button actions, carried as short string tags in callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Language(Lang),
    DocsConfirm,
    DocsRetry,
    ProfileConfirm,
    ProfileEdit,
    PostConfirm,
    PostRetry,
}

impl CallbackAction {
    pub fn tag(self) -> String {
        match self {
            Self::Language(lang) => format!("lang:{}", lang),
            Self::DocsConfirm => "docs:confirm".to_string(),
            Self::DocsRetry => "docs:retry".to_string(),
            Self::ProfileConfirm => "profile:confirm".to_string(),
            Self::ProfileEdit => "profile:edit".to_string(),
            Self::PostConfirm => "post:confirm".to_string(),
            Self::PostRetry => "post:retry".to_string(),
        }
    }

    /// Parses a callback tag; unknown tags yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "docs:confirm" => Some(Self::DocsConfirm),
            "docs:retry" => Some(Self::DocsRetry),
            "profile:confirm" => Some(Self::ProfileConfirm),
            "profile:edit" => Some(Self::ProfileEdit),
            "post:confirm" => Some(Self::PostConfirm),
            "post:retry" => Some(Self::PostRetry),
            other => other
                .strip_prefix("lang:")
                .and_then(|code| Lang::from_str(code).ok())
                .map(Self::Language),
        }
    }
}

/// Registration questions, asked in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Name,
    Phone,
}

pub const QUESTIONS: &[Question] = &[Question::Name, Question::Phone];

impl Question {
    /// Key the answer is stored under
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => NAME_LABEL,
            Self::Phone => PHONE_LABEL,
        }
    }

    pub fn prompt_key(self) -> &'static str {
        match self {
            Self::Name => "question-name",
            Self::Phone => "question-phone",
        }
    }

    pub fn validate(self, answer: &str) -> Result<(), ValidationError> {
        match self {
            Self::Name => validate_name(answer),
            Self::Phone => validate_phone(answer).map(|_| ()),
        }
    }
}

/// Documents a registered user uploads, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSlot {
    Passport,
    TechPassport,
    CargoLicense,
}

pub const DOCUMENT_SLOTS: &[DocumentSlot] = &[
    DocumentSlot::Passport,
    DocumentSlot::TechPassport,
    DocumentSlot::CargoLicense,
];

impl DocumentSlot {
    pub fn prompt_key(self) -> &'static str {
        match self {
            Self::Passport => "document-passport",
            Self::TechPassport => "document-tech-passport",
            Self::CargoLicense => "document-cargo-license",
        }
    }
}
