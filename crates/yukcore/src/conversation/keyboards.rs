//! Keyboard layouts

use strum::IntoEnumIterator;

use crate::conversation::menu::{CallbackAction, MenuAction};
use crate::core::types::Lang;
use crate::i18n;
use crate::transport::{InlineButton, Keyboard};

fn reply(lang: Lang, rows: &[&[MenuAction]]) -> Keyboard {
    Keyboard::Reply(
        rows.iter()
            .map(|row| row.iter().map(|action| action.label(lang)).collect())
            .collect(),
    )
}

/// One button per supported language, each labelled in its own language
pub fn language_menu() -> Keyboard {
    Keyboard::Inline(
        Lang::iter()
            .map(|lang| vec![InlineButton::new(i18n::t(lang, "lang-name"), CallbackAction::Language(lang))])
            .collect(),
    )
}

pub fn main_menu(lang: Lang) -> Keyboard {
    reply(
        lang,
        &[
            &[MenuAction::Registration, MenuAction::Operator],
            &[MenuAction::Services, MenuAction::Profile],
        ],
    )
}

/// Home/Back row shown while a flow is collecting input
pub fn navigation(lang: Lang) -> Keyboard {
    reply(lang, &[&[MenuAction::Home, MenuAction::Back]])
}

pub fn services(lang: Lang) -> Keyboard {
    reply(
        lang,
        &[
            &[MenuAction::Logistics],
            &[MenuAction::Customs],
            &[MenuAction::Administrative],
            &[MenuAction::Certification],
            &[MenuAction::Home, MenuAction::Back],
        ],
    )
}

pub fn admin_menu(lang: Lang) -> Keyboard {
    reply(
        lang,
        &[
            &[MenuAction::AdminStats, MenuAction::AdminPost],
            &[MenuAction::Home, MenuAction::Back],
        ],
    )
}

/// Confirm/edit pair attached to a summary or preview
pub fn confirm_retry(lang: Lang, confirm: CallbackAction, retry: CallbackAction) -> Keyboard {
    Keyboard::Inline(vec![vec![
        InlineButton::new(i18n::t(lang, "button-confirm"), confirm),
        InlineButton::new(i18n::t(lang, "button-retry"), retry),
    ]])
}
