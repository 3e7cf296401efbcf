use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::types::Lang;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "uz",
        // Telegram renders bidi isolation marks around placeables as garbage
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| langid(Lang::default()));

/// Maps a language to its Fluent identifier.
pub fn langid(lang: Lang) -> LanguageIdentifier {
    lang.as_ref().parse().unwrap_or_default()
}

/// Returns a localized string for the given key.
/// Converts literal `\n` sequences to actual newlines for proper Telegram formatting.
pub fn t(lang: Lang, key: &str) -> String {
    let id = langid(lang);
    let text = LOCALES
        .lookup(&id, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()));
    text.replace("\\n", "\n")
}

/// Returns a localized string with arguments for interpolation.
pub fn t_args(lang: Lang, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> = args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    let id = langid(lang);
    let text = LOCALES.lookup_with_args(&id, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    });
    text.replace("\\n", "\n")
}
