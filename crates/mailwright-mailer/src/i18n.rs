//! Translation lookup for subjects.

use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Looks up translated strings by locale and dotted key.
pub trait Translator: Send + Sync {
    /// Returns the translation of `key` (e.g. `actionmailer.base.welcome.subject`).
    fn translate(&self, locale: &str, key: &str) -> Option<String>;
}

/// In-memory translation store holding one nested JSON tree per locale.
///
/// ```
/// use mailwright_mailer::{Translations, Translator};
/// use serde_json::json;
///
/// let mut translations = Translations::new();
/// translations.store("en", json!({"actionmailer": {"base": {"welcome": {"subject": "Hi"}}}}));
/// assert_eq!(
///     translations.translate("en", "actionmailer.base.welcome.subject").as_deref(),
///     Some("Hi")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translations {
    locales: HashMap<String, Value>,
}

impl Translations {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a store from JSON keyed by locale at the top level.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let all: Map<String, Value> = serde_json::from_str(json)?;
        let mut translations = Self::new();
        for (locale, tree) in all {
            translations.store(&locale, tree);
        }
        Ok(translations)
    }

    /// Deep-merges `tree` into the translations for `locale`.
    pub fn store(&mut self, locale: &str, tree: Value) {
        match self.locales.get_mut(locale) {
            Some(existing) => deep_merge(existing, tree),
            None => {
                self.locales.insert(locale.to_string(), tree);
            }
        }
    }

    /// Removes every translation.
    pub fn clear(&mut self) {
        self.locales.clear();
    }
}

impl Translator for Translations {
    fn translate(&self, locale: &str, key: &str) -> Option<String> {
        let mut node = self.locales.get(locale)?;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        node.as_str().map(str::to_string)
    }
}

fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Turns an action name into a sentence: `implicit_multipart` becomes
/// `Implicit multipart`.
pub(crate) fn humanize(name: &str) -> String {
    let spaced = name.trim_end_matches("_id").replace('_', " ");
    let mut chars = spaced.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}
