//! Mailer-wide default settings.

use crate::error::Result;
use mailwright_mime::{DEFAULT_CHARSET, DEFAULT_MIME_VERSION, DEFAULT_PARTS_ORDER};
use serde::{Deserialize, Serialize};

/// Defaults applied to every mail unless the action overrides them.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Charset for text parts.
    pub charset: String,
    /// Content type for bodies and templates that do not declare one.
    pub content_type: String,
    /// Value of the `MIME-Version` header.
    pub mime_version: String,
    /// Preference order for implicit (template) representations.
    pub implicit_parts_order: Vec<String>,
    /// Sender used when an action gives no `from`.
    pub from: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            content_type: "text/plain".to_string(),
            mime_version: DEFAULT_MIME_VERSION.to_string(),
            implicit_parts_order: DEFAULT_PARTS_ORDER.iter().map(ToString::to_string).collect(),
            from: None,
        }
    }
}

impl Defaults {
    /// Parses defaults from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
