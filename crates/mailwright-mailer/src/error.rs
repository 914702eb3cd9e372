//! Error types for the mailer layer.

use thiserror::Error;

/// Errors that can occur while building or delivering mail.
#[derive(Debug, Error)]
pub enum Error {
    /// MIME assembly or encoding failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailwright_mime::Error),

    /// No action with this name exists on the mailer.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The action returned without calling `mail`.
    #[error("Action {0} did not call mail()")]
    MailNotCalled(String),

    /// No template was found in any view path.
    #[error("Missing template {mailer}/{action}{}", format_suffix(.format))]
    MissingTemplate {
        /// Mailer name.
        mailer: String,
        /// Action name.
        action: String,
        /// Requested mime type, for explicit formats.
        format: Option<String>,
    },

    /// The message has no To, Cc or Bcc recipient.
    #[error("No recipients specified")]
    MissingRecipient,

    /// Configuration or translation data could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mailwright_mime::EncodingError> for Error {
    fn from(err: mailwright_mime::EncodingError) -> Self {
        Self::Mime(err.into())
    }
}

fn format_suffix(format: &Option<String>) -> String {
    format.as_ref().map(|f| format!(" ({f})")).unwrap_or_default()
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
