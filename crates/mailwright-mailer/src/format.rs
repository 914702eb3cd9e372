//! Explicit representation declarations.

/// A representation format an action can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `text/plain`
    Text,
    /// `text/html`
    Html,
    /// `text/enriched`
    Enriched,
}

impl Format {
    /// Returns the mime type of this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Enriched => "text/enriched",
        }
    }

    /// Returns the template file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Enriched => "enriched",
        }
    }

    /// Parses a template file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "text" | "txt" => Some(Self::Text),
            "html" => Some(Self::Html),
            "enriched" => Some(Self::Enriched),
            _ => None,
        }
    }

    /// Finds the format with the given mime type.
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        [Self::Text, Self::Html, Self::Enriched]
            .into_iter()
            .find(|f| f.mime_type().eq_ignore_ascii_case(mime_type))
    }
}

/// One declared representation: a format and, optionally, its body.
///
/// Without a body the format's template is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declared {
    pub(crate) format: Format,
    pub(crate) body: Option<String>,
}

/// Collects the representations declared inside
/// [`Context::mail_with`](crate::Context::mail_with).
///
/// Declaration order is kept; the mailer's parts order does not apply.
#[derive(Debug, Default)]
pub struct FormatCollector {
    declared: Vec<Declared>,
}

impl FormatCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declares a `text/plain` representation rendered from its template.
    pub fn text(&mut self) -> &mut Self {
        self.push(Format::Text, None)
    }

    /// Declares a `text/plain` representation with the given body.
    pub fn text_with(&mut self, body: impl Into<String>) -> &mut Self {
        self.push(Format::Text, Some(body.into()))
    }

    /// Declares a `text/html` representation rendered from its template.
    pub fn html(&mut self) -> &mut Self {
        self.push(Format::Html, None)
    }

    /// Declares a `text/html` representation with the given body.
    pub fn html_with(&mut self, body: impl Into<String>) -> &mut Self {
        self.push(Format::Html, Some(body.into()))
    }

    /// Declares a `text/enriched` representation rendered from its template.
    pub fn enriched(&mut self) -> &mut Self {
        self.push(Format::Enriched, None)
    }

    /// Declares one representation per format, all with the same body.
    pub fn any(&mut self, formats: &[Format], body: impl Into<String>) -> &mut Self {
        let body = body.into();
        for &format in formats {
            self.push(format, Some(body.clone()));
        }
        self
    }

    pub(crate) fn into_declared(self) -> Vec<Declared> {
        self.declared
    }

    fn push(&mut self, format: Format, body: Option<String>) -> &mut Self {
        self.declared.push(Declared { format, body });
        self
    }
}
