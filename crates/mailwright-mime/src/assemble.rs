//! Multipart assembly: turning representations and attachments into a tree.
//!
//! | representations | attachments | root                                           |
//! |-----------------|-------------|------------------------------------------------|
//! | 1               | none        | the representation itself                      |
//! | 2+              | none        | `multipart/alternative`, ordered by preference |
//! | 1               | some        | `multipart/mixed`: representation, attachments |
//! | 2+              | some        | `multipart/mixed` with one nested alternative  |
//! | 0               | some        | `multipart/mixed` of the attachments           |

use crate::content_type::ContentType;
use crate::error::{AssemblyError, Result};
use crate::header::Headers;
use crate::message::{DEFAULT_MIME_VERSION, Leaf, Message, Multipart, Node};
use crate::order::order;
use crate::part::{Attachment, ContentPart};
use chrono::{DateTime, TimeZone};

/// Default charset applied to text parts.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Assembles representations and attachments into a message.
///
/// Representations come first: a lone representation is the first child
/// of a mixed message and an alternative group precedes the attachments.
/// The message has no headers besides `MIME-Version`; use
/// [`MessageBuilder`] to add them or to control registration order.
///
/// # Errors
///
/// Returns [`AssemblyError::Empty`] when both inputs are empty and an
/// encoding error if any body does not fit its transfer encoding.
pub fn assemble<S: AsRef<str>>(
    representations: Vec<ContentPart>,
    attachments: Vec<Attachment>,
    preference: &[S],
) -> Result<Message> {
    let mut builder = MessageBuilder::new().parts_order(preference);
    for part in representations {
        builder = builder.representation(part);
    }
    for attachment in attachments {
        builder = builder.attach(attachment);
    }
    builder.build()
}

#[derive(Debug, Clone)]
enum Entry {
    Representation(ContentPart),
    Attachment(Attachment),
}

/// Declarative builder for a [`Message`].
///
/// Representations and attachments are recorded in call order. When a
/// message has several representations, their alternative group takes the
/// position of the first representation registered, so attachments added
/// earlier come before it. A single representation is the message body and
/// is always the first child.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    headers: Headers,
    entries: Vec<Entry>,
    parts_order: Vec<String>,
    charset: String,
    content_type: Option<ContentType>,
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBuilder {
    /// Creates an empty builder with UTF-8 text parts and no ordering preference.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: Headers::new(),
            entries: Vec::new(),
            parts_order: Vec::new(),
            charset: DEFAULT_CHARSET.to_string(),
            content_type: None,
        }
    }

    /// Adds a From address.
    #[must_use]
    pub fn from(self, address: impl AsRef<str>) -> Self {
        self.address("From", address.as_ref())
    }

    /// Adds a To address.
    #[must_use]
    pub fn to(self, address: impl AsRef<str>) -> Self {
        self.address("To", address.as_ref())
    }

    /// Adds a Cc address.
    #[must_use]
    pub fn cc(self, address: impl AsRef<str>) -> Self {
        self.address("Cc", address.as_ref())
    }

    /// Adds a Bcc address.
    #[must_use]
    pub fn bcc(self, address: impl AsRef<str>) -> Self {
        self.address("Bcc", address.as_ref())
    }

    /// Adds a Reply-To address.
    #[must_use]
    pub fn reply_to(self, address: impl AsRef<str>) -> Self {
        self.address("Reply-To", address.as_ref())
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.header("Subject", subject)
    }

    /// Sets the Date header.
    #[must_use]
    pub fn date<Tz: TimeZone>(self, date: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        self.header("Date", date.to_rfc2822())
    }

    /// Sets the MIME-Version header (default `1.0`).
    #[must_use]
    pub fn mime_version(self, version: impl Into<String>) -> Self {
        self.header("MIME-Version", version)
    }

    /// Sets an arbitrary message-level header, replacing earlier values.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the charset applied to text parts that do not declare one.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Overrides the content type of the root.
    ///
    /// A single-part root takes the new type; a `multipart/*` override wraps
    /// it in that envelope. A multipart root only accepts another
    /// `multipart/*` type.
    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sets the preference list used to order alternative representations.
    #[must_use]
    pub fn parts_order<S: AsRef<str>>(mut self, preference: &[S]) -> Self {
        self.parts_order = preference.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Adds an alternative representation.
    #[must_use]
    pub fn representation(mut self, part: ContentPart) -> Self {
        self.entries.push(Entry::Representation(part));
        self
    }

    /// Adds a text/plain representation.
    #[must_use]
    pub fn text_body(self, body: impl Into<String>) -> Self {
        self.representation(ContentPart::text(body))
    }

    /// Adds a text/html representation.
    #[must_use]
    pub fn html_body(self, body: impl Into<String>) -> Self {
        self.representation(ContentPart::html(body))
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.entries.push(Entry::Attachment(attachment));
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Empty`] if nothing was added, or an encoding
    /// error if a body does not fit its transfer encoding.
    pub fn build(self) -> Result<Message> {
        let Self {
            mut headers,
            entries,
            parts_order,
            charset,
            content_type,
        } = self;

        if entries.is_empty() {
            return Err(AssemblyError::Empty.into());
        }

        let representation_count = entries
            .iter()
            .filter(|e| matches!(e, Entry::Representation(_)))
            .count();
        let has_attachments = representation_count < entries.len();

        let root = if !has_attachments && representation_count == 1 {
            let Some(Entry::Representation(part)) = entries.into_iter().next() else {
                return Err(AssemblyError::Empty.into());
            };
            let part = match &content_type {
                Some(ct) if !ct.is_multipart() => merge_content_type(part, ct),
                _ => part,
            };
            representation_leaf(part, &charset)?
        } else if !has_attachments {
            let parts = entries.into_iter().filter_map(|entry| match entry {
                Entry::Representation(part) => Some(part),
                Entry::Attachment(_) => None,
            });
            let alternatives = ordered_alternatives(parts.collect(), &parts_order, &charset)?;
            Node::Multipart(Multipart::alternative(alternatives))
        } else if representation_count > 1 {
            Node::Multipart(Multipart::mixed(group_alternatives(entries, &parts_order, &charset)?))
        } else {
            Node::Multipart(Multipart::mixed(body_first(entries, &charset)?))
        };

        let root = match (root, content_type) {
            (Node::Leaf(leaf), Some(ct)) if ct.is_multipart() => {
                Node::Multipart(Multipart::new(ct, vec![Node::Leaf(leaf)]))
            }
            (Node::Multipart(multipart), Some(ct)) if ct.is_multipart() => {
                Node::Multipart(Multipart::new(ct, multipart.into_children()))
            }
            (root, _) => root,
        };

        if !headers.contains("mime-version") {
            headers.add("MIME-Version", DEFAULT_MIME_VERSION);
        }

        Ok(Message::new(headers, root, charset))
    }

    fn address(mut self, name: &str, address: &str) -> Self {
        let value = match self.headers.get(name) {
            Some(existing) => format!("{existing}, {address}"),
            None => address.to_string(),
        };
        self.headers.set(name, value);
        self
    }
}

fn merge_content_type(part: ContentPart, content_type: &ContentType) -> ContentPart {
    let mut merged = content_type.clone();
    if merged.charset().is_none() {
        if let Some(charset) = part.content_type().charset() {
            merged.set_parameter("charset", charset);
        }
    }
    part.with_content_type(merged)
}

fn representation_leaf(mut part: ContentPart, charset: &str) -> Result<Node> {
    part.set_default_charset(charset);
    Ok(Node::Leaf(Leaf::new(part, None)?))
}

fn attachment_leaf(attachment: Attachment) -> Result<Node> {
    let (filename, part) = attachment.into_parts();
    Ok(Node::Leaf(Leaf::new(part, Some(filename))?))
}

/// Children of a mixed message with at most one representation, which goes first.
fn body_first(entries: Vec<Entry>, charset: &str) -> Result<Vec<Node>> {
    let mut body = None;
    let mut attachments = Vec::new();
    for entry in entries {
        match entry {
            Entry::Representation(part) => body = Some(representation_leaf(part, charset)?),
            Entry::Attachment(attachment) => attachments.push(attachment_leaf(attachment)?),
        }
    }
    Ok(body.into_iter().chain(attachments).collect())
}

fn ordered_alternatives(
    representations: Vec<ContentPart>,
    parts_order: &[String],
    charset: &str,
) -> Result<Vec<Node>> {
    order(representations, parts_order)
        .into_iter()
        .map(|part| representation_leaf(part, charset))
        .collect()
}

/// Children of a mixed message with several representations: one
/// alternative node sits where the first representation was registered.
fn group_alternatives(
    entries: Vec<Entry>,
    parts_order: &[String],
    charset: &str,
) -> Result<Vec<Node>> {
    let mut representations = Vec::new();
    let mut children = Vec::new();
    let mut group_slot = None;
    for entry in entries {
        match entry {
            Entry::Representation(part) => {
                group_slot.get_or_insert(children.len());
                representations.push(part);
            }
            Entry::Attachment(attachment) => children.push(attachment_leaf(attachment)?),
        }
    }

    let alternatives = ordered_alternatives(representations, parts_order, charset)?;
    children.insert(
        group_slot.unwrap_or(0),
        Node::Multipart(Multipart::alternative(alternatives)),
    );
    Ok(children)
}
