//! MIME message structure.

use crate::content_type::ContentType;
use crate::encoding::TransferEncoding;
use crate::error::{EncodingError, Result};
use crate::header::{Headers, split_addresses};
use crate::part::ContentPart;
use chrono::{DateTime, FixedOffset};

/// Default value of the `MIME-Version` header.
pub const DEFAULT_MIME_VERSION: &str = "1.0";

/// A leaf of the message tree: a content part with its encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    part: ContentPart,
    filename: Option<String>,
    encoded: Vec<u8>,
}

impl Leaf {
    pub(crate) fn new(
        part: ContentPart,
        filename: Option<String>,
    ) -> std::result::Result<Self, EncodingError> {
        let encoded = part.encode()?;
        Ok(Self {
            part,
            filename,
            encoded,
        })
    }

    /// Returns the underlying content part.
    #[must_use]
    pub const fn part(&self) -> &ContentPart {
        &self.part
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        self.part.content_type()
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        self.part.mime_type()
    }

    /// Returns the transfer encoding used for the body.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.part.transfer_encoding()
    }

    /// Returns the attachment file name, if this leaf is an attachment.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Checks whether this leaf is rendered as an attachment.
    #[must_use]
    pub const fn is_attachment(&self) -> bool {
        self.filename.is_some()
    }

    /// Returns the body as it goes on the wire.
    #[must_use]
    pub fn encoded_body(&self) -> &[u8] {
        &self.encoded
    }

    /// Returns the decoded body.
    #[must_use]
    pub fn decoded_body(&self) -> &[u8] {
        self.part.body()
    }

    /// Returns the decoded body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn body_text(&self) -> Result<String> {
        String::from_utf8(self.part.body().to_vec()).map_err(Into::into)
    }
}

/// A `multipart/*` node and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    content_type: ContentType,
    children: Vec<Node>,
}

impl Multipart {
    pub(crate) const fn new(content_type: ContentType, children: Vec<Node>) -> Self {
        Self {
            content_type,
            children,
        }
    }

    pub(crate) fn mixed(children: Vec<Node>) -> Self {
        Self::new(ContentType::new("multipart", "mixed"), children)
    }

    pub(crate) fn alternative(children: Vec<Node>) -> Self {
        Self::new(ContentType::new("multipart", "alternative"), children)
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Returns the content type (without boundary; boundaries are chosen
    /// when the message is serialized).
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Returns the child nodes in order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// A node of the message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single content part or attachment.
    Leaf(Leaf),
    /// A multipart envelope.
    Multipart(Multipart),
}

impl Node {
    /// Returns the content type of this node.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        match self {
            Self::Leaf(leaf) => leaf.content_type(),
            Self::Multipart(multipart) => multipart.content_type(),
        }
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        self.content_type().essence()
    }

    /// Returns the children of a multipart node; empty for a leaf.
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        match self {
            Self::Leaf(_) => &[],
            Self::Multipart(multipart) => multipart.children(),
        }
    }

    /// Returns the leaf if this node is one.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Multipart(_) => None,
        }
    }

    /// Returns the encoded body of a leaf node.
    #[must_use]
    pub fn encoded_body(&self) -> Option<&[u8]> {
        self.as_leaf().map(Leaf::encoded_body)
    }

    /// Returns every leaf below (or at) this node in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Multipart(multipart) => {
                for child in &multipart.children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// An assembled MIME message: message-level headers and a root node.
///
/// Messages are produced by [`MessageBuilder`](crate::MessageBuilder) or
/// [`assemble`](crate::assemble) and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: Headers,
    root: Node,
    charset: String,
}

impl Message {
    pub(crate) const fn new(headers: Headers, root: Node, charset: String) -> Self {
        Self {
            headers,
            root,
            charset,
        }
    }

    /// Returns the message-level headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the first value of a message-level header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the content type of the root node.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        self.root.content_type()
    }

    /// Returns the lowercased `type/subtype` of the root node.
    #[must_use]
    pub fn mime_type(&self) -> String {
        self.root.mime_type()
    }

    /// Checks if the root is a multipart envelope.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.root, Node::Multipart(_))
    }

    /// Returns the root's children; empty for a single-part message.
    #[must_use]
    pub fn parts(&self) -> &[Node] {
        self.root.parts()
    }

    /// Returns the encoded body of a single-part message.
    #[must_use]
    pub fn encoded_body(&self) -> Option<&[u8]> {
        self.root.encoded_body()
    }

    /// Returns every attachment in document order.
    #[must_use]
    pub fn attachments(&self) -> Vec<&Leaf> {
        self.root
            .leaves()
            .into_iter()
            .filter(|leaf| leaf.is_attachment())
            .collect()
    }

    /// Finds an attachment by file name.
    #[must_use]
    pub fn attachment(&self, filename: &str) -> Option<&Leaf> {
        self.attachments()
            .into_iter()
            .find(|leaf| leaf.filename() == Some(filename))
    }

    /// Returns the charset applied to text parts.
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Gets the From addresses.
    #[must_use]
    pub fn from(&self) -> Vec<&str> {
        self.addresses("from")
    }

    /// Gets the To addresses.
    #[must_use]
    pub fn to(&self) -> Vec<&str> {
        self.addresses("to")
    }

    /// Gets the Cc addresses.
    #[must_use]
    pub fn cc(&self) -> Vec<&str> {
        self.addresses("cc")
    }

    /// Gets the Bcc addresses. Bcc is never written to the wire.
    #[must_use]
    pub fn bcc(&self) -> Vec<&str> {
        self.addresses("bcc")
    }

    /// Gets the Reply-To addresses.
    #[must_use]
    pub fn reply_to(&self) -> Vec<&str> {
        self.addresses("reply-to")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the Date header, parsed as RFC 2822.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.headers
            .get("date")
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
    }

    /// Gets the MIME-Version header.
    #[must_use]
    pub fn mime_version(&self) -> &str {
        self.headers
            .get("mime-version")
            .unwrap_or(DEFAULT_MIME_VERSION)
    }

    /// Gets the Message-ID header.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.headers.get("message-id")
    }

    fn addresses(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .into_iter()
            .flat_map(split_addresses)
            .collect()
    }
}
