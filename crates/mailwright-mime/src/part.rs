//! Leaf content: representations and attachments.

use crate::content_type::ContentType;
use crate::encoding::{self, TransferEncoding};
use crate::error::{EncodingError, Result};
use crate::header::Headers;
use std::borrow::Cow;

/// One leaf unit of message content.
///
/// The body is held raw; it is transfer-encoded when the part is placed
/// into a [`Message`](crate::Message). Text bodies are sent with CRLF line
/// ends. Without an explicit transfer
/// encoding one is chosen from the body: 7bit for short-lined ASCII text,
/// quoted-printable for other text and base64 for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    content_type: ContentType,
    body: Vec<u8>,
    transfer_encoding: Option<TransferEncoding>,
    headers: Headers,
}

impl ContentPart {
    /// Creates a part with the given content type and raw body.
    #[must_use]
    pub fn new(content_type: ContentType, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type,
            body: body.into(),
            transfer_encoding: None,
            headers: Headers::new(),
        }
    }

    /// Creates a part from a `type/subtype[; params]` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type cannot be parsed.
    pub fn parse(content_type: &str, body: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::new(ContentType::parse(content_type)?, body))
    }

    /// Creates a text/plain part.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(ContentType::text_plain(), body.into())
    }

    /// Creates a text/html part.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(ContentType::text_html(), body.into())
    }

    /// Declares the transfer encoding instead of letting one be chosen.
    #[must_use]
    pub fn with_transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.transfer_encoding = Some(encoding);
        self
    }

    /// Adds a content-type parameter such as `charset`.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.content_type.set_parameter(key, value);
        self
    }

    /// Replaces the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Adds an extra header to this part (e.g. `Content-ID`).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        self.content_type.essence()
    }

    /// Returns the raw (unencoded) body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the extra headers of this part.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the declared transfer encoding, or the one chosen for the body.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.transfer_encoding
            .unwrap_or_else(|| suggest_encoding(&self.content_type, &self.canonical_body()))
    }

    /// Transfer-encodes the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is incompatible with the encoding.
    pub fn encode(&self) -> std::result::Result<Vec<u8>, EncodingError> {
        encoding::encode(&self.canonical_body(), self.transfer_encoding())
    }

    fn canonical_body(&self) -> Cow<'_, [u8]> {
        if self.content_type.is_text() {
            encoding::normalize_line_endings(&self.body)
        } else {
            Cow::Borrowed(&self.body)
        }
    }

    pub(crate) fn set_default_charset(&mut self, charset: &str) {
        if self.content_type.is_text() && self.content_type.charset().is_none() {
            self.content_type.set_parameter("charset", charset);
        }
    }
}

fn suggest_encoding(content_type: &ContentType, body: &[u8]) -> TransferEncoding {
    if !content_type.is_text() {
        TransferEncoding::Base64
    } else if encoding::check_seven_bit(body).is_ok() {
        TransferEncoding::SevenBit
    } else {
        TransferEncoding::QuotedPrintable
    }
}

/// A named file part, always rendered with `Content-Disposition: attachment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    part: ContentPart,
}

impl Attachment {
    /// Creates an attachment whose content type is guessed from the file
    /// name and which is sent base64 encoded.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let part = ContentPart::new(ContentType::from_filename(&filename), data)
            .with_transfer_encoding(TransferEncoding::Base64);
        Self { filename, part }
    }

    /// Creates an attachment from data that is already transfer-encoded.
    ///
    /// The data is decoded so that the attachment holds the raw bytes; it
    /// will be sent with the same encoding. Base64 data is read leniently
    /// (see [`encoding::decode_base64_lenient`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid for the encoding.
    pub fn from_encoded(
        filename: impl Into<String>,
        encoded: &[u8],
        transfer_encoding: TransferEncoding,
    ) -> std::result::Result<Self, EncodingError> {
        let data = match transfer_encoding {
            TransferEncoding::Base64 => encoding::decode_base64_lenient(encoded)?,
            other => encoding::decode(encoded, other)?,
        };
        Ok(Self::new(filename, data).with_transfer_encoding(transfer_encoding))
    }

    /// Overrides the guessed content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.part = self.part.with_content_type(content_type);
        self
    }

    /// Overrides the transfer encoding.
    #[must_use]
    pub fn with_transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.part = self.part.with_transfer_encoding(encoding);
        self
    }

    /// Returns the file name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the underlying content part.
    #[must_use]
    pub const fn part(&self) -> &ContentPart {
        &self.part
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        self.part.mime_type()
    }

    pub(crate) fn into_parts(self) -> (String, ContentPart) {
        (self.filename, self.part)
    }
}
