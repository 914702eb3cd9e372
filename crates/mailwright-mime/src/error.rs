//! Error types for MIME operations.

use std::string::FromUtf8Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message could not be assembled.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// A body is incompatible with its transfer encoding.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}

/// Failure to build a message tree from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    /// Neither representations nor attachments were supplied.
    #[error("Nothing to assemble: no representations and no attachments")]
    Empty,
}

/// Body bytes that cannot be carried by the declared transfer encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// A byte outside US-ASCII in a 7bit body.
    #[error("Non-ASCII byte 0x{byte:02X} at offset {offset} in 7bit body")]
    NonAscii {
        /// Offset of the offending byte.
        offset: usize,
        /// The offending byte.
        byte: u8,
    },

    /// A NUL byte in a 7bit or 8bit body.
    #[error("NUL byte at offset {offset}")]
    NulByte {
        /// Offset of the NUL byte.
        offset: usize,
    },

    /// A line longer than RFC 5322 allows.
    #[error("Line {line} is {length} octets long (limit 998)")]
    LineTooLong {
        /// Zero-based line number.
        line: usize,
        /// Line length in octets, excluding the line break.
        length: usize,
    },

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Malformed quoted-printable input.
    #[error("Invalid quoted-printable: {0}")]
    QuotedPrintable(String),

    /// Malformed RFC 2047 encoded word.
    #[error("Invalid encoded word: {0}")]
    EncodedWord(String),
}
