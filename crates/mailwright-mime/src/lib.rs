//! # mailwright-mime
//!
//! MIME multipart message assembly for outgoing email.
//!
//! ## Features
//!
//! - **Assembly**: representations and attachments become a correctly
//!   nested `multipart/alternative` / `multipart/mixed` tree
//! - **Ordering**: alternative representations follow a preference list
//! - **Encoding**: Base64, Quoted-Printable, 7bit/8bit validation, RFC 2047 headers
//! - **Serialization**: deterministic RFC 2045/2046 wire bytes
//!
//! ## Quick Start
//!
//! ### Building MIME Messages
//!
//! ```
//! use mailwright_mime::MessageBuilder;
//!
//! let message = MessageBuilder::new()
//!     .from("sender@example.com")
//!     .to("recipient@example.com")
//!     .subject("Test Message")
//!     .text_body("Hello, World!")
//!     .build()?;
//!
//! assert_eq!(message.mime_type(), "text/plain");
//! # Ok::<(), mailwright_mime::Error>(())
//! ```
//!
//! ### Multipart Messages with Attachments
//!
//! ```
//! use mailwright_mime::{Attachment, ContentPart, assemble};
//!
//! let message = assemble(
//!     vec![ContentPart::text("Plain text version"), ContentPart::html("<h1>HTML version</h1>")],
//!     vec![Attachment::new("invoice.pdf", b"%PDF-1.4".to_vec())],
//!     &["text/html", "text/plain"],
//! )?;
//!
//! assert_eq!(message.mime_type(), "multipart/mixed");
//! assert_eq!(message.parts()[0].mime_type(), "multipart/alternative");
//! let wire = message.to_bytes();
//! # assert!(!wire.is_empty());
//! # Ok::<(), mailwright_mime::Error>(())
//! ```
//!
//! ### Encoding/Decoding
//!
//! ```
//! use mailwright_mime::encoding::{decode, encode};
//! use mailwright_mime::TransferEncoding;
//!
//! let encoded = encode(b"Hello, World!", TransferEncoding::Base64)?;
//! assert_eq!(encoded, b"SGVsbG8sIFdvcmxkIQ==\r\n");
//! assert_eq!(decode(&encoded, TransferEncoding::Base64)?, b"Hello, World!");
//! # Ok::<(), mailwright_mime::EncodingError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod assemble;
mod content_type;
mod error;
mod header;
mod message;
mod order;
mod part;
mod wire;

pub mod encoding;

pub use assemble::{DEFAULT_CHARSET, MessageBuilder, assemble};
pub use content_type::ContentType;
pub use encoding::TransferEncoding;
pub use error::{AssemblyError, EncodingError, Error, Result};
pub use header::Headers;
pub use message::{DEFAULT_MIME_VERSION, Leaf, Message, Multipart, Node};
pub use order::{DEFAULT_PARTS_ORDER, order};
pub use part::{Attachment, ContentPart};
