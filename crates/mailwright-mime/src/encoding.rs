//! Content transfer encodings (RFC 2045) and RFC 2047 header words.
//!
//! [`encode`] and [`decode`] are the body-level entry points; the helpers
//! below them are public for callers that need a single encoding.

use crate::error::{EncodingError, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use std::borrow::Cow;
use std::fmt;

/// Maximum encoded line length for Base64 and Quoted-Printable bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Maximum line length for 7bit and 8bit bodies (RFC 5322 section 2.1.1).
const MAX_OCTETS_PER_LINE: usize = 998;

/// Raw bytes per RFC 2047 encoded word, keeping each word under 75 chars.
const ENCODED_WORD_CHUNK: usize = 45;

/// Base64 engine for data supplied already encoded: padding is optional and
/// non-zero trailing bits are accepted.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Characters allowed unescaped in an RFC 2231 extended parameter value.
const ATTRIBUTE_CHARS: &[u8] = b"!#$&+-.^_`|~";

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "7bit"))]
    SevenBit,
    /// 8-bit text.
    #[cfg_attr(feature = "serde", serde(rename = "8bit"))]
    EightBit,
    /// Base64 encoding.
    #[cfg_attr(feature = "serde", serde(rename = "base64"))]
    Base64,
    /// Quoted-Printable encoding.
    #[cfg_attr(feature = "serde", serde(rename = "quoted-printable"))]
    QuotedPrintable,
    /// Binary (no encoding).
    #[cfg_attr(feature = "serde", serde(rename = "binary"))]
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Returns the header token for this encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes a body for transport with the given transfer encoding.
///
/// Base64 output is wrapped at 76 characters and every line, including
/// the last, ends in CRLF. 7bit and 8bit bodies are validated and passed
/// through unchanged.
///
/// # Errors
///
/// Returns an [`EncodingError`] if the body cannot be carried by a 7bit or
/// 8bit encoding.
pub fn encode(
    body: &[u8],
    encoding: TransferEncoding,
) -> std::result::Result<Vec<u8>, EncodingError> {
    match encoding {
        TransferEncoding::Base64 => Ok(encode_base64_lines(body).into_bytes()),
        TransferEncoding::QuotedPrintable => Ok(encode_quoted_printable(body).into_bytes()),
        TransferEncoding::SevenBit => {
            check_seven_bit(body)?;
            Ok(body.to_vec())
        }
        TransferEncoding::EightBit => {
            check_eight_bit(body)?;
            Ok(body.to_vec())
        }
        TransferEncoding::Binary => Ok(body.to_vec()),
    }
}

/// Decodes a transfer-encoded body back to its raw bytes.
///
/// # Errors
///
/// Returns an [`EncodingError`] if the input is malformed for the encoding.
pub fn decode(
    encoded: &[u8],
    encoding: TransferEncoding,
) -> std::result::Result<Vec<u8>, EncodingError> {
    match encoding {
        TransferEncoding::Base64 => decode_base64(encoded),
        TransferEncoding::QuotedPrintable => decode_quoted_printable(encoded),
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
            Ok(encoded.to_vec())
        }
    }
}

/// Encodes data as a single unwrapped Base64 string.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 in CRLF-terminated lines of at most 76 chars.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let line_count = encoded.len() / MAX_LINE_LENGTH + 1;
    let mut result = String::with_capacity(encoded.len() + line_count * 2);
    // Base64 output is pure ASCII, so byte chunks are valid char boundaries.
    for line in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        result.extend(line.iter().map(|&b| b as char));
        result.push_str("\r\n");
    }
    result
}

/// Decodes Base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &[u8]) -> std::result::Result<Vec<u8>, EncodingError> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Base64 data the way mail clients read hand-written attachment
/// data.
///
/// Characters outside the Base64 alphabet are skipped and decoding stops at
/// the first `=`. A trailing group of fewer than four characters is decoded
/// only when it was padded; an unpadded incomplete group is dropped, so
/// `"you smiling"` decodes the eight characters `yousmili`.
///
/// # Errors
///
/// Returns an error if the cleaned input still cannot be decoded.
pub fn decode_base64_lenient(data: &[u8]) -> std::result::Result<Vec<u8>, EncodingError> {
    let padded = data.contains(&b'=');
    let mut cleaned: Vec<u8> = data
        .iter()
        .copied()
        .take_while(|&b| b != b'=')
        .filter(|&b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
        .collect();

    let remainder = cleaned.len() % 4;
    if !padded || remainder == 1 {
        cleaned.truncate(cleaned.len() - remainder);
    }
    LENIENT.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045 section 6.7).
///
/// Only CRLF is treated as a hard line break; a bare CR or LF is escaped so
/// that decoding reproduces the input exactly.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() + data.len() / 4);
    let mut line_length = 0;
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];

        if byte == b'\r' && data.get(i + 1) == Some(&b'\n') {
            result.push_str("\r\n");
            line_length = 0;
            i += 2;
            continue;
        }

        let at_line_end = i + 1 == data.len()
            || (data[i + 1] == b'\r' && data.get(i + 2) == Some(&b'\n'));
        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            b' ' | b'\t' => !at_line_end,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // Leave room for the trailing '=' of a soft line break
        if line_length + width > MAX_LINE_LENGTH - 1 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        if literal {
            result.push(byte as char);
        } else {
            push_hex_escape(&mut result, '=', byte);
        }
        line_length += width;
        i += 1;
    }

    result
}

fn push_hex_escape(out: &mut String, marker: char, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push(marker);
    out.push(HEX[usize::from(byte >> 4)] as char);
    out.push(HEX[usize::from(byte & 0x0F)] as char);
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(data: &[u8]) -> std::result::Result<Vec<u8>, EncodingError> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'=' {
            result.push(data[i]);
            i += 1;
            continue;
        }

        match (data.get(i + 1), data.get(i + 2)) {
            // Soft line break
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => {
                let byte = hex_value(hi)
                    .zip(hex_value(lo))
                    .map(|(high, low)| (high << 4) | low)
                    .ok_or_else(|| {
                        EncodingError::QuotedPrintable(format!(
                            "invalid escape ={}{}",
                            hi as char, lo as char
                        ))
                    })?;
                result.push(byte);
                i += 3;
            }
            _ => {
                return Err(EncodingError::QuotedPrintable(
                    "incomplete escape sequence".to_string(),
                ));
            }
        }
    }

    Ok(result)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Converts bare CR and bare LF line ends to CRLF.
///
/// Text bodies are sent in this canonical form whatever their transfer
/// encoding.
#[must_use]
pub fn normalize_line_endings(body: &[u8]) -> Cow<'_, [u8]> {
    let bare = body.iter().enumerate().any(|(i, &b)| match b {
        b'\n' => i == 0 || body[i - 1] != b'\r',
        b'\r' => body.get(i + 1) != Some(&b'\n'),
        _ => false,
    });
    if !bare {
        return Cow::Borrowed(body);
    }

    let mut out = Vec::with_capacity(body.len() + body.len() / 16);
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\r' => {
                out.extend_from_slice(b"\r\n");
                if body.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            byte => out.push(byte),
        }
        i += 1;
    }
    Cow::Owned(out)
}

/// Checks that a body can travel as 7bit: ASCII only, no NUL, short lines.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_seven_bit(body: &[u8]) -> std::result::Result<(), EncodingError> {
    if let Some(offset) = body.iter().position(|b| !b.is_ascii()) {
        return Err(EncodingError::NonAscii {
            offset,
            byte: body[offset],
        });
    }
    check_eight_bit(body)
}

/// Checks that a body can travel as 8bit: no NUL, short lines.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_eight_bit(body: &[u8]) -> std::result::Result<(), EncodingError> {
    if let Some(offset) = body.iter().position(|&b| b == 0) {
        return Err(EncodingError::NulByte { offset });
    }

    for (line, content) in body.split(|&b| b == b'\n').enumerate() {
        let length = content.strip_suffix(b"\r").unwrap_or(content).len();
        if length > MAX_OCTETS_PER_LINE {
            return Err(EncodingError::LineTooLong { line, length });
        }
    }

    Ok(())
}

/// Checks whether text is printable ASCII.
pub(crate) fn is_plain_ascii(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}

/// Checks whether a header value has to be written as encoded words.
pub(crate) fn needs_encoded_words(text: &str) -> bool {
    !is_plain_ascii(text) || text.contains("=?")
}

/// Encodes a header value using RFC 2047 encoding.
///
/// Format: `=?charset?B?encoded-text?=`. Values that are plain ASCII are
/// returned unchanged; longer values are split into several encoded words
/// joined by folding whitespace.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if !needs_encoded_words(text) {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk_start = 0;
    for (idx, ch) in text.char_indices() {
        if idx + ch.len_utf8() - chunk_start > ENCODED_WORD_CHUNK {
            words.push(&text[chunk_start..idx]);
            chunk_start = idx;
        }
    }
    words.push(&text[chunk_start..]);

    words
        .into_iter()
        .map(|word| format!("=?{charset}?B?{}?=", encode_base64(word.as_bytes())))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

/// Encodes a parameter value as an RFC 2231 extended value,
/// `charset''percent-encoded`, for use as `name*=value`.
#[must_use]
pub fn encode_rfc2231(value: &str, charset: &str) -> String {
    let mut result = format!("{charset}''");
    for &byte in value.as_bytes() {
        if byte.is_ascii_alphanumeric() || ATTRIBUTE_CHARS.contains(&byte) {
            result.push(byte as char);
        } else {
            push_hex_escape(&mut result, '%', byte);
        }
    }
    result
}

/// Decodes an RFC 2047 encoded header value.
///
/// Encoded words separated only by whitespace are concatenated; any other
/// text is kept as is.
///
/// # Errors
///
/// Returns an error if an encoded word is malformed or not UTF-8.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let mut result = String::new();
    let mut previous_was_word = false;

    for token in text.split_whitespace() {
        match decode_encoded_word(token)? {
            Some(decoded) => {
                if !result.is_empty() && !previous_was_word {
                    result.push(' ');
                }
                result.push_str(&decoded);
                previous_was_word = true;
            }
            None => {
                if !result.is_empty() {
                    result.push(' ');
                }
                result.push_str(token);
                previous_was_word = false;
            }
        }
    }

    Ok(result)
}

fn decode_encoded_word(token: &str) -> Result<Option<String>> {
    let Some(inner) = token.strip_prefix("=?").and_then(|t| t.strip_suffix("?=")) else {
        return Ok(None);
    };

    let parts: Vec<&str> = inner.split('?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(EncodingError::EncodedWord(token.to_string()).into());
    };

    let bytes = match encoding.to_uppercase().as_str() {
        "B" => decode_base64(encoded_text.as_bytes())?,
        // Q encoding uses underscore for space
        "Q" => decode_quoted_printable(encoded_text.replace('_', " ").as_bytes())?,
        other => {
            return Err(EncodingError::EncodedWord(format!("unknown encoding {other}")).into());
        }
    };

    Ok(Some(String::from_utf8(bytes)?))
}
