//! MIME header handling.

use crate::encoding::{encode_rfc2047, needs_encoded_words};
use std::fmt;

/// Headers whose values are address lists.
const ADDRESS_HEADERS: &[&str] = &["from", "sender", "reply-to", "to", "cc", "bcc"];

/// Ordered collection of header fields.
///
/// Names are matched case-insensitively but keep the casing they were
/// first added with. Iteration and serialization follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value, keeping any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Sets a header value.
    ///
    /// The first existing field with this name is replaced in place and any
    /// later duplicates are dropped; otherwise the field is appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(idx) => {
                self.fields[idx].1 = value;
                let mut seen = 0;
                self.fields.retain(|(n, _)| {
                    if n.eq_ignore_ascii_case(&name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.fields.push((name, value)),
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.fields[idx].1.as_str())
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Checks whether a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of header fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no header fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}

/// Writes each field as `Name: value\r\n`, RFC 2047 encoding non-ASCII text.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{name}: {}\r\n", encode_value(name, value))?;
        }
        Ok(())
    }
}

/// Encodes a header value for the wire.
///
/// In address headers only display names become encoded words; the
/// `<addr-spec>` stays literal. Other values are treated as unstructured
/// text and only runs of words that need it are encoded.
#[must_use]
pub(crate) fn encode_value(name: &str, value: &str) -> String {
    if !needs_encoded_words(value) {
        return value.to_string();
    }

    if ADDRESS_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)) {
        split_addresses(value)
            .into_iter()
            .map(encode_address)
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        encode_unstructured(value)
    }
}

fn encode_address(address: &str) -> String {
    let Some(open) = address.rfind('<') else {
        return address.to_string();
    };
    let phrase = address[..open].trim();
    let addr_spec = &address[open..];
    if phrase.is_empty() {
        return addr_spec.to_string();
    }

    let unquoted = phrase
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .map_or_else(|| phrase.to_string(), |p| p.replace("\\\"", "\"").replace("\\\\", "\\"));
    if needs_encoded_words(&unquoted) {
        format!("{} {addr_spec}", encode_rfc2047(&unquoted, "UTF-8"))
    } else {
        format!("{phrase} {addr_spec}")
    }
}

fn encode_unstructured(value: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for word in value.split(' ') {
        if needs_encoded_words(word) {
            run.push(word);
            continue;
        }
        if !run.is_empty() {
            segments.push(encode_rfc2047(&run.join(" "), "UTF-8"));
            run.clear();
        }
        segments.push(word.to_string());
    }
    if !run.is_empty() {
        segments.push(encode_rfc2047(&run.join(" "), "UTF-8"));
    }

    segments.join(" ")
}

/// Splits an address list on the commas that separate its entries.
///
/// Commas inside quoted strings, comments and angle brackets belong to the
/// address. Entries are trimmed and empty ones dropped.
#[must_use]
pub(crate) fn split_addresses(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    let mut comment_depth = 0usize;
    let mut angle_depth = 0usize;

    for (idx, ch) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if quoted || comment_depth > 0 => escaped = true,
            '"' if comment_depth == 0 => quoted = !quoted,
            '(' if !quoted => comment_depth += 1,
            ')' if !quoted => comment_depth = comment_depth.saturating_sub(1),
            '<' if !quoted && comment_depth == 0 => angle_depth += 1,
            '>' if !quoted && comment_depth == 0 => angle_depth = angle_depth.saturating_sub(1),
            ',' if !quoted && comment_depth == 0 && angle_depth == 0 => {
                entries.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}
