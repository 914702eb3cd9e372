//! Serialization of a [`Message`] to RFC 2045/2046 wire bytes.
//!
//! Output is deterministic: boundaries are derived from each multipart
//! node's position in the tree, so the same message always serializes to
//! the same bytes.

use crate::encoding::{encode_rfc2231, is_plain_ascii};
use crate::header::encode_value;
use crate::message::{Leaf, Message, Multipart, Node};
use std::io::{self, Write};

/// Message-level headers that are never written.
const HIDDEN_HEADERS: &[&str] = &["bcc"];

impl Message {
    /// Serializes the message to wire bytes with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        self.write_to(&mut out).unwrap_or_default();
        out
    }

    /// Writes the message in wire format.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, value) in self.headers().iter() {
            if HIDDEN_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name)) {
                continue;
            }
            write!(out, "{name}: {}\r\n", encode_value(name, value))?;
        }
        write_node(out, self.root(), "0")
    }
}

fn write_node<W: Write>(out: &mut W, node: &Node, path: &str) -> io::Result<()> {
    match node {
        Node::Leaf(leaf) => write_leaf(out, leaf),
        Node::Multipart(multipart) => write_multipart(out, multipart, path),
    }
}

fn write_leaf<W: Write>(out: &mut W, leaf: &Leaf) -> io::Result<()> {
    write!(out, "Content-Type: {}\r\n", leaf.content_type())?;
    write!(
        out,
        "Content-Transfer-Encoding: {}\r\n",
        leaf.transfer_encoding()
    )?;
    if let Some(filename) = leaf.filename() {
        write_disposition(out, filename)?;
    }
    write!(out, "{}", leaf.part().headers())?;
    out.write_all(b"\r\n")?;
    out.write_all(leaf.encoded_body())
}

/// ASCII names go in a quoted `filename`; others use the RFC 2231
/// `filename*` form.
fn write_disposition<W: Write>(out: &mut W, filename: &str) -> io::Result<()> {
    if is_plain_ascii(filename) {
        let quoted = filename.replace('\\', "\\\\").replace('"', "\\\"");
        write!(out, "Content-Disposition: attachment; filename=\"{quoted}\"\r\n")
    } else {
        write!(
            out,
            "Content-Disposition: attachment; filename*={}\r\n",
            encode_rfc2231(filename, "UTF-8")
        )
    }
}

fn write_multipart<W: Write>(out: &mut W, multipart: &Multipart, path: &str) -> io::Result<()> {
    let boundary = boundary_for(multipart, path);
    let content_type = multipart
        .content_type()
        .clone()
        .with_parameter("boundary", boundary.as_str());

    write!(out, "Content-Type: {content_type}\r\n\r\n")?;
    for (idx, child) in multipart.children().iter().enumerate() {
        write!(out, "--{boundary}\r\n")?;
        write_node(out, child, &format!("{path}.{idx}"))?;
        out.write_all(b"\r\n")?;
    }
    write!(out, "--{boundary}--\r\n")
}

/// Picks a boundary for the multipart at `path`.
///
/// The trailing `=` keeps boundaries of different nesting levels from
/// being prefixes of one another; a counter is appended while the
/// delimiter occurs in any encoded body below the node.
fn boundary_for(multipart: &Multipart, path: &str) -> String {
    let bodies: Vec<&[u8]> = multipart
        .children()
        .iter()
        .flat_map(Node::leaves)
        .map(Leaf::encoded_body)
        .collect();

    let mut attempt = 0u32;
    loop {
        let candidate = if attempt == 0 {
            format!("=_mw_{path}=")
        } else {
            format!("=_mw_{path}x{attempt}=")
        };
        let delimiter = format!("--{candidate}");
        if !bodies.iter().any(|body| contains(body, delimiter.as_bytes())) {
            return candidate;
        }
        attempt += 1;
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
