//! Ordering of alternative representations.

use crate::part::ContentPart;

/// Default preference for alternative parts: least to most faithful, as
/// RFC 2046 section 5.1.4 recommends.
pub const DEFAULT_PARTS_ORDER: &[&str] = &["text/plain", "text/enriched", "text/html"];

/// Orders parts by the position of their mime type in `preference`.
///
/// The sort is stable. Types missing from `preference` rank after every
/// listed type and keep their relative input order; matching ignores case.
#[must_use]
pub fn order<S: AsRef<str>>(parts: Vec<ContentPart>, preference: &[S]) -> Vec<ContentPart> {
    let mut ranked: Vec<(usize, ContentPart)> = parts
        .into_iter()
        .map(|part| (rank(&part.mime_type(), preference), part))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, part)| part).collect()
}

fn rank<S: AsRef<str>>(mime_type: &str, preference: &[S]) -> usize {
    preference
        .iter()
        .position(|wanted| wanted.as_ref().trim().eq_ignore_ascii_case(mime_type))
        .unwrap_or(usize::MAX)
}
