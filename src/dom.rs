//! Thin adapter over `dom_query` for the operations article extraction needs.
//!
//! Keeps the extraction code free of raw node plumbing: tag names come back
//! lowercase, text comes back as `StrTendril` (reference-counted, cheap to
//! pass around), and attribute listing is flattened to plain pairs.

pub use dom_query::{Document, Selection};
pub use tendril::StrTendril;

/// Tag name of the first node in the selection, lowercase.
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_lowercase())
}

/// All text content of the selection and its descendants.
///
/// Returns `StrTendril`; use `.to_string()` only when owned storage is
/// needed.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Text length with whitespace runs collapsed, in characters.
///
/// Raw DOM text is full of indentation; collapsing before measuring keeps
/// candidate scoring stable across formatting styles.
#[must_use]
pub fn collapsed_text_len(sel: &Selection) -> usize {
    let text = sel.text();
    let mut len = 0;
    let mut in_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                len += 1;
                in_space = true;
            }
        } else {
            len += 1;
            in_space = false;
        }
    }
    if in_space && len > 0 {
        len -= 1;
    }
    len
}

/// Attributes of a node as owned name/value pairs.
#[must_use]
pub fn attribute_pairs(node: &dom_query::NodeRef) -> Vec<(String, String)> {
    node.attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}
