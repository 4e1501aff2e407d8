//! Null-flavor sanitization
//!
//! HL7 marks missing data with a `nullFlavor` instead of leaving it out. The
//! sanitizer removes those markers and collapses every subtree that is left
//! with no content, so downstream mapping can treat "absent" uniformly:
//!
//! - a sequence keeps its surviving items in order (an empty sequence is kept)
//! - an element drops its null flavor, drops entries that sanitize to nothing,
//!   and disappears itself when no entry survives
//! - scalars are returned unchanged
//!
//! A null flavor never vetoes its siblings. `<code nullFlavor="OTH">` with a
//! `translation` child keeps the translation.

use crate::node::{CcdaNode, Element};

/// Strip null-flavor markers from `node`.
///
/// Returns `None` when nothing informative is left. The result is a new,
/// independently owned tree.
pub fn sanitize(node: &CcdaNode) -> Option<CcdaNode> {
    match node {
        CcdaNode::Scalar(_) => Some(node.clone()),
        CcdaNode::Sequence(items) => Some(CcdaNode::Sequence(
            items.iter().filter_map(sanitize).collect(),
        )),
        CcdaNode::Element(element) => sanitize_element(element).map(CcdaNode::Element),
    }
}

/// [`sanitize`] for values that may already be absent.
pub fn sanitize_opt(node: Option<&CcdaNode>) -> Option<CcdaNode> {
    node.and_then(sanitize)
}

/// Sanitize a single element.
pub fn sanitize_element(element: &Element) -> Option<Element> {
    let mut result = Element::new();
    for (key, value) in element.entries() {
        if let Some(clean) = sanitize(value) {
            result.insert(key.clone(), clean);
        }
    }

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

/// `true` when `node` carries no information once null flavors are removed.
pub fn is_null_flavored(node: &CcdaNode) -> bool {
    sanitize(node).is_none()
}
