#![forbid(unsafe_code)]

//! Drag handle resolution.
//!
//! A source may restrict which of its descendants can begin a gesture. The
//! restriction belongs to the nearest source only: handles of a nested
//! source never count for the outer one.
//!
//! # Invariants
//!
//! 1. [`find_handles`] never returns an element inside a nested source.
//! 2. A returned handle never contains another returned handle.
//! 3. Results are in document (pre-) order.

use crate::dom::{Document, NodeId};
use crate::matcher::Matcher;

/// All handles of `root`, excluding `root` itself.
///
/// Descendants matching `is_source` are skipped together with their
/// subtree; descendants matching `is_handle` are collected and not
/// descended into.
#[must_use]
pub fn find_handles(
    doc: &Document,
    root: NodeId,
    is_source: &Matcher,
    is_handle: &Matcher,
) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect(doc, root, is_source, is_handle, &mut out);
    out
}

fn collect(
    doc: &Document,
    node: NodeId,
    is_source: &Matcher,
    is_handle: &Matcher,
    out: &mut Vec<NodeId>,
) {
    for &child in doc.children(node) {
        if is_source.matches(doc, child) {
            continue;
        }
        if is_handle.matches(doc, child) {
            out.push(child);
        } else {
            collect(doc, child, is_source, is_handle, out);
        }
    }
}

/// Where a gesture beginning at some origin element landed, relative to a
/// resolved source and its handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grab {
    /// No handle restriction applies: no handle matcher, or a matcher that
    /// matches nothing inside the source.
    Unrestricted,
    /// The origin lies inside this handle.
    Handle(NodeId),
    /// Handles exist but the origin is outside all of them.
    OutsideHandles(Vec<NodeId>),
}

impl Grab {
    /// Whether the gesture may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::OutsideHandles(_))
    }
}

/// Apply the handle rule for a gesture that began at `origin` inside
/// `source`.
#[must_use]
pub fn resolve_grab(
    doc: &Document,
    source: NodeId,
    origin: NodeId,
    is_source: &Matcher,
    is_handle: Option<&Matcher>,
) -> Grab {
    let Some(is_handle) = is_handle else {
        return Grab::Unrestricted;
    };
    let handles = find_handles(doc, source, is_source, is_handle);
    if handles.is_empty() {
        return Grab::Unrestricted;
    }
    match handles.iter().copied().find(|&h| doc.contains(h, origin)) {
        Some(handle) => Grab::Handle(handle),
        None => Grab::OutsideHandles(handles),
    }
}
