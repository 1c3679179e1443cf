#![forbid(unsafe_code)]

//! Element matchers and the [`closest`] ancestor walk.
//!
//! Every "is this element a source / dropzone / handle" question in the
//! engine is answered by a [`Matcher`]. Results are never cached: the walk is
//! linear in the depth of the tree and the host may restructure the document
//! between any two events.

use core::fmt;
use std::rc::Rc;

use ahash::AHashSet;

use crate::dom::{Document, NodeId};

/// Predicate form of a matcher.
pub type ElementPredicate = Rc<dyn Fn(&Document, NodeId) -> bool>;

/// How an element is recognized.
#[derive(Clone)]
pub enum Matcher {
    /// Class-list membership.
    Class(String),
    /// Arbitrary test on the element.
    Predicate(ElementPredicate),
    /// Identity against an explicit node set.
    Nodes(AHashSet<NodeId>),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Nodes(nodes) => f.debug_tuple("Nodes").field(&nodes.len()).finish(),
        }
    }
}

impl Matcher {
    /// Match by class name.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// Match with a predicate.
    #[must_use]
    pub fn predicate(f: impl Fn(&Document, NodeId) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(f))
    }

    /// Match a single node by identity.
    #[must_use]
    pub fn node(node: NodeId) -> Self {
        Self::nodes([node])
    }

    /// Match any node of an explicit set by identity.
    #[must_use]
    pub fn nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self::Nodes(nodes.into_iter().collect())
    }

    /// Test one element, without walking.
    #[must_use]
    pub fn matches(&self, doc: &Document, element: NodeId) -> bool {
        match self {
            Self::Class(name) => doc.has_class(element, name),
            Self::Predicate(f) => f(doc, element),
            Self::Nodes(set) => set.contains(&element),
        }
    }
}

impl From<&str> for Matcher {
    fn from(name: &str) -> Self {
        Self::class(name)
    }
}

impl From<String> for Matcher {
    fn from(name: String) -> Self {
        Self::Class(name)
    }
}

/// First of `element` and its ancestors satisfying `matcher`.
///
/// The walk includes `element` itself and stops before the document body
/// (and the root), which are never matched. Unknown ids yield `None`.
#[must_use]
pub fn closest(doc: &Document, element: NodeId, matcher: &Matcher) -> Option<NodeId> {
    doc.ancestors(element)
        .take_while(|&n| n != doc.body() && n != doc.root())
        .find(|&n| matcher.matches(doc, n))
}

/// [`closest`], restricted to descendants of `container` (inclusive).
#[must_use]
pub fn closest_within(
    doc: &Document,
    container: NodeId,
    element: NodeId,
    matcher: &Matcher,
) -> Option<NodeId> {
    if !doc.contains(container, element) {
        return None;
    }
    closest(doc, element, matcher).filter(|&found| doc.contains(container, found))
}
