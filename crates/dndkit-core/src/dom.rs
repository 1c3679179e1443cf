#![forbid(unsafe_code)]

//! Arena-backed host document.
//!
//! [`Document`] mirrors the part of the host's element tree that drag and drop
//! resolution needs: parent/child links, classes, namespaces, the native
//! `draggable` attribute, editability, border boxes for hit testing, the page
//! scroll offset, keyboard focus, and whether text selection is enabled on the
//! body.
//!
//! # Invariants
//!
//! 1. The root (`<html>`) and body exist for the whole lifetime of a document
//!    and are never detached.
//! 2. The parent/child links form a forest: appending an ancestor beneath one
//!    of its descendants is refused.
//! 3. Node ids are never reused; a detached node keeps its id and data.
//!
//! Ids from another document are tolerated: every query returns the neutral
//! answer (`None`, `false`, empty) instead of panicking.

use crate::geometry::{Point, Rect};

/// Stable identity of an element inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena index of this node.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// XML namespace of an element.
///
/// Only HTML elements can host a drop target; SVG and MathML nodes are
/// reported as uncontrolled by the native coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

/// One element of the document.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    namespace: Namespace,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    draggable: Option<bool>,
    editable: bool,
    rect: Rect,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            namespace: Namespace::Html,
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
            draggable: None,
            editable: false,
            rect: Rect::default(),
        }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Explicit `draggable` attribute, if set.
    #[must_use]
    pub const fn draggable_attr(&self) -> Option<bool> {
        self.draggable
    }

    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }
}

/// The host document: an element arena rooted at `<html>` with a `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    scroll: Point,
    focused: Option<NodeId>,
    text_selection: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only `<html>` and `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::with_capacity(16),
            root: NodeId(0),
            body: NodeId(0),
            scroll: Point::ZERO,
            focused: None,
            text_selection: true,
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.nodes[root.index()].children.push(body);
        doc.nodes[body.index()].parent = Some(root);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// The `<html>` element.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element; ancestor walks stop here.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Number of elements ever created, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document holds at least `<html>` and `<body>`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    // -----------------------------------------------------------------------
    // Tree construction
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Element::new(tag));
        id
    }

    /// Create an element and append it to `parent`.
    pub fn create(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Create an element carrying `class` and append it to `parent`.
    pub fn create_with_class(&mut self, parent: NodeId, tag: &str, class: &str) -> NodeId {
        let id = self.create(parent, tag);
        self.add_class(id, class);
        id
    }

    /// Move `child` to the end of `parent`'s children.
    ///
    /// Returns `false` (and changes nothing) if either id is unknown, if
    /// `child` is the root or body, or if `child` is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none()
            || self.get(child).is_none()
            || child == self.root
            || child == self.body
        {
            return false;
        }
        if self.contains(child, parent) {
            tracing::debug!(
                parent = parent.index(),
                child = child.index(),
                "append_child refused: would create a cycle"
            );
            return false;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Remove `node` from its parent. The root and body stay attached.
    pub fn detach(&mut self, node: NodeId) {
        if node == self.root || node == self.body {
            return;
        }
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id)
            && !el.has_class(class)
        {
            el.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn set_namespace(&mut self, id: NodeId, namespace: Namespace) {
        if let Some(el) = self.get_mut(id) {
            el.namespace = namespace;
        }
    }

    /// Set or clear the native `draggable` attribute.
    pub fn set_draggable(&mut self, id: NodeId, draggable: Option<bool>) {
        if let Some(el) = self.get_mut(id) {
            el.draggable = draggable;
        }
    }

    /// Mark an element as `contenteditable`.
    pub fn set_editable(&mut self, id: NodeId, editable: bool) {
        if let Some(el) = self.get_mut(id) {
            el.editable = editable;
        }
    }

    /// Set the border box in viewport coordinates.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(el) = self.get_mut(id) {
            el.rect = rect;
        }
    }

    // -----------------------------------------------------------------------
    // Structural queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Element::parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Element::children)
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|el| el.has_class(class))
    }

    #[must_use]
    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        self.get(id).map(Element::namespace)
    }

    #[must_use]
    pub fn is_html(&self, id: NodeId) -> bool {
        self.namespace(id) == Some(Namespace::Html)
    }

    #[must_use]
    pub fn rect(&self, id: NodeId) -> Rect {
        self.get(id).map(Element::rect).unwrap_or_default()
    }

    /// Iterate `id` and then each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.get(id).map(|_| id);
        core::iter::successors(start, move |&n| self.parent(n))
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Whether `node` is reachable from the root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    /// Pre-order traversal of `root`'s subtree, `root` first.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if self.get(n).is_none() {
                continue;
            }
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Whether the platform would start a native drag from this element.
    ///
    /// An explicit `draggable` attribute wins; otherwise images and links are
    /// draggable by default, as in browsers.
    #[must_use]
    pub fn is_native_draggable(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|el| match el.draggable {
            Some(explicit) => explicit,
            None => matches!(el.tag(), "img" | "a"),
        })
    }

    /// Whether text in this element can be edited (form fields or
    /// `contenteditable`, inherited from ancestors).
    #[must_use]
    pub fn is_editable(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| {
            self.get(n)
                .is_some_and(|el| el.editable || matches!(el.tag(), "input" | "textarea"))
        })
    }

    // -----------------------------------------------------------------------
    // Viewport, focus, selection
    // -----------------------------------------------------------------------

    /// Page scroll offset (page = viewport + offset).
    #[must_use]
    pub const fn scroll_offset(&self) -> Point {
        self.scroll
    }

    pub fn set_scroll_offset(&mut self, offset: Point) {
        self.scroll = offset;
    }

    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.focused = id.filter(|&n| self.get(n).is_some());
    }

    /// Whether `id` is editable text that currently holds (or is inside the
    /// holder of) keyboard focus.
    #[must_use]
    pub fn is_focused_editable(&self, id: NodeId) -> bool {
        self.focused
            .is_some_and(|f| self.contains(f, id) && self.is_editable(id))
    }

    /// Whether the body allows text selection (`user-select`).
    #[must_use]
    pub const fn text_selection_enabled(&self) -> bool {
        self.text_selection
    }

    pub fn set_text_selection_enabled(&mut self, enabled: bool) {
        self.text_selection = enabled;
    }

    /// Topmost connected element whose box contains the viewport point.
    ///
    /// Paint order is document order: later siblings and descendants sit on
    /// top of earlier ones. The body is returned when nothing else is hit and
    /// the point lies in its box.
    #[must_use]
    pub fn element_from_point(&self, point: Point) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|&n| self.rect(n).contains(point))
            .last()
    }
}
