#![forbid(unsafe_code)]

//! The canonical drag protocol.
//!
//! Every coordinator, whatever modality drives it, reports a gesture as a
//! sequence of [`DragEvent`]s:
//!
//! ```text
//! drag:start | drag:prevent
//!   → (drag:enter | drag:over | drag:leave | drag | drag:move)*
//!   → drop?
//!   → drag:end
//! ```
//!
//! # Invariants
//!
//! 1. Exactly one of `drag:start` / `drag:prevent` per attempted gesture.
//! 2. `drag:end` follows every `drag:start` that was not canceled.
//! 3. `drop` fires at most once, before `drag:end`.
//!
//! Cancelability is a property of the kind, not of the instance: calling
//! [`DragEvent::cancel`] on a non-cancelable kind does nothing.

use core::cell::Cell;
use core::fmt;

use dndkit_core::dom::NodeId;
use dndkit_core::event::{DataTransfer, DomEvent};

/// Kinds of protocol events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    /// Periodic "still dragging" signal (`drag`).
    Drag,
    Start,
    /// A gesture hit a source that is not draggable.
    Prevent,
    Enter,
    /// Periodic "still over the current target" signal.
    Over,
    Leave,
    /// Fine-grained pointer movement, simulated modalities only.
    Move,
    Drop,
    End,
}

impl DragEventKind {
    /// Every kind, in protocol order.
    pub const ALL: [Self; 9] = [
        Self::Start,
        Self::Prevent,
        Self::Drag,
        Self::Move,
        Self::Enter,
        Self::Over,
        Self::Leave,
        Self::Drop,
        Self::End,
    ];

    /// Event type string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::Start => "drag:start",
            Self::Prevent => "drag:prevent",
            Self::Enter => "drag:enter",
            Self::Over => "drag:over",
            Self::Leave => "drag:leave",
            Self::Move => "drag:move",
            Self::Drop => "drop",
            Self::End => "drag:end",
        }
    }

    /// Whether subscribers may cancel events of this kind.
    #[must_use]
    pub const fn cancelable(self) -> bool {
        matches!(self, Self::Start | Self::Move | Self::Over)
    }
}

impl fmt::Display for DragEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One protocol event.
///
/// `target` holds the element the kind is about (`over`, `enter`, `leave`,
/// or `dropzone`); `related` holds the element being entered on a
/// `drag:leave`, when known.
#[derive(Debug, Clone)]
pub struct DragEvent {
    kind: DragEventKind,
    source: NodeId,
    target: Option<NodeId>,
    related: Option<NodeId>,
    container: NodeId,
    original: Option<DomEvent>,
    canceled: Cell<bool>,
}

impl DragEvent {
    #[must_use]
    pub fn new(kind: DragEventKind, source: NodeId, container: NodeId) -> Self {
        Self {
            kind,
            source,
            target: None,
            related: None,
            container,
            original: None,
            canceled: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<NodeId>) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_related(mut self, related: Option<NodeId>) -> Self {
        self.related = related;
        self
    }

    #[must_use]
    pub fn with_original(mut self, original: Option<DomEvent>) -> Self {
        self.original = original;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> DragEventKind {
        self.kind
    }

    /// The element being dragged.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    /// Raw target field, whatever the kind.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Current drop target for `drag`, `drag:over`, `drag:move`, `drag:end`.
    #[must_use]
    pub const fn over(&self) -> Option<NodeId> {
        match self.kind {
            DragEventKind::Drag
            | DragEventKind::Over
            | DragEventKind::Move
            | DragEventKind::End => self.target,
            _ => None,
        }
    }

    /// Entered dropzone: the target of `drag:enter`, or the element entered
    /// while leaving on `drag:leave`.
    #[must_use]
    pub const fn enter(&self) -> Option<NodeId> {
        match self.kind {
            DragEventKind::Enter => self.target,
            DragEventKind::Leave => self.related,
            _ => None,
        }
    }

    /// Dropzone being left on `drag:leave`.
    #[must_use]
    pub const fn leave(&self) -> Option<NodeId> {
        match self.kind {
            DragEventKind::Leave => self.target,
            _ => None,
        }
    }

    /// Dropzone receiving a `drop`.
    #[must_use]
    pub const fn dropzone(&self) -> Option<NodeId> {
        match self.kind {
            DragEventKind::Drop => self.target,
            _ => None,
        }
    }

    /// The raw event that produced this one, `None` when synthesized on a
    /// timer.
    #[must_use]
    pub const fn original_event(&self) -> Option<&DomEvent> {
        self.original.as_ref()
    }

    /// Shared native drag data, when the original event carries it.
    #[must_use]
    pub fn data_transfer(&self) -> Option<&DataTransfer> {
        self.original.as_ref().and_then(DomEvent::data_transfer)
    }

    #[must_use]
    pub const fn cancelable(&self) -> bool {
        self.kind.cancelable()
    }

    /// Request cancellation; ignored for non-cancelable kinds.
    pub fn cancel(&self) {
        if self.cancelable() {
            self.canceled.set(true);
        }
    }

    #[must_use]
    pub fn canceled(&self) -> bool {
        self.canceled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dndkit_core::dom::Document;
    use dndkit_core::event::{DropEffect, EventKind};

    #[test]
    fn only_cancelable_kinds_record_cancel() {
        let doc = Document::new();
        let body = doc.body();
        for kind in DragEventKind::ALL {
            let ev = DragEvent::new(kind, body, body);
            ev.cancel();
            assert_eq!(ev.canceled(), kind.cancelable(), "{kind}");
        }
    }

    #[test]
    fn accessors_follow_kind() {
        let mut doc = Document::new();
        let a = doc.create(doc.body(), "div");
        let b = doc.create(doc.body(), "div");
        let body = doc.body();

        let leave = DragEvent::new(DragEventKind::Leave, body, body)
            .with_target(Some(a))
            .with_related(Some(b));
        assert_eq!(leave.leave(), Some(a));
        assert_eq!(leave.enter(), Some(b));
        assert_eq!(leave.over(), None);

        let enter = DragEvent::new(DragEventKind::Enter, body, body).with_target(Some(b));
        assert_eq!(enter.enter(), Some(b));
        assert_eq!(enter.leave(), None);

        let drop = DragEvent::new(DragEventKind::Drop, body, body).with_target(Some(a));
        assert_eq!(drop.dropzone(), Some(a));
        assert_eq!(drop.over(), None);
    }

    #[test]
    fn data_transfer_comes_from_original() {
        let doc = Document::new();
        let body = doc.body();
        let raw = DomEvent::drag(EventKind::DragOver, body);
        let ev = DragEvent::new(DragEventKind::Over, body, body).with_original(Some(raw.clone()));
        if let Some(dt) = ev.data_transfer() {
            dt.set_drop_effect(DropEffect::Link);
        }
        assert_eq!(raw.data_transfer().map(DataTransfer::drop_effect), Some(DropEffect::Link));

        let synthetic = DragEvent::new(DragEventKind::Drag, body, body);
        assert!(synthetic.original_event().is_none());
        assert!(synthetic.data_transfer().is_none());
    }

    #[test]
    fn names() {
        assert_eq!(DragEventKind::Start.to_string(), "drag:start");
        assert_eq!(DragEventKind::Drop.name(), "drop");
    }
}
