#![forbid(unsafe_code)]

//! Drag coordinators.
//!
//! A coordinator owns the gesture state of one container and turns raw
//! input into the canonical protocol. [`NativeDnd`] follows the platform's
//! own drag events; [`SimulatedDnd`] drives a mouse or touch simulator and
//! synthesizes the same sequence.
//!
//! # Invariants
//!
//! 1. `over` is only ever set while `source` is set.
//! 2. At most one gesture per coordinator; a second begin is ignored.
//! 3. [`DragDropCoordinator::destroy`] is refused while a gesture is in
//!    progress and is a no-op once destroyed.
//! 4. Coordinators never share state: every handler re-checks that the
//!    element in question belongs to its own container.

mod native;
mod simulated;

use core::fmt;

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::DomEvent;
use dndkit_core::matcher::{ElementPredicate, Matcher};
use std::rc::Rc;
use web_time::Instant;

use crate::emitter::{Emitter, ListenerId, ListenerResult};
use crate::protocol::{DragEvent, DragEventKind};

pub use native::NativeDnd;
pub use simulated::{DEFAULT_EMIT_INTERVAL, SimulatedDnd, SimulatedSettings};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Element rules shared by both coordinators.
///
/// The four predicates default to "always". `is_recognized_*` answer
/// whether the host layer actually instantiated an element that matches
/// structurally; they only gate native `preventDefault` and diagnostics.
#[derive(Clone)]
pub struct DndOptions {
    pub source: Matcher,
    pub dropzone: Matcher,
    pub handle: Option<Matcher>,
    is_draggable: ElementPredicate,
    is_droppable: ElementPredicate,
    is_recognized_source: ElementPredicate,
    is_recognized_dropzone: ElementPredicate,
}

impl fmt::Debug for DndOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DndOptions")
            .field("source", &self.source)
            .field("dropzone", &self.dropzone)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

fn always() -> ElementPredicate {
    Rc::new(|_, _| true)
}

impl DndOptions {
    #[must_use]
    pub fn new(source: impl Into<Matcher>, dropzone: impl Into<Matcher>) -> Self {
        Self {
            source: source.into(),
            dropzone: dropzone.into(),
            handle: None,
            is_draggable: always(),
            is_droppable: always(),
            is_recognized_source: always(),
            is_recognized_dropzone: always(),
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<Matcher>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    #[must_use]
    pub fn with_draggable(mut self, f: impl Fn(&Document, NodeId) -> bool + 'static) -> Self {
        self.is_draggable = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_droppable(mut self, f: impl Fn(&Document, NodeId) -> bool + 'static) -> Self {
        self.is_droppable = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_recognized_source(
        mut self,
        f: impl Fn(&Document, NodeId) -> bool + 'static,
    ) -> Self {
        self.is_recognized_source = Rc::new(f);
        self
    }

    #[must_use]
    pub fn with_recognized_dropzone(
        mut self,
        f: impl Fn(&Document, NodeId) -> bool + 'static,
    ) -> Self {
        self.is_recognized_dropzone = Rc::new(f);
        self
    }

    #[must_use]
    pub fn is_draggable(&self, doc: &Document, source: NodeId) -> bool {
        (self.is_draggable)(doc, source)
    }

    #[must_use]
    pub fn is_droppable(&self, doc: &Document, dropzone: NodeId) -> bool {
        (self.is_droppable)(doc, dropzone)
    }

    #[must_use]
    pub fn is_recognized_source(&self, doc: &Document, source: NodeId) -> bool {
        (self.is_recognized_source)(doc, source)
    }

    #[must_use]
    pub fn is_recognized_dropzone(&self, doc: &Document, dropzone: NodeId) -> bool {
        (self.is_recognized_dropzone)(doc, dropzone)
    }

    /// Both ends of the pair were instantiated by the host.
    #[must_use]
    pub fn is_recognized_pair(&self, doc: &Document, source: NodeId, dropzone: NodeId) -> bool {
        self.is_recognized_source(doc, source) && self.is_recognized_dropzone(doc, dropzone)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Gesture state common to both coordinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DndState {
    container: NodeId,
    source: Option<NodeId>,
    over: Option<NodeId>,
}

impl DndState {
    #[must_use]
    pub const fn new(container: NodeId) -> Self {
        Self {
            container,
            source: None,
            over: None,
        }
    }

    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub const fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// The current drop target.
    #[must_use]
    pub const fn over(&self) -> Option<NodeId> {
        self.over
    }

    /// Whether a gesture is in progress, optionally for `element` only.
    #[must_use]
    pub fn is_dragging(&self, element: Option<NodeId>) -> bool {
        self.source
            .is_some_and(|s| element.is_none_or(|e| e == s))
    }

    pub(crate) fn begin(&mut self, source: NodeId) {
        self.source = Some(source);
        self.over = None;
    }

    /// Ignored without a source.
    pub(crate) fn set_over(&mut self, over: Option<NodeId>) {
        if self.source.is_some() {
            self.over = over;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.source = None;
        self.over = None;
    }
}

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// What every coordinator offers its host.
pub trait DragDropCoordinator {
    fn state(&self) -> &DndState;

    fn emitter_mut(&mut self) -> &mut Emitter;

    /// Feed one raw document event.
    fn handle_event(&mut self, doc: &mut Document, event: &mut DomEvent, now: Instant);

    /// Advance timers.
    fn tick(&mut self, doc: &mut Document, now: Instant);

    /// Tear down. Returns `false`, with a diagnostic, when refused because a
    /// gesture is in progress.
    fn destroy(&mut self) -> bool;

    fn is_destroyed(&self) -> bool;

    fn on<F>(&mut self, kind: DragEventKind, callback: F) -> ListenerId
    where
        Self: Sized,
        F: FnMut(&DragEvent) -> ListenerResult + 'static,
    {
        self.emitter_mut().on(kind, callback)
    }

    fn once<F>(&mut self, kind: DragEventKind, callback: F) -> ListenerId
    where
        Self: Sized,
        F: FnMut(&DragEvent) -> ListenerResult + 'static,
    {
        self.emitter_mut().once(kind, callback)
    }

    fn off(&mut self, id: ListenerId) -> bool {
        self.emitter_mut().off(id)
    }

    fn is_dragging(&self, element: Option<NodeId>) -> bool {
        self.state().is_dragging(element)
    }

    fn source(&self) -> Option<NodeId> {
        self.state().source()
    }

    fn over(&self) -> Option<NodeId> {
        self.state().over()
    }

    fn container(&self) -> NodeId {
        self.state().container()
    }
}

/// Emit `event` and hand it back so the caller can read `canceled()`.
/// Listener failures are logged; the engine's own bookkeeping continues.
pub(crate) fn dispatch(emitter: &mut Emitter, event: DragEvent) -> DragEvent {
    if let Err(err) = emitter.emit(&event) {
        tracing::error!(
            event = %event.kind(),
            failures = err.len(),
            error = %err,
            "drag listener failed"
        );
    }
    event
}

pub(crate) fn refuse_destroy(container: NodeId, source: NodeId) {
    tracing::warn!(
        container = container.index(),
        source = source.index(),
        "refusing to destroy drag coordinator while a drag is in progress"
    );
}
