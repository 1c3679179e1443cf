#![forbid(unsafe_code)]

//! Per-modality gesture simulators.
//!
//! A simulator turns raw pointer or touch input into a modality-neutral
//! start / move / end sequence delivered to a [`SensorHandler`]. It only
//! sees the raw kinds it registered on its [`Environment`]: `attach`
//! registers the gesture-begin kind, arming registers the interim kinds, and
//! ending or cancelling removes them again.
//!
//! # Invariants
//!
//! 1. At most one gesture per simulator: a second begin while armed or
//!    dragging is ignored.
//! 2. A begin that does not resolve to a source (or misses every handle) is
//!    a silent no-op; it never reaches the handler.
//! 3. `on_drag_end` is called exactly once per accepted `on_drag_start`,
//!    unless [`Simulator::cancel`] intervenes.
//! 4. `cancel` and `detach` are idempotent and leave no interim listeners.

mod mouse;
mod touch;

use core::time::Duration;

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::DomEvent;
use dndkit_core::geometry::Point;
use dndkit_core::handles::resolve_grab;
use dndkit_core::listener::Environment;
use dndkit_core::matcher::{Matcher, closest_within};
use web_time::Instant;

pub use mouse::MouseSimulator;
pub use touch::{TouchSimulator, guard_touchmove, scroll_suppressed};

/// Default long-press delay before a touch gesture may start.
pub const DEFAULT_TOUCH_DELAY: Duration = Duration::from_millis(100);

/// Which raw input drives a simulated gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Modality {
    #[default]
    Mouse,
    Touch,
}

/// Source and handle rules a simulator applies to gesture begins.
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    pub source: Matcher,
    pub handle: Option<Matcher>,
    /// Minimum hold time before a touch gesture starts. Ignored by mouse.
    pub delay: Duration,
}

impl SimulatorOptions {
    #[must_use]
    pub fn new(source: impl Into<Matcher>) -> Self {
        Self {
            source: source.into(),
            handle: None,
            delay: DEFAULT_TOUCH_DELAY,
        }
    }

    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<Matcher>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The source a gesture starting at `origin` would grab, if any.
    #[must_use]
    pub fn resolve_source(
        &self,
        doc: &Document,
        container: NodeId,
        origin: NodeId,
    ) -> Option<NodeId> {
        let source = closest_within(doc, container, origin, &self.source)?;
        resolve_grab(doc, source, origin, &self.source, self.handle.as_ref())
            .is_allowed()
            .then_some(source)
    }
}

/// One simulated gesture step.
#[derive(Debug, Clone, Copy)]
pub struct SensorEvent<'a> {
    pub source: NodeId,
    /// Element under the pointer, when known.
    pub target: Option<NodeId>,
    /// Pointer position: viewport coordinates for mouse, page for touch.
    pub position: Point,
    /// The raw event that produced this step.
    pub original: &'a DomEvent,
    pub timestamp: Instant,
}

/// Handler answer to a gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartVerdict {
    Accept,
    /// Abort immediately; the simulator never enters move/end tracking.
    Cancel,
}

/// Receiver of simulated gesture steps.
pub trait SensorHandler {
    fn on_drag_start(&mut self, doc: &mut Document, event: &SensorEvent<'_>) -> StartVerdict;

    fn on_drag_move(&mut self, doc: &mut Document, event: &SensorEvent<'_>);

    fn on_drag_end(&mut self, doc: &mut Document, event: &SensorEvent<'_>);
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// The closed set of simulated modalities.
#[derive(Debug, Clone)]
pub enum Simulator {
    Mouse(MouseSimulator),
    Touch(TouchSimulator),
}

impl Simulator {
    #[must_use]
    pub fn mouse(container: NodeId, options: SimulatorOptions) -> Self {
        Self::Mouse(MouseSimulator::new(container, options))
    }

    #[must_use]
    pub fn touch(container: NodeId, options: SimulatorOptions) -> Self {
        Self::Touch(TouchSimulator::new(container, options))
    }

    #[must_use]
    pub fn new(modality: Modality, container: NodeId, options: SimulatorOptions) -> Self {
        match modality {
            Modality::Mouse => Self::mouse(container, options),
            Modality::Touch => Self::touch(container, options),
        }
    }

    #[must_use]
    pub const fn modality(&self) -> Modality {
        match self {
            Self::Mouse(_) => Modality::Mouse,
            Self::Touch(_) => Modality::Touch,
        }
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        match self {
            Self::Mouse(m) => m.container(),
            Self::Touch(t) => t.container(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SimulatorOptions {
        match self {
            Self::Mouse(m) => m.options(),
            Self::Touch(t) => t.options(),
        }
    }

    /// Start observing gesture begins.
    pub fn attach<E: Environment + ?Sized>(&mut self, env: &mut E) {
        match self {
            Self::Mouse(m) => m.attach(env),
            Self::Touch(t) => t.attach(env),
        }
    }

    /// Stop observing input altogether, cancelling any gesture.
    pub fn detach<E: Environment + ?Sized>(&mut self, env: &mut E) {
        match self {
            Self::Mouse(m) => m.detach(env),
            Self::Touch(t) => t.detach(env),
        }
    }

    /// Abort a pending or active gesture without `on_drag_end`.
    pub fn cancel<E: Environment + ?Sized>(&mut self, env: &mut E) {
        match self {
            Self::Mouse(m) => m.cancel(env),
            Self::Touch(t) => t.cancel(env),
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        match self {
            Self::Mouse(m) => m.is_attached(),
            Self::Touch(t) => t.is_attached(),
        }
    }

    /// Armed or dragging.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::Mouse(m) => m.is_active(),
            Self::Touch(t) => t.is_active(),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        match self {
            Self::Mouse(m) => m.is_dragging(),
            Self::Touch(t) => t.is_dragging(),
        }
    }

    /// Feed one raw event. Kinds not registered on `env` are ignored.
    pub fn handle_event<E, H>(
        &mut self,
        env: &mut E,
        doc: &mut Document,
        event: &mut DomEvent,
        now: Instant,
        handler: &mut H,
    ) where
        E: Environment + ?Sized,
        H: SensorHandler + ?Sized,
    {
        if !env.is_listening(event.kind) {
            return;
        }
        match self {
            Self::Mouse(m) => m.handle_event(env, doc, event, now, handler),
            Self::Touch(t) => t.handle_event(env, doc, event, now, handler),
        }
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
