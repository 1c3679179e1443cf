#![forbid(unsafe_code)]

//! Touch drag simulation.
//!
//! A touch gesture starts only when a `touchmove` arrives at least `delay`
//! after the `touchstart`, which separates a deliberate drag from a scroll
//! or tap. Earlier moves are ignored, not fatal: the finger may wobble
//! while the delay runs.
//!
//! Touch coordinates are page-relative; hit-testing is viewport-relative,
//! so every lookup subtracts the document scroll offset.
//!
//! # Scroll guard
//!
//! WebKit only honours `preventDefault` on `touchmove` from a listener that
//! was registered early and non-passively. The host installs one such
//! document listener for the whole process and routes every `touchmove`
//! through [`guard_touchmove`]. A single process-wide flag, raised while any
//! touch gesture is dragging, decides whether the guard cancels scrolling.
//! The flag carries no gesture data.

use core::sync::atomic::{AtomicBool, Ordering};

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::{DomEvent, EventKind};
use dndkit_core::geometry::Point;
use dndkit_core::listener::{Environment, ListenerOptions};
use dndkit_core::timer::Deadline;
use web_time::Instant;

use super::{SensorEvent, SensorHandler, SimulatorOptions, StartVerdict};

static SCROLL_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Whether a touch drag currently suppresses page scrolling.
#[must_use]
pub fn scroll_suppressed() -> bool {
    SCROLL_SUPPRESSED.load(Ordering::Relaxed)
}

/// The document-level scroll guard. Prevents the default action of a
/// `touchmove` while a touch drag is in progress.
pub fn guard_touchmove(event: &mut DomEvent) {
    if event.kind == EventKind::TouchMove && scroll_suppressed() {
        event.prevent_default();
    }
}

fn set_scroll_suppressed(on: bool) {
    SCROLL_SUPPRESSED.store(on, Ordering::Relaxed);
}

const NON_PASSIVE: ListenerOptions = ListenerOptions::BUBBLE;
const PASSIVE: ListenerOptions = ListenerOptions {
    capture: false,
    passive: true,
};

/// Listeners held between touchstart and gesture end.
const INTERIM: [(EventKind, ListenerOptions); 3] = [
    (EventKind::TouchMove, NON_PASSIVE),
    (EventKind::TouchEnd, NON_PASSIVE),
    (EventKind::TouchCancel, NON_PASSIVE),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pending {
        source: NodeId,
        position: Point,
    },
    Dragging {
        source: NodeId,
        position: Point,
    },
}

/// Turns touchstart / touchmove / touchend into a simulated gesture.
#[derive(Debug, Clone)]
pub struct TouchSimulator {
    container: NodeId,
    options: SimulatorOptions,
    attached: bool,
    phase: Phase,
    hold: Deadline,
}

impl TouchSimulator {
    #[must_use]
    pub fn new(container: NodeId, options: SimulatorOptions) -> Self {
        Self {
            container,
            options,
            attached: false,
            phase: Phase::Idle,
            hold: Deadline::new(),
        }
    }

    #[must_use]
    pub const fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub const fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn attach<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.attached {
            return;
        }
        env.add_listener(EventKind::TouchStart, PASSIVE);
        self.attached = true;
    }

    pub fn detach<E: Environment + ?Sized>(&mut self, env: &mut E) {
        self.cancel(env);
        if self.attached {
            env.remove_listener(EventKind::TouchStart, PASSIVE);
            self.attached = false;
        }
    }

    pub fn cancel<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.phase == Phase::Idle {
            return;
        }
        if self.is_dragging() {
            set_scroll_suppressed(false);
        }
        for (kind, options) in INTERIM {
            env.remove_listener(kind, options);
        }
        self.hold.cancel();
        self.phase = Phase::Idle;
    }

    pub(super) fn handle_event<E, H>(
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
        match event.kind {
            EventKind::TouchStart => self.on_touch_start(env, doc, event, now),
            EventKind::TouchMove => self.on_touch_move(env, doc, event, now, handler),
            EventKind::TouchEnd | EventKind::TouchCancel => {
                self.on_touch_end(env, doc, event, now, handler);
            }
            _ => {}
        }
    }

    fn on_touch_start<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        doc: &Document,
        event: &DomEvent,
        now: Instant,
    ) {
        if self.is_active() {
            return;
        }
        let Some(source) = self
            .options
            .resolve_source(doc, self.container, event.target)
        else {
            return;
        };
        let position = page_position(doc, event, None);
        for (kind, options) in INTERIM {
            env.add_listener(kind, options);
        }
        self.hold.arm(now, self.options.delay);
        self.phase = Phase::Pending { source, position };
        tracing::trace!(
            source = source.index(),
            delay_ms = u64::try_from(self.options.delay.as_millis()).unwrap_or(u64::MAX),
            "touch gesture pending"
        );
    }

    fn on_touch_move<E, H>(
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
        match self.phase {
            Phase::Idle => {}
            Phase::Pending { source, position } => {
                if !self.hold.is_due(now) {
                    return;
                }
                let position = page_position(doc, event, Some(position));
                let target = hit_test(doc, position);
                let step = SensorEvent {
                    source,
                    target,
                    position,
                    original: event,
                    timestamp: now,
                };
                match handler.on_drag_start(doc, &step) {
                    StartVerdict::Accept => {
                        self.hold.cancel();
                        self.phase = Phase::Dragging { source, position };
                        set_scroll_suppressed(true);
                        event.prevent_default();
                    }
                    StartVerdict::Cancel => self.cancel(env),
                }
            }
            Phase::Dragging { source, position } => {
                event.prevent_default();
                let position = page_position(doc, event, Some(position));
                self.phase = Phase::Dragging { source, position };
                let step = SensorEvent {
                    source,
                    target: hit_test(doc, position),
                    position,
                    original: event,
                    timestamp: now,
                };
                handler.on_drag_move(doc, &step);
            }
        }
    }

    fn on_touch_end<E, H>(
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
        let phase = self.phase;
        self.cancel(env);
        if let Phase::Dragging { source, position } = phase {
            // Keep the platform from synthesizing a click on release.
            event.prevent_default();
            let position = page_position(doc, event, Some(position));
            let step = SensorEvent {
                source,
                target: hit_test(doc, position),
                position,
                original: event,
                timestamp: now,
            };
            handler.on_drag_end(doc, &step);
        }
    }
}

/// Page position of the event's primary touch, else `fallback`, else the
/// client point shifted by the scroll offset.
fn page_position(doc: &Document, event: &DomEvent, fallback: Option<Point>) -> Point {
    event
        .primary_touch()
        .map(|t| t.page)
        .or(fallback)
        .unwrap_or_else(|| event.client + doc.scroll_offset())
}

fn hit_test(doc: &Document, page: Point) -> Option<NodeId> {
    doc.element_from_point(page - doc.scroll_offset())
}

#[cfg(test)]
pub(crate) fn scroll_flag_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
