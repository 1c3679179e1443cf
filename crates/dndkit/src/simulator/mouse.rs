#![forbid(unsafe_code)]

//! Mouse drag simulation.
//!
//! # State Machine
//!
//! ```text
//! Idle --mousedown(primary, no Alt, on source)--> Armed
//! Armed --mousemove--> Dragging            (on_drag_start)
//! Armed --mouseup | Escape--> Idle         (click, nothing reported)
//! Dragging --mousemove--> Dragging         (on_drag_move)
//! Dragging --mouseup | Escape--> Idle      (on_drag_end)
//! ```
//!
//! While armed or dragging, native `dragstart` and `contextmenu` are
//! prevented so the platform's own drag and menu do not compete.

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::{DomEvent, EventKind, Modifiers, MouseButton};
use dndkit_core::geometry::Point;
use dndkit_core::listener::{Environment, ListenerOptions};
use web_time::Instant;

use super::{SensorEvent, SensorHandler, SimulatorOptions, StartVerdict};

/// Listeners held while armed or dragging.
const INTERIM: [(EventKind, ListenerOptions); 5] = [
    (EventKind::MouseMove, ListenerOptions::BUBBLE),
    (EventKind::MouseUp, ListenerOptions::BUBBLE),
    (EventKind::DragStart, ListenerOptions::BUBBLE),
    (EventKind::KeyDown, ListenerOptions::BUBBLE),
    (EventKind::ContextMenu, ListenerOptions::CAPTURE),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Armed {
        source: NodeId,
    },
    Dragging {
        source: NodeId,
        target: Option<NodeId>,
        position: Point,
    },
}

/// Turns mousedown / mousemove / mouseup into a simulated gesture.
#[derive(Debug, Clone)]
pub struct MouseSimulator {
    container: NodeId,
    options: SimulatorOptions,
    attached: bool,
    phase: Phase,
}

impl MouseSimulator {
    #[must_use]
    pub fn new(container: NodeId, options: SimulatorOptions) -> Self {
        Self {
            container,
            options,
            attached: false,
            phase: Phase::Idle,
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
        env.add_listener(EventKind::MouseDown, ListenerOptions::CAPTURE);
        self.attached = true;
    }

    pub fn detach<E: Environment + ?Sized>(&mut self, env: &mut E) {
        self.cancel(env);
        if self.attached {
            env.remove_listener(EventKind::MouseDown, ListenerOptions::CAPTURE);
            self.attached = false;
        }
    }

    pub fn cancel<E: Environment + ?Sized>(&mut self, env: &mut E) {
        if self.phase == Phase::Idle {
            return;
        }
        for (kind, options) in INTERIM {
            env.remove_listener(kind, options);
        }
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
            EventKind::MouseDown => self.on_mouse_down(env, doc, event),
            EventKind::MouseMove => self.on_mouse_move(env, doc, event, now, handler),
            EventKind::MouseUp => {
                if event.button == MouseButton::Primary {
                    self.finish(env, doc, event, now, handler);
                }
            }
            EventKind::KeyDown => {
                if event.is_escape() {
                    self.finish(env, doc, event, now, handler);
                }
            }
            EventKind::DragStart | EventKind::ContextMenu => {
                if self.is_active() {
                    event.prevent_default();
                }
            }
            _ => {}
        }
    }

    fn on_mouse_down<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        doc: &Document,
        event: &DomEvent,
    ) {
        if self.is_active()
            || event.button != MouseButton::Primary
            || event.modifiers.contains(Modifiers::ALT)
        {
            return;
        }
        let Some(source) = self
            .options
            .resolve_source(doc, self.container, event.target)
        else {
            return;
        };
        for (kind, options) in INTERIM {
            env.add_listener(kind, options);
        }
        self.phase = Phase::Armed { source };
        tracing::trace!(source = source.index(), "mouse gesture armed");
    }

    fn on_mouse_move<E, H>(
        &mut self,
        env: &mut E,
        doc: &mut Document,
        event: &DomEvent,
        now: Instant,
        handler: &mut H,
    ) where
        E: Environment + ?Sized,
        H: SensorHandler + ?Sized,
    {
        match self.phase {
            Phase::Idle => {}
            Phase::Armed { source } => {
                let step = SensorEvent {
                    source,
                    target: Some(event.target),
                    position: event.client,
                    original: event,
                    timestamp: now,
                };
                match handler.on_drag_start(doc, &step) {
                    StartVerdict::Accept => {
                        self.phase = Phase::Dragging {
                            source,
                            target: Some(event.target),
                            position: event.client,
                        };
                    }
                    StartVerdict::Cancel => self.cancel(env),
                }
            }
            Phase::Dragging { source, .. } => {
                self.phase = Phase::Dragging {
                    source,
                    target: Some(event.target),
                    position: event.client,
                };
                let step = SensorEvent {
                    source,
                    target: Some(event.target),
                    position: event.client,
                    original: event,
                    timestamp: now,
                };
                handler.on_drag_move(doc, &step);
            }
        }
    }

    /// Release or Escape. An armed gesture that never moved is a click and
    /// is dropped silently.
    fn finish<E, H>(
        &mut self,
        env: &mut E,
        doc: &mut Document,
        event: &DomEvent,
        now: Instant,
        handler: &mut H,
    ) where
        E: Environment + ?Sized,
        H: SensorHandler + ?Sized,
    {
        let phase = self.phase;
        self.cancel(env);
        if let Phase::Dragging {
            source,
            target,
            position,
        } = phase
        {
            // Escape carries no pointer data; reuse the last known position.
            let (target, position) = if event.kind == EventKind::KeyDown {
                (target, position)
            } else {
                (Some(event.target), event.client)
            };
            let step = SensorEvent {
                source,
                target,
                position,
                original: event,
                timestamp: now,
            };
            handler.on_drag_end(doc, &step);
        }
    }
}
