#![forbid(unsafe_code)]

//! Coordinator over a simulated (mouse or touch) gesture.
//!
//! The simulator delivers start / move / end; this coordinator resolves
//! dropzones itself and synthesizes the protocol a native drag would have
//! produced, including the periodic `drag` and `drag:over` the platform
//! fires on its own.
//!
//! # Invariants
//!
//! 1. Event suppression is enabled exactly while a gesture is active.
//! 2. Body text selection is disabled for the gesture and restored to its
//!    previous value on end.
//! 3. The `drag` timer runs from `drag:start` to `drag:end`; the `drag:over`
//!    timer runs only while a drop target is set. Neither fires after
//!    `drag:end`.
//! 4. On a direct move from zone A to zone B, `drag:enter(B)` is emitted
//!    before `drag:leave(A)`.
//!
//! # Design Notes
//!
//! The simulator and the gesture state live in separate fields so the
//! simulator can call back into the state while it is borrowed mutably.
//! Late ticks coalesce: one `tick` emits at most one `drag` and one
//! `drag:over` however many periods elapsed.

use core::time::Duration;

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::DomEvent;
use dndkit_core::matcher::closest_within;
use dndkit_core::timer::Interval;
use web_time::Instant;

use super::{DndOptions, DndState, DragDropCoordinator, dispatch, refuse_destroy};
use crate::emitter::Emitter;
use crate::protocol::{DragEvent, DragEventKind};
use crate::simulator::{
    DEFAULT_TOUCH_DELAY, Modality, SensorEvent, SensorHandler, Simulator, SimulatorOptions,
    StartVerdict,
};
use crate::suppress::EventSuppressor;

/// Default period of the synthesized `drag` and `drag:over` events.
pub const DEFAULT_EMIT_INTERVAL: Duration = Duration::from_millis(50);

/// Construction knobs for [`SimulatedDnd`].
#[derive(Debug, Clone)]
pub struct SimulatedSettings {
    pub modality: Modality,
    /// Touch hold delay.
    pub delay: Duration,
    pub drag_interval: Duration,
    pub over_interval: Duration,
    pub suppressor: EventSuppressor,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self {
            modality: Modality::Mouse,
            delay: DEFAULT_TOUCH_DELAY,
            drag_interval: DEFAULT_EMIT_INTERVAL,
            over_interval: DEFAULT_EMIT_INTERVAL,
            suppressor: EventSuppressor::default(),
        }
    }
}

impl SimulatedSettings {
    #[must_use]
    pub fn touch() -> Self {
        Self {
            modality: Modality::Touch,
            ..Self::default()
        }
    }
}

/// Gesture state and protocol output; the simulator's callback target.
#[derive(Debug)]
struct Core {
    options: DndOptions,
    state: DndState,
    emitter: Emitter,
    drag_timer: Interval,
    over_timer: Interval,
    saved_selection: Option<bool>,
}

impl Core {
    fn emit(
        &mut self,
        kind: DragEventKind,
        source: NodeId,
        target: Option<NodeId>,
        related: Option<NodeId>,
        original: Option<&DomEvent>,
    ) -> DragEvent {
        let event = DragEvent::new(kind, source, self.state.container())
            .with_target(target)
            .with_related(related)
            .with_original(original.cloned());
        dispatch(&mut self.emitter, event)
    }

    fn disable_selection(&mut self, doc: &mut Document) {
        if self.saved_selection.is_none() {
            self.saved_selection = Some(doc.text_selection_enabled());
        }
        doc.set_text_selection_enabled(false);
    }

    fn restore_selection(&mut self, doc: &mut Document) {
        if let Some(enabled) = self.saved_selection.take() {
            doc.set_text_selection_enabled(enabled);
        }
    }

    fn sync_over_timer(&mut self, now: Instant) {
        match (self.state.over().is_some(), self.over_timer.is_running()) {
            (true, false) => self.over_timer.start(now),
            (false, true) => self.over_timer.stop(),
            _ => {}
        }
    }

    fn finish(&mut self) {
        self.state.clear();
        self.drag_timer.stop();
        self.over_timer.stop();
    }
}

impl SensorHandler for Core {
    fn on_drag_start(&mut self, doc: &mut Document, ev: &SensorEvent<'_>) -> StartVerdict {
        if self.state.source().is_some() {
            return StartVerdict::Cancel;
        }
        let source = ev.source;
        if !self.options.is_draggable(doc, source) {
            self.emit(DragEventKind::Prevent, source, None, None, Some(ev.original));
            return StartVerdict::Cancel;
        }

        self.state.begin(source);
        self.disable_selection(doc);
        let start = self.emit(DragEventKind::Start, source, None, None, Some(ev.original));
        if start.canceled() {
            tracing::debug!(source = source.index(), "drag start canceled by listener");
            self.restore_selection(doc);
            self.finish();
            return StartVerdict::Cancel;
        }
        self.drag_timer.start(ev.timestamp);
        tracing::debug!(source = source.index(), "simulated drag started");

        // A source that is also a dropzone starts over itself.
        if self.options.dropzone.matches(doc, source) {
            self.state.set_over(Some(source));
            self.emit(DragEventKind::Enter, source, Some(source), None, Some(ev.original));
            self.sync_over_timer(ev.timestamp);
        }
        StartVerdict::Accept
    }

    fn on_drag_move(&mut self, doc: &mut Document, ev: &SensorEvent<'_>) {
        let Some(source) = self.state.source() else {
            return;
        };
        let container = self.state.container();
        let zone = ev
            .target
            .and_then(|t| closest_within(doc, container, t, &self.options.dropzone));
        let current = self.state.over();
        let entering = zone.filter(|&z| current != Some(z));
        let leaving = current.filter(|&c| zone != Some(c));

        if let Some(z) = entering {
            self.state.set_over(Some(z));
            self.emit(DragEventKind::Enter, source, Some(z), None, Some(ev.original));
        }
        if let Some(c) = leaving {
            if entering.is_none() {
                self.state.set_over(None);
            }
            self.emit(DragEventKind::Leave, source, Some(c), entering, Some(ev.original));
        }
        self.sync_over_timer(ev.timestamp);

        let over = self.state.over();
        self.emit(DragEventKind::Move, source, over, None, Some(ev.original));
    }

    fn on_drag_end(&mut self, doc: &mut Document, ev: &SensorEvent<'_>) {
        let Some(source) = self.state.source() else {
            return;
        };
        self.restore_selection(doc);
        if let Some(over) = self.state.over() {
            if ev.original.is_escape() || !self.options.is_droppable(doc, over) {
                self.emit(DragEventKind::Leave, source, Some(over), None, Some(ev.original));
                self.state.set_over(None);
            } else {
                self.emit(DragEventKind::Drop, source, Some(over), None, Some(ev.original));
            }
        }
        let over = self.state.over();
        self.emit(DragEventKind::End, source, over, None, Some(ev.original));
        self.finish();
        tracing::debug!(source = source.index(), "simulated drag ended");
    }
}

/// Simulated drag-and-drop coordinator for one container.
#[derive(Debug)]
pub struct SimulatedDnd {
    simulator: Simulator,
    suppressor: EventSuppressor,
    core: Core,
    destroyed: bool,
}

impl SimulatedDnd {
    #[must_use]
    pub fn new(container: NodeId, options: DndOptions, settings: SimulatedSettings) -> Self {
        let mut sim_options =
            SimulatorOptions::new(options.source.clone()).with_delay(settings.delay);
        sim_options.handle = options.handle.clone();
        let mut simulator = Simulator::new(settings.modality, container, sim_options);
        let mut suppressor = settings.suppressor;
        simulator.attach(&mut suppressor);
        Self {
            simulator,
            suppressor,
            core: Core {
                options,
                state: DndState::new(container),
                emitter: Emitter::new(),
                drag_timer: Interval::new(settings.drag_interval),
                over_timer: Interval::new(settings.over_interval),
                saved_selection: None,
            },
            destroyed: false,
        }
    }

    /// Mouse-driven coordinator with default settings.
    #[must_use]
    pub fn mouse(container: NodeId, options: DndOptions) -> Self {
        Self::new(container, options, SimulatedSettings::default())
    }

    /// Touch-driven coordinator with default settings.
    #[must_use]
    pub fn touch(container: NodeId, options: DndOptions) -> Self {
        Self::new(container, options, SimulatedSettings::touch())
    }

    #[must_use]
    pub const fn options(&self) -> &DndOptions {
        &self.core.options
    }

    #[must_use]
    pub const fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    #[must_use]
    pub const fn suppressor(&self) -> &EventSuppressor {
        &self.suppressor
    }

    fn sync_suppression(&mut self) {
        if self.core.state.source().is_some() {
            self.suppressor.enable();
        } else {
            self.suppressor.disable();
        }
    }
}

impl DragDropCoordinator for SimulatedDnd {
    fn state(&self) -> &DndState {
        &self.core.state
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.core.emitter
    }

    fn handle_event(&mut self, doc: &mut Document, event: &mut DomEvent, now: Instant) {
        if self.destroyed {
            return;
        }
        self.suppressor.intercept(event);
        self.simulator
            .handle_event(&mut self.suppressor, doc, event, now, &mut self.core);
        self.sync_suppression();
    }

    fn tick(&mut self, _doc: &mut Document, now: Instant) {
        let Some(source) = self.core.state.source() else {
            return;
        };
        let over = self.core.state.over();
        if self.core.drag_timer.poll(now) > 0 {
            self.core.emit(DragEventKind::Drag, source, over, None, None);
        }
        if self.core.over_timer.poll(now) > 0 && over.is_some() {
            self.core.emit(DragEventKind::Over, source, over, None, None);
        }
    }

    fn destroy(&mut self) -> bool {
        if let Some(source) = self.core.state.source() {
            refuse_destroy(self.core.state.container(), source);
            return false;
        }
        if !self.destroyed {
            self.simulator.detach(&mut self.suppressor);
            self.suppressor.disable();
            self.destroyed = true;
        }
        true
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
