#![forbid(unsafe_code)]

//! Coordinator over the platform's native drag events.
//!
//! All seven native kinds are observed at document level so that leaving
//! the container is still seen. The platform owns the drag image and the
//! drop-effect cursor; this coordinator steers both through the shared
//! [`DataTransfer`].
//!
//! # Leave bookkeeping
//!
//! Browsers fire `dragenter` on the new element before `dragleave` on the
//! old one. When an enter switches dropzones, the previous zone is parked
//! in `pending_leave` and its `drag:leave` is emitted once the matching
//! `dragleave` arrives. A `dragleave` whose `relatedTarget` resolves to the
//! same dropzone is movement between that zone's own descendants and is
//! ignored. A null `relatedTarget` is the platform's signal that the
//! pointer left the document or the gesture is ending (Escape, or release
//! over something undroppable); that is a true leave, and the zone is
//! remembered in `temp_leave` for the final `drag:end`.
//!
//! # Failure Modes
//!
//! - Handles that are not natively draggable are a configuration error: the
//!   drag is refused with a warning.
//! - A `dragenter` on a non-HTML element (SVG, MathML) clears the current
//!   target with a warning; such elements cannot host a drop.
//! - A subscriber leaving `dropEffect` inconsistent with droppability is
//!   corrected after dispatch, with a warning.

use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::{DataTransfer, DomEvent, DropEffect, EventKind};
use dndkit_core::handles::find_handles;
use dndkit_core::listener::{Environment, ListenerOptions, ListenerRegistry};
use dndkit_core::matcher::closest_within;
use web_time::Instant;

use super::{DndOptions, DndState, DragDropCoordinator, dispatch, refuse_destroy};
use crate::emitter::Emitter;
use crate::protocol::{DragEvent, DragEventKind};

const NATIVE_KINDS: [EventKind; 7] = [
    EventKind::DragStart,
    EventKind::Drag,
    EventKind::DragEnter,
    EventKind::DragOver,
    EventKind::DragLeave,
    EventKind::Drop,
    EventKind::DragEnd,
];

/// Native drag-and-drop coordinator for one container.
#[derive(Debug)]
pub struct NativeDnd {
    options: DndOptions,
    state: DndState,
    emitter: Emitter,
    listeners: ListenerRegistry,
    /// Element the platform drag started from.
    origin: Option<NodeId>,
    /// Last zone left with no subsequent enter.
    temp_leave: Option<NodeId>,
    /// Zone switched away from by an enter, awaiting its `dragleave`.
    pending_leave: Option<NodeId>,
    dropped: bool,
    destroyed: bool,
}

impl NativeDnd {
    #[must_use]
    pub fn new(container: NodeId, options: DndOptions) -> Self {
        let mut listeners = ListenerRegistry::new();
        for kind in NATIVE_KINDS {
            listeners.add_listener(kind, ListenerOptions::BUBBLE);
        }
        Self {
            options,
            state: DndState::new(container),
            emitter: Emitter::new(),
            listeners,
            origin: None,
            temp_leave: None,
            pending_leave: None,
            dropped: false,
            destroyed: false,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &DndOptions {
        &self.options
    }

    /// Document listeners the host must route to [`handle_event`].
    ///
    /// [`handle_event`]: DragDropCoordinator::handle_event
    #[must_use]
    pub const fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    fn emit(&mut self, kind: DragEventKind, source: NodeId, raw: &DomEvent) -> DragEvent {
        self.emit_with(kind, source, None, None, raw)
    }

    fn emit_with(
        &mut self,
        kind: DragEventKind,
        source: NodeId,
        target: Option<NodeId>,
        related: Option<NodeId>,
        raw: &DomEvent,
    ) -> DragEvent {
        let event = DragEvent::new(kind, source, self.state.container())
            .with_target(target)
            .with_related(related)
            .with_original(Some(raw.clone()));
        dispatch(&mut self.emitter, event)
    }

    fn reset(&mut self) {
        self.state.clear();
        self.origin = None;
        self.temp_leave = None;
        self.pending_leave = None;
        self.dropped = false;
    }

    /// The platform's own drag from `origin` must survive: a draggable
    /// non-source descendant (image, link) or focused editable text.
    fn keeps_native_default(
        &self,
        doc: &Document,
        source: NodeId,
        origin: NodeId,
        handles: &[NodeId],
    ) -> bool {
        origin != source
            && !handles.contains(&origin)
            && (doc.is_native_draggable(origin) || doc.is_focused_editable(origin))
    }

    // -----------------------------------------------------------------------
    // Drop effect
    // -----------------------------------------------------------------------

    /// Force `dropEffect` to agree with droppability of `zone`.
    ///
    /// Non-droppable zones get `none`; droppable ones get an effect inferred
    /// from `effectAllowed` when left at `none`, which would otherwise kill
    /// the platform's drop silently.
    fn correct_drop_effect(&self, doc: &Document, zone: NodeId, raw: &DomEvent, after: bool) {
        let Some(dt) = raw.data_transfer() else {
            return;
        };
        let Some(effect) = self.expected_drop_effect(doc, zone, dt) else {
            return;
        };
        if after {
            tracing::warn!(
                dropzone = zone.index(),
                found = ?dt.drop_effect(),
                corrected = ?effect,
                "drag listener left an inconsistent dropEffect"
            );
        }
        dt.set_drop_effect(effect);
    }

    fn expected_drop_effect(
        &self,
        doc: &Document,
        zone: NodeId,
        dt: &DataTransfer,
    ) -> Option<DropEffect> {
        let current = dt.drop_effect();
        if self.options.is_droppable(doc, zone) {
            if current == DropEffect::None {
                dt.effect_allowed().infer_drop_effect()
            } else {
                None
            }
        } else if current != DropEffect::None {
            Some(DropEffect::None)
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn on_drag_start(&mut self, doc: &Document, event: &mut DomEvent) {
        if self.state.source().is_some() {
            return;
        }
        let container = self.state.container();
        let origin = event.target;
        let Some(source) = closest_within(doc, container, origin, &self.options.source) else {
            return;
        };

        let handles = match &self.options.handle {
            Some(is_handle) => find_handles(doc, source, &self.options.source, is_handle),
            None => Vec::new(),
        };
        let keep_native = self.keeps_native_default(doc, source, origin, &handles);

        if !handles.is_empty() {
            if let Some(&bad) = handles.iter().find(|&&h| !doc.is_native_draggable(h)) {
                tracing::warn!(
                    handle = bad.index(),
                    source = source.index(),
                    "drag handle is not natively draggable; mark it draggable"
                );
                event.prevent_default();
                return;
            }
            if !handles.iter().any(|&h| doc.contains(h, origin)) {
                if !keep_native {
                    event.prevent_default();
                }
                return;
            }
        }

        if !self.options.is_draggable(doc, source) {
            self.emit(DragEventKind::Prevent, source, event);
            if !keep_native {
                event.prevent_default();
            }
            return;
        }

        self.state.begin(source);
        self.origin = Some(origin);
        if origin != source {
            if let Some(dt) = event.data_transfer() {
                dt.set_drag_image(source, event.client - doc.rect(source).origin());
            }
        }

        let start = self.emit(DragEventKind::Start, source, event);
        if start.canceled() {
            tracing::debug!(source = source.index(), "drag start canceled by listener");
            self.reset();
            if keep_native {
                if let Some(dt) = event.data_transfer() {
                    dt.clear_drag_image();
                }
            } else {
                event.prevent_default();
            }
            return;
        }
        tracing::debug!(source = source.index(), "native drag started");
    }

    fn on_drag(&mut self, event: &DomEvent) {
        let Some(source) = self.state.source() else {
            return;
        };
        if self.origin != Some(event.target) {
            return;
        }
        let over = self.state.over();
        self.emit_with(DragEventKind::Drag, source, over, None, event);
    }

    fn on_drag_enter(&mut self, doc: &Document, event: &mut DomEvent) {
        let Some(source) = self.state.source() else {
            return;
        };
        let container = self.state.container();
        let target = event.target;

        if !doc.contains(container, target) {
            if let Some(over) = self.state.over() {
                self.temp_leave = Some(over);
            }
            self.state.set_over(None);
            self.pending_leave = None;
            return;
        }
        if !doc.is_html(target) {
            tracing::warn!(
                element = target.index(),
                namespace = ?doc.namespace(target),
                "dragenter on a non-HTML element; it cannot host a drop"
            );
            if let Some(over) = self.state.over() {
                self.temp_leave = Some(over);
            }
            self.state.set_over(None);
            self.pending_leave = None;
            return;
        }
        let Some(zone) = closest_within(doc, container, target, &self.options.dropzone) else {
            return;
        };

        if self.state.over() != Some(zone) {
            self.pending_leave = self.state.over();
            self.temp_leave = None;
            self.state.set_over(Some(zone));
            self.correct_drop_effect(doc, zone, event, false);
            self.emit_with(DragEventKind::Enter, source, Some(zone), None, event);
            self.correct_drop_effect(doc, zone, event, true);
        }

        if self.options.is_recognized_pair(doc, source, zone) {
            event.prevent_default();
        } else {
            tracing::debug!(
                source = source.index(),
                dropzone = zone.index(),
                "drag pair not recognized by host; native drop stays disabled"
            );
        }
    }

    fn on_drag_leave(&mut self, doc: &Document, event: &DomEvent) {
        let (Some(source), Some(current)) = (self.state.source(), self.state.over()) else {
            return;
        };
        let container = self.state.container();
        if !doc.contains(container, event.target) {
            return;
        }
        let Some(leaving) = closest_within(doc, container, event.target, &self.options.dropzone)
        else {
            return;
        };

        let Some(related) = event.related_target else {
            if leaving == current {
                self.emit_with(DragEventKind::Leave, source, Some(current), None, event);
                self.temp_leave = Some(current);
                self.state.set_over(None);
            } else if self.pending_leave == Some(leaving) {
                self.emit_with(DragEventKind::Leave, source, Some(leaving), Some(current), event);
            }
            self.pending_leave = None;
            return;
        };

        let entering = closest_within(doc, container, related, &self.options.dropzone);
        if entering == Some(leaving) {
            return;
        }
        if leaving == current {
            self.emit_with(DragEventKind::Leave, source, Some(current), entering, event);
            self.temp_leave = Some(current);
            self.state.set_over(None);
        } else if self.pending_leave == Some(leaving) {
            self.pending_leave = None;
            self.emit_with(DragEventKind::Leave, source, Some(leaving), Some(current), event);
        }
    }

    fn on_drag_over(&mut self, doc: &Document, event: &mut DomEvent) {
        let (Some(source), Some(current)) = (self.state.source(), self.state.over()) else {
            return;
        };
        if !doc.contains(current, event.target) {
            return;
        }
        self.correct_drop_effect(doc, current, event, false);
        if self.options.is_recognized_pair(doc, source, current) {
            event.prevent_default();
        }
        self.emit_with(DragEventKind::Over, source, Some(current), None, event);
        self.correct_drop_effect(doc, current, event, true);
    }

    fn on_drop(&mut self, doc: &Document, event: &mut DomEvent) {
        let (Some(source), Some(current)) = (self.state.source(), self.state.over()) else {
            return;
        };
        if self.dropped || !self.options.is_droppable(doc, current) {
            return;
        }
        // Keep the platform from opening dropped data.
        event.prevent_default();
        self.dropped = true;
        self.emit_with(DragEventKind::Drop, source, Some(current), None, event);
    }

    fn on_drag_end(&mut self, event: &DomEvent) {
        let Some(source) = self.state.source() else {
            return;
        };
        if self.origin != Some(event.target) {
            return;
        }
        let target = self.state.over().or(self.temp_leave);
        self.emit_with(DragEventKind::End, source, target, None, event);
        self.reset();
        tracing::debug!(source = source.index(), "native drag ended");
    }
}

impl DragDropCoordinator for NativeDnd {
    fn state(&self) -> &DndState {
        &self.state
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    fn handle_event(&mut self, doc: &mut Document, event: &mut DomEvent, _now: Instant) {
        if self.destroyed || !self.listeners.is_listening(event.kind) {
            return;
        }
        match event.kind {
            EventKind::DragStart => self.on_drag_start(doc, event),
            EventKind::Drag => self.on_drag(event),
            EventKind::DragEnter => self.on_drag_enter(doc, event),
            EventKind::DragOver => self.on_drag_over(doc, event),
            EventKind::DragLeave => self.on_drag_leave(doc, event),
            EventKind::Drop => self.on_drop(doc, event),
            EventKind::DragEnd => self.on_drag_end(event),
            _ => {}
        }
    }

    /// The platform fires `drag`/`dragover` itself; nothing to poll.
    fn tick(&mut self, _doc: &mut Document, _now: Instant) {}

    fn destroy(&mut self) -> bool {
        if let Some(source) = self.state.source() {
            refuse_destroy(self.state.container(), source);
            return false;
        }
        if !self.destroyed {
            self.listeners.clear();
            self.destroyed = true;
        }
        true
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dndkit_core::event::EffectAllowed;
    use dndkit_core::geometry::{Point, Rect};
    use dndkit_core::Namespace;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(DragEventKind, Option<NodeId>, Option<NodeId>)>>>;

    struct Rig {
        doc: Document,
        dnd: NativeDnd,
        log: Log,
        item: NodeId,
        a: NodeId,
        b: NodeId,
        now: Instant,
    }

    impl Rig {
        fn with(options: DndOptions) -> Self {
            let mut doc = Document::new();
            let container = doc.create(doc.body(), "div");
            let item = doc.create_with_class(container, "div", "source");
            doc.set_draggable(item, Some(true));
            doc.set_rect(item, Rect::new(10.0, 20.0, 100.0, 40.0));
            let a = doc.create_with_class(container, "div", "zone");
            let b = doc.create_with_class(container, "div", "zone");
            let mut dnd = NativeDnd::new(container, options);
            let log: Log = Rc::default();
            for kind in DragEventKind::ALL {
                let log = Rc::clone(&log);
                dnd.on(kind, move |e| {
                    log.borrow_mut().push((e.kind(), e.target(), e.enter()));
                    Ok(())
                });
            }
            Self {
                doc,
                dnd,
                log,
                item,
                a,
                b,
                now: Instant::now(),
            }
        }

        fn new() -> Self {
            Self::with(DndOptions::new("source", "zone"))
        }

        fn send(&mut self, mut ev: DomEvent) -> DomEvent {
            self.dnd.handle_event(&mut self.doc, &mut ev, self.now);
            ev
        }

        fn kinds(&self) -> Vec<DragEventKind> {
            self.log.borrow().iter().map(|e| e.0).collect()
        }

        fn start(&mut self) -> DomEvent {
            let item = self.item;
            self.send(DomEvent::drag(EventKind::DragStart, item))
        }
    }

    #[test]
    fn full_gesture_emits_canonical_sequence() {
        let mut r = Rig::new();
        let (item, a) = (r.item, r.a);
        let ev = r.start();
        assert!(!ev.default_prevented());
        let ev = r.send(DomEvent::drag(EventKind::DragEnter, a));
        assert!(ev.default_prevented(), "enter must be accepted");
        let ev = r.send(DomEvent::drag(EventKind::DragOver, a));
        assert!(ev.default_prevented());
        r.send(DomEvent::drag(EventKind::Drag, item));
        let ev = r.send(DomEvent::drag(EventKind::Drop, a));
        assert!(ev.default_prevented());
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        assert_eq!(
            r.kinds(),
            vec![
                DragEventKind::Start,
                DragEventKind::Enter,
                DragEventKind::Over,
                DragEventKind::Drag,
                DragEventKind::Drop,
                DragEventKind::End,
            ]
        );
        assert_eq!(r.log.borrow().last().map(|e| e.1), Some(Some(a)));
        assert!(!r.dnd.is_dragging(None));
    }

    #[test]
    fn non_draggable_source_emits_prevent_only() {
        let mut r = Rig::with(DndOptions::new("source", "zone").with_draggable(|_, _| false));
        let ev = r.start();
        assert!(ev.default_prevented());
        assert_eq!(r.kinds(), vec![DragEventKind::Prevent]);
        assert!(!r.dnd.is_dragging(None));
    }

    #[test]
    fn dragstart_outside_container_is_ignored() {
        let mut r = Rig::new();
        let stray = r.doc.create_with_class(r.doc.body(), "div", "source");
        let ev = r.send(DomEvent::drag(EventKind::DragStart, stray));
        assert!(!ev.default_prevented());
        assert!(r.kinds().is_empty());
    }

    #[test]
    fn canceled_start_is_undone() {
        let mut r = Rig::new();
        r.dnd.on(DragEventKind::Start, |e| {
            e.cancel();
            Ok(())
        });
        let ev = r.start();
        assert!(ev.default_prevented());
        assert!(!r.dnd.is_dragging(None));
        let item = r.item;
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        assert_eq!(r.kinds(), vec![DragEventKind::Start]);
    }

    #[test]
    fn handle_rule() {
        let opts = DndOptions::new("source", "zone").with_handle("handle");
        let mut r = Rig::with(opts);
        let item = r.item;
        let grip = r.doc.create_with_class(item, "span", "handle");
        r.doc.set_draggable(grip, Some(true));
        r.doc.set_rect(grip, Rect::new(10.0, 20.0, 10.0, 10.0));

        // Outside the handle: refused, no protocol event.
        let ev = r.start();
        assert!(ev.default_prevented());
        assert!(r.kinds().is_empty());

        // From the handle: starts, with a drag image anchored on the source.
        let ev = r.send(
            DomEvent::drag(EventKind::DragStart, grip).with_client(Point::new(15.0, 25.0)),
        );
        assert!(!ev.default_prevented());
        assert_eq!(r.kinds(), vec![DragEventKind::Start]);
        let image = ev.data_transfer().and_then(DataTransfer::drag_image);
        assert_eq!(image.map(|i| i.element), Some(item));
        assert_eq!(image.map(|i| i.offset), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn undraggable_handle_is_a_configuration_error() {
        let opts = DndOptions::new("source", "zone").with_handle("handle");
        let mut r = Rig::with(opts);
        let grip = r.doc.create_with_class(r.item, "span", "handle");
        let ev = r.send(DomEvent::drag(EventKind::DragStart, grip));
        assert!(ev.default_prevented());
        assert!(r.kinds().is_empty());
    }

    #[test]
    fn native_image_drag_inside_source_is_left_alone() {
        let opts = DndOptions::new("source", "zone").with_handle("handle");
        let mut r = Rig::with(opts);
        let grip = r.doc.create_with_class(r.item, "span", "handle");
        r.doc.set_draggable(grip, Some(true));
        let img = r.doc.create(r.item, "img");
        let ev = r.send(DomEvent::drag(EventKind::DragStart, img));
        assert!(!ev.default_prevented());
        assert!(r.kinds().is_empty());
    }

    #[test]
    fn focused_editable_text_keeps_native_drag() {
        let opts = DndOptions::new("source", "zone").with_handle("handle");
        let mut r = Rig::with(opts);
        let grip = r.doc.create_with_class(r.item, "span", "handle");
        r.doc.set_draggable(grip, Some(true));
        let text = r.doc.create(r.item, "span");
        r.doc.set_editable(text, true);

        let ev = r.send(DomEvent::drag(EventKind::DragStart, text));
        assert!(ev.default_prevented(), "unfocused text follows the handle rule");

        r.doc.set_focus(Some(text));
        let ev = r.send(DomEvent::drag(EventKind::DragStart, text));
        assert!(!ev.default_prevented());
        assert!(r.kinds().is_empty());
        assert!(!r.dnd.is_dragging(None));
    }

    #[test]
    fn same_zone_reenter_is_a_no_op() {
        let mut r = Rig::new();
        let a = r.a;
        let child = r.doc.create(a, "span");
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragEnter, child));
        r.send(DomEvent::drag(EventKind::DragLeave, a).with_related_target(Some(child)));
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragLeave, child).with_related_target(Some(a)));
        assert_eq!(r.kinds(), vec![DragEventKind::Start, DragEventKind::Enter]);
        assert_eq!(r.dnd.over(), Some(a));
    }

    #[test]
    fn zone_to_zone_emits_pending_leave() {
        let mut r = Rig::new();
        let (a, b) = (r.a, r.b);
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragEnter, b));
        r.send(DomEvent::drag(EventKind::DragLeave, a).with_related_target(Some(b)));
        let log = r.log.borrow().clone();
        assert_eq!(log[2], (DragEventKind::Enter, Some(b), Some(b)));
        assert_eq!(log[3], (DragEventKind::Leave, Some(a), Some(b)));
        assert_eq!(r.dnd.over(), Some(b));
    }

    #[test]
    fn null_related_leave_of_switched_zone_is_still_reported() {
        let mut r = Rig::new();
        let (item, a, b) = (r.item, r.a, r.b);
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragEnter, b));
        r.send(DomEvent::drag(EventKind::DragLeave, a));
        assert_eq!(r.dnd.over(), Some(b));
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        let log = r.log.borrow().clone();
        assert_eq!(log[3], (DragEventKind::Leave, Some(a), Some(b)));
        assert_eq!(log[4], (DragEventKind::End, Some(b), None));
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn null_related_is_a_true_leave_and_end_reports_it() {
        let mut r = Rig::new();
        let (item, a) = (r.item, r.a);
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragLeave, a));
        assert_eq!(r.dnd.over(), None);
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        let log = r.log.borrow().clone();
        assert_eq!(log[2].0, DragEventKind::Leave);
        assert_eq!(log[3], (DragEventKind::End, Some(a), None));
    }

    #[test]
    fn leaving_container_clears_silently() {
        let mut r = Rig::new();
        let (item, a) = (r.item, r.a);
        let outside = r.doc.create(r.doc.body(), "div");
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragEnter, outside));
        r.send(DomEvent::drag(EventKind::DragLeave, a).with_related_target(Some(outside)));
        assert_eq!(r.dnd.over(), None);
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        assert_eq!(
            r.kinds(),
            vec![DragEventKind::Start, DragEventKind::Enter, DragEventKind::End]
        );
        assert_eq!(r.log.borrow()[2].1, Some(a));
    }

    #[test]
    fn svg_enter_clears_target() {
        let mut r = Rig::new();
        let (item, a) = (r.item, r.a);
        let svg = r.doc.create(a, "svg");
        r.doc.set_namespace(svg, Namespace::Svg);
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        r.send(DomEvent::drag(EventKind::DragEnter, svg));
        assert_eq!(r.dnd.over(), None);
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        let log = r.log.borrow().clone();
        assert_eq!(log.last(), Some(&(DragEventKind::End, Some(a), None)));
    }

    #[test]
    fn unrecognized_pair_is_not_accepted() {
        let opts = DndOptions::new("source", "zone").with_recognized_dropzone(|_, _| false);
        let mut r = Rig::with(opts);
        let a = r.a;
        r.start();
        let ev = r.send(DomEvent::drag(EventKind::DragEnter, a));
        assert!(!ev.default_prevented());
        assert_eq!(r.dnd.over(), Some(a));
    }

    #[test]
    fn droppable_zone_gets_inferred_drop_effect() {
        let mut r = Rig::new();
        let a = r.a;
        r.start();
        let dt = Rc::new(DataTransfer::with_effect_allowed(EffectAllowed::CopyLink));
        let ev = r.send(DomEvent::new(EventKind::DragEnter, a).with_data_transfer(Rc::clone(&dt)));
        assert!(ev.default_prevented());
        assert_eq!(dt.drop_effect(), DropEffect::Copy);
    }

    #[test]
    fn drop_requires_droppable_target() {
        let opts = DndOptions::new("source", "zone").with_droppable(|_, _| false);
        let mut r = Rig::with(opts);
        let a = r.a;
        r.start();
        r.send(DomEvent::drag(EventKind::DragEnter, a));
        let ev = r.send(DomEvent::drag(EventKind::Drop, a));
        assert!(!ev.default_prevented());
        assert!(!r.kinds().contains(&DragEventKind::Drop));
    }

    #[test]
    fn events_from_other_origins_are_ignored() {
        let mut r = Rig::new();
        let a = r.a;
        r.start();
        r.send(DomEvent::drag(EventKind::Drag, a));
        r.send(DomEvent::drag(EventKind::DragEnd, a));
        assert_eq!(r.kinds(), vec![DragEventKind::Start]);
        assert!(r.dnd.is_dragging(None));
    }

    #[test]
    fn destroy_refused_mid_gesture_and_idempotent_when_idle() {
        let mut r = Rig::new();
        let item = r.item;
        r.start();
        assert!(!r.dnd.destroy());
        assert!(!r.dnd.is_destroyed());
        r.send(DomEvent::drag(EventKind::DragEnd, item));
        assert!(r.dnd.destroy());
        assert!(r.dnd.destroy());
        assert!(r.dnd.listeners().is_empty());
        let before = r.kinds().len();
        r.start();
        assert_eq!(r.kinds().len(), before);
    }
}
