#![forbid(unsafe_code)]

//! End-to-end protocol scenarios across all three modalities.
//!
//! Every test builds a small document, drives a coordinator with raw host
//! events, and checks the exact protocol sequence subscribers observe:
//! - non-draggable native source yields `drag:prevent` only
//! - a source that is also a dropzone starts over itself
//! - touch hold delay boundary (99 ms vs 100 ms)
//! - direct zone switch emits enter before leave
//! - native drop-effect post-correction
//! - one start/prevent and one end per gesture, whatever ends it
//! - idempotent cancel and destroy
//!
//! Run:
//!   cargo test -p dndkit --test scenarios

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dndkit::{
    DndOptions, DragDropCoordinator, DragEventKind, NativeDnd, SimulatedDnd, Simulator,
    SimulatorOptions,
};
use dndkit_core::dom::{Document, NodeId};
use dndkit_core::event::{DomEvent, DropEffect, EventKind, KeyCode, TouchPoint};
use dndkit_core::geometry::{Point, Rect};
use dndkit_core::listener::ListenerRegistry;
use dndkit_core::timer::DeterministicClock;
use pretty_assertions::assert_eq;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    kind: DragEventKind,
    source: NodeId,
    target: Option<NodeId>,
    enter: Option<NodeId>,
    leave: Option<NodeId>,
}

type Log = Rc<RefCell<Vec<Seen>>>;

fn record<C: DragDropCoordinator>(dnd: &mut C) -> Log {
    let log: Log = Rc::default();
    for kind in DragEventKind::ALL {
        let log = Rc::clone(&log);
        dnd.on(kind, move |e| {
            log.borrow_mut().push(Seen {
                kind: e.kind(),
                source: e.source(),
                target: e.target(),
                enter: e.enter(),
                leave: e.leave(),
            });
            Ok(())
        });
    }
    log
}

fn kinds(log: &Log) -> Vec<DragEventKind> {
    log.borrow().iter().map(|s| s.kind).collect()
}

fn count(log: &Log, kind: DragEventKind) -> usize {
    log.borrow().iter().filter(|s| s.kind == kind).count()
}

/// A 300x100 container holding a source and two dropzones side by side.
struct Page {
    doc: Document,
    container: NodeId,
    source: NodeId,
    zone_a: NodeId,
    zone_b: NodeId,
}

impl Page {
    fn new() -> Self {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_rect(body, Rect::new(0.0, 0.0, 800.0, 600.0));
        let container = doc.create(body, "section");
        doc.set_rect(container, Rect::new(0.0, 0.0, 300.0, 100.0));
        let source = doc.create_with_class(container, "div", "source");
        doc.set_draggable(source, Some(true));
        doc.set_rect(source, Rect::new(0.0, 0.0, 100.0, 100.0));
        let zone_a = doc.create_with_class(container, "div", "dropzone");
        doc.set_rect(zone_a, Rect::new(100.0, 0.0, 100.0, 100.0));
        let zone_b = doc.create_with_class(container, "div", "dropzone");
        doc.set_rect(zone_b, Rect::new(200.0, 0.0, 100.0, 100.0));
        Self {
            doc,
            container,
            source,
            zone_a,
            zone_b,
        }
    }

    fn options(&self) -> DndOptions {
        DndOptions::new("source", "dropzone")
    }
}

fn mouse(kind: EventKind, target: NodeId) -> DomEvent {
    DomEvent::mouse(kind, target, Point::new(1.0, 1.0))
}

fn touch(kind: EventKind, target: NodeId, x: f64, y: f64) -> DomEvent {
    DomEvent::touch(kind, target, vec![TouchPoint::new(0, Point::new(x, y))])
}

fn send<C: DragDropCoordinator>(
    dnd: &mut C,
    doc: &mut Document,
    ev: DomEvent,
    clock: &DeterministicClock,
) -> DomEvent {
    let mut ev = ev;
    dnd.handle_event(doc, &mut ev, clock.now());
    ev
}

// ============================================================================
// Native, non-draggable source
// ============================================================================

#[test]
fn native_non_draggable_source_is_prevented() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut dnd = NativeDnd::new(page.container, page.options().with_draggable(|_, _| false));
    let log = record(&mut dnd);

    let ev = send(
        &mut dnd,
        &mut page.doc,
        DomEvent::drag(EventKind::DragStart, page.source),
        &clock,
    );

    assert!(ev.default_prevented());
    assert_eq!(kinds(&log), vec![DragEventKind::Prevent]);
    assert_eq!(log.borrow()[0].source, page.source);
    assert_eq!(count(&log, DragEventKind::Start), 0);
}

// ============================================================================
// Simulated mouse, source that is also a dropzone
// ============================================================================

#[test]
fn simulated_source_that_is_a_dropzone_enters_itself_once() {
    let mut page = Page::new();
    page.doc.add_class(page.source, "dropzone");
    let clock = DeterministicClock::new();
    let mut dnd = SimulatedDnd::mouse(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseDown, page.source), &clock);
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.source), &clock);

    let seen = log.borrow().clone();
    assert_eq!(seen[0].kind, DragEventKind::Start);
    assert_eq!(count(&log, DragEventKind::Enter), 1);
    assert_eq!(seen[1].kind, DragEventKind::Enter);
    assert_eq!(seen[1].enter, Some(page.source));
    assert_eq!(dnd.over(), Some(page.source));

    // Moving within the source keeps it current.
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.source), &clock);
    assert_eq!(count(&log, DragEventKind::Enter), 1);
    assert_eq!(count(&log, DragEventKind::Leave), 0);
}

// ============================================================================
// Touch delay boundary
// ============================================================================

#[test]
fn touch_starts_exactly_at_delay() {
    let mut page = Page::new();
    let mut clock = DeterministicClock::new();
    let mut dnd = SimulatedDnd::touch(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, touch(EventKind::TouchStart, page.source, 10.0, 10.0), &clock);
    clock.advance(Duration::from_millis(99));
    send(&mut dnd, &mut page.doc, touch(EventKind::TouchMove, page.source, 12.0, 10.0), &clock);
    assert_eq!(count(&log, DragEventKind::Start), 0);

    clock.set(Duration::from_millis(100));
    let moved = touch(EventKind::TouchMove, page.source, 14.0, 10.0);
    let ev = send(&mut dnd, &mut page.doc, moved, &clock);
    assert_eq!(count(&log, DragEventKind::Start), 1);
    assert!(ev.default_prevented());

    send(&mut dnd, &mut page.doc, touch(EventKind::TouchEnd, page.source, 14.0, 10.0), &clock);
    assert_eq!(count(&log, DragEventKind::Start), 1);
    assert_eq!(count(&log, DragEventKind::End), 1);
}

// ============================================================================
// Direct zone switch
// ============================================================================

#[test]
fn direct_switch_orders_enter_before_leave() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut dnd = SimulatedDnd::mouse(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseDown, page.source), &clock);
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.source), &clock);
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.zone_a), &clock);
    log.borrow_mut().clear();
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.zone_b), &clock);

    let seen = log.borrow().clone();
    assert_eq!(
        seen[..2],
        [
            Seen {
                kind: DragEventKind::Enter,
                source: page.source,
                target: Some(page.zone_b),
                enter: Some(page.zone_b),
                leave: None,
            },
            Seen {
                kind: DragEventKind::Leave,
                source: page.source,
                target: Some(page.zone_a),
                enter: Some(page.zone_b),
                leave: Some(page.zone_a),
            },
        ]
    );
    assert_eq!(dnd.over(), Some(page.zone_b));
}

#[test]
fn touch_switch_uses_hit_testing() {
    let mut page = Page::new();
    let mut clock = DeterministicClock::new();
    let mut dnd = SimulatedDnd::touch(page.container, page.options());
    let log = record(&mut dnd);
    let body = page.doc.body();

    send(&mut dnd, &mut page.doc, touch(EventKind::TouchStart, page.source, 10.0, 10.0), &clock);
    clock.advance(Duration::from_millis(150));
    send(&mut dnd, &mut page.doc, touch(EventKind::TouchMove, body, 10.0, 10.0), &clock);
    send(&mut dnd, &mut page.doc, touch(EventKind::TouchMove, body, 150.0, 50.0), &clock);
    send(&mut dnd, &mut page.doc, touch(EventKind::TouchMove, body, 250.0, 50.0), &clock);
    assert_eq!(dnd.over(), Some(page.zone_b));
    send(&mut dnd, &mut page.doc, touch(EventKind::TouchEnd, body, 250.0, 50.0), &clock);

    let drop = log
        .borrow()
        .iter()
        .find(|s| s.kind == DragEventKind::Drop)
        .cloned();
    assert_eq!(drop.and_then(|s| s.target), Some(page.zone_b));
}

// ============================================================================
// Native drop-effect correction
// ============================================================================

#[test]
fn native_post_correction_forces_none_on_undroppable_zone() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut dnd = NativeDnd::new(page.container, page.options().with_droppable(|_, _| false));
    dnd.on(DragEventKind::Enter, |e| {
        if let Some(dt) = e.data_transfer() {
            dt.set_drop_effect(DropEffect::Copy);
        }
        Ok(())
    });

    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragStart, page.source), &clock);
    let enter = send(
        &mut dnd,
        &mut page.doc,
        DomEvent::drag(EventKind::DragEnter, page.zone_a),
        &clock,
    );

    let effect = enter.data_transfer().map(|dt| dt.drop_effect());
    assert_eq!(effect, Some(DropEffect::None));
}

// ============================================================================
// One start, one end
// ============================================================================

#[test]
fn every_mouse_terminator_yields_exactly_one_end() {
    let terminators: [fn(NodeId, NodeId) -> DomEvent; 2] = [
        |_, zone| mouse(EventKind::MouseUp, zone),
        |body, _| DomEvent::key_down(body, KeyCode::Escape),
    ];
    for make_end in terminators {
        let mut page = Page::new();
        let clock = DeterministicClock::new();
        let mut dnd = SimulatedDnd::mouse(page.container, page.options());
        let log = record(&mut dnd);
        let body = page.doc.body();

        send(&mut dnd, &mut page.doc, mouse(EventKind::MouseDown, page.source), &clock);
        send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.source), &clock);
        send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, page.zone_a), &clock);
        send(&mut dnd, &mut page.doc, make_end(body, page.zone_a), &clock);
        // Stragglers after the end change nothing.
        send(&mut dnd, &mut page.doc, mouse(EventKind::MouseUp, page.zone_a), &clock);
        send(&mut dnd, &mut page.doc, DomEvent::key_down(body, KeyCode::Escape), &clock);

        assert_eq!(count(&log, DragEventKind::Start), 1);
        assert_eq!(count(&log, DragEventKind::Prevent), 0);
        assert_eq!(count(&log, DragEventKind::End), 1);
        assert!(count(&log, DragEventKind::Drop) <= 1);
        assert_eq!(kinds(&log).last(), Some(&DragEventKind::End));
        assert!(!dnd.is_dragging(None));
    }
}

#[test]
fn start_precedes_every_target_event() {
    let mut page = Page::new();
    let mut clock = DeterministicClock::new();
    let mut dnd = SimulatedDnd::mouse(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseDown, page.source), &clock);
    for target in [page.zone_a, page.zone_b, page.source, page.zone_a] {
        clock.advance(Duration::from_millis(30));
        send(&mut dnd, &mut page.doc, mouse(EventKind::MouseMove, target), &clock);
        dnd.tick(&mut page.doc, clock.now());
    }
    send(&mut dnd, &mut page.doc, mouse(EventKind::MouseUp, page.zone_a), &clock);

    let seen = kinds(&log);
    assert_eq!(seen.first(), Some(&DragEventKind::Start));
    assert_eq!(seen.last(), Some(&DragEventKind::End));
    assert_eq!(count(&log, DragEventKind::Drop), 1);
    let drop_at = seen.iter().position(|k| *k == DragEventKind::Drop);
    assert_eq!(drop_at, Some(seen.len() - 2));
}

#[test]
fn native_gesture_ends_once_on_escape() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut dnd = NativeDnd::new(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragStart, page.source), &clock);
    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragEnter, page.zone_a), &clock);
    // Escape: the platform fires dragleave with no related target, then dragend.
    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragLeave, page.zone_a), &clock);
    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragEnd, page.source), &clock);
    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragEnd, page.source), &clock);

    assert_eq!(
        kinds(&log),
        vec![
            DragEventKind::Start,
            DragEventKind::Enter,
            DragEventKind::Leave,
            DragEventKind::End,
        ]
    );
    assert_eq!(log.borrow()[3].target, Some(page.zone_a));
}

// ============================================================================
// Idempotence and isolation
// ============================================================================

#[test]
fn cancel_twice_on_idle_simulator_is_silent() {
    let page = Page::new();
    let mut env = ListenerRegistry::new();
    let mut sim = Simulator::mouse(page.container, SimulatorOptions::new("source"));
    sim.attach(&mut env);
    sim.cancel(&mut env);
    sim.cancel(&mut env);
    assert!(!sim.is_active());
    assert_eq!(env.len(), 1);
}

#[test]
fn destroy_twice_on_idle_coordinator_is_silent() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut native = NativeDnd::new(page.container, page.options());
    let mut simulated = SimulatedDnd::mouse(page.container, page.options());
    let native_log = record(&mut native);
    let simulated_log = record(&mut simulated);

    assert!(native.destroy());
    assert!(native.destroy());
    assert!(simulated.destroy());
    assert!(simulated.destroy());

    send(&mut native, &mut page.doc, DomEvent::drag(EventKind::DragStart, page.source), &clock);
    send(&mut simulated, &mut page.doc, mouse(EventKind::MouseDown, page.source), &clock);
    send(&mut simulated, &mut page.doc, mouse(EventKind::MouseMove, page.source), &clock);
    assert!(native_log.borrow().is_empty());
    assert!(simulated_log.borrow().is_empty());
}

#[test]
fn coordinators_on_one_document_do_not_interfere() {
    let mut page = Page::new();
    let body = page.doc.body();
    let other = page.doc.create(body, "section");
    let other_source = page.doc.create_with_class(other, "div", "source");
    page.doc.set_draggable(other_source, Some(true));
    let clock = DeterministicClock::new();

    let mut first = NativeDnd::new(page.container, page.options());
    let mut second = NativeDnd::new(other, page.options());
    let first_log = record(&mut first);
    let second_log = record(&mut second);

    for ev in [
        DomEvent::drag(EventKind::DragStart, other_source),
        DomEvent::drag(EventKind::DragEnter, page.zone_a),
        DomEvent::drag(EventKind::DragEnd, other_source),
    ] {
        let mut a = ev.clone();
        let mut b = ev;
        first.handle_event(&mut page.doc, &mut a, clock.now());
        second.handle_event(&mut page.doc, &mut b, clock.now());
    }

    assert!(first_log.borrow().is_empty());
    assert_eq!(
        kinds(&second_log),
        vec![DragEventKind::Start, DragEventKind::End]
    );
}

#[test]
fn second_begin_while_dragging_is_ignored() {
    let mut page = Page::new();
    let clock = DeterministicClock::new();
    let mut dnd = NativeDnd::new(page.container, page.options());
    let log = record(&mut dnd);

    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragStart, page.source), &clock);
    send(&mut dnd, &mut page.doc, DomEvent::drag(EventKind::DragStart, page.source), &clock);
    assert_eq!(count(&log, DragEventKind::Start), 1);
    assert!(dnd.is_dragging(Some(page.source)));
    assert!(!dnd.is_dragging(Some(page.zone_a)));
}
