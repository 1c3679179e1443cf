#![forbid(unsafe_code)]

//! Document event suppression during simulated drags.
//!
//! While the platform runs a native drag it swallows ordinary UI events:
//! hover transitions, clicks, context menus. A simulated drag has to do the
//! same by hand. [`EventSuppressor`] intercepts a configured set of event
//! kinds while enabled and applies its [`SuppressBehavior`] to each.
//!
//! Listeners that must keep working through suppression (the simulator's
//! own) register on the suppressor itself, which implements
//! [`Environment`]. Those survivors are still routed events of suppressed
//! kinds; everyone else sees `stopImmediatePropagation`.
//!
//! # Invariants
//!
//! 1. A disabled suppressor never touches an event.
//! 2. Events of kinds outside the configured set are never touched.
//! 3. Survivor registration is independent of the enabled flag.

use bitflags::bitflags;
use dndkit_core::event::{DomEvent, EventKind};
use dndkit_core::listener::{Environment, ListenerOptions, ListenerRegistry};

bitflags! {
    /// What suppression does to an intercepted event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SuppressBehavior: u8 {
        const PREVENT_DEFAULT = 0b001;
        const STOP_PROPAGATION = 0b010;
        const STOP_IMMEDIATE_PROPAGATION = 0b100;
    }
}

impl Default for SuppressBehavior {
    fn default() -> Self {
        Self::all()
    }
}

/// Kinds a native drag mutes by default.
pub const DEFAULT_SUPPRESSED_KINDS: [EventKind; 10] = [
    EventKind::MouseOver,
    EventKind::MouseOut,
    EventKind::MouseEnter,
    EventKind::MouseLeave,
    EventKind::Click,
    EventKind::DblClick,
    EventKind::ContextMenu,
    EventKind::SelectStart,
    EventKind::Wheel,
    EventKind::Focus,
];

/// Intercepts document events while a simulated gesture is active.
#[derive(Debug, Clone)]
pub struct EventSuppressor {
    kinds: Vec<EventKind>,
    behavior: SuppressBehavior,
    enabled: bool,
    survivors: ListenerRegistry,
}

impl Default for EventSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSED_KINDS, SuppressBehavior::default())
    }
}

impl EventSuppressor {
    /// Create a disabled suppressor for `kinds`.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = EventKind>, behavior: SuppressBehavior) -> Self {
        let mut deduped: Vec<EventKind> = Vec::new();
        for kind in kinds {
            if !deduped.contains(&kind) {
                deduped.push(kind);
            }
        }
        Self {
            kinds: deduped,
            behavior,
            enabled: false,
            survivors: ListenerRegistry::new(),
        }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            tracing::trace!(kinds = self.kinds.len(), "event suppression enabled");
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if self.enabled {
            tracing::trace!("event suppression disabled");
        }
        self.enabled = false;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn behavior(&self) -> SuppressBehavior {
        self.behavior
    }

    #[must_use]
    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    /// Whether `kind` is in the configured set.
    #[must_use]
    pub fn suppresses(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Listeners registered through this suppressor.
    #[must_use]
    pub const fn survivors(&self) -> &ListenerRegistry {
        &self.survivors
    }

    /// Apply suppression to `event` if enabled and its kind is configured.
    ///
    /// Returns whether the event was suppressed. Survivors are consulted
    /// separately through [`Environment::is_listening`].
    pub fn intercept(&self, event: &mut DomEvent) -> bool {
        if !self.enabled || !self.suppresses(event.kind) {
            return false;
        }
        if self.behavior.contains(SuppressBehavior::PREVENT_DEFAULT) {
            event.prevent_default();
        }
        if self.behavior.contains(SuppressBehavior::STOP_IMMEDIATE_PROPAGATION) {
            event.stop_immediate_propagation();
        } else if self.behavior.contains(SuppressBehavior::STOP_PROPAGATION) {
            event.stop_propagation();
        }
        true
    }
}

impl Environment for EventSuppressor {
    fn add_listener(&mut self, kind: EventKind, options: ListenerOptions) {
        self.survivors.add_listener(kind, options);
    }

    fn remove_listener(&mut self, kind: EventKind, options: ListenerOptions) {
        self.survivors.remove_listener(kind, options);
    }

    fn is_listening(&self, kind: EventKind) -> bool {
        self.survivors.is_listening(kind)
    }
}
