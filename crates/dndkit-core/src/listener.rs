#![forbid(unsafe_code)]

//! Listener registration seam.
//!
//! Simulators do not receive every raw event: they register the kinds they
//! need on an [`Environment`] and the owner routes only registered kinds to
//! them. The plain [`ListenerRegistry`] stands in for the document; the
//! engine's event suppressor offers a second implementation whose
//! registrations survive suppression.
//!
//! Registration follows `addEventListener` dedup rules: the same kind and
//! capture phase registered twice is stored once.

use crate::event::EventKind;

/// Options passed when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ListenerOptions {
    /// Listen in the capture phase.
    pub capture: bool,
    /// The listener promises never to call `preventDefault`.
    pub passive: bool,
}

impl ListenerOptions {
    /// Bubble phase, non-passive.
    pub const BUBBLE: Self = Self {
        capture: false,
        passive: false,
    };

    /// Capture phase, non-passive.
    pub const CAPTURE: Self = Self {
        capture: true,
        passive: false,
    };
}

/// Something listeners can be added to and removed from.
pub trait Environment {
    fn add_listener(&mut self, kind: EventKind, options: ListenerOptions);

    /// Remove a listener; only `options.capture` takes part in matching.
    fn remove_listener(&mut self, kind: EventKind, options: ListenerOptions);

    /// Whether any listener for `kind` is registered.
    fn is_listening(&self, kind: EventKind) -> bool;
}

/// A record of registered listeners.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    entries: Vec<(EventKind, ListenerOptions)>,
}

impl ListenerRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of distinct registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options of the registration for `kind`, preferring the bubble phase.
    #[must_use]
    pub fn options(&self, kind: EventKind) -> Option<ListenerOptions> {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, o)| *o)
            .min_by_key(|o| o.capture)
    }

    /// Registered kinds, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Environment for ListenerRegistry {
    fn add_listener(&mut self, kind: EventKind, options: ListenerOptions) {
        if self
            .entries
            .iter()
            .any(|(k, o)| *k == kind && o.capture == options.capture)
        {
            return;
        }
        self.entries.push((kind, options));
    }

    fn remove_listener(&mut self, kind: EventKind, options: ListenerOptions) {
        self.entries
            .retain(|(k, o)| !(*k == kind && o.capture == options.capture));
    }

    fn is_listening(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }
}
