#![forbid(unsafe_code)]

//! Typed publish/subscribe over [`DragEventKind`].
//!
//! # Failure Modes
//!
//! A subscriber reports failure by returning `Err`. Emission never stops at
//! a failing subscriber: every listener registered for the kind runs, the
//! failures are collected in registration order, and the whole batch is
//! returned as one [`EmitError`] after dispatch completes. The engine logs
//! the batch and carries on with its own bookkeeping.

use core::fmt;

use crate::protocol::{DragEvent, DragEventKind};

/// Error type subscribers return.
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Subscriber return type.
pub type ListenerResult = Result<(), ListenerError>;

type Callback = Box<dyn FnMut(&DragEvent) -> ListenerResult>;

/// Handle returned by [`Emitter::on`] and [`Emitter::once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Slot {
    id: ListenerId,
    kind: DragEventKind,
    once: bool,
    callback: Callback,
}

/// Registry of protocol subscribers.
#[derive(Default)]
pub struct Emitter {
    slots: Vec<Slot>,
    next_id: u64,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.slots.len())
            .finish()
    }
}

impl Emitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event of `kind`.
    pub fn on<F>(&mut self, kind: DragEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&DragEvent) -> ListenerResult + 'static,
    {
        self.insert(kind, false, Box::new(callback))
    }

    /// Subscribe to the next event of `kind` only.
    pub fn once<F>(&mut self, kind: DragEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&DragEvent) -> ListenerResult + 'static,
    {
        self.insert(kind, true, Box::new(callback))
    }

    fn insert(&mut self, kind: DragEventKind, once: bool, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            kind,
            once,
            callback,
        });
        id
    }

    /// Unsubscribe. Returns `false` if `id` was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != id);
        self.slots.len() != before
    }

    /// Number of subscribers for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: DragEventKind) -> usize {
        self.slots.iter().filter(|s| s.kind == kind).count()
    }

    /// Invoke every subscriber of `event.kind()` in registration order.
    ///
    /// `once` subscribers are removed after they ran, whether or not they
    /// failed.
    pub fn emit(&mut self, event: &DragEvent) -> Result<(), EmitError> {
        let kind = event.kind();
        let mut failures = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.kind == kind) {
            if let Err(err) = (slot.callback)(event) {
                failures.push(err);
            }
        }
        self.slots.retain(|s| !(s.once && s.kind == kind));

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EmitError { kind, failures })
        }
    }
}

/// Failures collected from one emission.
#[derive(Debug)]
pub struct EmitError {
    kind: DragEventKind,
    failures: Vec<ListenerError>,
}

impl EmitError {
    #[must_use]
    pub const fn kind(&self) -> DragEventKind {
        self.kind
    }

    /// Errors in listener registration order.
    #[must_use]
    pub fn failures(&self) -> &[ListenerError] {
        &self.failures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listener(s) failed during {}",
            self.failures.len(),
            self.kind
        )?;
        for (i, err) in self.failures.iter().enumerate() {
            write!(f, "; [{i}] {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.first().map(|e| e.as_ref())
    }
}
