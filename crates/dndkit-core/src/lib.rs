#![forbid(unsafe_code)]

//! Core: host document model, raw input events, and element resolution.
//!
//! # Role in dndkit
//! `dndkit-core` is the input layer. It owns the arena [`dom::Document`] the
//! host mirrors its element tree into, the raw [`event::DomEvent`] values the
//! host pushes, and the structural queries every drag coordinator relies on.
//!
//! # Primary responsibilities
//! - **Document**: element tree, classes, namespaces, boxes, focus, scroll.
//! - **DomEvent**: raw mouse, touch, keyboard, and native drag events with
//!   `preventDefault` / propagation flags the host honours.
//! - **Resolution**: [`matcher::closest`] and [`handles::find_handles`].
//! - **Timing**: host-polled [`timer::Interval`] and [`timer::Deadline`].
//! - **Listeners**: the [`listener::Environment`] seam simulators register on.
//!
//! # How it fits in the system
//! The engine crate (`dndkit`) consumes `DomEvent` values, resolves sources and
//! dropzones against the `Document`, and emits the canonical drag protocol.

pub mod dom;
pub mod event;
pub mod geometry;
pub mod handles;
pub mod listener;
pub mod matcher;
pub mod timer;

pub use dom::{Document, Namespace, NodeId};
pub use event::{DomEvent, EventKind};
pub use geometry::{Point, Rect};
pub use matcher::{Matcher, closest};
