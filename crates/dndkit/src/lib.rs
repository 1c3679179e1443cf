#![forbid(unsafe_code)]

//! Canonical drag-and-drop over native, mouse, and touch input.
//!
//! # Role in dndkit
//! `dndkit` is the interaction engine. Whatever physically drives a drag
//! (the platform's own drag-and-drop, an emulated mouse drag, or an emulated
//! touch drag) subscribers see one protocol: `drag:start` or
//! `drag:prevent`, then `drag:enter` / `drag:over` / `drag:leave` / `drag` /
//! `drag:move`, an optional `drop`, and a final `drag:end`.
//!
//! # Primary responsibilities
//! - **Protocol**: [`DragEvent`] and its cancelable kinds.
//! - **Emitter**: ordered subscribers with collected failures.
//! - **Coordinators**: [`NativeDnd`] and [`SimulatedDnd`] behind
//!   [`DragDropCoordinator`].
//! - **Simulators**: mouse and touch gesture recognition.
//! - **Suppression**: muting ordinary UI events during simulated drags.
//!
//! # How it fits in the system
//! The host mirrors its element tree into a [`dndkit_core::Document`],
//! pushes every raw event through `handle_event`, and calls `tick` from its
//! frame loop. Nothing here sleeps, spawns, or owns a clock.
//!
//! ```rust,ignore
//! let mut dnd = SimulatedDnd::mouse(container, DndOptions::new("item", "list"));
//! dnd.on(DragEventKind::Drop, |e| {
//!     println!("{:?} dropped on {:?}", e.source(), e.dropzone());
//!     Ok(())
//! });
//! dnd.handle_event(&mut doc, &mut event, now);
//! dnd.tick(&mut doc, now);
//! ```

pub mod config;
pub mod coordinator;
pub mod emitter;
pub mod protocol;
pub mod simulator;
pub mod suppress;

pub use config::{ConfigError, DndConfig, SuppressConfig};
pub use coordinator::{
    DndOptions, DndState, DragDropCoordinator, NativeDnd, SimulatedDnd, SimulatedSettings,
};
pub use emitter::{EmitError, Emitter, ListenerError, ListenerId, ListenerResult};
pub use protocol::{DragEvent, DragEventKind};
pub use simulator::{
    Modality, SensorEvent, SensorHandler, Simulator, SimulatorOptions, StartVerdict,
};
pub use suppress::{EventSuppressor, SuppressBehavior};
