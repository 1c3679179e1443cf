#![forbid(unsafe_code)]

//! Raw host input events.
//!
//! [`DomEvent`] is the value the host pushes for every document-level event it
//! observes: mouse, keyboard, touch, and native drag events. The engine never
//! creates raw events itself except in tests; it only reads them and flips the
//! default/propagation flags the host must honour after dispatch.
//!
//! # Design Notes
//!
//! - `client` coordinates are viewport-relative; touch points carry page
//!   coordinates, as in browsers.
//! - [`DataTransfer`] is shared (`Rc`) between the raw event and every
//!   protocol event derived from it, so a subscriber writing `drop_effect`
//!   is observed by the coordinator's post-correction.
//! - Calling `stop_immediate_propagation` implies `stop_propagation`.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::str::FromStr;
use std::rc::Rc;

use bitflags::bitflags;

use crate::dom::NodeId;
use crate::geometry::Point;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Raw document event types the engine can observe or suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    Click,
    DblClick,
    ContextMenu,
    MouseOver,
    MouseOut,
    MouseEnter,
    MouseLeave,
    Wheel,
    KeyDown,
    KeyUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    SelectStart,
    Focus,
    Blur,
    DragStart,
    Drag,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 27] = [
        Self::MouseDown,
        Self::MouseMove,
        Self::MouseUp,
        Self::Click,
        Self::DblClick,
        Self::ContextMenu,
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseEnter,
        Self::MouseLeave,
        Self::Wheel,
        Self::KeyDown,
        Self::KeyUp,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::TouchCancel,
        Self::SelectStart,
        Self::Focus,
        Self::Blur,
        Self::DragStart,
        Self::Drag,
        Self::DragEnter,
        Self::DragOver,
        Self::DragLeave,
        Self::Drop,
        Self::DragEnd,
    ];

    /// The DOM event type string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::ContextMenu => "contextmenu",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::SelectStart => "selectstart",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::DragStart => "dragstart",
            Self::Drag => "drag",
            Self::DragEnter => "dragenter",
            Self::DragOver => "dragover",
            Self::DragLeave => "dragleave",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
        }
    }

    /// Whether this is one of the platform's native drag events.
    #[must_use]
    pub const fn is_native_drag(self) -> bool {
        matches!(
            self,
            Self::DragStart
                | Self::Drag
                | Self::DragEnter
                | Self::DragOver
                | Self::DragLeave
                | Self::Drop
                | Self::DragEnd
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind(pub String);

impl fmt::Display for UnknownEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event type: {:?}", self.0)
    }
}

impl std::error::Error for UnknownEventKind {}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| UnknownEventKind(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Pointer and keyboard details
// ---------------------------------------------------------------------------

/// Mouse buttons, numbered as in `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Usually the left button.
    #[default]
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
    Back,
    Forward,
}

bitflags! {
    /// Modifier keys held during the event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

/// Keyboard keys the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
    Other,
}

/// One touch point, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub identifier: u32,
    pub page: Point,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(identifier: u32, page: Point) -> Self {
        Self { identifier, page }
    }
}

// ---------------------------------------------------------------------------
// DataTransfer
// ---------------------------------------------------------------------------

/// `DataTransfer.dropEffect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DropEffect {
    #[default]
    None,
    Copy,
    Move,
    Link,
}

/// `DataTransfer.effectAllowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectAllowed {
    None,
    Copy,
    CopyLink,
    CopyMove,
    Link,
    LinkMove,
    Move,
    All,
    #[default]
    Uninitialized,
}

impl EffectAllowed {
    /// Whether `effect` is permitted.
    #[must_use]
    pub const fn allows(self, effect: DropEffect) -> bool {
        match effect {
            DropEffect::None => true,
            DropEffect::Copy => matches!(
                self,
                Self::Copy | Self::CopyLink | Self::CopyMove | Self::All | Self::Uninitialized
            ),
            DropEffect::Move => matches!(
                self,
                Self::Move | Self::CopyMove | Self::LinkMove | Self::All | Self::Uninitialized
            ),
            DropEffect::Link => matches!(
                self,
                Self::Link | Self::CopyLink | Self::LinkMove | Self::All | Self::Uninitialized
            ),
        }
    }

    /// The drop effect a platform would pick for a droppable target, or
    /// `None` when nothing but `none` is allowed.
    ///
    /// Preference order is move, copy, link.
    #[must_use]
    pub const fn infer_drop_effect(self) -> Option<DropEffect> {
        if self.allows(DropEffect::Move) {
            Some(DropEffect::Move)
        } else if self.allows(DropEffect::Copy) {
            Some(DropEffect::Copy)
        } else if self.allows(DropEffect::Link) {
            Some(DropEffect::Link)
        } else {
            None
        }
    }
}

/// Custom drag feedback image, anchored at `offset` inside `element`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragImage {
    pub element: NodeId,
    pub offset: Point,
}

/// Mutable drag session data shared between a native drag event and the
/// protocol events derived from it.
#[derive(Debug, Default)]
pub struct DataTransfer {
    drop_effect: Cell<DropEffect>,
    effect_allowed: Cell<EffectAllowed>,
    drag_image: RefCell<Option<DragImage>>,
}

impl DataTransfer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_effect_allowed(effect_allowed: EffectAllowed) -> Self {
        let dt = Self::default();
        dt.effect_allowed.set(effect_allowed);
        dt
    }

    #[must_use]
    pub fn drop_effect(&self) -> DropEffect {
        self.drop_effect.get()
    }

    pub fn set_drop_effect(&self, effect: DropEffect) {
        self.drop_effect.set(effect);
    }

    #[must_use]
    pub fn effect_allowed(&self) -> EffectAllowed {
        self.effect_allowed.get()
    }

    pub fn set_effect_allowed(&self, effect_allowed: EffectAllowed) {
        self.effect_allowed.set(effect_allowed);
    }

    /// The custom drag image, or `None` for the platform default.
    #[must_use]
    pub fn drag_image(&self) -> Option<DragImage> {
        *self.drag_image.borrow()
    }

    pub fn set_drag_image(&self, element: NodeId, offset: Point) {
        *self.drag_image.borrow_mut() = Some(DragImage { element, offset });
    }

    /// Restore the platform default drag image.
    pub fn clear_drag_image(&self) {
        *self.drag_image.borrow_mut() = None;
    }
}

// ---------------------------------------------------------------------------
// DomEvent
// ---------------------------------------------------------------------------

bitflags! {
    /// Dispatch flags set by listeners.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DispatchFlags: u8 {
        const DEFAULT_PREVENTED      = 0b001;
        const PROPAGATION_STOPPED    = 0b010;
        const IMMEDIATE_PROPAGATION_STOPPED = 0b100;
    }
}

/// A raw document event.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub kind: EventKind,
    /// The element the event was dispatched at.
    pub target: NodeId,
    /// `relatedTarget` for enter/leave style events.
    pub related_target: Option<NodeId>,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub key: Option<KeyCode>,
    /// Viewport coordinates of the pointer.
    pub client: Point,
    /// Touch points relevant to this event (`changedTouches` for end/cancel).
    pub touches: Vec<TouchPoint>,
    pub data_transfer: Option<Rc<DataTransfer>>,
    flags: DispatchFlags,
}

impl DomEvent {
    /// Create an event with neutral details.
    #[must_use]
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            related_target: None,
            button: MouseButton::Primary,
            modifiers: Modifiers::NONE,
            key: None,
            client: Point::ZERO,
            touches: Vec::new(),
            data_transfer: None,
            flags: DispatchFlags::empty(),
        }
    }

    /// A mouse event with the primary button at `client`.
    #[must_use]
    pub fn mouse(kind: EventKind, target: NodeId, client: Point) -> Self {
        Self::new(kind, target).with_client(client)
    }

    /// A `keydown` for `key`.
    #[must_use]
    pub fn key_down(target: NodeId, key: KeyCode) -> Self {
        let mut ev = Self::new(EventKind::KeyDown, target);
        ev.key = Some(key);
        ev
    }

    /// A touch event carrying `touches`.
    #[must_use]
    pub fn touch(kind: EventKind, target: NodeId, touches: Vec<TouchPoint>) -> Self {
        let mut ev = Self::new(kind, target);
        ev.touches = touches;
        ev
    }

    /// A native drag event with a fresh [`DataTransfer`].
    #[must_use]
    pub fn drag(kind: EventKind, target: NodeId) -> Self {
        Self::new(kind, target).with_data_transfer(Rc::new(DataTransfer::new()))
    }

    #[must_use]
    pub fn with_client(mut self, client: Point) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    #[must_use]
    pub fn with_data_transfer(mut self, data_transfer: Rc<DataTransfer>) -> Self {
        self.data_transfer = Some(data_transfer);
        self
    }

    #[must_use]
    pub fn data_transfer(&self) -> Option<&DataTransfer> {
        self.data_transfer.as_deref()
    }

    /// First touch point, if any.
    #[must_use]
    pub fn primary_touch(&self) -> Option<TouchPoint> {
        self.touches.first().copied()
    }

    /// Whether this is an Escape `keydown`.
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.kind == EventKind::KeyDown && self.key == Some(KeyCode::Escape)
    }

    // -----------------------------------------------------------------------
    // Dispatch flags
    // -----------------------------------------------------------------------

    pub fn prevent_default(&mut self) {
        self.flags.insert(DispatchFlags::DEFAULT_PREVENTED);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.flags.contains(DispatchFlags::DEFAULT_PREVENTED)
    }

    pub fn stop_propagation(&mut self) {
        self.flags.insert(DispatchFlags::PROPAGATION_STOPPED);
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.flags.contains(DispatchFlags::PROPAGATION_STOPPED)
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.flags.insert(
            DispatchFlags::PROPAGATION_STOPPED | DispatchFlags::IMMEDIATE_PROPAGATION_STOPPED,
        );
    }

    #[must_use]
    pub fn immediate_propagation_stopped(&self) -> bool {
        self.flags
            .contains(DispatchFlags::IMMEDIATE_PROPAGATION_STOPPED)
    }

    #[must_use]
    pub const fn flags(&self) -> DispatchFlags {
        self.flags
    }
}
