//! Events routed through the widget tree.
//!
//! Event kinds form a closed enum. The propagation model, focus channel and
//! positional payload are all derived from the kind, so dispatch code matches
//! on them instead of inspecting types at runtime.

/// Keyboard input.
pub mod key;
/// Pointer input.
pub mod pointer;

use std::cell::Cell;

use crate::{
    core::{focus::FocusType, id::NodeId},
    geom::{Point, Rect},
};

/// How an event moves through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Top-down from the root toward a target, stopping at the first capturer.
    Trickling,
    /// Bottom-up from the originating widget toward the root.
    Bubbling,
    /// Delivered to a single widget, never propagated.
    Sticky,
}

/// State of a tab-selection search.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSelect {
    /// Widget the search is relative to. `None` selects the first (or, when
    /// reversed, the last) tab-focusable widget.
    pub relative_to: Option<NodeId>,
    /// Walk the tree backwards.
    pub reversed: bool,
    /// Set once the search passes `relative_to`.
    reached: Cell<bool>,
}

impl TabSelect {
    /// Start a new search.
    pub fn new(relative_to: Option<NodeId>, reversed: bool) -> Self {
        Self {
            relative_to,
            reversed,
            reached: Cell::new(false),
        }
    }

    /// Has the search passed its relative anchor? Always true without an anchor.
    pub fn reached(&self) -> bool {
        self.relative_to.is_none() || self.reached.get()
    }

    /// Record that the search passed its relative anchor.
    pub(crate) fn mark_reached(&self) {
        self.reached.set(true);
    }
}

/// The payload of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Pointer moved.
    PointerMove(pointer::Pointer),
    /// Pointer button pressed.
    PointerPress(pointer::Pointer),
    /// Pointer button released.
    PointerRelease(pointer::Pointer),
    /// Pointer wheel scrolled.
    PointerWheel(pointer::Wheel),
    /// The pointer left a widget. Sticky, always targeted.
    Leave,
    /// The pointer left the root entirely. Sticky, handled by the root.
    LeaveRoot,
    /// Key pressed.
    KeyPress(key::Key),
    /// Key released.
    KeyRelease(key::Key),
    /// A focus channel is being granted. Sticky.
    Focus(FocusType),
    /// A focus channel was taken away. Sticky.
    Blur(FocusType),
    /// Tab navigation search.
    TabSelect(TabSelect),
    /// Ask ancestors to scroll a rectangle (in the originator's viewport
    /// space) into view. Bubbling.
    AutoScroll(Rect),
}

/// An event, optionally aimed at a specific widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event payload.
    pub kind: EventKind,
    /// Explicit target. Trickling events with a target only reach the target
    /// and its ancestors.
    pub target: Option<NodeId>,
}

impl Event {
    /// An untargeted event.
    pub fn new(kind: EventKind) -> Self {
        Self { kind, target: None }
    }

    /// A targeted event.
    pub fn targeted(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target: Some(target),
        }
    }

    /// Clone this event with a new target.
    pub fn with_target(&self, target: NodeId) -> Self {
        Self {
            kind: self.kind.clone(),
            target: Some(target),
        }
    }

    /// Pointer move at `(x, y)`.
    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerMove(pointer::Pointer::at(x, y)))
    }

    /// Primary button press at `(x, y)`.
    pub fn pointer_press(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerPress(
            pointer::Pointer::at(x, y).button(pointer::Button::Primary),
        ))
    }

    /// Primary button release at `(x, y)`.
    pub fn pointer_release(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerRelease(
            pointer::Pointer::at(x, y).button(pointer::Button::Primary),
        ))
    }

    /// Wheel scroll at `(x, y)`.
    pub fn wheel(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self::new(EventKind::PointerWheel(pointer::Wheel {
            pointer: pointer::Pointer::at(x, y),
            dx,
            dy,
        }))
    }

    /// Key press.
    pub fn key_press(key: impl Into<key::Key>) -> Self {
        Self::new(EventKind::KeyPress(key.into()))
    }

    /// Key release.
    pub fn key_release(key: impl Into<key::Key>) -> Self {
        Self::new(EventKind::KeyRelease(key.into()))
    }

    /// Tab-selection search.
    pub fn tab_select(relative_to: Option<NodeId>, reversed: bool) -> Self {
        Self::new(EventKind::TabSelect(TabSelect::new(relative_to, reversed)))
    }

    /// The pointer left the root.
    pub fn leave_root() -> Self {
        Self::new(EventKind::LeaveRoot)
    }

    /// Propagation model for this event.
    pub fn propagation(&self) -> Propagation {
        match self.kind {
            EventKind::PointerMove(_)
            | EventKind::PointerPress(_)
            | EventKind::PointerRelease(_)
            | EventKind::PointerWheel(_)
            | EventKind::KeyPress(_)
            | EventKind::KeyRelease(_)
            | EventKind::TabSelect(_) => Propagation::Trickling,
            EventKind::AutoScroll(_) => Propagation::Bubbling,
            EventKind::Leave | EventKind::LeaveRoot | EventKind::Focus(_) | EventKind::Blur(_) => {
                Propagation::Sticky
            }
        }
    }

    /// The focus channel this event belongs to, if any.
    pub fn focus_type(&self) -> Option<FocusType> {
        match self.kind {
            EventKind::PointerMove(_)
            | EventKind::PointerPress(_)
            | EventKind::PointerRelease(_)
            | EventKind::PointerWheel(_) => Some(FocusType::Pointer),
            EventKind::KeyPress(_) | EventKind::KeyRelease(_) => Some(FocusType::Keyboard),
            EventKind::TabSelect(_) => Some(FocusType::Tab),
            _ => None,
        }
    }

    /// Is this event dropped when its focus channel is empty?
    pub fn needs_focus(&self) -> bool {
        matches!(self.kind, EventKind::KeyPress(_) | EventKind::KeyRelease(_))
    }

    /// Is this event aimed at the channel's focused widget when untargeted?
    pub fn follows_focus(&self) -> bool {
        !matches!(self.kind, EventKind::TabSelect(_)) && self.focus_type().is_some()
    }

    /// Location of a positional event.
    pub fn location(&self) -> Option<Point> {
        match &self.kind {
            EventKind::PointerMove(p) | EventKind::PointerPress(p) | EventKind::PointerRelease(p) => {
                Some(p.location)
            }
            EventKind::PointerWheel(w) => Some(w.pointer.location),
            _ => None,
        }
    }

    /// An untargeted pointer move at this event's position, carrying the
    /// same pointer state.
    pub fn as_move(&self) -> Option<Self> {
        let p = match &self.kind {
            EventKind::PointerMove(p) | EventKind::PointerPress(p) | EventKind::PointerRelease(p) => *p,
            EventKind::PointerWheel(w) => w.pointer,
            _ => return None,
        };
        Some(Self::new(EventKind::PointerMove(pointer::Pointer { button: None, ..p })))
    }

    /// Is this a positional event?
    pub fn is_positional(&self) -> bool {
        self.location().is_some()
    }

    /// Does this event walk the tree in reverse order?
    pub fn is_reversed(&self) -> bool {
        matches!(&self.kind, EventKind::TabSelect(t) if t.reversed)
    }

    /// Clone this event with positional coordinates shifted by `(dx, dy)`.
    /// Non-positional events are cloned unchanged.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut out = self.clone();
        match &mut out.kind {
            EventKind::PointerMove(p) | EventKind::PointerPress(p) | EventKind::PointerRelease(p) => {
                p.location = p.location.translate(dx, dy);
            }
            EventKind::PointerWheel(w) => {
                w.pointer.location = w.pointer.location.translate(dx, dy);
            }
            _ => {}
        }
        out
    }
}

/// Who captured an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capturer {
    /// A root-level listener.
    Root,
    /// A widget, or one of its listeners.
    Widget(NodeId),
}

/// One dispatched event and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// The event as dispatched, after any retargeting.
    pub event: Event,
    /// Who captured it, if anyone.
    pub capturer: Option<Capturer>,
}

impl Capture {
    /// Construct a capture record from a widget dispatch result.
    pub fn new(event: Event, captured: Option<NodeId>) -> Self {
        Self {
            event,
            capturer: captured.map(Capturer::Widget),
        }
    }

    /// Was the event captured?
    pub fn captured(&self) -> bool {
        self.capturer.is_some()
    }

    /// The capturing widget, if a widget captured the event.
    pub fn widget(&self) -> Option<NodeId> {
        match self.capturer {
            Some(Capturer::Widget(id)) => Some(id),
            _ => None,
        }
    }
}

/// Ordered list of events produced by one root dispatch, including
/// synthesized follow-up events.
pub type CaptureList = Vec<Capture>;
