//! Pointer input primitives.
use crate::{event::key, geom::Point};

/// Pointer button codes.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Primary (usually left) button.
    Primary,
    /// Secondary (usually right) button.
    Secondary,
    /// Middle button.
    Middle,
}

/// A positional pointer event payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Position in the coordinate space of the widget receiving the event.
    pub location: Point,
    /// Button involved, for press and release.
    pub button: Option<Button>,
    /// Keyboard modifiers.
    pub mods: key::Mods,
    /// Identifies the physical pointer (mouse, touch point, XR controller).
    pub source: u32,
}

impl Pointer {
    /// A pointer at `(x, y)` from source 0 with no button.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            location: Point::new(x, y),
            button: None,
            mods: key::Empty,
            source: 0,
        }
    }

    /// Set the button.
    pub fn button(mut self, button: Button) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the pointer source.
    pub fn source(mut self, source: u32) -> Self {
        self.source = source;
        self
    }
}

/// A wheel event payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    /// Pointer state at the time of the wheel event.
    pub pointer: Pointer,
    /// Horizontal scroll delta in layout units.
    pub dx: f64,
    /// Vertical scroll delta in layout units.
    pub dy: f64,
}
