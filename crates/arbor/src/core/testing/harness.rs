use crate::{
    Root,
    core::{
        config::RootConfig,
        error::Result,
        event::{
            CaptureList, Event,
            key::{self, Key, KeyCode},
        },
        id::NodeId,
        surface::Color,
    },
    geom::Rect,
    widget::Widget,
};

use super::init_tracing;

/// A Root plus shortcuts for building trees, running frames and sending
/// input. Every input helper dispatches one event and returns its capture
/// list; frames are run explicitly.
pub struct Harness {
    /// The Root under test.
    pub root: Root,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// A harness with the default configuration.
    pub fn new() -> Self {
        init_tracing();
        Self { root: Root::new() }
    }

    /// A harness with a custom configuration.
    pub fn with_config(config: RootConfig) -> Result<Self> {
        init_tracing();
        Ok(Self {
            root: Root::with_config(config)?,
        })
    }

    /// Create a widget and make it the top of the tree.
    pub fn mount(&mut self, widget: impl Widget) -> Result<NodeId> {
        let id = self.root.create(widget);
        self.root.set_child(id)?;
        Ok(id)
    }

    /// Create a widget as the last child of `parent`.
    pub fn add(&mut self, parent: NodeId, widget: impl Widget) -> Result<NodeId> {
        let id = self.root.create(widget);
        self.root.append_child(parent, id)?;
        Ok(id)
    }

    /// Run a full frame.
    pub fn frame(&mut self) -> Result<bool> {
        self.root.frame()
    }

    /// Dispatch an event.
    pub fn dispatch(&mut self, event: Event) -> Result<CaptureList> {
        self.root.dispatch_event(event)
    }

    /// Move the pointer.
    pub fn move_to(&mut self, x: f64, y: f64) -> Result<CaptureList> {
        self.dispatch(Event::pointer_move(x, y))
    }

    /// Press the primary button.
    pub fn press(&mut self, x: f64, y: f64) -> Result<CaptureList> {
        self.dispatch(Event::pointer_press(x, y))
    }

    /// Release the primary button.
    pub fn release(&mut self, x: f64, y: f64) -> Result<CaptureList> {
        self.dispatch(Event::pointer_release(x, y))
    }

    /// Press and release at the same spot. Returns the release's capture
    /// list.
    pub fn click(&mut self, x: f64, y: f64) -> Result<CaptureList> {
        self.press(x, y)?;
        self.release(x, y)
    }

    /// Scroll the wheel.
    pub fn wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> Result<CaptureList> {
        self.dispatch(Event::wheel(x, y, dx, dy))
    }

    /// Press a key.
    pub fn key(&mut self, k: impl Into<Key>) -> Result<CaptureList> {
        self.dispatch(Event::key_press(k))
    }

    /// Press hardware Tab.
    pub fn tab(&mut self) -> Result<CaptureList> {
        self.key(KeyCode::Tab)
    }

    /// Press hardware Shift-Tab.
    pub fn shift_tab(&mut self) -> Result<CaptureList> {
        self.key(key::Shift + KeyCode::Tab)
    }

    /// Rounded bounds of a node.
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.root.node(id).map_or(Rect::zero(), |n| n.bounds())
    }

    /// A pixel of the Root's surface. Out-of-range pixels are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        match self.root.surface() {
            Some(s) if x < s.width() && y < s.height() => s.pixel(x, y),
            _ => Color::TRANSPARENT,
        }
    }

    /// Size of the Root's surface.
    pub fn surface_size(&self) -> (u32, u32) {
        self.root
            .surface()
            .map_or((0, 0), |s| (s.width(), s.height()))
    }
}
