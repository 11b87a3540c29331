use std::{cell::RefCell, rc::Rc};

use crate::{
    Root,
    core::{
        context::{EventCtx, LayoutCtx, PaintCtx, ReadCtx},
        driver::Driver,
        error::Result,
        event::{Event, EventKind},
        focus::FocusType,
        id::NodeId,
        layout::Constraints,
        surface::Color,
    },
    geom::{Point, Rect, Size},
    widget::Widget,
};

/// Shared log of `(widget, event)` pairs, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<(NodeId, EventKind)>>>);

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    fn push(&self, id: NodeId, kind: EventKind) {
        self.0.borrow_mut().push((id, kind));
    }

    /// Every entry.
    pub fn entries(&self) -> Vec<(NodeId, EventKind)> {
        self.0.borrow().clone()
    }

    /// Entries for one widget.
    pub fn of(&self, id: NodeId) -> Vec<EventKind> {
        self.0
            .borrow()
            .iter()
            .filter(|(n, _)| *n == id)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Number of entries for `id` matching `pred`.
    pub fn count(&self, id: NodeId, pred: impl Fn(&EventKind) -> bool) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|(n, k)| *n == id && pred(k))
            .count()
    }

    /// Number of blur events for `id` on channel `ty`.
    pub fn blurs(&self, id: NodeId, ty: FocusType) -> usize {
        self.count(id, |k| matches!(k, EventKind::Blur(t) if *t == ty))
    }

    /// Number of leave events for `id`.
    pub fn leaves(&self, id: NodeId) -> usize {
        self.count(id, |k| matches!(k, EventKind::Leave))
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A configurable widget that records every event it handles.
///
/// A probe asks for a fixed size, fills itself with a color if given one, and
/// stacks its children at its origin plus an inset. What it captures is set
/// with the builder methods; everything else is forwarded to its children.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Natural size.
    size: Size,
    /// Where children are placed, relative to the probe's origin.
    inset: Point,
    /// Fill color.
    color: Option<Color>,
    /// Event log.
    log: EventLog,
    /// Accept tab focus.
    tab_focusable: bool,
    /// Capture focus-grant events.
    accept_focus: bool,
    /// Capture pointer events inside the bounds.
    capture_pointer: bool,
    /// Capture key events.
    capture_keys: bool,
    /// Take pointer focus on press and drop it on release.
    grab: bool,
    /// Number of paint calls.
    paints: Rc<RefCell<usize>>,
}

impl Probe {
    /// A probe of `size` writing to `log`.
    pub fn new(size: Size, log: &EventLog) -> Self {
        Self {
            size,
            inset: Point::zero(),
            color: None,
            log: log.clone(),
            tab_focusable: false,
            accept_focus: false,
            capture_pointer: false,
            capture_keys: false,
            grab: false,
            paints: Rc::default(),
        }
    }

    /// Place children at `inset` from the probe's origin.
    pub fn inset(mut self, x: f64, y: f64) -> Self {
        self.inset = Point::new(x, y);
        self
    }

    /// Fill with a color.
    pub fn color(mut self, c: Color) -> Self {
        self.color = Some(c);
        self
    }

    /// Accept tab focus and capture focus grants.
    pub fn tab_focusable(mut self) -> Self {
        self.tab_focusable = true;
        self.accept_focus = true;
        self
    }

    /// Capture focus grants.
    pub fn accept_focus(mut self) -> Self {
        self.accept_focus = true;
        self
    }

    /// Capture pointer events that land inside the bounds.
    pub fn capture_pointer(mut self) -> Self {
        self.capture_pointer = true;
        self
    }

    /// Capture key events.
    pub fn capture_keys(mut self) -> Self {
        self.capture_keys = true;
        self
    }

    /// Grab pointer focus on press, release it on release. Implies
    /// capturing pointer events and focus grants.
    pub fn grab(mut self) -> Self {
        self.grab = true;
        self.capture_pointer = true;
        self.accept_focus = true;
        self
    }

    /// A shared counter of paint calls.
    pub fn paint_counter(&self) -> Rc<RefCell<usize>> {
        self.paints.clone()
    }
}

impl Widget for Probe {
    fn resolve_dimensions(&mut self, ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        for child in ctx.children() {
            ctx.resolve_child(child, c.loosen())?;
        }
        Ok(c.clamp(self.size))
    }

    fn resolve_position(&mut self, ctx: &mut LayoutCtx, p: Point) -> Result<()> {
        let at = p + self.inset;
        for child in ctx.children() {
            ctx.position_child(child, at)?;
        }
        Ok(())
    }

    fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        *self.paints.borrow_mut() += 1;
        if let Some(c) = self.color {
            ctx.fill(c);
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut EventCtx, event: &Event) -> Result<Option<NodeId>> {
        let id = ctx.id();
        self.log.push(id, event.kind.clone());
        if let Some(c) = ctx.dispatch_to_children(event)? {
            return Ok(Some(c));
        }
        let inside = event.location().is_some_and(|p| ctx.bounds().contains(p));
        Ok(match &event.kind {
            EventKind::Focus(_) if self.accept_focus => Some(id),
            EventKind::PointerPress(_) if self.capture_pointer && inside => {
                if self.grab {
                    ctx.request_focus(FocusType::Pointer);
                }
                Some(id)
            }
            EventKind::PointerRelease(_) if self.capture_pointer => {
                if self.grab {
                    ctx.release_focus(FocusType::Pointer);
                }
                (inside || self.grab).then_some(id)
            }
            EventKind::PointerMove(_) | EventKind::PointerWheel(_)
                if self.capture_pointer && inside =>
            {
                Some(id)
            }
            EventKind::KeyPress(_) | EventKind::KeyRelease(_) if self.capture_keys => Some(id),
            _ => None,
        })
    }

    fn accepts_tab_focus(&self) -> bool {
        self.tab_focusable
    }
}

/// A driver notification, as recorded by [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// `update`.
    Update,
    /// `on_enable`.
    Enable,
    /// `on_disable`.
    Disable,
    /// `on_focus_changed`.
    FocusChanged(FocusType, Option<NodeId>),
    /// `on_focus_capturer_changed`.
    CapturerChanged(FocusType, Option<NodeId>, Option<NodeId>),
}

/// A driver that records every call it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    /// Calls, in order.
    pub calls: Rc<RefCell<Vec<DriverCall>>>,
}

impl RecordingDriver {
    /// A driver and a handle on its call log.
    pub fn new() -> (Self, Rc<RefCell<Vec<DriverCall>>>) {
        let d = Self::default();
        let calls = d.calls.clone();
        (d, calls)
    }
}

impl Driver for RecordingDriver {
    fn update(&mut self, _root: &mut Root) {
        self.calls.borrow_mut().push(DriverCall::Update);
    }

    fn on_enable(&mut self, _root: &mut Root) {
        self.calls.borrow_mut().push(DriverCall::Enable);
    }

    fn on_disable(&mut self, _root: &mut Root) {
        self.calls.borrow_mut().push(DriverCall::Disable);
    }

    fn on_focus_changed(&mut self, _root: &mut Root, ty: FocusType, widget: Option<NodeId>) {
        self.calls
            .borrow_mut()
            .push(DriverCall::FocusChanged(ty, widget));
    }

    fn on_focus_capturer_changed(
        &mut self,
        _root: &mut Root,
        ty: FocusType,
        old: Option<NodeId>,
        new: Option<NodeId>,
    ) {
        self.calls
            .borrow_mut()
            .push(DriverCall::CapturerChanged(ty, old, new));
    }
}
