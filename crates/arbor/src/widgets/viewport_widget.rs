//! A scrolling window onto a child, through a nested viewport.

use crate::{
    Root,
    core::{
        context::{EventCtx, LayoutCtx, PaintCtx, ReadCtx},
        error::Result,
        event::{Event, EventKind},
        id::NodeId,
        layout::Constraints,
        surface::{Color, Surface},
    },
    geom::{Point, Rect, Size},
    widget::Widget,
};

/// Owns a nested viewport whose child is this widget's only child.
///
/// The widget takes its natural size (or whatever the constraints force) and
/// shows part of the child through it. Wheel events scroll, and auto-scroll
/// requests from descendants move the offset so the requested rectangle is
/// visible. The offset is kept inside the scrollable range. Background comes
/// from `viewport/fill`.
#[derive(Debug, Clone)]
pub struct ViewportWidget {
    /// Natural size.
    size: Size,
}

impl ViewportWidget {
    /// A viewport widget asking for `size`.
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    /// Create a viewport widget showing `child`. With a surface, the child
    /// renders into it and is composited; otherwise it paints directly into
    /// the enclosing surface, clipped. Returns the widget's node.
    pub fn install(
        root: &mut Root,
        size: Size,
        child: NodeId,
        surface: Option<Box<dyn Surface>>,
    ) -> Result<NodeId> {
        let id = root.create(Self::new(size));
        match surface {
            Some(s) => root.create_surface_viewport(id, s)?,
            None => root.create_viewport(id)?,
        };
        root.append_child(id, child)?;
        Ok(id)
    }

    /// Clamp an offset so the child never scrolls past its edges.
    fn clamp_offset(o: Point, view: Rect, child: Size) -> Point {
        let min_x = (view.w - child.w).min(0.0);
        let min_y = (view.h - child.h).min(0.0);
        Point::new(o.x.clamp(min_x, 0.0), o.y.clamp(min_y, 0.0))
    }

    /// Move the offset, clamped. Returns whether it changed.
    fn scroll_to(ctx: &mut EventCtx, o: Point) -> Result<bool> {
        let Some((view, _, child)) = ctx.viewport_geometry() else {
            return Ok(false);
        };
        ctx.set_viewport_offset(Self::clamp_offset(o, view, child))
    }

    /// Offset that brings `r`, in child space, into view.
    fn reveal(r: Rect, view: Rect, offset: Point) -> Point {
        let axis = |lo: f64, len: f64, extent: f64, o: f64| {
            if lo + o < 0.0 {
                -lo
            } else if lo + len + o > extent {
                (extent - lo - len).max(-lo)
            } else {
                o
            }
        };
        Point::new(
            axis(r.x, r.w, view.w, offset.x),
            axis(r.y, r.h, view.h, offset.y),
        )
    }
}

impl Widget for ViewportWidget {
    fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        Ok(c.clamp(self.size))
    }

    fn resolve_position(&mut self, _ctx: &mut LayoutCtx, _p: Point) -> Result<()> {
        // The nested viewport places the child.
        Ok(())
    }

    fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        let fill = ctx.theme().color("viewport/fill", Color::TRANSPARENT);
        if fill.a > 0 {
            ctx.fill(fill);
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut EventCtx, event: &Event) -> Result<Option<NodeId>> {
        match &event.kind {
            EventKind::PointerWheel(w) => {
                if let Some(c) = ctx.dispatch_to_children(event)? {
                    return Ok(Some(c));
                }
                let Some((_, offset, _)) = ctx.viewport_geometry() else {
                    return Ok(None);
                };
                let moved = Self::scroll_to(ctx, Point::new(offset.x - w.dx, offset.y - w.dy))?;
                Ok(moved.then_some(ctx.id()))
            }
            EventKind::AutoScroll(r) => {
                if let Some((view, offset, _)) = ctx.viewport_geometry() {
                    Self::scroll_to(ctx, Self::reveal(*r, view, offset))?;
                }
                // Outer viewports get to scroll too.
                Ok(None)
            }
            _ => ctx.dispatch_to_children(event),
        }
    }
}
