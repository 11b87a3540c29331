//! The widget trait.

use std::any::{Any, type_name};

use crate::{
    core::{
        context::{EventCtx, LayoutCtx, PaintCtx, ReadCtx, UpdateCtx},
        error::Result,
        event::Event,
        id::NodeId,
        layout::Constraints,
    },
    geom::{Point, Rect, Size},
};

/// Widgets are the behavior attached to nodes in the Root's arena.
///
/// Generic state (geometry, flags, tree links) lives on the node; a widget
/// only implements the hooks it needs. The defaults describe a transparent
/// container that stacks its children at its own origin.
pub trait Widget: Any {
    /// Called once per frame before layout. Return `true` to mark this
    /// widget layout-dirty, for instance because its content changed.
    fn pre_layout(&mut self, _ctx: &mut UpdateCtx) -> bool {
        false
    }

    /// Called once per frame after layout.
    fn post_layout(&mut self, _ctx: &mut UpdateCtx) {}

    /// Sizing hook. The result should lie within `c`; if it does not, it is
    /// clamped and an error is logged.
    fn resolve_dimensions(&mut self, ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        let mut size = c.clamp(Size::zero());
        for child in ctx.children() {
            let s = ctx.resolve_child(child, c.loosen())?;
            size.w = size.w.max(s.w);
            size.h = size.h.max(s.h);
        }
        Ok(c.clamp(size))
    }

    /// Position hook. `p` has already been assigned as this widget's ideal
    /// position; containers position their children here.
    fn resolve_position(&mut self, ctx: &mut LayoutCtx, p: Point) -> Result<()> {
        for child in ctx.children() {
            ctx.position_child(child, p)?;
        }
        Ok(())
    }

    /// Draw this widget. Children are painted afterwards by the framework.
    /// `dirty` is the part of the bounds being repainted; drawing is clipped
    /// to it.
    fn paint(&mut self, _ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        Ok(())
    }

    /// Decide whether to capture an event, returning the capturing widget.
    ///
    /// The default forwards trickling events to the children.
    fn handle_event(&mut self, ctx: &mut EventCtx, event: &Event) -> Result<Option<NodeId>> {
        ctx.dispatch_to_children(event)
    }

    /// Can tab navigation select this widget?
    fn accepts_tab_focus(&self) -> bool {
        false
    }

    /// The widget became active.
    fn activate(&mut self, _ctx: &mut UpdateCtx) {}

    /// The widget became inactive. Focus, pointer style and hover claims
    /// have already been dropped.
    fn deactivate(&mut self, _ctx: &mut UpdateCtx) {}

    /// Name used in diagnostics.
    fn name(&self) -> String {
        let name = type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name).to_string()
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
