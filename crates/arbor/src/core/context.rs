//! Contexts handed to widget hooks.
//!
//! Each hook gets a context scoped to the phase it runs in. Read-only queries
//! shared by all phases live on [`ReadCtx`].

use crate::{
    Root,
    core::{
        dispatch,
        error::{Error, Result},
        event::{Event, EventKind},
        focus::FocusType,
        id::{NodeId, ViewportId},
        layout::Constraints,
        node::Node,
        paint::PaintTransform,
        root::PendingOp,
        surface::{Color, Surface},
        theme::Theme,
        tree, viewport,
    },
    geom::{Point, Rect, Size},
};

/// Queries available in every non-paint context.
pub trait ReadCtx {
    /// The Root.
    fn root(&self) -> &Root;

    /// The node whose hook is running.
    fn id(&self) -> NodeId;

    /// This node's arena data.
    fn node(&self) -> Option<&Node> {
        self.root().node(self.id())
    }

    /// Rounded bounds, in viewport space.
    fn bounds(&self) -> Rect {
        self.node().map_or(Rect::zero(), Node::bounds)
    }

    /// Unrounded layout geometry.
    fn ideal(&self) -> Rect {
        self.node().map_or(Rect::zero(), Node::ideal)
    }

    /// Child node ids.
    fn children(&self) -> Vec<NodeId> {
        self.node().map(|n| n.children().to_vec()).unwrap_or_default()
    }

    /// The theme.
    fn theme(&self) -> &Theme {
        self.root().theme()
    }

    /// Does this node hold a focus channel?
    fn has_focus(&self, ty: FocusType) -> bool {
        self.root().focus(ty) == Some(self.id())
    }

    /// The nested viewport this node owns.
    fn owned_viewport(&self) -> Option<ViewportId> {
        self.node().and_then(Node::owned_viewport)
    }
}

/// Context for update hooks: pre-layout, post-layout, activation.
pub struct UpdateCtx<'a> {
    /// The Root.
    root: &'a mut Root,
    /// Current node.
    id: NodeId,
}

impl<'a> UpdateCtx<'a> {
    /// Construct a context for `id`.
    pub(crate) fn new(root: &'a mut Root, id: NodeId) -> Self {
        Self { root, id }
    }

    /// Mark this node's whole bounds for repaint.
    pub fn mark_dirty(&mut self) {
        tree::mark_whole_as_dirty(self.root, self.id);
    }

    /// Mark a rectangle of this node, in viewport space, for repaint.
    pub fn mark_rect_dirty(&mut self, r: Rect) {
        tree::mark_as_dirty(self.root, self.id, r);
    }

    /// Request layout for this node.
    pub fn mark_layout_dirty(&mut self) {
        tree::mark_layout_dirty(self.root, self.id);
    }
}

impl ReadCtx for UpdateCtx<'_> {
    fn root(&self) -> &Root {
        self.root
    }

    fn id(&self) -> NodeId {
        self.id
    }
}

/// Context for the layout hooks.
pub struct LayoutCtx<'a> {
    /// The Root.
    root: &'a mut Root,
    /// Current node.
    id: NodeId,
}

impl<'a> LayoutCtx<'a> {
    /// Construct a context for `id`.
    pub(crate) fn new(root: &'a mut Root, id: NodeId) -> Self {
        Self { root, id }
    }

    /// Check that `child` is a direct child of this node.
    fn check_child(&self, child: NodeId) -> Result<()> {
        match self.root.nodes.get(child) {
            Some(n) if n.parent == Some(self.id) => Ok(()),
            Some(_) => Err(Error::Invalid(format!(
                "{child:?} is not a child of {:?}",
                self.id
            ))),
            None => Err(Error::NodeNotFound(child)),
        }
    }

    /// Resolve a child's dimensions.
    pub fn resolve_child(&mut self, child: NodeId, c: Constraints) -> Result<Size> {
        self.check_child(child)?;
        tree::resolve_dimensions(self.root, child, c)
    }

    /// Position a child. Coordinates are in viewport space.
    pub fn position_child(&mut self, child: NodeId, p: Point) -> Result<()> {
        self.check_child(child)?;
        tree::resolve_position(self.root, child, p)
    }

    /// A child's resolved ideal size.
    pub fn child_size(&self, child: NodeId) -> Size {
        self.root
            .nodes
            .get(child)
            .map_or(Size::zero(), |n| n.ideal.size())
    }

    /// Is a child enabled? Disabled children take no space.
    pub fn child_enabled(&self, child: NodeId) -> bool {
        self.root.nodes.get(child).is_some_and(|n| n.enabled)
    }

    /// Ask for another layout pass after this one. Viewports bound the
    /// number of extra passes.
    pub fn request_relayout(&mut self) {
        tree::mark_layout_dirty(self.root, self.id);
    }

    /// Set the constraints of this node's nested viewport.
    pub fn set_viewport_constraints(&mut self, c: Constraints) -> Result<()> {
        let vid = self
            .owned_viewport()
            .ok_or_else(|| Error::Invalid(format!("{:?} owns no viewport", self.id)))?;
        if let Some(vp) = self.root.viewports.get_mut(vid) {
            vp.set_constraints(c);
        }
        Ok(())
    }
}

impl ReadCtx for LayoutCtx<'_> {
    fn root(&self) -> &Root {
        self.root
    }

    fn id(&self) -> NodeId {
        self.id
    }
}

/// Context for event handlers and widget listeners.
pub struct EventCtx<'a> {
    /// The Root.
    root: &'a mut Root,
    /// Current node.
    id: NodeId,
}

impl<'a> EventCtx<'a> {
    /// Construct a context for `id`.
    pub(crate) fn new(root: &'a mut Root, id: NodeId) -> Self {
        Self { root, id }
    }

    /// Capture the event at this node.
    pub fn capture(&self) -> Result<Option<NodeId>> {
        Ok(Some(self.id))
    }

    /// Forward an event to this node's children: through the nested viewport
    /// if the node owns one, otherwise to each child in order (reverse order
    /// for reversed events) until one captures. Only trickling events are
    /// forwarded.
    pub fn dispatch_to_children(&mut self, event: &Event) -> Result<Option<NodeId>> {
        dispatch::dispatch_to_children(self.root, self.id, event)
    }

    /// Ask for a focus channel. Applied once the current dispatch finishes.
    pub fn request_focus(&mut self, ty: FocusType) {
        self.root.pending.push(PendingOp::Focus(ty, self.id));
    }

    /// Give up a focus channel if this node holds it. Applied once the
    /// current dispatch finishes.
    pub fn release_focus(&mut self, ty: FocusType) {
        self.root.pending.push(PendingOp::Release(ty, self.id));
    }

    /// Send a bubbling event from this node's parent upwards. Applied once the
    /// current dispatch finishes.
    pub fn bubble(&mut self, kind: EventKind) {
        self.root.pending.push(PendingOp::Bubble(self.id, kind));
    }

    /// Ask ancestors to scroll `r`, in this node's viewport space, into view.
    pub fn scroll_into_view(&mut self, r: Rect) {
        self.bubble(EventKind::AutoScroll(r));
    }

    /// Request a pointer style for `(self, source)`.
    pub fn request_pointer_style(&mut self, source: u32, style: &str) -> bool {
        self.root.request_pointer_style(self.id, source, style)
    }

    /// Clear the pointer style for `(self, source)`.
    pub fn clear_pointer_style(&mut self, source: u32) -> bool {
        self.root.clear_pointer_style(self.id, source)
    }

    /// Clear every pointer style this node requested.
    pub fn clear_pointer_styles(&mut self) -> bool {
        self.root.clear_pointer_styles_from_widget(self.id)
    }

    /// Mark this node's whole bounds for repaint.
    pub fn mark_dirty(&mut self) {
        tree::mark_whole_as_dirty(self.root, self.id);
    }

    /// Request layout for this node.
    pub fn mark_layout_dirty(&mut self) {
        tree::mark_layout_dirty(self.root, self.id);
    }

    /// Move the child of this node's nested viewport. Returns `true` if the
    /// offset changed.
    pub fn set_viewport_offset(&mut self, offset: Point) -> Result<bool> {
        let vid = self
            .owned_viewport()
            .ok_or_else(|| Error::Invalid(format!("{:?} owns no viewport", self.id)))?;
        self.root.set_viewport_offset(vid, offset)
    }

    /// The nested viewport's rect and offset, and its child's rounded size.
    pub fn viewport_geometry(&self) -> Option<(Rect, Point, Size)> {
        let vid = self.owned_viewport()?;
        let vp = self.root.viewports.get(vid)?;
        let child = viewport::viewport_child(self.root, vid)
            .and_then(|c| self.root.nodes.get(c))
            .map_or(Size::zero(), |n| n.bounds.size());
        Some((vp.rect, vp.offset, child))
    }

    /// Detach a node from the tree. Any node may be detached, including the
    /// Root's child; the running dispatch notices and stops.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.root.detach(id)
    }

    /// Enable or disable a node.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        self.root.set_enabled(id, enabled)
    }

    /// The Root's child.
    pub fn tree_root(&self) -> Option<NodeId> {
        self.root.child()
    }
}

impl ReadCtx for EventCtx<'_> {
    fn root(&self) -> &Root {
        self.root
    }

    fn id(&self) -> NodeId {
        self.id
    }
}

/// Context for the paint hook.
pub struct PaintCtx<'a> {
    /// Target surface.
    surface: &'a mut dyn Surface,
    /// Layout space to pixel mapping.
    xf: PaintTransform,
    /// The theme.
    theme: &'a Theme,
    /// Current node.
    id: NodeId,
    /// Rounded bounds of the current node.
    bounds: Rect,
}

impl<'a> PaintCtx<'a> {
    /// Construct a paint context.
    pub(crate) fn new(
        surface: &'a mut dyn Surface,
        xf: PaintTransform,
        theme: &'a Theme,
        id: NodeId,
        bounds: Rect,
    ) -> Self {
        Self {
            surface,
            xf,
            theme,
            id,
            bounds,
        }
    }

    /// The node being painted.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Rounded bounds, in viewport space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The theme.
    pub fn theme(&self) -> &Theme {
        self.theme
    }

    /// Fill a rectangle given in viewport space.
    pub fn fill_rect(&mut self, r: Rect, color: Color) {
        let (w, h) = (self.surface.width(), self.surface.height());
        if let Some(p) = self.xf.to_pixels(r, w, h) {
            self.surface.fill_rect(p, color);
        }
    }

    /// Fill this node's bounds.
    pub fn fill(&mut self, color: Color) {
        self.fill_rect(self.bounds, color);
    }

    /// The underlying surface, for drawing the context does not cover.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    /// The layout to pixel mapping in effect.
    pub fn transform(&self) -> PaintTransform {
        self.xf
    }
}
