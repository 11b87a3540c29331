//! Viewports.
//!
//! A viewport maps one child widget onto a rectangular region of a drawing
//! surface. The Root owns a surface-backed viewport for the whole tree;
//! widgets may own nested viewports, which either clip their subtree into the
//! enclosing surface or render it into a surface of their own.
//!
//! Coordinates: the child of a viewport with relative coordinates is laid out
//! at the origin of its own space, and a child-space point `c` lands at
//! `rect.origin + offset + c` in the enclosing space. With absolute
//! coordinates the child shares the enclosing space and keeps its own
//! preferred position.

use tracing::{debug, trace, warn};

use crate::{
    Root,
    core::{
        dispatch,
        error::{Error, Result},
        event::Event,
        id::{NodeId, ViewportId},
        layout::Constraints,
        surface_viewport,
        tree,
    },
    geom::{Point, Rect, Scale, Size},
};

pub use crate::core::surface_viewport::SurfaceState;

/// Default number of extra layout passes a viewport allows per frame.
pub const DEFAULT_LAYOUT_RETRIES: usize = 4;

/// The placement of a viewport's child after clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedRect {
    /// Where the whole child would land, unclipped, in the enclosing space.
    pub dest: Rect,
    /// The visible part of `dest`, or `None` if nothing is visible.
    pub clipped: Option<Rect>,
    /// The child-space sub-rectangle that lands on `clipped`.
    pub source: Option<Rect>,
}

/// A viewport.
pub struct Viewport {
    /// Constraints for the child.
    pub(crate) constraints: Constraints,
    /// Placement in the enclosing space.
    pub(crate) rect: Rect,
    /// Child translation, used for scrolling.
    pub(crate) offset: Point,
    /// Lay the child out at the origin of its own space.
    pub(crate) relative_coordinates: bool,
    /// Scale applied when mapping child space onto pixels.
    pub(crate) effective_scale: Scale,
    /// Run layout on the next frame even if the child is clean.
    pub(crate) force_relayout: bool,
    /// Extra layout passes allowed per frame.
    pub(crate) layout_retries: usize,
    /// Owning widget. `None` for the Root's viewport.
    pub(crate) owner: Option<NodeId>,
    /// Enclosing viewport. `None` while detached and for the Root's viewport.
    pub(crate) parent: Option<ViewportId>,
    /// Raster state, for surface-backed viewports.
    pub(crate) surface: Option<SurfaceState>,
}

impl Viewport {
    /// A clipped viewport.
    pub fn new(owner: Option<NodeId>) -> Self {
        Self {
            constraints: Constraints::UNBOUNDED,
            rect: Rect::zero(),
            offset: Point::zero(),
            relative_coordinates: true,
            effective_scale: Scale::UNIT,
            force_relayout: true,
            layout_retries: DEFAULT_LAYOUT_RETRIES,
            owner,
            parent: None,
            surface: None,
        }
    }

    /// A surface-backed viewport.
    pub(crate) fn with_surface(owner: Option<NodeId>, state: SurfaceState) -> Self {
        let mut vp = Self::new(owner);
        vp.effective_scale = Scale::uniform(state.resolution);
        vp.surface = Some(state);
        vp
    }

    /// Child constraints.
    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    /// Placement in the enclosing space.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Child translation.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Is the child laid out relative to the viewport origin?
    pub fn relative_coordinates(&self) -> bool {
        self.relative_coordinates
    }

    /// Per-axis scale actually applied.
    pub fn effective_scale(&self) -> Scale {
        self.effective_scale
    }

    /// Owning widget.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Enclosing viewport.
    pub fn parent(&self) -> Option<ViewportId> {
        self.parent
    }

    /// Does this viewport own a surface?
    pub fn is_surface_backed(&self) -> bool {
        self.surface.is_some()
    }

    /// Raster state, for surface-backed viewports.
    pub fn surface_state(&self) -> Option<&SurfaceState> {
        self.surface.as_ref()
    }

    /// Set the child constraints. Forces a relayout if they changed.
    pub fn set_constraints(&mut self, c: Constraints) -> bool {
        if self.constraints == c {
            return false;
        }
        self.constraints = c;
        self.force_relayout = true;
        true
    }

    /// Set the placement rectangle. Forces a relayout if it changed.
    pub fn set_rect(&mut self, r: Rect) -> bool {
        if self.rect == r {
            return false;
        }
        self.rect = r;
        self.force_relayout = true;
        true
    }

    /// Set the child offset. Returns `true` if it changed; the caller is
    /// responsible for damage.
    pub fn set_offset(&mut self, o: Point) -> bool {
        if self.offset == o {
            return false;
        }
        self.offset = o;
        true
    }

    /// Switch between relative and absolute child coordinates. Forces a
    /// relayout if it changed.
    pub fn set_relative_coordinates(&mut self, v: bool) -> bool {
        if self.relative_coordinates == v {
            return false;
        }
        self.relative_coordinates = v;
        self.force_relayout = true;
        true
    }

    /// Set the per-frame relayout retry budget.
    pub fn set_layout_retries(&mut self, n: usize) {
        self.layout_retries = n;
    }

    /// Request a relayout on the next frame.
    pub fn force_relayout(&mut self) {
        self.force_relayout = true;
    }

    /// Translation from child space into the enclosing space.
    pub fn child_origin(&self) -> Point {
        if self.relative_coordinates {
            self.rect.origin() + self.offset
        } else {
            Point::zero()
        }
    }

    /// Intersect the placed child with the viewport rect. `child` is the
    /// child's rounded size.
    pub fn clipped_viewport_rect(&self, child: Size) -> ClippedRect {
        let origin = self.child_origin();
        let dest = Rect::new(origin.x, origin.y, child.w, child.h);
        let clipped = dest.intersect(&self.rect);
        let source = clipped.map(|c| Rect::new(c.x - dest.x, c.y - dest.y, c.w, c.h));
        ClippedRect {
            dest,
            clipped,
            source,
        }
    }

    /// Map a child-space rectangle into the enclosing space, clipped to the
    /// viewport rect.
    pub fn child_to_parent(&self, r: Rect) -> Option<Rect> {
        let o = self.child_origin();
        r.translate(o.x, o.y).intersect(&self.rect)
    }
}

/// The widget laid out by a viewport: the Root's child for the Root's
/// viewport, the owner's first child otherwise.
pub(crate) fn viewport_child(root: &Root, vid: ViewportId) -> Option<NodeId> {
    let vp = root.viewports.get(vid)?;
    match vp.owner {
        Some(owner) => root.nodes.get(owner)?.children.first().copied(),
        None => root.child,
    }
}

/// Resolve the viewport's child layout.
///
/// Skipped unless the child is layout-dirty or a relayout was forced.
/// Returns whether the child's rounded dimensions changed. Surface-backed
/// viewports resize their surface when that happens.
pub(crate) fn resolve_layout(root: &mut Root, vid: ViewportId) -> Result<bool> {
    let vp = root
        .viewports
        .get_mut(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    let mut forced = vp.force_relayout;
    vp.force_relayout = false;
    let retries = vp.layout_retries;
    let constraints = vp.constraints;
    let relative = vp.relative_coordinates;
    let parent = vp.parent;
    let surface_backed = vp.surface.is_some();

    // Clipped viewports round at the enclosing scale.
    if !surface_backed && let Some(p) = parent.and_then(|p| root.viewports.get(p)) {
        let scale = p.effective_scale;
        if let Some(vp) = root.viewports.get_mut(vid)
            && vp.effective_scale != scale
        {
            debug!(?vid, from = ?vp.effective_scale, to = ?scale, "inherited scale changed");
            vp.effective_scale = scale;
            forced = true;
        }
    }

    let Some(child) = viewport_child(root, vid) else {
        return Ok(false);
    };
    let node = root.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
    if !node.layout_dirty && !forced {
        return Ok(false);
    }
    let before = node.bounds.size();

    let mut attempt = 0;
    loop {
        trace!(?vid, attempt, "viewport layout pass");
        tree::resolve_dimensions_as_top(root, child, constraints)?;
        let pos = if relative {
            Point::zero()
        } else {
            root.nodes[child].ideal.origin()
        };
        tree::resolve_position(root, child, pos)?;
        tree::finalize_bounds(root, child)?;
        if !root.nodes.get(child).is_some_and(|n| n.layout_dirty) {
            break;
        }
        if attempt >= retries {
            warn!(?vid, "layout did not settle after {retries} retries");
            break;
        }
        attempt += 1;
    }

    if surface_backed {
        let after = root.nodes.get(child).map(|n| n.bounds.size());
        let needs_resize = root.viewports[vid]
            .surface
            .as_ref()
            .is_some_and(|s| s.force_resize);
        if after != Some(before) || needs_resize {
            debug!(?vid, ?before, ?after, "resizing viewport surface");
            surface_viewport::resize_surface(root, vid)?;
        }
    }

    // A scale change inside the resize re-rounds the child, so read its
    // bounds afterwards.
    let Some(bounds) = root.nodes.get(child).map(|n| n.bounds) else {
        return Ok(false);
    };
    if root.viewports[vid].owner.is_none() {
        // The Root's viewport covers exactly its child.
        root.viewports[vid].rect = bounds;
    }
    Ok(bounds.size() != before)
}

/// Dispatch a trickling event into a viewport's child.
///
/// Untargeted positional events outside the viewport rect are dropped.
/// Positional coordinates are rewritten into child space.
pub(crate) fn dispatch_trickling_event(
    root: &mut Root,
    vid: ViewportId,
    event: &Event,
) -> Result<Option<NodeId>> {
    let vp = root
        .viewports
        .get(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    if event.target.is_none()
        && let Some(p) = event.location()
        && !vp.rect.contains(p)
    {
        return Ok(None);
    }
    let o = vp.child_origin();
    let Some(child) = viewport_child(root, vid) else {
        return Ok(None);
    };
    if o.is_zero() || !event.is_positional() {
        dispatch::dispatch_to_node(root, child, event)
    } else {
        dispatch::dispatch_to_node(root, child, &event.translated(-o.x, -o.y))
    }
}
