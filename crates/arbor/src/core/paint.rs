//! The paint pass.
//!
//! Painting walks a viewport's subtree and asks each widget whose rounded
//! bounds meet the dirty rectangle to draw itself, clipped to that
//! intersection. Nested clipped viewports paint their subtree into the same
//! surface; surface-backed viewports repaint their own surface and are then
//! composited.

use scopeguard::guard;

use crate::{
    Root,
    core::{
        context::PaintCtx,
        error::{Error, Result},
        id::{NodeId, ViewportId},
        surface::Surface,
        surface_viewport, tree,
        viewport::viewport_child,
    },
    geom::{PixelRect, Point, Rect, Scale},
};

/// Maps a viewport's layout space onto surface pixels: a layout point `p`
/// lands on pixel `(p + origin) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintTransform {
    /// Translation applied before scaling.
    pub origin: Point,
    /// Pixels per layout unit.
    pub scale: Scale,
}

impl PaintTransform {
    /// Construct a transform.
    pub fn new(origin: Point, scale: Scale) -> Self {
        Self { origin, scale }
    }

    /// The same scale, with an extra translation.
    pub fn translated(&self, by: Point) -> Self {
        Self::new(self.origin + by, self.scale)
    }

    /// Pixel rectangle covering `r`, clamped to a `width` x `height` surface.
    pub fn to_pixels(&self, r: Rect, width: u32, height: u32) -> Option<PixelRect> {
        r.translate(self.origin.x, self.origin.y)
            .to_pixels(self.scale, width, height)
    }

    /// Layout-space rectangle covered by a pixel rectangle.
    pub fn to_layout(&self, r: PixelRect) -> Rect {
        let r = Rect::from(r);
        Rect::new(
            r.x / self.scale.x - self.origin.x,
            r.y / self.scale.y - self.origin.y,
            r.w / self.scale.x,
            r.h / self.scale.y,
        )
    }
}

/// Paint a node and its subtree where they meet `dirty`, given in the node's
/// viewport space.
pub(crate) fn paint_node(
    root: &mut Root,
    id: NodeId,
    surface: &mut dyn Surface,
    xf: PaintTransform,
    dirty: Rect,
) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if !node.active {
        return Ok(());
    }
    let bounds = node.bounds;
    let owned = node.owned_viewport;
    let children = node.children.clone();

    if let Some(area) = bounds.intersect(&dirty)
        && let Some(px) = xf.to_pixels(area, surface.width(), surface.height())
    {
        let mut s = guard(&mut *surface, |s| s.restore());
        s.save();
        s.clip_rect(px);
        tree::with_widget(root, id, |w, root| {
            let mut ctx = PaintCtx::new(&mut **s, xf, &root.theme, id, bounds);
            w.paint(&mut ctx, area)
        })??;
    }

    match owned {
        Some(vid) => paint_viewport(root, vid, surface, xf, dirty),
        None => {
            for c in children {
                paint_node(root, c, surface, xf, dirty)?;
            }
            Ok(())
        }
    }
}

/// Paint a nested viewport into the enclosing surface.
fn paint_viewport(
    root: &mut Root,
    vid: ViewportId,
    surface: &mut dyn Surface,
    xf: PaintTransform,
    dirty: Rect,
) -> Result<()> {
    let vp = root
        .viewports
        .get(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    let Some(clip) = vp.rect.intersect(&dirty) else {
        return Ok(());
    };
    if vp.is_surface_backed() {
        surface_viewport::paint_to_internal(root, vid, false)?;
        let mut s = guard(&mut *surface, |s| s.restore());
        s.save();
        if let Some(px) = xf.to_pixels(clip, s.width(), s.height()) {
            s.clip_rect(px);
        }
        return surface_viewport::composite(root, vid, &mut **s, xf);
    }

    let o = vp.child_origin();
    let Some(child) = viewport_child(root, vid) else {
        return Ok(());
    };
    let Some(px) = xf.to_pixels(clip, surface.width(), surface.height()) else {
        return Ok(());
    };
    let mut s = guard(&mut *surface, |s| s.restore());
    s.save();
    s.clip_rect(px);
    paint_node(
        root,
        child,
        &mut **s,
        xf.translated(o),
        clip.translate(-o.x, -o.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trip() {
        let xf = PaintTransform::new(Point::new(10.0, 0.0), Scale::uniform(2.0));
        let px = xf.to_pixels(Rect::new(0.0, 0.0, 5.0, 5.0), 100, 100);
        assert_eq!(px, Some(PixelRect::new(20, 0, 10, 10)));
        assert_eq!(
            xf.to_layout(PixelRect::new(20, 0, 10, 10)),
            Rect::new(0.0, 0.0, 5.0, 5.0)
        );
        let inner = xf.translated(Point::new(-4.0, 1.0));
        assert_eq!(inner.origin, Point::new(6.0, 1.0));
    }

    #[test]
    fn off_surface_is_none() {
        let xf = PaintTransform::new(Point::zero(), Scale::UNIT);
        assert_eq!(xf.to_pixels(Rect::new(200.0, 0.0, 5.0, 5.0), 100, 100), None);
    }
}
