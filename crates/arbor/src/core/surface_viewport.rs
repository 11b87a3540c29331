//! Surface-backed viewports.
//!
//! A surface-backed viewport renders its child into a surface of its own at
//! the viewport's effective scale. Surfaces grow in powers of two and never
//! shrink. Damage is queued in child space and converted to pixel rectangles
//! when painting; the result is composited into the enclosing surface.

use std::mem;

use scopeguard::guard;
use tracing::{debug, warn};

use crate::{
    Root,
    core::{
        config::RootConfig,
        error::{Error, Result},
        id::{NodeId, ViewportId},
        paint::{self, PaintTransform},
        surface::{Color, Composite, PixelSurface, Surface},
        tree,
        viewport::viewport_child,
    },
    geom::{PixelRect, Point, Rect, Scale, Size, is_pow2, round_up_pow2},
};

/// Raster state of a surface-backed viewport.
pub struct SurfaceState {
    /// The surface. Taken out while painting.
    pub(crate) surface: Option<Box<dyn Surface>>,
    /// Maximum surface width in pixels.
    pub(crate) max_width: u32,
    /// Maximum surface height in pixels.
    pub(crate) max_height: u32,
    /// Pixels per layout unit, before clamping to the maxima.
    pub(crate) resolution: f64,
    /// Clear stale margins when the child shrinks.
    pub(crate) prevent_bleeding: bool,
    /// Fill for areas not covered by the child.
    pub(crate) background: Color,
    /// Child size in pixels after the last resize.
    pub(crate) real: (u32, u32),
    /// `real` at the last paint.
    pub(crate) painted_real: Option<(u32, u32)>,
    /// Damage waiting for the next paint, in child space.
    pub(crate) pending: Vec<Rect>,
    /// Repaint everything on the next paint.
    pub(crate) force_full: bool,
    /// Recompute the surface size on the next layout.
    pub(crate) force_resize: bool,
    /// Pixel rectangles touched by the last paint.
    pub(crate) last_dirty: Vec<PixelRect>,
    /// A zero-sized surface was reported.
    warned_zero: bool,
    /// A non-power-of-two surface was reported.
    warned_npot: bool,
}

impl SurfaceState {
    /// Surface state around an existing surface.
    pub(crate) fn new(surface: Box<dyn Surface>, config: &RootConfig) -> Self {
        Self {
            surface: Some(surface),
            max_width: config.max_surface_width,
            max_height: config.max_surface_height,
            resolution: config.resolution,
            prevent_bleeding: config.prevent_bleeding,
            background: config.background,
            real: (0, 0),
            painted_real: None,
            pending: Vec::new(),
            force_full: true,
            force_resize: true,
            last_dirty: Vec::new(),
            warned_zero: false,
            warned_npot: false,
        }
    }

    /// The surface, unless it is being painted.
    pub fn surface(&self) -> Option<&dyn Surface> {
        self.surface.as_deref()
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.surface
            .as_ref()
            .map_or((0, 0), |s| (s.width(), s.height()))
    }

    /// Child size in pixels.
    pub fn real_size(&self) -> (u32, u32) {
        self.real
    }

    /// Pixels per layout unit.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Maximum surface size.
    pub fn max_size(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }

    /// Pixel rectangles touched by the last paint. Hosts use these to update
    /// a texture selectively.
    pub fn dirty_rects(&self) -> &[PixelRect] {
        &self.last_dirty
    }

    /// Damage waiting for the next paint, in child space.
    pub fn pending(&self) -> &[Rect] {
        &self.pending
    }

    /// Queue a child-space rectangle for repainting.
    pub(crate) fn mark_dirty_rect(&mut self, r: Rect) {
        if !r.is_empty() {
            self.pending.push(r);
        }
    }

    /// Change resolution or maxima. The surface is resized on the next layout.
    pub(crate) fn configure(&mut self, resolution: f64, max_width: u32, max_height: u32) {
        if self.resolution != resolution
            || self.max_width != max_width
            || self.max_height != max_height
        {
            self.resolution = resolution;
            self.max_width = max_width;
            self.max_height = max_height;
            self.force_resize = true;
        }
    }

    /// Warn once about zero or non-power-of-two sizes. Returns whether a
    /// warning was logged.
    fn check_size(&mut self, w: u32, h: u32) -> bool {
        if w == 0 || h == 0 {
            if self.warned_zero {
                return false;
            }
            self.warned_zero = true;
            warn!("viewport surface has zero size: {w} x {h}");
            true
        } else if (!is_pow2(w) || !is_pow2(h)) && !self.warned_npot {
            self.warned_npot = true;
            warn!("viewport surface size {w} x {h} is not a power of two");
            true
        } else {
            false
        }
    }
}

/// Real pixel extent of a child dimension at `resolution`, clamped to `max`.
fn real_extent(d: f64, resolution: f64, max: u32) -> u32 {
    let v = (d * resolution).ceil();
    if v.is_nan() || v <= 0.0 {
        0
    } else {
        // Float-to-int casts saturate.
        (v as u32).min(max)
    }
}

/// Scale for one axis: the resolution, reduced so the child fits `max`.
fn axis_scale(d: f64, resolution: f64, max: u32) -> f64 {
    if d > 0.0 {
        (f64::from(max) / d).min(resolution)
    } else {
        resolution
    }
}

/// Candidate surface extent: the next power of two of the real extent,
/// never smaller than the current extent, clamped to the maximum.
pub(crate) fn surface_extent(real: u32, current: u32, max: u32) -> u32 {
    round_up_pow2(real).max(current).min(max)
}

/// Rounded size of a viewport's child, or zero.
fn child_size(root: &Root, child: Option<NodeId>) -> Size {
    child
        .and_then(|c| root.nodes.get(c))
        .map_or(Size::zero(), |n| n.bounds.size())
}

/// Resize a surface-backed viewport's surface to fit its child.
///
/// The effective scale is derived from the child's current bounds. If it
/// changed, the child is rounded again at the new scale before the real size
/// and the surface extent are computed.
pub(crate) fn resize_surface(root: &mut Root, vid: ViewportId) -> Result<()> {
    let child = viewport_child(root, vid);
    let dims = child_size(root, child);
    let vp = root
        .viewports
        .get_mut(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    let old_scale = vp.effective_scale;
    let st = vp
        .surface
        .as_mut()
        .ok_or_else(|| Error::Invalid(format!("viewport {vid:?} has no surface")))?;
    st.force_resize = false;
    let scale = Scale::new(
        axis_scale(dims.w, st.resolution, st.max_width),
        axis_scale(dims.h, st.resolution, st.max_height),
    );
    let scale_changed = scale != old_scale;
    if scale_changed {
        debug!(?vid, ?old_scale, ?scale, "viewport effective scale changed");
        st.force_full = true;
        vp.effective_scale = scale;
        if let Some(c) = child {
            tree::finalize_bounds(root, c)?;
        }
    }

    let dims = child_size(root, child);
    let st = root
        .viewports
        .get_mut(vid)
        .and_then(|v| v.surface.as_mut())
        .ok_or_else(|| Error::Invalid(format!("viewport {vid:?} has no surface")))?;
    let res = st.resolution;
    let real = (
        real_extent(dims.w, res, st.max_width),
        real_extent(dims.h, res, st.max_height),
    );
    st.real = real;

    let (cur_w, cur_h) = st.size();
    let size = (
        surface_extent(real.0, cur_w, st.max_width),
        surface_extent(real.1, cur_h, st.max_height),
    );
    if size != (cur_w, cur_h) {
        debug!(?vid, from = ?(cur_w, cur_h), to = ?size, "growing viewport surface");
        let old: Box<dyn Surface> = st
            .surface
            .take()
            .unwrap_or_else(|| Box::new(PixelSurface::new(0, 0)));
        let mut new = old.allocate(size.0, size.1);
        if !scale_changed && cur_w > 0 && cur_h > 0 {
            let keep = PixelRect::full(cur_w.min(size.0), cur_h.min(size.1));
            new.set_composite(Composite::Copy);
            new.draw_surface(old.as_ref(), keep, keep);
            new.set_composite(Composite::SourceOver);
        }
        st.surface = Some(new);
    }
    st.check_size(size.0, size.1);
    Ok(())
}

/// Paint pending damage into the viewport's own surface.
///
/// Returns whether anything was dirty. With `force`, the whole surface is
/// repainted.
pub(crate) fn paint_to_internal(root: &mut Root, vid: ViewportId, force: bool) -> Result<bool> {
    let child = viewport_child(root, vid);
    let vp = root
        .viewports
        .get_mut(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    let scale = vp.effective_scale;
    let Some(st) = vp.surface.as_mut() else {
        return Ok(false);
    };
    let pending = mem::take(&mut st.pending);
    let full = mem::take(&mut st.force_full) || force;
    let background = st.background;
    let Some(mut surface) = st.surface.take() else {
        return Err(Error::Invalid(format!("viewport {vid:?} surface is in use")));
    };
    let (w, h) = (surface.width(), surface.height());

    let mut rects = Vec::new();
    if full {
        if w > 0 && h > 0 {
            rects.push(PixelRect::full(w, h));
        }
    } else {
        for r in pending.iter().filter_map(|r| r.to_pixels(scale, w, h)) {
            if !rects.iter().any(|o: &PixelRect| o.contains_rect(&r)) {
                rects.retain(|o| !r.contains_rect(o));
                rects.push(r);
            }
        }
    }

    let result = paint_rects(root, child, surface.as_mut(), scale, background, &rects);

    if let Some(st) = root.viewports.get_mut(vid).and_then(|v| v.surface.as_mut()) {
        if st.prevent_bleeding {
            rects.extend(prevent_bleeding(surface.as_mut(), st.real, st.painted_real));
        }
        st.painted_real = Some(st.real);
        st.last_dirty = rects;
        st.surface = Some(surface);
        result?;
        return Ok(!st.last_dirty.is_empty());
    }
    result.map(|()| false)
}

/// Clear, fill and repaint each pixel rectangle.
fn paint_rects(
    root: &mut Root,
    child: Option<NodeId>,
    surface: &mut dyn Surface,
    scale: Scale,
    background: Color,
    rects: &[PixelRect],
) -> Result<()> {
    let xf = PaintTransform::new(Point::zero(), scale);
    for r in rects {
        let mut s = guard(&mut *surface, |s| s.restore());
        s.save();
        s.clip_rect(*r);
        s.clear_rect(*r);
        if background.a > 0 {
            s.fill_rect(*r, background);
        }
        if let Some(c) = child {
            paint::paint_node(root, c, &mut **s, xf, xf.to_layout(*r))?;
        }
    }
    Ok(())
}

/// Clear the margins beyond the child's real size if it shrank since the
/// last paint. Returns the cleared rectangles.
fn prevent_bleeding(
    surface: &mut dyn Surface,
    real: (u32, u32),
    painted: Option<(u32, u32)>,
) -> Vec<PixelRect> {
    let Some((pw, ph)) = painted else {
        return Vec::new();
    };
    let (w, h) = (surface.width(), surface.height());
    let mut out = Vec::new();
    if real.0 < pw && real.0 < w {
        out.push(PixelRect::new(real.0, 0, w - real.0, h));
    }
    if real.1 < ph && real.1 < h {
        out.push(PixelRect::new(0, real.1, w, h - real.1));
    }
    for r in &out {
        surface.save();
        surface.set_composite(Composite::Copy);
        surface.clear_rect(*r);
        surface.restore();
    }
    out.retain(|r| !r.is_empty());
    out
}

/// Composite a surface-backed viewport into the enclosing surface.
///
/// The placement rect is filled with the background, the visible part of the
/// child is blitted over it, and whatever the blit did not cover is filled
/// with the background again.
pub(crate) fn composite(
    root: &Root,
    vid: ViewportId,
    dst: &mut dyn Surface,
    xf: PaintTransform,
) -> Result<()> {
    let vp = root
        .viewports
        .get(vid)
        .ok_or(Error::ViewportNotFound(vid))?;
    let Some(st) = vp.surface.as_ref() else {
        return Ok(());
    };
    let Some(src) = st.surface.as_deref() else {
        return Err(Error::Invalid(format!("viewport {vid:?} surface is in use")));
    };
    let child = viewport_child(root, vid)
        .and_then(|c| root.nodes.get(c))
        .map_or(Size::zero(), |n| n.bounds.size());
    let Some(placement) = xf.to_pixels(vp.rect, dst.width(), dst.height()) else {
        return Ok(());
    };

    let mut dst = guard(dst, |d| d.restore());
    dst.save();
    dst.clip_rect(placement);
    dst.fill_rect(placement, st.background);

    let c = vp.clipped_viewport_rect(child);
    let mut blitted = PixelRect::default();
    if let (Some(clipped), Some(source)) = (c.clipped, c.source)
        && let Some(s) = source.to_pixels(vp.effective_scale, src.width(), src.height())
        && let Some(d) = xf.to_pixels(clipped, dst.width(), dst.height())
    {
        dst.draw_surface(src, s, d);
        blitted = d;
    }
    dst.clip_even_odd(placement, blitted);
    dst.fill_rect(placement, st.background);
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn extent_rules() {
        assert_eq!(real_extent(300.0, 1.0, 16384), 300);
        assert_eq!(real_extent(99.5, 2.0, 16384), 199);
        assert_eq!(real_extent(1e9, 1.0, 4096), 4096);
        assert_eq!(real_extent(0.0, 1.0, 4096), 0);
        assert_eq!(surface_extent(300, 128, 16384), 512);
        assert_eq!(surface_extent(100, 512, 16384), 512);
        assert_eq!(surface_extent(3000, 0, 1000), 1000);
        assert_eq!(axis_scale(100.0, 2.0, 16384), 2.0);
        assert_eq!(axis_scale(1000.0, 2.0, 1000), 1.0);
        assert_eq!(axis_scale(0.0, 2.0, 1000), 2.0);
    }

    #[test]
    fn bleeding_margins() {
        let mut s = PixelSurface::new(8, 8);
        s.fill_rect(PixelRect::full(8, 8), Color::WHITE);
        let cleared = prevent_bleeding(&mut s, (4, 8), Some((8, 8)));
        assert_eq!(cleared, vec![PixelRect::new(4, 0, 4, 8)]);
        assert_eq!(s.pixel(5, 5), Color::TRANSPARENT);
        assert_eq!(s.pixel(3, 5), Color::WHITE);
        assert!(prevent_bleeding(&mut s, (4, 8), None).is_empty());
    }

    #[test]
    fn size_warnings_latch() {
        let mut st = SurfaceState::new(Box::new(PixelSurface::new(0, 0)), &RootConfig::default());
        assert!(!st.check_size(128, 128));

        let zero = [(0, 64), (0, 0), (32, 0)].map(|(w, h)| st.check_size(w, h));
        assert_eq!(zero, [true, false, false]);
        assert!(st.warned_zero && !st.warned_npot);

        // A maximum that is not a power of two clamps the extent to it.
        let npot = surface_extent(900, 0, 1000);
        assert_eq!(npot, 1000);
        let warned = [(npot, 64), (npot, 64), (64, 100)].map(|(w, h)| st.check_size(w, h));
        assert_eq!(warned, [true, false, false]);
        assert!(st.warned_npot);
        assert!(!st.check_size(0, 0));
    }

    proptest! {
        #[test]
        fn growth_is_monotonic(
            sizes in proptest::collection::vec(1u32..5000, 1..12),
            max in 1u32..8192,
        ) {
            let mut cur = 0;
            let mut last_real = 0;
            for s in sizes {
                let real = s.max(last_real).min(max);
                last_real = real;
                let next = surface_extent(real, cur, max);
                prop_assert!(next >= cur || cur > max);
                prop_assert!(is_pow2(next) || next == max);
                prop_assert!(next >= real);
                cur = next;
            }
        }
    }
}
