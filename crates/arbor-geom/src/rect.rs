use super::{PixelRect, Point, Scale, Size, ceil_to_scale, floor_to_scale};

/// A rectangle in unrounded layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a new rectangle.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// A zero rectangle at the origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// True if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Does this rectangle contain the point? Right and bottom edges are exclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Intersect two rectangles. Returns `None` if the overlap is empty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        let out = Self::new(x, y, r - x, b - y);
        if out.is_empty() { None } else { Some(out) }
    }

    /// Do the two rectangles overlap with a non-empty area?
    pub fn intersects(&self, other: &Self) -> bool {
        self.intersect(other).is_some()
    }

    /// Smallest rectangle enclosing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Self::new(x, y, r - x, b - y)
    }

    /// Shift the rectangle by an offset.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Scale every coordinate by a per-axis factor.
    pub fn scale(&self, s: Scale) -> Self {
        Self::new(self.x * s.x, self.y * s.y, self.w * s.x, self.h * s.y)
    }

    /// Align to whole pixels at scale `s`: the top-left corner is floored and
    /// the bottom-right corner is ceiled, and the size is recomputed from the
    /// rounded corners. The result is still expressed in layout space.
    pub fn round_out(&self, s: Scale) -> Self {
        let l = floor_to_scale(self.x, s.x);
        let t = floor_to_scale(self.y, s.y);
        let r = ceil_to_scale(self.right(), s.x);
        let b = ceil_to_scale(self.bottom(), s.y);
        Self::new(l, t, r - l, b - t)
    }

    /// Convert to whole pixels at scale `s`, rounding outwards and clamping to
    /// a `width` x `height` surface. Returns `None` if nothing is left.
    pub fn to_pixels(&self, s: Scale, width: u32, height: u32) -> Option<PixelRect> {
        if self.is_empty() {
            return None;
        }
        let clamp = |v: f64, max: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else if v >= f64::from(max) {
                max
            } else {
                v as u32
            }
        };
        let l = clamp((self.x * s.x).floor(), width);
        let t = clamp((self.y * s.y).floor(), height);
        let r = clamp((self.right() * s.x).ceil(), width);
        let b = clamp((self.bottom() * s.y).ceil(), height);
        let out = PixelRect::new(l, t, r.saturating_sub(l), b.saturating_sub(t));
        if out.is_empty() { None } else { Some(out) }
    }
}

impl From<PixelRect> for Rect {
    fn from(r: PixelRect) -> Self {
        Self::new(
            f64::from(r.x),
            f64::from(r.y),
            f64::from(r.w),
            f64::from(r.h),
        )
    }
}
