/// A rectangle in whole surface pixels.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl PixelRect {
    /// Construct a new pixel rectangle.
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle covering a whole `w` x `h` surface.
    pub const fn full(w: u32, h: u32) -> Self {
        Self::new(0, 0, w, h)
    }

    /// Right edge (exclusive), saturating.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive), saturating.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// The number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// True if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Does this rectangle contain the pixel at (`x`, `y`)?
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Does this rectangle completely enclose the other?
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersect two rectangles. Returns `None` if the overlap is empty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r <= x || b <= y {
            None
        } else {
            Some(Self::new(x, y, r - x, b - y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&PixelRect::new(5, 5, 10, 10)),
            Some(PixelRect::new(5, 5, 5, 5))
        );
        assert_eq!(a.intersect(&PixelRect::new(10, 10, 1, 1)), None);
        assert!(a.contains_rect(&PixelRect::new(2, 2, 8, 8)));
        assert!(!a.contains_rect(&PixelRect::new(2, 2, 9, 8)));
        assert_eq!(a.area(), 100);
    }
}
