use super::{Error, Point, Rect, Result};

/// A `Size` is a rectangle that has a width and height but no location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Size {
    /// Construct a new size.
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Construct a size, rejecting NaN or infinite components.
    pub fn finite(w: f64, h: f64) -> Result<Self> {
        if !w.is_finite() || !h.is_finite() {
            return Err(Error::NotFinite(format!("size {w} x {h}")));
        }
        Ok(Self { w, h })
    }

    /// A zero size.
    pub const fn zero() -> Self {
        Self { w: 0.0, h: 0.0 }
    }

    /// The area of this size.
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// True if either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    /// Return a `Rect` with the same dimensions, placed at `origin`.
    pub fn at(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.w, self.h)
    }

    /// True if this size can completely enclose the target size in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(f64, f64)> for Size {
    fn from(v: (f64, f64)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_rejects_infinity() {
        assert!(Size::finite(1.0, f64::INFINITY).is_err());
        assert!(Size::finite(f64::NAN, 1.0).is_err());
        assert_eq!(Size::finite(2.0, 3.0), Ok(Size::new(2.0, 3.0)));
    }

    #[test]
    fn contains() {
        assert!(Size::new(10.0, 10.0).contains(&Size::new(10.0, 2.0)));
        assert!(!Size::new(10.0, 10.0).contains(&Size::new(11.0, 2.0)));
        assert!(Size::new(0.0, 3.0).is_empty());
    }
}
