//! Layout constraints.
//!
//! Layout is a two-phase protocol. A parent resolves each child's ideal
//! dimensions against a [`Constraints`] box, then assigns the child an ideal
//! position. Once a viewport has resolved its child, bounds are finalized:
//! the ideal rectangle is rounded outwards to whole pixels at the viewport's
//! effective scale. Painting and hit-testing only ever read the rounded
//! values.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    core::error::{Error, Result},
    geom::{Padding, Size},
};

/// Minimum and maximum dimensions for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Minimum width.
    pub min_w: f64,
    /// Maximum width, possibly infinite.
    pub max_w: f64,
    /// Minimum height.
    pub min_h: f64,
    /// Maximum height, possibly infinite.
    pub max_h: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl Constraints {
    /// No constraints at all.
    pub const UNBOUNDED: Self = Self {
        min_w: 0.0,
        max_w: f64::INFINITY,
        min_h: 0.0,
        max_h: f64::INFINITY,
    };

    /// Construct constraints from their four components.
    pub const fn new(min_w: f64, max_w: f64, min_h: f64, max_h: f64) -> Self {
        Self {
            min_w,
            max_w,
            min_h,
            max_h,
        }
    }

    /// Constraints that force exactly `size`.
    pub fn tight(size: Size) -> Self {
        Self::new(size.w, size.w, size.h, size.h)
    }

    /// Constraints from zero up to `size`.
    pub fn loose(size: Size) -> Self {
        Self::new(0.0, size.w, 0.0, size.h)
    }

    /// Drop the minimums.
    pub fn loosen(&self) -> Self {
        Self::new(0.0, self.max_w, 0.0, self.max_h)
    }

    /// Shrink both bounds by padding, saturating at zero.
    pub fn deflate(&self, p: Padding) -> Self {
        Self::new(
            (self.min_w - p.horizontal()).max(0.0),
            (self.max_w - p.horizontal()).max(0.0),
            (self.min_h - p.vertical()).max(0.0),
            (self.max_h - p.vertical()).max(0.0),
        )
    }

    /// Is either maximum unbounded?
    pub fn is_unbounded(&self) -> bool {
        self.max_w.is_infinite() || self.max_h.is_infinite()
    }

    /// Clamp a size into these constraints. NaN components become the minimum.
    pub fn clamp(&self, s: Size) -> Size {
        let c = |v: f64, lo: f64, hi: f64| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        Size::new(c(s.w, self.min_w, self.max_w), c(s.h, self.min_h, self.max_h))
    }

    /// Does `s` satisfy these constraints?
    pub fn contains(&self, s: Size) -> bool {
        s.w >= self.min_w && s.w <= self.max_w && s.h >= self.min_h && s.h <= self.max_h
    }

    /// Validate and repair constraints before handing them to a sizing hook.
    ///
    /// An infinite or NaN minimum, or a NaN maximum, is an error. Negative
    /// values are clamped to zero and inverted bounds are swapped, each with a
    /// warning: floating-point reflow produces these transiently.
    pub fn validated(&self) -> Result<Self> {
        if !self.min_w.is_finite() || !self.min_h.is_finite() {
            return Err(Error::Layout(format!(
                "minimum dimension is not finite: {} x {}",
                self.min_w, self.min_h
            )));
        }
        if self.max_w.is_nan() || self.max_h.is_nan() {
            return Err(Error::Layout(format!(
                "maximum dimension is NaN: {} x {}",
                self.max_w, self.max_h
            )));
        }
        let mut out = *self;
        for v in [&mut out.min_w, &mut out.max_w, &mut out.min_h, &mut out.max_h] {
            if *v < 0.0 {
                warn!("negative layout constraint {v}, clamping to zero");
                *v = 0.0;
            }
        }
        if out.min_w > out.max_w {
            warn!("min width {} > max width {}, swapping", out.min_w, out.max_w);
            (out.min_w, out.max_w) = (out.max_w, out.min_w);
        }
        if out.min_h > out.max_h {
            warn!("min height {} > max height {}, swapping", out.min_h, out.max_h);
            (out.min_h, out.max_h) = (out.max_h, out.min_h);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_repairs() -> Result<()> {
        let c = Constraints::new(-1.0, 10.0, 20.0, 5.0).validated()?;
        assert_eq!(c, Constraints::new(0.0, 10.0, 5.0, 20.0));
        Ok(())
    }

    #[test]
    fn validate_rejects_infinite_minimum() {
        assert!(matches!(
            Constraints::new(f64::INFINITY, f64::INFINITY, 0.0, 1.0).validated(),
            Err(Error::Layout(_))
        ));
        assert!(Constraints::new(0.0, 1.0, f64::NAN, 1.0).validated().is_err());
    }

    #[test]
    fn clamp_and_deflate() {
        let c = Constraints::new(2.0, 10.0, 0.0, 4.0);
        assert_eq!(c.clamp(Size::new(20.0, f64::NAN)), Size::new(10.0, 0.0));
        assert!(c.contains(Size::new(2.0, 4.0)));
        let d = Constraints::UNBOUNDED.deflate(Padding::uniform(4.0));
        assert!(d.is_unbounded());
        assert_eq!(d.min_w, 0.0);
    }
}
