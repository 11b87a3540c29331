/// Per-axis scale applied when mapping layout space onto surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Horizontal scale factor.
    pub x: f64,
    /// Vertical scale factor.
    pub y: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Scale {
    /// The identity scale.
    pub const UNIT: Self = Self { x: 1.0, y: 1.0 };

    /// Construct a per-axis scale.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The same scale on both axes.
    pub const fn uniform(v: f64) -> Self {
        Self { x: v, y: v }
    }
}

/// Floor a layout-space coordinate to the nearest whole pixel boundary at
/// scale `s`, returning the result in layout space.
#[inline]
pub fn floor_to_scale(v: f64, s: f64) -> f64 {
    (v * s).floor() / s
}

/// Ceil a layout-space coordinate to the nearest whole pixel boundary at
/// scale `s`, returning the result in layout space.
#[inline]
pub fn ceil_to_scale(v: f64, s: f64) -> f64 {
    (v * s).ceil() / s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_at_half_scale() {
        assert_eq!(floor_to_scale(3.0, 0.5), 2.0);
        assert_eq!(ceil_to_scale(3.0, 0.5), 4.0);
        assert_eq!(floor_to_scale(3.2, 2.0), 3.0);
        assert_eq!(ceil_to_scale(3.2, 2.0), 3.5);
    }
}
