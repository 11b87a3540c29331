//! Geometry primitives used across arbor.
//!
//! Layout happens in unrounded floating-point space ([`Rect`], [`Size`],
//! [`Point`]). Surfaces are addressed in whole pixels ([`PixelRect`]). The
//! bridge between the two is a per-axis [`Scale`].

#![warn(missing_docs)]

/// Error types for geometry operations.
mod error;
/// Padding around a rectangle.
mod padding;
/// Integer pixel rectangles.
mod pixel_rect;
/// Point helpers.
mod point;
/// Floating-point rectangle operations.
mod rect;
/// Per-axis scale factors and surface rounding.
mod scale;
/// Width/height size type.
mod size;

pub use error::{Error, Result};
pub use padding::Padding;
pub use pixel_rect::PixelRect;
pub use point::Point;
pub use rect::Rect;
pub use scale::{Scale, ceil_to_scale, floor_to_scale};
pub use size::Size;

/// Round a pixel dimension up to the nearest power of two.
///
/// Zero stays zero, and values beyond the largest representable power of two
/// saturate at `u32::MAX`.
pub fn round_up_pow2(v: u32) -> u32 {
    if v == 0 {
        0
    } else {
        v.checked_next_power_of_two().unwrap_or(u32::MAX)
    }
}

/// Is this value a power of two? Zero is not.
pub fn is_pow2(v: u32) -> bool {
    v.is_power_of_two()
}
