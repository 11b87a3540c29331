//! Drawing surfaces.
//!
//! The pipeline needs very little from a raster target: create-at-size,
//! resize, a save/restore state stack, rectangular and even-odd clipping,
//! fills, and blits with a copy composite mode. [`Surface`] captures exactly
//! that. [`PixelSurface`] is a software implementation over an
//! [`image::RgbaImage`], used by default and in tests.

use std::any::Any;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geom::PixelRect;

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Source-over blend of `self` onto `dst`.
    pub fn over(self, dst: Self) -> Self {
        match self.a {
            255 => self,
            0 => dst,
            _ => {
                let sa = f32::from(self.a) / 255.0;
                let da = f32::from(dst.a) / 255.0;
                let oa = sa + da * (1.0 - sa);
                let ch = |s: u8, d: u8| {
                    let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / oa;
                    v.round().clamp(0.0, 255.0) as u8
                };
                Self::rgba(
                    ch(self.r, dst.r),
                    ch(self.g, dst.g),
                    ch(self.b, dst.b),
                    (oa * 255.0).round() as u8,
                )
            }
        }
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Self([c.r, c.g, c.b, c.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Self::rgba(p.0[0], p.0[1], p.0[2], p.0[3])
    }
}

/// How drawing operations combine with existing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Blend over existing pixels.
    #[default]
    SourceOver,
    /// Overwrite existing pixels, alpha included.
    Copy,
}

/// A raster drawing target.
pub trait Surface: Any {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Resize, clearing all contents and drawing state.
    fn resize(&mut self, width: u32, height: u32);

    /// Create a new, empty surface of the same kind.
    fn allocate(&self, width: u32, height: u32) -> Box<dyn Surface>;

    /// Push the drawing state (clip and composite mode).
    fn save(&mut self);

    /// Pop the drawing state. Unbalanced restores are ignored.
    fn restore(&mut self);

    /// Intersect the clip with a rectangle.
    fn clip_rect(&mut self, r: PixelRect);

    /// Intersect the clip with the even-odd region formed by `outer` and
    /// `inner`: when `inner` lies within `outer`, that is `outer` minus
    /// `inner`.
    fn clip_even_odd(&mut self, outer: PixelRect, inner: PixelRect);

    /// Set the composite mode.
    fn set_composite(&mut self, mode: Composite);

    /// Fill a rectangle, honoring clip and composite mode.
    fn fill_rect(&mut self, r: PixelRect, color: Color);

    /// Set a rectangle to transparent, honoring the clip.
    fn clear_rect(&mut self, r: PixelRect);

    /// Copy `src_rect` of `src` into `dst_rect`, scaling with nearest-neighbor
    /// sampling.
    fn draw_surface(&mut self, src: &dyn Surface, src_rect: PixelRect, dst_rect: PixelRect);

    /// Read a pixel. Out-of-range reads return transparent.
    fn pixel(&self, x: u32, y: u32) -> Color;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// Clip region: a bounding rectangle with excluded holes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Clip {
    /// Drawable bounds.
    rect: PixelRect,
    /// Regions excluded from `rect`.
    holes: Vec<PixelRect>,
}

impl Clip {
    /// Can pixel `(x, y)` be drawn?
    fn allows(&self, x: u32, y: u32) -> bool {
        self.rect.contains(x, y) && !self.holes.iter().any(|h| h.contains(x, y))
    }
}

/// Saved drawing state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct State {
    /// Current clip.
    clip: Clip,
    /// Current composite mode.
    composite: Composite,
}

/// A software surface backed by an RGBA image.
pub struct PixelSurface {
    /// Pixel storage.
    img: RgbaImage,
    /// Current drawing state.
    state: State,
    /// Saved states.
    stack: Vec<State>,
}

impl PixelSurface {
    /// A transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbaImage::new(width, height),
            state: Self::initial_state(width, height),
            stack: Vec::new(),
        }
    }

    /// Default state for a surface of this size.
    fn initial_state(width: u32, height: u32) -> State {
        State {
            clip: Clip {
                rect: PixelRect::full(width, height),
                holes: Vec::new(),
            },
            composite: Composite::SourceOver,
        }
    }

    /// The underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Write one pixel, honoring clip and composite mode.
    fn put(&mut self, x: u32, y: u32, color: Color) {
        if !self.state.clip.allows(x, y) {
            return;
        }
        let out = match self.state.composite {
            Composite::Copy => color,
            Composite::SourceOver => color.over(Color::from(*self.img.get_pixel(x, y))),
        };
        self.img.put_pixel(x, y, out.into());
    }

    /// The part of `r` inside both the surface and the clip bounds.
    fn drawable(&self, r: PixelRect) -> Option<PixelRect> {
        r.intersect(&self.state.clip.rect)
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.img.width()
    }

    fn height(&self) -> u32 {
        self.img.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    fn allocate(&self, width: u32, height: u32) -> Box<dyn Surface> {
        Box::new(Self::new(width, height))
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    fn clip_rect(&mut self, r: PixelRect) {
        self.state.clip.rect = self.state.clip.rect.intersect(&r).unwrap_or_default();
    }

    fn clip_even_odd(&mut self, outer: PixelRect, inner: PixelRect) {
        self.clip_rect(outer);
        if !inner.is_empty() {
            self.state.clip.holes.push(inner);
        }
    }

    fn set_composite(&mut self, mode: Composite) {
        self.state.composite = mode;
    }

    fn fill_rect(&mut self, r: PixelRect, color: Color) {
        let Some(r) = self.drawable(r) else {
            return;
        };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                self.put(x, y, color);
            }
        }
    }

    fn clear_rect(&mut self, r: PixelRect) {
        let Some(r) = self.drawable(r) else {
            return;
        };
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                if self.state.clip.allows(x, y) {
                    self.img.put_pixel(x, y, Color::TRANSPARENT.into());
                }
            }
        }
    }

    fn draw_surface(&mut self, src: &dyn Surface, src_rect: PixelRect, dst_rect: PixelRect) {
        if src_rect.is_empty() {
            return;
        }
        let Some(d) = self.drawable(dst_rect) else {
            return;
        };
        let sx = |x: u32| {
            src_rect.x + (u64::from(x - dst_rect.x) * u64::from(src_rect.w) / u64::from(dst_rect.w)) as u32
        };
        let sy = |y: u32| {
            src_rect.y + (u64::from(y - dst_rect.y) * u64::from(src_rect.h) / u64::from(dst_rect.h)) as u32
        };
        for y in d.y..d.bottom() {
            for x in d.x..d.right() {
                self.put(x, y, src.pixel(sx(x), sy(y)));
            }
        }
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        self.img
            .get_pixel_checked(x, y)
            .map_or(Color::TRANSPARENT, |p| Color::from(*p))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
