//! A fixed-size leaf.

use crate::{
    core::{
        context::{LayoutCtx, PaintCtx},
        error::Result,
        layout::Constraints,
        surface::Color,
    },
    geom::{Rect, Size},
    widget::Widget,
};

/// A leaf that asks for a fixed size and fills itself with a color.
///
/// Without an explicit color the fill comes from the `block/fill` theme path;
/// if the theme has none, nothing is drawn.
#[derive(Debug, Clone)]
pub struct Block {
    /// Requested size.
    size: Size,
    /// Fill, overriding the theme.
    color: Option<Color>,
}

impl Block {
    /// A block asking for `size`.
    pub fn new(size: Size) -> Self {
        Self { size, color: None }
    }

    /// Fill with an explicit color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// The requested size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Change the requested size. The caller marks the node layout-dirty.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Change the fill color. The caller marks the node dirty.
    pub fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

impl Widget for Block {
    fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        Ok(c.clamp(self.size))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        let color = self
            .color
            .unwrap_or_else(|| ctx.theme().color("block/fill", Color::TRANSPARENT));
        if color.a > 0 {
            ctx.fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Root, geom::Point};

    #[test]
    fn clamps_to_constraints() -> Result<()> {
        let mut root = Root::new();
        let b = root.create(Block::new(Size::new(50.0, 50.0)));
        root.set_child(b)?;
        root.set_constraints(Constraints::new(0.0, 20.0, 60.0, 80.0))?;
        root.frame()?;
        let bounds = root.node(b).map(|n| n.bounds()).unwrap_or_default();
        assert_eq!(bounds, Size::new(20.0, 60.0).at(Point::zero()));
        Ok(())
    }

    #[test]
    fn paints_theme_fill() -> Result<()> {
        let mut root = Root::new();
        root.theme_mut().set("fill", Color::rgb(1, 2, 3));
        let b = root.create(Block::new(Size::new(4.0, 4.0)));
        root.set_child(b)?;
        root.frame()?;
        let px = root.surface().map(|s| s.pixel(2, 2));
        assert_eq!(px, Some(Color::rgb(1, 2, 3)));
        Ok(())
    }
}
