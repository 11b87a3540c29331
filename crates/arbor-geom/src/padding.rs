use super::{Rect, Size};

/// Padding applied inside the edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    /// Left padding.
    pub left: f64,
    /// Right padding.
    pub right: f64,
    /// Top padding.
    pub top: f64,
    /// Bottom padding.
    pub bottom: f64,
}

impl Padding {
    /// Construct padding from individual edges.
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The same padding on every edge.
    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Grow a content size by this padding.
    pub fn outer(&self, content: Size) -> Size {
        Size::new(
            content.w + self.horizontal(),
            content.h + self.vertical(),
        )
    }

    /// Shrink a rectangle by this padding, saturating at zero size.
    pub fn inner(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x + self.left,
            rect.y + self.top,
            (rect.w - self.horizontal()).max(0.0),
            (rect.h - self.vertical()).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_outer() {
        let p = Padding::uniform(4.0);
        assert_eq!(p.outer(Size::new(10.0, 2.0)), Size::new(18.0, 10.0));
        assert_eq!(
            p.inner(Rect::new(0.0, 0.0, 18.0, 10.0)),
            Rect::new(4.0, 4.0, 10.0, 2.0)
        );
        assert_eq!(
            p.inner(Rect::new(0.0, 0.0, 5.0, 5.0)),
            Rect::new(4.0, 4.0, 0.0, 0.0)
        );
    }
}
