//! Row and column layout with flex weights.

use std::collections::HashMap;

use crate::{
    core::{
        context::{LayoutCtx, ReadCtx},
        error::Result,
        id::NodeId,
        layout::Constraints,
    },
    geom::{Point, Size},
    widget::Widget,
};

/// Main axis of a [`Flex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Children left to right.
    Row,
    /// Children top to bottom.
    Column,
}

impl Direction {
    /// Split a size into (main, cross).
    fn split(self, s: Size) -> (f64, f64) {
        match self {
            Self::Row => (s.w, s.h),
            Self::Column => (s.h, s.w),
        }
    }

    /// Join (main, cross) into a size.
    fn join(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Row => Size::new(main, cross),
            Self::Column => Size::new(cross, main),
        }
    }

    /// Constraints with the given main and cross ranges.
    fn constraints(self, main: (f64, f64), cross: (f64, f64)) -> Constraints {
        match self {
            Self::Row => Constraints::new(main.0, main.1, cross.0, cross.1),
            Self::Column => Constraints::new(cross.0, cross.1, main.0, main.1),
        }
    }
}

/// Lays children out along one axis.
///
/// Children without a weight take their natural size. Weighted children share
/// whatever main-axis space is left, in proportion to their weights; when the
/// main axis is unbounded they fall back to their natural size too. Spacing
/// between enabled children comes from the `flex/spacing` theme path.
#[derive(Debug, Clone)]
pub struct Flex {
    /// Main axis.
    direction: Direction,
    /// Flex weights by child.
    weights: HashMap<NodeId, f64>,
}

impl Flex {
    /// A horizontal flex.
    pub fn row() -> Self {
        Self {
            direction: Direction::Row,
            weights: HashMap::new(),
        }
    }

    /// A vertical flex.
    pub fn column() -> Self {
        Self {
            direction: Direction::Column,
            weights: HashMap::new(),
        }
    }

    /// The main axis.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Give a child a flex weight. Zero or negative removes it. The caller
    /// marks the node layout-dirty.
    pub fn set_weight(&mut self, child: NodeId, weight: f64) {
        if weight > 0.0 {
            self.weights.insert(child, weight);
        } else {
            self.weights.remove(&child);
        }
    }

    /// Spacing from the theme.
    fn spacing(ctx: &dyn ReadCtx) -> f64 {
        ctx.theme().number("flex/spacing", 0.0).max(0.0)
    }
}

impl Widget for Flex {
    fn resolve_dimensions(&mut self, ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        let dir = self.direction;
        let children: Vec<NodeId> = ctx
            .children()
            .into_iter()
            .filter(|c| ctx.child_enabled(*c))
            .collect();
        let gaps = children.len().saturating_sub(1) as f64 * Self::spacing(ctx);
        let (max_main, max_cross) = dir.split(Size::new(c.max_w, c.max_h));

        let mut used = gaps;
        let mut cross: f64 = 0.0;
        let mut total_weight = 0.0;
        for child in &children {
            match self.weights.get(child) {
                Some(w) if max_main.is_finite() => total_weight += w,
                _ => {
                    let avail = (max_main - used).max(0.0);
                    let cc = dir.constraints((0.0, avail), (0.0, max_cross));
                    let s = ctx.resolve_child(*child, cc)?;
                    let (m, x) = dir.split(s);
                    used += m;
                    cross = cross.max(x);
                }
            }
        }

        if total_weight > 0.0 {
            let free = (max_main - used).max(0.0);
            for child in &children {
                let Some(w) = self.weights.get(child) else {
                    continue;
                };
                let share = free * w / total_weight;
                let cc = dir.constraints((share, share), (0.0, max_cross));
                let s = ctx.resolve_child(*child, cc)?;
                let (m, x) = dir.split(s);
                used += m;
                cross = cross.max(x);
            }
        }
        Ok(c.clamp(dir.join(used, cross)))
    }

    fn resolve_position(&mut self, ctx: &mut LayoutCtx, p: Point) -> Result<()> {
        let spacing = Self::spacing(ctx);
        let mut main = 0.0;
        for child in ctx.children() {
            if !ctx.child_enabled(child) {
                ctx.position_child(child, p)?;
                continue;
            }
            let at = match self.direction {
                Direction::Row => Point::new(p.x + main, p.y),
                Direction::Column => Point::new(p.x, p.y + main),
            };
            ctx.position_child(child, at)?;
            main += self.direction.split(ctx.child_size(child)).0 + spacing;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Root, geom::Rect, widgets::Block};

    /// Bounds of a node, or zero.
    fn bounds(root: &Root, id: NodeId) -> Rect {
        root.node(id).map(|n| n.bounds()).unwrap_or_default()
    }

    #[test]
    fn row_distributes_weights() -> Result<()> {
        let mut root = Root::new();
        let f = root.create(Flex::row());
        let a = root.create(Block::new(Size::new(10.0, 5.0)));
        let b = root.create(Block::new(Size::new(0.0, 5.0)));
        let c = root.create(Block::new(Size::new(0.0, 5.0)));
        for id in [a, b, c] {
            root.append_child(f, id)?;
        }
        root.with_widget(f, |w: &mut Flex| {
            w.set_weight(b, 1.0);
            w.set_weight(c, 3.0);
        })?;
        root.set_child(f)?;
        root.set_constraints(Constraints::new(0.0, 50.0, 0.0, 20.0))?;
        root.frame()?;

        assert_eq!(bounds(&root, a), Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(bounds(&root, b), Rect::new(10.0, 0.0, 10.0, 5.0));
        assert_eq!(bounds(&root, c), Rect::new(20.0, 0.0, 30.0, 5.0));
        assert_eq!(bounds(&root, f), Rect::new(0.0, 0.0, 50.0, 5.0));
        Ok(())
    }

    #[test]
    fn column_spacing_skips_disabled() -> Result<()> {
        let mut root = Root::new();
        root.theme_mut().set("flex/spacing", 2.0);
        let f = root.create(Flex::column());
        let a = root.create(Block::new(Size::new(4.0, 4.0)));
        let b = root.create(Block::new(Size::new(4.0, 4.0)));
        let c = root.create(Block::new(Size::new(6.0, 4.0)));
        for id in [a, b, c] {
            root.append_child(f, id)?;
        }
        root.set_enabled(b, false)?;
        root.set_child(f)?;
        root.frame()?;

        assert_eq!(bounds(&root, a), Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(bounds(&root, c), Rect::new(0.0, 6.0, 6.0, 4.0));
        assert_eq!(bounds(&root, f).size(), Size::new(6.0, 10.0));
        Ok(())
    }
}
