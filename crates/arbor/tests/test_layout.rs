//! Layout pipeline tests: idempotence, pixel rounding, constraint repair and
//! the per-viewport retry budget.

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use arbor::{
        LayoutCtx, NodeId, RootConfig, Widget,
        context::ReadCtx,
        error::{Error, Result},
        geom::{Point, Rect, Size},
        layout::Constraints,
        testing::{EventLog, Harness, Probe},
        widgets::{Block, Flex},
    };
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Ignores its constraints and always asks for the same size.
    struct Stubborn(Size);

    impl Widget for Stubborn {
        fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, _c: Constraints) -> Result<Size> {
            Ok(self.0)
        }
    }

    /// Requests another layout pass from its position hook `remaining` times.
    struct Restless {
        /// Relayout requests left.
        remaining: usize,
        /// Position hook calls.
        passes: Rc<Cell<usize>>,
    }

    impl Widget for Restless {
        fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
            Ok(c.clamp(Size::new(10.0, 10.0)))
        }

        fn resolve_position(&mut self, ctx: &mut LayoutCtx, _p: Point) -> Result<()> {
            self.passes.set(self.passes.get() + 1);
            if self.remaining > 0 {
                self.remaining -= 1;
                ctx.request_relayout();
            }
            Ok(())
        }
    }

    /// A row holding a 10x10 and a 20x5 block.
    fn row_of_blocks(h: &mut Harness) -> Result<(NodeId, NodeId, NodeId)> {
        let row = h.mount(Flex::row())?;
        let a = h.add(row, Block::new(Size::new(10.0, 10.0)))?;
        let b = h.add(row, Block::new(Size::new(20.0, 5.0)))?;
        Ok((row, a, b))
    }

    #[test]
    fn second_layout_is_a_no_op() -> Result<()> {
        let mut h = Harness::new();
        let (row, a, b) = row_of_blocks(&mut h)?;
        h.frame()?;
        let before = [h.bounds(row), h.bounds(a), h.bounds(b)];
        assert_eq!(before[2], Rect::new(10.0, 0.0, 20.0, 5.0));

        assert!(!h.root.resolve_layout()?);
        assert_eq!([h.bounds(row), h.bounds(a), h.bounds(b)], before);
        assert!(!h.root.node(a).is_some_and(|n| n.is_layout_dirty()));
        Ok(())
    }

    #[test]
    fn theme_change_relayouts() -> Result<()> {
        let mut h = Harness::new();
        let (row, _, b) = row_of_blocks(&mut h)?;
        h.frame()?;
        assert_eq!(h.bounds(row).w, 30.0);

        h.root.theme_mut().set("flex/spacing", 5.0);
        h.frame()?;
        assert_eq!(h.bounds(b).x, 15.0);
        assert_eq!(h.bounds(row).w, 35.0);
        Ok(())
    }

    #[test]
    fn disabled_children_take_no_space() -> Result<()> {
        let mut h = Harness::new();
        let (row, a, b) = row_of_blocks(&mut h)?;
        h.root.set_enabled(a, false)?;
        h.frame()?;
        assert_eq!(h.bounds(a).size(), Size::zero());
        assert_eq!(h.bounds(b).x, 0.0);
        assert_eq!(h.bounds(row).w, 20.0);

        h.root.set_enabled(a, true)?;
        h.frame()?;
        assert_eq!(h.bounds(b).x, 10.0);
        Ok(())
    }

    #[test]
    fn inverted_constraints_are_repaired() -> Result<()> {
        let mut h = Harness::new();
        let top = h.mount(Block::new(Size::new(100.0, 5.0)))?;
        h.root.set_constraints(Constraints::new(50.0, 20.0, -3.0, 10.0))?;
        h.frame()?;
        assert_eq!(h.bounds(top), Rect::new(0.0, 0.0, 50.0, 5.0));
        Ok(())
    }

    #[test]
    fn absurd_constraints_are_errors() {
        let mut h = Harness::new();
        let bad = Constraints::new(f64::INFINITY, f64::INFINITY, 0.0, 10.0);
        assert!(matches!(h.root.set_constraints(bad), Err(Error::Layout(_))));
        let nan = Constraints::new(0.0, f64::NAN, 0.0, 10.0);
        assert!(matches!(h.root.set_constraints(nan), Err(Error::Layout(_))));
    }

    #[test]
    fn oversized_results_are_clamped() -> Result<()> {
        let mut h = Harness::new();
        let top = h.mount(Stubborn(Size::new(500.0, 500.0)))?;
        h.root.set_constraints(Constraints::tight(Size::new(100.0, 80.0)))?;
        h.frame()?;
        assert_eq!(h.bounds(top).size(), Size::new(100.0, 80.0));
        Ok(())
    }

    #[test]
    fn non_finite_sizes_fail_layout() -> Result<()> {
        let mut h = Harness::new();
        h.mount(Stubborn(Size::new(f64::NAN, 1.0)))?;
        assert!(matches!(h.frame(), Err(Error::Geometry(_))));
        Ok(())
    }

    #[test]
    fn retries_are_bounded() -> Result<()> {
        let passes = Rc::new(Cell::new(0));
        let mut h = Harness::with_config(RootConfig::default().layout_retries(2))?;
        h.mount(Restless {
            remaining: usize::MAX,
            passes: passes.clone(),
        })?;
        h.frame()?;
        assert_eq!(passes.get(), 3);
        Ok(())
    }

    #[test]
    fn retries_stop_once_settled() -> Result<()> {
        let passes = Rc::new(Cell::new(0));
        let mut h = Harness::new();
        let top = h.mount(Restless {
            remaining: 1,
            passes: passes.clone(),
        })?;
        h.frame()?;
        assert_eq!(passes.get(), 2);
        assert!(!h.root.node(top).is_some_and(|n| n.is_layout_dirty()));

        h.frame()?;
        assert_eq!(passes.get(), 2);
        Ok(())
    }

    /// Is `v` a whole number of pixels at scale `s`?
    fn on_pixel_grid(v: f64, s: f64) -> bool {
        let px = v * s;
        (px - px.round()).abs() < 1e-6
    }

    proptest! {
        #[test]
        fn bounds_snap_outwards_to_pixels(
            scale in prop::sample::select(vec![1.0, 0.5, 2.0, 4.0 / 3.0]),
            w in 1.0f64..300.0,
            h in 1.0f64..300.0,
            ix in 0.0f64..40.0,
            iy in 0.0f64..40.0,
            cw in 1.0f64..200.0,
            ch in 1.0f64..200.0,
        ) {
            let mut hs = Harness::with_config(RootConfig::default().resolution(scale))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let log = EventLog::new();
            let run = |hs: &mut Harness| -> Result<Vec<NodeId>> {
                let top = hs.mount(Probe::new(Size::new(w, h), &log).inset(ix, iy))?;
                let child = hs.add(top, Probe::new(Size::new(cw, ch), &log))?;
                hs.frame()?;
                Ok(vec![top, child])
            };
            let ids = run(&mut hs).map_err(|e| TestCaseError::fail(e.to_string()))?;
            for id in ids {
                let Some(node) = hs.root.node(id) else {
                    return Err(TestCaseError::fail("node vanished"));
                };
                let (b, i) = (node.bounds(), node.ideal());
                for v in [b.x, b.y, b.right(), b.bottom()] {
                    prop_assert!(on_pixel_grid(v, scale), "{v} off grid at {scale}");
                }
                prop_assert!(b.x <= i.x + 1e-9 && b.y <= i.y + 1e-9);
                prop_assert!(b.right() >= i.right() - 1e-9 && b.bottom() >= i.bottom() - 1e-9);
            }
        }
    }

    #[test]
    fn layout_context_reads_node_state() -> Result<()> {
        /// Records how many children it saw while sizing.
        struct Reader(Rc<Cell<usize>>);

        impl Widget for Reader {
            fn resolve_dimensions(&mut self, ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
                self.0.set(ctx.children().len());
                Ok(c.clamp(Size::new(4.0, 4.0)))
            }
        }

        let seen = Rc::new(Cell::new(usize::MAX));
        let mut h = Harness::new();
        let top = h.mount(Reader(seen.clone()))?;
        h.add(top, Block::new(Size::new(1.0, 1.0)))?;
        h.add(top, Block::new(Size::new(1.0, 1.0)))?;
        h.frame()?;
        assert_eq!(seen.get(), 2);
        Ok(())
    }
}
