//! Damage tracking tests: repaint only what was marked, report exactly what
//! was touched, and clip damage at viewport edges.

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use arbor::{
        LayoutCtx, NodeId, PaintCtx, UpdateCtx, Widget,
        error::{Error, Result},
        geom::{PixelRect, Point, Rect, Scale, Size},
        layout::Constraints,
        surface::{Color, PixelSurface},
        testing::{EventLog, Harness, Probe},
        widgets::{Block, Flex, ViewportWidget},
    };
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);
    const GREEN: Color = Color::rgb(0, 255, 0);

    /// Paints a shared color and, when armed, damages a fixed rectangle of
    /// itself in the pre-layout hook.
    struct Blinker {
        /// Fill color.
        color: Rc<Cell<Color>>,
        /// Rectangle to damage on the next pre-layout pass.
        arm: Rc<Cell<Option<Rect>>>,
    }

    impl Widget for Blinker {
        fn pre_layout(&mut self, ctx: &mut UpdateCtx) -> bool {
            if let Some(r) = self.arm.take() {
                ctx.mark_rect_dirty(r);
            }
            false
        }

        fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
            Ok(c.clamp(Size::new(20.0, 20.0)))
        }

        fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
            ctx.fill(self.color.get());
            Ok(())
        }
    }

    /// Paint count of a probe.
    fn paints(c: &Rc<RefCell<usize>>) -> usize {
        *c.borrow()
    }

    #[test]
    fn only_marked_widgets_repaint() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let row = h.mount(Flex::row())?;
        let pa = Probe::new(Size::new(20.0, 20.0), &log).color(RED);
        let pb = Probe::new(Size::new(20.0, 20.0), &log).color(BLUE);
        let (ca, cb) = (pa.paint_counter(), pb.paint_counter());
        let a = h.add(row, pa)?;
        h.add(row, pb)?;
        assert!(h.frame()?);
        assert_eq!((paints(&ca), paints(&cb)), (1, 1));

        h.root.mark_dirty(a);
        assert!(h.frame()?);
        assert_eq!((paints(&ca), paints(&cb)), (2, 1));
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(0, 0, 20, 20)]);
        assert_eq!(h.pixel(25, 5), BLUE);
        Ok(())
    }

    #[test]
    fn clean_frames_paint_nothing() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let p = Probe::new(Size::new(20.0, 20.0), &log).color(RED);
        let count = p.paint_counter();
        h.mount(p)?;
        h.frame()?;

        assert!(!h.frame()?);
        assert!(h.root.dirty_rects().is_empty());
        assert_eq!(paints(&count), 1);

        h.root.request_full_repaint();
        assert!(h.frame()?);
        assert_eq!(h.root.dirty_rects(), &[PixelRect::full(32, 32)]);
        assert_eq!(paints(&count), 2);
        Ok(())
    }

    #[test]
    fn partial_damage_is_clipped() -> Result<()> {
        let mut h = Harness::new();
        let color = Rc::new(Cell::new(RED));
        let arm = Rc::new(Cell::new(None));
        h.mount(Blinker {
            color: color.clone(),
            arm: arm.clone(),
        })?;
        h.frame()?;
        assert_eq!(h.pixel(10, 10), RED);

        color.set(GREEN);
        arm.set(Some(Rect::new(0.0, 0.0, 5.0, 5.0)));
        h.frame()?;
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(0, 0, 5, 5)]);
        assert_eq!(h.pixel(2, 2), GREEN);
        assert_eq!(h.pixel(10, 10), RED);
        Ok(())
    }

    /// Paint a red 20x20 blinker, turn it green and damage `r`. Returns the
    /// reported dirty rectangles and the blinker's pixels, row by row.
    fn damage_once(r: Rect) -> Result<(Vec<PixelRect>, Vec<Color>)> {
        let mut h = Harness::new();
        let color = Rc::new(Cell::new(RED));
        let arm = Rc::new(Cell::new(None));
        h.mount(Blinker {
            color: color.clone(),
            arm: arm.clone(),
        })?;
        h.frame()?;
        color.set(GREEN);
        arm.set(Some(r));
        h.frame()?;
        let mut pixels = Vec::new();
        for y in 0..20 {
            for x in 0..20 {
                pixels.push(h.pixel(x, y));
            }
        }
        Ok((h.root.dirty_rects().to_vec(), pixels))
    }

    proptest! {
        #[test]
        fn repaint_stays_inside_damage(
            x in 0.0f64..19.0,
            y in 0.0f64..19.0,
            w in 0.5f64..12.0,
            hgt in 0.5f64..12.0,
        ) {
            let r = Rect::new(x, y, w, hgt);
            let expected = r.to_pixels(Scale::UNIT, 32, 32);
            let (dirty, pixels) =
                damage_once(r).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(&dirty, &expected.into_iter().collect::<Vec<_>>());
            let Some(px) = expected else {
                return Ok(());
            };
            for (i, c) in pixels.iter().enumerate() {
                let (cx, cy) = ((i % 20) as u32, (i / 20) as u32);
                let want = if px.contains(cx, cy) { GREEN } else { RED };
                prop_assert_eq!(*c, want, "pixel {} {}", cx, cy);
            }
        }
    }

    #[test]
    fn overlapping_damage_is_merged() -> Result<()> {
        let mut h = Harness::new();
        let color = Rc::new(Cell::new(RED));
        let arm = Rc::new(Cell::new(None));
        let id = h.mount(Blinker {
            color: color.clone(),
            arm: arm.clone(),
        })?;
        h.frame()?;

        arm.set(Some(Rect::new(2.0, 2.0, 4.0, 4.0)));
        h.root.mark_dirty(id);
        h.frame()?;
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(0, 0, 20, 20)]);
        Ok(())
    }

    #[test]
    fn recolored_blocks_repaint() -> Result<()> {
        let mut h = Harness::new();
        let b = h.mount(Block::new(Size::new(10.0, 10.0)).with_color(RED))?;
        h.frame()?;
        h.root.with_widget::<Block, _>(b, |b| b.set_color(BLUE))?;
        assert_eq!(h.pixel(5, 5), RED);
        h.root.mark_dirty(b);
        h.frame()?;
        assert_eq!(h.pixel(5, 5), BLUE);
        Ok(())
    }

    /// Counters and ids for the clipped-viewport fixture.
    struct Clipped {
        /// The viewport widget.
        vw: NodeId,
        /// A probe visible at the top of the viewport.
        visible: NodeId,
        /// A probe below the visible area.
        hidden: NodeId,
        /// Paint count of `visible`.
        visible_paints: Rc<RefCell<usize>>,
        /// Paint count of `hidden`.
        hidden_paints: Rc<RefCell<usize>>,
    }

    /// A 100x100 probe with a 50x50 clipped viewport at (10, 10). The
    /// viewport shows a column: a 20x20 probe, a 200x100 spacer and another
    /// 20x20 probe.
    fn clipped(h: &mut Harness, log: &EventLog) -> Result<Clipped> {
        let top = h.mount(Probe::new(Size::new(100.0, 100.0), log).inset(10.0, 10.0))?;
        let column = h.root.create(Flex::column());
        let pv = Probe::new(Size::new(20.0, 20.0), log).color(RED);
        let ph = Probe::new(Size::new(20.0, 20.0), log).color(BLUE);
        let (visible_paints, hidden_paints) = (pv.paint_counter(), ph.paint_counter());
        let visible = h.root.create(pv);
        let spacer = h.root.create(Block::new(Size::new(200.0, 100.0)));
        let hidden = h.root.create(ph);
        for c in [visible, spacer, hidden] {
            h.root.append_child(column, c)?;
        }
        let vw = ViewportWidget::install(&mut h.root, Size::new(50.0, 50.0), column, None)?;
        h.root.append_child(top, vw)?;
        Ok(Clipped {
            vw,
            visible,
            hidden,
            visible_paints,
            hidden_paints,
        })
    }

    #[test]
    fn damage_outside_a_viewport_is_dropped() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let f = clipped(&mut h, &log)?;
        h.frame()?;
        assert_eq!(paints(&f.visible_paints), 1);
        assert_eq!(paints(&f.hidden_paints), 0);
        assert_eq!(h.pixel(15, 15), RED);
        assert_eq!(h.pixel(65, 15), Color::TRANSPARENT);

        h.root.mark_dirty(f.hidden);
        assert!(!h.frame()?);
        assert!(h.root.dirty_rects().is_empty());
        assert_eq!(paints(&f.hidden_paints), 0);

        h.root.mark_dirty(f.visible);
        assert!(h.frame()?);
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(10, 10, 20, 20)]);
        assert_eq!(paints(&f.visible_paints), 2);
        Ok(())
    }

    #[test]
    fn scrolling_exposes_hidden_content() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let f = clipped(&mut h, &log)?;
        h.frame()?;

        let vid = h
            .root
            .node(f.vw)
            .and_then(|n| n.owned_viewport())
            .ok_or_else(|| Error::Invalid("no viewport".into()))?;
        assert!(h.root.set_viewport_offset(vid, Point::new(0.0, -120.0))?);
        assert!(!h.root.set_viewport_offset(vid, Point::new(0.0, -120.0))?);
        h.frame()?;
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(10, 10, 50, 50)]);
        assert_eq!(paints(&f.hidden_paints), 1);
        assert_eq!(h.pixel(15, 15), BLUE);
        assert_eq!(h.pixel(35, 15), Color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn damage_inside_surface_viewports_propagates_clipped() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let top = h.mount(Probe::new(Size::new(200.0, 200.0), &log).inset(50.0, 50.0))?;
        let stripe = h.root.create(Block::new(Size::new(300.0, 10.0)).with_color(RED));
        let vw = ViewportWidget::install(
            &mut h.root,
            Size::new(100.0, 100.0),
            stripe,
            Some(Box::new(PixelSurface::new(0, 0))),
        )?;
        h.root.append_child(top, vw)?;
        h.frame()?;

        h.root.with_widget::<Block, _>(stripe, |b| b.set_color(GREEN))?;
        h.root.mark_dirty(stripe);
        h.frame()?;
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(50, 50, 100, 10)]);
        let nested = h
            .root
            .node(vw)
            .and_then(|n| n.owned_viewport())
            .and_then(|v| h.root.viewport(v))
            .and_then(|v| v.surface_state())
            .map(|s| s.dirty_rects().to_vec());
        assert_eq!(nested, Some(vec![PixelRect::new(0, 0, 300, 10)]));
        assert_eq!(h.pixel(60, 55), GREEN);
        Ok(())
    }
}
