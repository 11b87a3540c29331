//! Surface-backed viewport tests: power-of-two growth, clamping to the
//! maximum size, resolution changes, bleed prevention and compositing.

#[cfg(test)]
mod tests {
    use arbor::{
        NodeId, Root, RootConfig,
        error::{Error, Result},
        geom::{PixelRect, Point, Rect, Scale, Size},
        surface::{Color, PixelSurface},
        testing::{EventLog, Harness, Probe},
        widgets::{Block, ViewportWidget},
    };
    use pretty_assertions::assert_eq;

    const RED: Color = Color::rgb(255, 0, 0);

    /// Change a block's requested size and schedule a relayout.
    fn resize_block(h: &mut Harness, id: NodeId, w: f64, hgt: f64) -> Result<()> {
        h.root
            .with_widget::<Block, _>(id, |b| b.set_size(Size::new(w, hgt)))?;
        h.root.mark_layout_dirty(id);
        Ok(())
    }

    /// Child size in pixels of the Root's surface.
    fn real_size(h: &Harness) -> (u32, u32) {
        h.root.surface_state().map_or((0, 0), |s| s.real_size())
    }

    #[test]
    fn growth_rounds_up_to_powers_of_two() -> Result<()> {
        let mut h = Harness::new();
        let b = h.mount(Block::new(Size::new(100.0, 100.0)).with_color(RED))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (128, 128));
        assert_eq!(real_size(&h), (100, 100));

        resize_block(&mut h, b, 300.0, 100.0)?;
        h.frame()?;
        assert_eq!(h.surface_size(), (512, 128));
        assert_eq!(h.pixel(250, 50), RED);
        assert_eq!(h.pixel(350, 50), Color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn surfaces_never_shrink() -> Result<()> {
        let mut h = Harness::new();
        let b = h.mount(Block::new(Size::new(300.0, 300.0)))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (512, 512));

        for (w, hgt) in [(10.0, 10.0), (130.0, 20.0), (0.0, 0.0)] {
            resize_block(&mut h, b, w, hgt)?;
            h.frame()?;
            assert_eq!(h.surface_size(), (512, 512));
        }
        assert_eq!(real_size(&h), (0, 0));
        Ok(())
    }

    #[test]
    fn host_surfaces_are_kept_when_large_enough() -> Result<()> {
        let root = Root::with_surface(Box::new(PixelSurface::new(64, 64)), RootConfig::default())?;
        let mut h = Harness { root };
        h.mount(Block::new(Size::new(10.0, 10.0)))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (64, 64));
        Ok(())
    }

    #[test]
    fn maximum_size_reduces_scale() -> Result<()> {
        let mut h = Harness::with_config(RootConfig::default().max_surface(256, 256))?;
        h.mount(Block::new(Size::new(300.0, 100.0)).with_color(RED))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (256, 128));
        assert_eq!(real_size(&h), (256, 100));

        let top = h.root.top_viewport();
        let scale = h
            .root
            .viewport(top)
            .map(|v| v.effective_scale())
            .unwrap_or_default();
        assert!((scale.x - 256.0 / 300.0).abs() < 1e-9);
        assert_eq!(scale.y, 1.0);
        assert_eq!(h.pixel(255, 99), RED);
        Ok(())
    }

    #[test]
    fn resolution_change_repaints_everything() -> Result<()> {
        let mut h = Harness::new();
        h.mount(Block::new(Size::new(100.0, 100.0)).with_color(RED))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (128, 128));

        h.root.set_resolution(2.0)?;
        h.frame()?;
        assert_eq!(h.surface_size(), (256, 256));
        assert_eq!(real_size(&h), (200, 200));
        assert_eq!(h.root.dirty_rects(), &[PixelRect::full(256, 256)]);
        assert_eq!(h.pixel(150, 150), RED);
        assert_eq!(h.pixel(210, 10), Color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn resolution_change_rounds_the_tree_again() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let p = h.mount(Probe::new(Size::new(100.3, 100.3), &log).capture_pointer())?;
        h.frame()?;
        assert_eq!(h.bounds(p).w, 101.0);

        h.root.set_resolution(0.5)?;
        h.frame()?;
        assert_eq!(h.bounds(p), Rect::new(0.0, 0.0, 102.0, 102.0));
        let top = h.root.top_viewport();
        assert_eq!(h.root.viewport(top).map(|v| v.rect()), Some(h.bounds(p)));
        assert_eq!(real_size(&h), (51, 51));

        let out = h.move_to(101.5, 10.0)?;
        assert_eq!(out[0].widget(), Some(p));
        Ok(())
    }

    #[test]
    fn clipped_viewports_follow_the_enclosing_scale() -> Result<()> {
        let mut h = Harness::new();
        let block = h.root.create(Block::new(Size::new(10.3, 10.3)));
        let vw = ViewportWidget::install(&mut h.root, Size::new(20.0, 20.0), block, None)?;
        h.root.set_child(vw)?;
        h.frame()?;
        assert_eq!(h.bounds(block).w, 11.0);

        h.root.set_resolution(2.0)?;
        h.frame()?;
        let vid = h.root.node(vw).and_then(|n| n.owned_viewport());
        let scale = vid
            .and_then(|v| h.root.viewport(v))
            .map(|v| v.effective_scale());
        assert_eq!(scale, Some(Scale::uniform(2.0)));
        assert_eq!(h.bounds(block), Rect::new(0.0, 0.0, 10.5, 10.5));
        Ok(())
    }

    #[test]
    fn bad_resolutions_are_rejected() {
        let mut h = Harness::new();
        assert!(matches!(h.root.set_resolution(0.0), Err(Error::Invalid(_))));
        assert!(matches!(
            h.root.set_resolution(f64::NAN),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Harness::with_config(RootConfig::default().resolution(-1.0)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn empty_maximum_sizes_are_rejected() {
        let mut h = Harness::new();
        let top = h.root.top_viewport();
        assert!(matches!(
            h.root.configure_surface(top, 1.0, 0, 64),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Harness::with_config(RootConfig::default().max_surface(0, 0)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn shrinking_clears_stale_margins() -> Result<()> {
        let mut h = Harness::with_config(RootConfig::default().prevent_bleeding(true))?;
        let b = h.mount(Block::new(Size::new(100.0, 100.0)).with_color(RED))?;
        h.frame()?;

        resize_block(&mut h, b, 50.0, 50.0)?;
        h.frame()?;
        let dirty = h.root.dirty_rects();
        assert!(dirty.contains(&PixelRect::new(50, 0, 78, 128)));
        assert!(dirty.contains(&PixelRect::new(0, 50, 128, 78)));
        assert_eq!(h.pixel(75, 75), Color::TRANSPARENT);
        assert_eq!(h.pixel(25, 25), RED);
        Ok(())
    }

    #[test]
    fn margins_are_left_alone_without_bleed_prevention() -> Result<()> {
        let mut h = Harness::new();
        let b = h.mount(Block::new(Size::new(100.0, 100.0)).with_color(RED))?;
        h.frame()?;

        resize_block(&mut h, b, 50.0, 50.0)?;
        h.frame()?;
        assert_eq!(h.root.dirty_rects(), &[PixelRect::new(0, 0, 100, 100)]);
        Ok(())
    }

    #[test]
    fn surface_viewports_must_be_relative() -> Result<()> {
        let mut h = Harness::new();
        let top = h.root.top_viewport();
        assert!(matches!(
            h.root.set_viewport_relative(top, false),
            Err(Error::Invalid(_))
        ));
        h.root.set_viewport_relative(top, true)?;
        Ok(())
    }

    /// A 200x200 probe with a 100x100 surface-backed viewport at (50, 50)
    /// onto a 300x300 child whose top 10 rows are red. Returns the viewport
    /// widget.
    fn nested(h: &mut Harness, log: &EventLog) -> Result<NodeId> {
        let top = h.mount(Probe::new(Size::new(200.0, 200.0), log).inset(50.0, 50.0))?;
        let inner = h.root.create(Probe::new(Size::new(300.0, 300.0), log));
        let stripe = h.root.create(Block::new(Size::new(300.0, 10.0)).with_color(RED));
        h.root.append_child(inner, stripe)?;
        let vw = ViewportWidget::install(
            &mut h.root,
            Size::new(100.0, 100.0),
            inner,
            Some(Box::new(PixelSurface::new(0, 0))),
        )?;
        h.root.append_child(top, vw)?;
        Ok(vw)
    }

    #[test]
    fn nested_surfaces_are_composited() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let vw = nested(&mut h, &log)?;
        h.frame()?;

        assert_eq!(h.surface_size(), (256, 256));
        let vid = h.root.node(vw).and_then(|n| n.owned_viewport());
        let state = vid.and_then(|v| h.root.viewport(v)).and_then(|v| v.surface_state());
        assert_eq!(state.map(|s| s.size()), Some((512, 512)));

        assert_eq!(h.pixel(60, 55), RED);
        assert_eq!(h.pixel(149, 59), RED);
        assert_eq!(h.pixel(60, 65), Color::TRANSPARENT);
        assert_eq!(h.pixel(40, 55), Color::TRANSPARENT);
        assert_eq!(h.pixel(160, 55), Color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn scrolling_recomposites_without_repainting_the_child() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let vw = nested(&mut h, &log)?;
        h.frame()?;

        let out = h.wheel(100.0, 100.0, 0.0, 10.0)?;
        assert_eq!(out[0].widget(), Some(vw));
        h.frame()?;

        let vid = h.root.node(vw).and_then(|n| n.owned_viewport());
        let vp = vid.and_then(|v| h.root.viewport(v));
        assert_eq!(vp.map(|v| v.offset()), Some(Point::new(0.0, -10.0)));
        assert_eq!(
            vp.and_then(|v| v.surface_state()).map(|s| s.dirty_rects().len()),
            Some(0)
        );
        assert_eq!(h.pixel(60, 55), Color::TRANSPARENT);
        Ok(())
    }

    #[test]
    fn config_from_json() -> Result<()> {
        let config = RootConfig::from_json(
            r#"{"resolution": 2.0, "max_surface_width": 256, "max_surface_height": 256}"#,
        )?;
        let mut h = Harness::with_config(config)?;
        let b = h.mount(Block::new(Size::new(100.0, 100.0)))?;
        h.frame()?;
        assert_eq!(h.surface_size(), (256, 256));
        assert_eq!(real_size(&h), (200, 200));

        resize_block(&mut h, b, 200.0, 200.0)?;
        h.frame()?;
        assert_eq!(h.surface_size(), (256, 256));
        assert_eq!(real_size(&h), (256, 256));
        Ok(())
    }
}
