//! Integration tests for focus channels, tab navigation and drivers.

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use arbor::{
        NodeId, Root,
        context::ReadCtx,
        driver::Driver,
        error::Result,
        event::{
            EventKind,
            key::{Key, KeyCode},
        },
        focus::FocusType,
        geom::Size,
        testing::{DriverCall, EventLog, Harness, Probe, RecordingDriver},
    };
    use pretty_assertions::assert_eq;

    /// A column of three tab-focusable probes under a plain one.
    fn tab_tree(h: &mut Harness, log: &EventLog) -> Result<(NodeId, [NodeId; 3])> {
        let top = h.mount(Probe::new(Size::new(30.0, 10.0), log))?;
        let mut ids = [top; 3];
        for slot in &mut ids {
            *slot = h.add(top, Probe::new(Size::new(10.0, 10.0), log).tab_focusable())?;
        }
        h.frame()?;
        Ok((top, ids))
    }

    /// Every channel holds at most one widget, and that widget is active.
    fn assert_exclusive(root: &Root) {
        for ty in FocusType::ALL {
            if let Some(w) = root.focus(ty) {
                assert!(root.node(w).is_some_and(|n| n.is_active()), "{ty} holder inactive");
            }
        }
    }

    #[test]
    fn tab_walks_forward_and_back() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, b, c]) = tab_tree(&mut h, &log)?;

        for expected in [a, b, c] {
            h.tab()?;
            assert_eq!(h.root.focus(FocusType::Tab), Some(expected));
            assert_eq!(h.root.focus(FocusType::Keyboard), Some(expected));
            assert_exclusive(&h.root);
        }
        // No wrap-around past the last widget.
        let out = h.tab()?;
        assert_eq!(out.len(), 2);
        assert!(!out[1].captured());
        assert_eq!(h.root.focus(FocusType::Tab), Some(c));

        h.shift_tab()?;
        assert_eq!(h.root.focus(FocusType::Tab), Some(b));
        h.shift_tab()?;
        assert_eq!(h.root.focus(FocusType::Tab), Some(a));

        assert_eq!(log.blurs(a, FocusType::Tab), 1);
        assert_eq!(log.blurs(b, FocusType::Tab), 2);
        assert_eq!(log.blurs(c, FocusType::Tab), 1);
        Ok(())
    }

    #[test]
    fn virtual_tab_does_not_navigate() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, _, _]) = tab_tree(&mut h, &log)?;
        let out = h.key(Key::new(KeyCode::Tab).virtual_key())?;
        assert!(out.is_empty());
        assert_eq!(h.root.focus(FocusType::Tab), None);

        h.root.request_focus(FocusType::Keyboard, a)?;
        let out = h.key(Key::new(KeyCode::Tab).virtual_key())?;
        assert_eq!(out.len(), 1);
        assert_eq!(h.root.focus(FocusType::Tab), Some(a));
        Ok(())
    }

    #[test]
    fn tab_retries_when_anchor_is_gone() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, b, _]) = tab_tree(&mut h, &log)?;
        h.tab()?;
        h.tab()?;
        assert_eq!(h.root.focus_capturer(FocusType::Tab), Some(b));

        h.root.detach(b)?;
        assert_eq!(h.root.focus(FocusType::Keyboard), None);
        assert_eq!(h.root.focus(FocusType::Tab), None);
        assert_eq!(log.blurs(b, FocusType::Keyboard), 1);
        h.frame()?;

        let out = h.tab()?;
        let kinds: Vec<_> = out
            .iter()
            .map(|c| match &c.event.kind {
                EventKind::TabSelect(t) => (t.relative_to, c.widget()),
                _ => (None, c.widget()),
            })
            .collect();
        assert_eq!(kinds, vec![(None, None), (Some(b), None), (None, Some(a))]);
        assert_eq!(h.root.focus(FocusType::Tab), Some(a));
        Ok(())
    }

    #[test]
    fn partner_channels() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, b, _]) = tab_tree(&mut h, &log)?;

        assert!(h.root.request_focus(FocusType::Tab, a)?);
        assert_eq!(h.root.focus(FocusType::Keyboard), Some(a));
        // Clearing one partner leaves the other.
        h.root.clear_focus(FocusType::Tab)?;
        assert_eq!(h.root.focus(FocusType::Keyboard), Some(a));
        assert_eq!(h.root.focus(FocusType::Tab), None);

        assert!(h.root.request_focus(FocusType::Keyboard, b)?);
        assert_eq!(log.blurs(a, FocusType::Keyboard), 1);
        assert_eq!(log.blurs(a, FocusType::Tab), 1);
        // Pointer focus is independent.
        assert!(h.root.request_focus(FocusType::Pointer, a)?);
        assert_eq!(h.root.focus(FocusType::Keyboard), Some(b));
        assert_exclusive(&h.root);
        Ok(())
    }

    #[test]
    fn focus_needs_capture() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let top = h.mount(Probe::new(Size::new(10.0, 10.0), &log))?;
        let a = h.add(top, Probe::new(Size::new(10.0, 10.0), &log).accept_focus())?;
        h.frame()?;

        assert!(!h.root.request_focus(FocusType::Keyboard, top)?);
        assert_eq!(h.root.focus(FocusType::Keyboard), None);
        assert_eq!(log.count(top, |k| matches!(k, EventKind::Focus(_))), 1);

        h.root.set_enabled(a, false)?;
        assert!(!h.root.request_focus(FocusType::Keyboard, a)?);
        h.root.set_enabled(a, true)?;
        assert!(h.root.request_focus(FocusType::Keyboard, a)?);
        // Already holding it is not a change.
        assert!(h.root.request_focus(FocusType::Keyboard, a)?);
        assert_eq!(log.count(a, |k| matches!(k, EventKind::Focus(_))), 1);
        Ok(())
    }

    #[test]
    fn clearing_blurs_exactly_once() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, _, _]) = tab_tree(&mut h, &log)?;
        h.root.request_focus(FocusType::Pointer, a)?;
        h.root.clear_focus(FocusType::Pointer)?;
        h.root.clear_focus(FocusType::Pointer)?;
        assert_eq!(log.blurs(a, FocusType::Pointer), 1);
        assert!(!h.root.drop_focus(FocusType::Pointer, a)?);
        Ok(())
    }

    #[test]
    fn deactivation_drops_focus() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (top, [a, _, _]) = tab_tree(&mut h, &log)?;
        h.root.request_focus(FocusType::Keyboard, a)?;
        h.root.request_focus(FocusType::Pointer, a)?;
        h.root.set_enabled(top, false)?;
        for ty in FocusType::ALL {
            assert_eq!(h.root.focus(ty), None);
            assert_eq!(log.blurs(a, ty), 1);
        }
        Ok(())
    }

    #[test]
    fn focus_requests_from_handlers_are_deferred() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [_, b, _]) = tab_tree(&mut h, &log)?;
        let during = Rc::new(Cell::new(None));
        let d = during.clone();
        h.root.add_listener(b, move |ctx, e| {
            if matches!(e.kind, EventKind::PointerPress(_)) {
                ctx.request_focus(FocusType::Keyboard);
                d.set(Some(ctx.root().focus(FocusType::Keyboard)));
                return true;
            }
            false
        })?;
        let out = h.press(5.0, 5.0)?;
        assert_eq!(out[0].widget(), Some(b));
        assert_eq!(during.get(), Some(None));
        assert_eq!(h.root.focus(FocusType::Keyboard), Some(b));
        Ok(())
    }

    #[test]
    fn driver_notifications() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let top = h.mount(Probe::new(Size::new(20.0, 10.0), &log))?;
        let a = h.add(top, Probe::new(Size::new(10.0, 10.0), &log).grab())?;
        h.frame()?;

        let (driver, calls) = RecordingDriver::new();
        let id = h.root.add_driver(Box::new(driver));
        h.press(5.0, 5.0)?;
        h.frame()?;
        h.root.set_root_enabled(false)?;

        assert_eq!(
            *calls.borrow(),
            vec![
                DriverCall::Enable,
                DriverCall::FocusChanged(FocusType::Pointer, Some(a)),
                DriverCall::CapturerChanged(FocusType::Pointer, None, Some(a)),
                DriverCall::Update,
                DriverCall::FocusChanged(FocusType::Pointer, None),
                DriverCall::Disable,
            ]
        );
        assert!(h.root.remove_driver(id));
        assert!(!h.root.remove_driver(id));
        Ok(())
    }

    /// Requests keyboard focus for a widget whenever it is told about a
    /// pointer focus change.
    struct Follower {
        /// Widget to focus.
        target: NodeId,
        /// Keyboard focus changes seen.
        seen: Rc<RefCell<Vec<Option<NodeId>>>>,
    }

    impl Driver for Follower {
        fn on_focus_changed(&mut self, root: &mut Root, ty: FocusType, widget: Option<NodeId>) {
            match ty {
                FocusType::Pointer if widget.is_some() => {
                    root.request_focus(FocusType::Keyboard, self.target).ok();
                }
                FocusType::Keyboard => self.seen.borrow_mut().push(widget),
                _ => {}
            }
        }
    }

    #[test]
    fn reentrant_driver_notifications_are_queued() -> Result<()> {
        let mut h = Harness::new();
        let log = EventLog::new();
        let (_, [a, b, _]) = tab_tree(&mut h, &log)?;
        let seen = Rc::new(RefCell::new(Vec::new()));
        h.root.add_driver(Box::new(Follower {
            target: b,
            seen: seen.clone(),
        }));
        h.root.request_focus(FocusType::Pointer, a)?;
        assert_eq!(h.root.focus(FocusType::Keyboard), Some(b));
        assert_eq!(*seen.borrow(), vec![Some(b)]);
        Ok(())
    }
}
