//! The Root: owner of a widget tree.
//!
//! A Root owns the widget and viewport arenas, the surface-backed viewport
//! the tree renders into, the focus channels, hover bookkeeping, pointer
//! style requests and the registered drivers. Hosts drive it with
//! [`Root::frame`] once per display frame and [`Root::dispatch_event`] for
//! input.

use std::{
    any::{Any, type_name},
    collections::{HashMap, VecDeque},
    mem,
};

use slotmap::SlotMap;
use tracing::{debug, trace, trace_span, warn};

use crate::{
    core::{
        config::RootConfig,
        context::EventCtx,
        cursor::{PointerStyles, StyleHandler},
        dispatch,
        driver::{Driver, DriverId, Notification},
        dump,
        error::{Error, Result},
        event::{Capture, CaptureList, Capturer, Event, EventKind, Propagation, key::KeyCode},
        focus::{FocusState, FocusType},
        id::{ListenerId, NodeId, ViewportId},
        layout::Constraints,
        node::{Listener, Node},
        surface::{PixelSurface, Surface},
        surface_viewport::{self, SurfaceState},
        theme::Theme,
        tree,
        viewport::{self, Viewport},
    },
    geom::{PixelRect, Point},
    widget::Widget,
};

/// Rounds of deferred operations run per dispatch before giving up.
const MAX_PENDING_ROUNDS: usize = 32;

/// A listener on the Root. Returning `true` captures the event before the
/// tree sees it.
pub type RootListener = Box<dyn FnMut(&mut Root, &Event) -> bool>;

/// Work requested by widgets during dispatch, applied once the dispatch
/// that requested it finishes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingOp {
    /// Grant a focus channel.
    Focus(FocusType, NodeId),
    /// Release a focus channel if the node holds it.
    Release(FocusType, NodeId),
    /// Bubble an event from the parent of a node.
    Bubble(NodeId, EventKind),
}

/// The owner of a widget tree.
pub struct Root {
    /// Widget arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Viewport arena.
    pub(crate) viewports: SlotMap<ViewportId, Viewport>,
    /// The surface-backed viewport the tree renders into.
    pub(crate) top: ViewportId,
    /// Top of the widget tree.
    pub(crate) child: Option<NodeId>,
    /// Registered widget ids.
    pub(crate) ids: HashMap<String, NodeId>,
    /// Root-level enable flag.
    pub(crate) enabled: bool,
    /// Focus channels and their last capturers.
    pub(crate) focus: FocusState,
    /// Widgets hovered during the current positional dispatch.
    pub(crate) hovered: Vec<NodeId>,
    /// Widgets hovered during the previous positional dispatch.
    pub(crate) hovered_prev: Vec<NodeId>,
    /// Widgets that lost pointer focus since the last reconciliation.
    pub(crate) dropped_foci: Vec<NodeId>,
    /// Deferred widget requests.
    pub(crate) pending: Vec<PendingOp>,
    /// Pointer style requests.
    pub(crate) pointer_styles: PointerStyles,
    /// Registered drivers. A slot is empty while its driver runs.
    drivers: Vec<(DriverId, Option<Box<dyn Driver>>)>,
    /// Driver notifications waiting for delivery.
    notifications: VecDeque<Notification>,
    /// A driver is running, so notifications are queued.
    notifying: bool,
    /// Root-level listeners.
    pub(crate) listeners: Vec<(ListenerId, RootListener)>,
    /// Theme provider.
    pub(crate) theme: Theme,
    /// Theme generation seen by the last pre-layout phase.
    theme_generation: u64,
    /// Counter for driver and listener ids.
    next_id: u64,
    /// Configuration the Root was built with.
    config: RootConfig,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    /// A Root with the default configuration and a software surface.
    pub fn new() -> Self {
        Self::build(Box::new(PixelSurface::new(0, 0)), RootConfig::default())
    }

    /// A Root with a software surface.
    pub fn with_config(config: RootConfig) -> Result<Self> {
        Self::with_surface(Box::new(PixelSurface::new(0, 0)), config)
    }

    /// A Root rendering into a host-provided surface.
    pub fn with_surface(surface: Box<dyn Surface>, config: RootConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(surface, config))
    }

    /// Construct without validating the configuration.
    fn build(surface: Box<dyn Surface>, config: RootConfig) -> Self {
        let mut viewports = SlotMap::with_key();
        let mut vp = Viewport::with_surface(None, SurfaceState::new(surface, &config));
        vp.set_constraints(config.constraints);
        vp.set_layout_retries(config.layout_retries);
        let top = viewports.insert(vp);
        Self {
            nodes: SlotMap::with_key(),
            viewports,
            top,
            child: None,
            ids: HashMap::new(),
            enabled: true,
            focus: FocusState::default(),
            hovered: Vec::new(),
            hovered_prev: Vec::new(),
            dropped_foci: Vec::new(),
            pending: Vec::new(),
            pointer_styles: PointerStyles::default(),
            drivers: Vec::new(),
            notifications: VecDeque::new(),
            notifying: false,
            listeners: Vec::new(),
            theme: Theme::new(),
            theme_generation: 0,
            next_id: 0,
            config,
        }
    }

    /// The configuration the Root was built with.
    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// A fresh id for drivers and listeners.
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // Tree

    /// Add a detached widget to the arena.
    pub fn create<W: Widget + 'static>(&mut self, widget: W) -> NodeId {
        self.create_boxed(Box::new(widget))
    }

    /// Add a detached boxed widget to the arena.
    pub fn create_boxed(&mut self, widget: Box<dyn Widget>) -> NodeId {
        self.nodes.insert(Node::new(widget))
    }

    /// Give a detached widget a nested clipped viewport. Its children are laid
    /// out and painted through it.
    pub fn create_viewport(&mut self, owner: NodeId) -> Result<ViewportId> {
        self.install_viewport(owner, Viewport::new(Some(owner)))
    }

    /// Give a detached widget a nested viewport rendering into its own
    /// surface, which is then composited into the enclosing one. Resolution
    /// and maxima start from the Root's configuration.
    pub fn create_surface_viewport(
        &mut self,
        owner: NodeId,
        surface: Box<dyn Surface>,
    ) -> Result<ViewportId> {
        let st = SurfaceState::new(surface, &self.config);
        self.install_viewport(owner, Viewport::with_surface(Some(owner), st))
    }

    /// Attach a viewport to its owner.
    fn install_viewport(&mut self, owner: NodeId, vp: Viewport) -> Result<ViewportId> {
        let node = self.nodes.get(owner).ok_or(Error::NodeNotFound(owner))?;
        if node.owned_viewport.is_some() {
            return Err(Error::Invalid(format!("{owner:?} already owns a viewport")));
        }
        if node.attached {
            return Err(Error::Invalid(format!(
                "{owner:?} is attached; create viewports before attaching"
            )));
        }
        let vid = self.viewports.insert(vp);
        self.nodes[owner].owned_viewport = Some(vid);
        Ok(vid)
    }

    /// Make `id` the top of the tree, detaching any previous top.
    pub fn set_child(&mut self, id: NodeId) -> Result<()> {
        if self.child == Some(id) {
            return Ok(());
        }
        if let Some(old) = self.child {
            tree::unlink(self, old)?;
        }
        tree::link(self, None, id, None)?;
        if let Some(vp) = self.viewports.get_mut(self.top) {
            vp.force_relayout();
        }
        Ok(())
    }

    /// The top of the tree.
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    /// Append `child` to `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        tree::link(self, Some(parent), child, None)
    }

    /// Insert `child` into `parent`'s children at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        tree::link(self, Some(parent), child, Some(index))
    }

    /// Detach a node from its parent, or from the Root. The subtree stays in
    /// the arena and may be attached again.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        tree::unlink(self, id)
    }

    /// Remove a subtree from the arena, detaching it first.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        tree::destroy(self, id)
    }

    /// Node data.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set or clear a node's unique string id.
    pub fn set_widget_id(&mut self, id: NodeId, name: Option<&str>) -> Result<()> {
        tree::set_widget_id(self, id, name.map(str::to_string))
    }

    /// Look up an attached node by its string id.
    pub fn get_by_id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// Enable or disable a node.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        tree::set_enabled(self, id, enabled)
    }

    /// Is the Root enabled?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the whole Root. Drivers are notified.
    pub fn set_root_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.enabled == enabled {
            return Ok(());
        }
        self.enabled = enabled;
        if let Some(c) = self.child {
            tree::update_active_state(self, c)?;
        }
        self.notify(if enabled {
            Notification::Enable
        } else {
            Notification::Disable
        });
        Ok(())
    }

    /// Run `f` on a widget of a known type.
    pub fn with_widget<W: Widget + 'static, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut W) -> R,
    ) -> Result<R> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        let widget = node
            .widget
            .as_deref_mut()
            .ok_or(Error::ReentrantWidgetBorrow(id))?;
        let any = widget as &mut dyn Any;
        let widget = any
            .downcast_mut::<W>()
            .ok_or_else(|| Error::Invalid(format!("expected widget type {}", type_name::<W>())))?;
        Ok(f(widget))
    }

    /// Mark a node's whole bounds for repaint.
    pub fn mark_dirty(&mut self, id: NodeId) {
        tree::mark_whole_as_dirty(self, id);
    }

    /// Request layout for a node.
    pub fn mark_layout_dirty(&mut self, id: NodeId) {
        tree::mark_layout_dirty(self, id);
    }

    /// Debug dump of the tree.
    pub fn dump(&self) -> Result<String> {
        dump::dump(self)
    }

    // Theme

    /// The theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Mutable access to the theme. Changes trigger a full relayout on the
    /// next pre-layout phase.
    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    // Viewports

    /// The surface-backed viewport the tree renders into.
    pub fn top_viewport(&self) -> ViewportId {
        self.top
    }

    /// A viewport.
    pub fn viewport(&self, vid: ViewportId) -> Option<&Viewport> {
        self.viewports.get(vid)
    }

    /// A viewport, or an error.
    fn viewport_mut(&mut self, vid: ViewportId) -> Result<&mut Viewport> {
        self.viewports
            .get_mut(vid)
            .ok_or(Error::ViewportNotFound(vid))
    }

    /// Set a viewport's child constraints.
    pub fn set_viewport_constraints(&mut self, vid: ViewportId, c: Constraints) -> Result<()> {
        let c = c.validated()?;
        self.viewport_mut(vid)?.set_constraints(c);
        Ok(())
    }

    /// Set the constraints of the whole tree.
    pub fn set_constraints(&mut self, c: Constraints) -> Result<()> {
        self.set_viewport_constraints(self.top, c)
    }

    /// Switch a clipped viewport between relative and absolute child
    /// coordinates. Surface-backed viewports are always relative.
    pub fn set_viewport_relative(&mut self, vid: ViewportId, relative: bool) -> Result<()> {
        let vp = self.viewport_mut(vid)?;
        if vp.is_surface_backed() && !relative {
            return Err(Error::Invalid(format!(
                "surface-backed viewport {vid:?} must use relative coordinates"
            )));
        }
        vp.set_relative_coordinates(relative);
        Ok(())
    }

    /// Set a viewport's per-frame layout retry budget.
    pub fn set_viewport_layout_retries(&mut self, vid: ViewportId, n: usize) -> Result<()> {
        self.viewport_mut(vid)?.set_layout_retries(n);
        Ok(())
    }

    /// Scroll a viewport's child. Returns `true` if the offset changed. The
    /// owner is marked dirty, so the new placement is recomposited.
    pub fn set_viewport_offset(&mut self, vid: ViewportId, offset: Point) -> Result<bool> {
        let vp = self.viewport_mut(vid)?;
        if !vp.set_offset(offset) {
            return Ok(false);
        }
        match vp.owner {
            Some(owner) => tree::mark_whole_as_dirty(self, owner),
            None => {
                if let Some(st) = vp.surface.as_mut() {
                    st.force_full = true;
                }
            }
        }
        Ok(true)
    }

    /// Change a surface-backed viewport's resolution and maximum size. The
    /// surface is resized on the next layout.
    pub fn configure_surface(
        &mut self,
        vid: ViewportId,
        resolution: f64,
        max_width: u32,
        max_height: u32,
    ) -> Result<()> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(Error::Invalid(format!("bad resolution {resolution}")));
        }
        if max_width == 0 || max_height == 0 {
            return Err(Error::Invalid(format!(
                "bad maximum surface size {max_width} x {max_height}"
            )));
        }
        let vp = self.viewport_mut(vid)?;
        let st = vp
            .surface
            .as_mut()
            .ok_or_else(|| Error::Invalid(format!("viewport {vid:?} has no surface")))?;
        st.configure(resolution, max_width, max_height);
        vp.force_relayout();
        Ok(())
    }

    /// Change the resolution of the Root's surface.
    pub fn set_resolution(&mut self, resolution: f64) -> Result<()> {
        let (w, h) = self.surface_state().map_or((0, 0), SurfaceState::max_size);
        self.configure_surface(self.top, resolution, w, h)
    }

    /// Raster state of the Root's surface.
    pub fn surface_state(&self) -> Option<&SurfaceState> {
        self.viewports.get(self.top)?.surface_state()
    }

    /// The Root's surface, for hosts to read after painting.
    pub fn surface(&self) -> Option<&dyn Surface> {
        self.surface_state()?.surface()
    }

    /// Pixel rectangles touched by the last paint.
    pub fn dirty_rects(&self) -> &[PixelRect] {
        self.surface_state().map_or(&[], SurfaceState::dirty_rects)
    }

    /// Repaint the whole Root surface on the next paint.
    pub fn request_full_repaint(&mut self) {
        if let Some(st) = self
            .viewports
            .get_mut(self.top)
            .and_then(|v| v.surface.as_mut())
        {
            st.force_full = true;
        }
    }

    // Frame phases

    /// Update drivers, pick up theme changes and run pre-layout hooks.
    pub fn pre_layout_update(&mut self) -> Result<()> {
        let _span = trace_span!("pre_layout_update").entered();
        for did in self.driver_ids() {
            self.with_driver(did, |d, root| d.update(root));
        }
        self.drain_notifications();
        if self.theme.generation() != self.theme_generation {
            self.theme_generation = self.theme.generation();
            debug!("theme changed, scheduling full relayout");
            for node in self.nodes.values_mut() {
                node.layout_dirty = true;
            }
            for vp in self.viewports.values_mut() {
                vp.force_relayout();
                if let Some(st) = vp.surface.as_mut() {
                    st.force_full = true;
                }
            }
        }
        if let Some(c) = self.child
            && self.nodes.get(c).is_some_and(|n| n.active)
        {
            tree::pre_layout_update(self, c)?;
        }
        Ok(())
    }

    /// Resolve layout. Returns whether the tree's rounded size changed.
    pub fn resolve_layout(&mut self) -> Result<bool> {
        let _span = trace_span!("resolve_layout").entered();
        viewport::resolve_layout(self, self.top)
    }

    /// Run post-layout hooks.
    pub fn post_layout_update(&mut self) -> Result<()> {
        let _span = trace_span!("post_layout_update").entered();
        if let Some(c) = self.child
            && self.nodes.get(c).is_some_and(|n| n.active)
        {
            tree::post_layout_update(self, c)?;
        }
        Ok(())
    }

    /// Repaint damaged regions of the Root's surface. Returns whether
    /// anything was painted; [`Root::dirty_rects`] lists what.
    pub fn paint(&mut self) -> Result<bool> {
        let _span = trace_span!("paint").entered();
        surface_viewport::paint_to_internal(self, self.top, false)
    }

    /// Run all four frame phases.
    pub fn frame(&mut self) -> Result<bool> {
        self.pre_layout_update()?;
        self.resolve_layout()?;
        self.post_layout_update()?;
        self.paint()
    }

    // Drivers

    /// Register a driver. It is enabled right away if the Root is.
    pub fn add_driver(&mut self, mut driver: Box<dyn Driver>) -> DriverId {
        let id = DriverId(self.next_id());
        if self.enabled {
            let was = mem::replace(&mut self.notifying, true);
            driver.on_enable(self);
            self.notifying = was;
        }
        self.drivers.push((id, Some(driver)));
        self.drain_notifications();
        id
    }

    /// Remove a driver. Returns `false`, with a warning, if it was unknown.
    pub fn remove_driver(&mut self, id: DriverId) -> bool {
        let Some(pos) = self.drivers.iter().position(|(d, _)| *d == id) else {
            warn!(?id, "removing unknown driver");
            return false;
        };
        let (_, slot) = self.drivers.remove(pos);
        if self.enabled
            && let Some(mut d) = slot
        {
            let was = mem::replace(&mut self.notifying, true);
            d.on_disable(self);
            self.notifying = was;
        }
        self.drain_notifications();
        true
    }

    /// Ids of registered drivers, in registration order.
    fn driver_ids(&self) -> Vec<DriverId> {
        self.drivers.iter().map(|(id, _)| *id).collect()
    }

    /// Run `f` with a driver taken out of its slot. Notifications raised
    /// meanwhile are queued.
    fn with_driver(&mut self, id: DriverId, f: impl FnOnce(&mut dyn Driver, &mut Self)) {
        let Some(mut d) = self
            .drivers
            .iter_mut()
            .find(|(i, _)| *i == id)
            .and_then(|(_, slot)| slot.take())
        else {
            return;
        };
        let was = mem::replace(&mut self.notifying, true);
        f(d.as_mut(), self);
        self.notifying = was;
        if let Some((_, slot)) = self.drivers.iter_mut().find(|(i, _)| *i == id) {
            *slot = Some(d);
        }
    }

    /// Notify every driver. Notifications raised while drivers are running
    /// are delivered after the current round, in order.
    fn notify(&mut self, n: Notification) {
        self.notifications.push_back(n);
        self.drain_notifications();
    }

    /// Deliver queued notifications, unless a driver is already running.
    fn drain_notifications(&mut self) {
        if self.notifying {
            return;
        }
        self.notifying = true;
        while let Some(n) = self.notifications.pop_front() {
            trace!(?n, "notifying drivers");
            for did in self.driver_ids() {
                self.with_driver(did, |d, root| n.deliver(d, root));
            }
        }
        self.notifying = false;
    }

    // Listeners

    /// Add a listener to a widget. Listeners run before the widget's own
    /// handler, in registration order.
    pub fn add_listener(
        &mut self,
        id: NodeId,
        f: impl FnMut(&mut EventCtx, &Event) -> bool + 'static,
    ) -> Result<ListenerId> {
        let lid = ListenerId(self.next_id());
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        node.listeners.push((lid, Box::new(f) as Listener));
        Ok(lid)
    }

    /// Remove a widget listener. Returns `false`, with a warning, if it was
    /// unknown.
    pub fn remove_listener(&mut self, id: NodeId, lid: ListenerId) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            warn!(?id, "removing listener from unknown node");
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|(l, _)| *l != lid);
        if node.listeners.len() == before {
            warn!(?id, ?lid, "removing unknown listener");
            return false;
        }
        true
    }

    /// Add a Root listener. Root listeners see every event first.
    pub fn add_root_listener(
        &mut self,
        f: impl FnMut(&mut Self, &Event) -> bool + 'static,
    ) -> ListenerId {
        let lid = ListenerId(self.next_id());
        self.listeners.push((lid, Box::new(f)));
        lid
    }

    /// Remove a Root listener. Returns `false`, with a warning, if it was
    /// unknown.
    pub fn remove_root_listener(&mut self, lid: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != lid);
        if self.listeners.len() == before {
            warn!(?lid, "removing unknown root listener");
            return false;
        }
        true
    }

    // Focus

    /// The widget holding a focus channel.
    pub fn focus(&self, ty: FocusType) -> Option<NodeId> {
        self.focus.focused(ty)
    }

    /// The last widget to capture an event of a channel's type.
    pub fn focus_capturer(&self, ty: FocusType) -> Option<NodeId> {
        self.focus.capturer(ty)
    }

    /// Offer a focus channel to a widget. The widget gets a targeted
    /// [`EventKind::Focus`] event and receives the channel only if it
    /// captures it; the previous holder is blurred. Keyboard and Tab focus
    /// are granted together. Returns whether the widget holds the channel.
    pub fn request_focus(&mut self, ty: FocusType, id: NodeId) -> Result<bool> {
        let granted = self.offer_focus(ty, id)?;
        self.flush_pending()?;
        Ok(granted)
    }

    /// [`Root::request_focus`] without flushing deferred operations.
    fn offer_focus(&mut self, ty: FocusType, id: NodeId) -> Result<bool> {
        let node = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
        if !node.active {
            return Ok(false);
        }
        if self.focus.focused(ty) == Some(id) {
            return Ok(true);
        }
        let ev = Event::targeted(EventKind::Focus(ty), id);
        let captured = dispatch::dispatch_to_node(self, id, &ev)?;
        if captured.is_none() || !self.nodes.get(id).is_some_and(|n| n.active) {
            return Ok(false);
        }
        self.grant_focus(ty, id)?;
        if let Some(p) = ty.partner()
            && self.focus.focused(p) != Some(id)
        {
            self.grant_focus(p, id)?;
        }
        Ok(true)
    }

    /// Hand a channel to `id`, blurring the previous holder.
    fn grant_focus(&mut self, ty: FocusType, id: NodeId) -> Result<()> {
        debug!(?ty, ?id, "focus granted");
        if let Some(old) = self.focus.set_focused(ty, Some(id))
            && old != id
        {
            if ty == FocusType::Pointer {
                self.dropped_foci.push(old);
            }
            dispatch::deliver_sticky(self, old, &Event::targeted(EventKind::Blur(ty), old))?;
        }
        self.notify(Notification::FocusChanged(ty, Some(id)));
        Ok(())
    }

    /// Empty a focus channel. The holder, if any, gets exactly one
    /// [`EventKind::Blur`]. The partner channel is left alone.
    pub fn clear_focus(&mut self, ty: FocusType) -> Result<()> {
        let Some(old) = self.focus.set_focused(ty, None) else {
            return Ok(());
        };
        debug!(?ty, ?old, "focus cleared");
        if ty == FocusType::Pointer {
            self.dropped_foci.push(old);
        }
        dispatch::deliver_sticky(self, old, &Event::targeted(EventKind::Blur(ty), old))?;
        self.notify(Notification::FocusChanged(ty, None));
        Ok(())
    }

    /// Empty a focus channel if `id` holds it. Returns whether it did.
    pub fn drop_focus(&mut self, ty: FocusType, id: NodeId) -> Result<bool> {
        if self.focus.focused(ty) != Some(id) {
            return Ok(false);
        }
        self.clear_focus(ty)?;
        Ok(true)
    }

    // Pointer styles

    /// Request a pointer style for `(widget, source)`. Returns whether the
    /// shown style changed.
    pub fn request_pointer_style(&mut self, widget: NodeId, source: u32, style: &str) -> bool {
        self.pointer_styles.request(widget, source, style)
    }

    /// Clear the pointer style for `(widget, source)`.
    pub fn clear_pointer_style(&mut self, widget: NodeId, source: u32) -> bool {
        self.pointer_styles.clear(widget, source)
    }

    /// Clear every pointer style requested by a widget.
    pub fn clear_pointer_styles_from_widget(&mut self, widget: NodeId) -> bool {
        self.pointer_styles.clear_widget(widget)
    }

    /// The pointer style currently shown.
    pub fn pointer_style(&self) -> &'static str {
        self.pointer_styles.current()
    }

    /// Install the callback invoked when the shown pointer style changes.
    pub fn set_pointer_style_handler(&mut self, handler: impl FnMut(&str) + 'static) {
        self.pointer_styles
            .set_handler(Box::new(handler) as StyleHandler);
    }

    // Dispatch

    /// Dispatch an event into the tree.
    ///
    /// Returns every event dispatched as a consequence, in order: the base
    /// event (after retargeting), tab selection searches, leave events for
    /// widgets that lost pointer focus, a follow-up pointer move, and leave
    /// events for widgets no longer hovered.
    pub fn dispatch_event(&mut self, event: Event) -> Result<CaptureList> {
        let _span = trace_span!("dispatch_event").entered();
        let before = self.focus.capturers();
        let mut out = CaptureList::new();
        let result = self.dispatch_root_event(event, &mut out);
        let after = self.focus.capturers();
        for (i, ty) in FocusType::ALL.into_iter().enumerate() {
            if before[i] != after[i] {
                self.notify(Notification::CapturerChanged(ty, before[i], after[i]));
            }
        }
        result?;
        Ok(out)
    }

    /// Is the tree still in place after user code ran?
    fn tree_intact(&self) -> bool {
        self.child
            .and_then(|c| self.nodes.get(c))
            .is_some_and(|n| n.attached)
    }

    /// The body of [`Root::dispatch_event`].
    fn dispatch_root_event(&mut self, event: Event, out: &mut CaptureList) -> Result<()> {
        if dispatch::run_root_listeners(self, &event)? {
            out.push(Capture {
                event,
                capturer: Some(Capturer::Root),
            });
            return Ok(());
        }

        if event.propagation() != Propagation::Trickling {
            if matches!(event.kind, EventKind::LeaveRoot) {
                out.push(Capture::new(event, None));
                let mut prev = mem::take(&mut self.hovered_prev);
                for &id in &prev {
                    self.send_leave(id, out)?;
                }
                prev.clear();
                self.hovered_prev = prev;
                return Ok(());
            }
            let captured = match event.target {
                Some(t) => dispatch::dispatch_to_node(self, t, &event)?,
                None => None,
            };
            out.push(Capture::new(event, captured));
            return self.flush_pending();
        }

        let mut event = event;
        if event.target.is_none()
            && event.follows_focus()
            && let Some(ty) = event.focus_type()
        {
            match self.focus.focused(ty) {
                Some(f) => event.target = Some(f),
                None if event.needs_focus() => {
                    if let EventKind::KeyPress(k) = &event.kind
                        && k.is_hardware_tab()
                    {
                        let reversed = k.mods.shift;
                        out.push(Capture::new(event, None));
                        let anchor = self.focus.capturer(FocusType::Tab);
                        self.tab_select(anchor, reversed, out)?;
                        return self.reconcile(None, out);
                    }
                    trace!("no focused widget, dropping event");
                    return Ok(());
                }
                None => {}
            }
        }

        if event.is_positional() {
            self.hovered.clear();
        }
        let captured = self.dispatch_tree(&event)?;
        out.push(Capture::new(event.clone(), captured));
        if !self.tree_intact() {
            self.hovered.clear();
            return Ok(());
        }

        if captured.is_none() {
            match &event.kind {
                EventKind::KeyPress(k) if k.is_hardware_tab() => {
                    self.tab_select(event.target, k.mods.shift, out)?;
                }
                EventKind::KeyPress(k) if k.code == KeyCode::Escape => {
                    self.clear_focus(FocusType::Keyboard)?;
                }
                _ => {}
            }
        }
        if matches!(event.kind, EventKind::TabSelect(_)) {
            self.finish_tab_select(&event, captured, out)?;
        }
        self.reconcile(Some(&event), out)
    }

    /// Dispatch a trickling event from the top viewport, then apply deferred
    /// operations and record the channel's capturer.
    fn dispatch_tree(&mut self, event: &Event) -> Result<Option<NodeId>> {
        let captured = viewport::dispatch_trickling_event(self, self.top, event)?;
        trace!(kind = ?event.kind, ?captured, "tree dispatch");
        if let (Some(ty), Some(w)) = (event.focus_type(), captured) {
            self.focus.set_capturer(ty, Some(w));
        }
        self.flush_pending()?;
        Ok(captured)
    }

    /// Run a tab selection search and grant Tab focus to the result.
    fn tab_select(
        &mut self,
        relative_to: Option<NodeId>,
        reversed: bool,
        out: &mut CaptureList,
    ) -> Result<()> {
        let ev = Event::tab_select(relative_to, reversed);
        let captured = self.dispatch_tree(&ev)?;
        out.push(Capture::new(ev.clone(), captured));
        self.finish_tab_select(&ev, captured, out)
    }

    /// Follow up on a dispatched tab selection: retry once from the start if
    /// the anchor was never found, and grant Tab focus to whoever captured.
    fn finish_tab_select(
        &mut self,
        ev: &Event,
        captured: Option<NodeId>,
        out: &mut CaptureList,
    ) -> Result<()> {
        let EventKind::TabSelect(ts) = &ev.kind else {
            return Ok(());
        };
        if !self.tree_intact() {
            return Ok(());
        }
        let captured = match captured {
            Some(w) => {
                if !ts.reached() {
                    warn!(?w, "widget captured a tab selection before its anchor");
                }
                Some(w)
            }
            None if ts.relative_to.is_some() && !ts.reached() => {
                debug!(anchor = ?ts.relative_to, "tab anchor not found, retrying from the start");
                let retry = Event::tab_select(None, ts.reversed);
                let c = self.dispatch_tree(&retry)?;
                out.push(Capture::new(retry, c));
                c
            }
            None => None,
        };
        if let Some(w) = captured
            && self.tree_intact()
        {
            self.request_focus(FocusType::Tab, w)?;
        }
        Ok(())
    }

    /// Send leave events for dropped pointer foci and, for positional events,
    /// reconcile the hover sets.
    fn reconcile(&mut self, event: Option<&Event>, out: &mut CaptureList) -> Result<()> {
        let positional = event.and_then(Event::as_move);

        let dropped = mem::take(&mut self.dropped_foci);
        let mut left = Vec::with_capacity(dropped.len());
        for id in &dropped {
            if self.send_leave(*id, out)? {
                left.push(*id);
            }
        }
        if !dropped.is_empty()
            && let Some(mv) = positional.as_ref()
            && self.tree_intact()
        {
            self.hovered.clear();
            let c = self.dispatch_tree(mv)?;
            out.push(Capture::new(mv.clone(), c));
        }

        if positional.is_some() {
            let mut prev = mem::take(&mut self.hovered_prev);
            for &id in &prev {
                if !self.hovered.contains(&id) && !left.contains(&id) {
                    self.send_leave(id, out)?;
                }
            }
            prev.clear();
            self.hovered_prev = mem::replace(&mut self.hovered, prev);
        }
        Ok(())
    }

    /// Send a leave event to an active widget. Returns whether it was sent.
    fn send_leave(&mut self, id: NodeId, out: &mut CaptureList) -> Result<bool> {
        if !self.nodes.get(id).is_some_and(|n| n.active) {
            return Ok(false);
        }
        let ev = Event::targeted(EventKind::Leave, id);
        let c = dispatch::dispatch_to_node(self, id, &ev)?;
        out.push(Capture::new(ev, c));
        Ok(true)
    }

    /// Apply deferred widget requests until none are left.
    fn flush_pending(&mut self) -> Result<()> {
        let mut rounds = 0;
        while !self.pending.is_empty() {
            if rounds == MAX_PENDING_ROUNDS {
                warn!("deferred operations did not settle, dropping the rest");
                self.pending.clear();
                break;
            }
            rounds += 1;
            for op in mem::take(&mut self.pending) {
                match op {
                    PendingOp::Focus(ty, id) => {
                        if self.nodes.contains_key(id) {
                            self.offer_focus(ty, id)?;
                        }
                    }
                    PendingOp::Release(ty, id) => {
                        self.drop_focus(ty, id)?;
                    }
                    PendingOp::Bubble(from, kind) => {
                        let ev = Event::new(kind);
                        match self.nodes.get(from).map(|n| n.parent) {
                            Some(Some(p)) => {
                                dispatch::dispatch_to_node(self, p, &ev)?;
                            }
                            Some(None) if self.child == Some(from) => {
                                dispatch::run_root_listeners(self, &ev)?;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
