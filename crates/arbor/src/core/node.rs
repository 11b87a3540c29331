use crate::{
    core::{
        context::EventCtx,
        event::Event,
        id::{ListenerId, NodeId, ViewportId},
        layout::Constraints,
    },
    geom::Rect,
    widget::Widget,
};

/// A listener on a widget. Returning `true` captures the event before the
/// widget's own handler sees it.
pub type Listener = Box<dyn FnMut(&mut EventCtx, &Event) -> bool>;

/// Core node data stored in the arena.
pub struct Node {
    /// Widget behavior and state. `None` while a hook is running.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Widget type name, cached for diagnostics while the widget is out.
    pub(crate) name: String,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree.
    pub(crate) children: Vec<NodeId>,
    /// Nearest enclosing viewport. Set on attach.
    pub(crate) viewport: Option<ViewportId>,
    /// Nested viewport owned by this widget. Children live in its space.
    pub(crate) owned_viewport: Option<ViewportId>,

    /// Part of the Root's tree.
    pub(crate) attached: bool,
    /// Local opt-out.
    pub(crate) enabled: bool,
    /// Derived: enabled, attached, parent active (or Root enabled at the top).
    pub(crate) active: bool,
    /// Needs dimension and position resolution.
    pub(crate) layout_dirty: bool,

    /// Unrounded layout-phase geometry in viewport space.
    pub(crate) ideal: Rect,
    /// Geometry rounded to the viewport's effective scale.
    pub(crate) bounds: Rect,
    /// Constraints of the last dimension resolution.
    pub(crate) last_constraints: Option<Constraints>,

    /// Unique string id registered with the Root.
    pub(crate) id: Option<String>,
    /// User listeners, run before the widget's handler.
    pub(crate) listeners: Vec<(ListenerId, Listener)>,
}

impl Node {
    /// Construct a detached node around a widget.
    pub(crate) fn new(widget: Box<dyn Widget>) -> Self {
        let name = widget.name();
        Self {
            widget: Some(widget),
            name,
            parent: None,
            children: Vec::new(),
            viewport: None,
            owned_viewport: None,
            attached: false,
            enabled: true,
            active: false,
            layout_dirty: true,
            ideal: Rect::zero(),
            bounds: Rect::zero(),
            last_constraints: None,
            id: None,
            listeners: Vec::new(),
        }
    }

    /// Return the node's widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The enclosing viewport.
    pub fn viewport(&self) -> Option<ViewportId> {
        self.viewport
    }

    /// The nested viewport this widget owns, if any.
    pub fn owned_viewport(&self) -> Option<ViewportId> {
        self.owned_viewport
    }

    /// Is the node part of the Root's tree?
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Is the node locally enabled?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Is the node active?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Does the node need layout?
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// Unrounded geometry.
    pub fn ideal(&self) -> Rect {
        self.ideal
    }

    /// Rounded geometry, used for painting and hit-testing.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The registered string id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
