//! Tree structure and the per-widget layout protocol.
//!
//! Everything here operates on the Root's arena. Widgets are taken out of
//! their slot while a hook runs, so the hook can be handed a context with
//! mutable access to the rest of the tree.

use std::collections::HashSet;

use tracing::{error, trace};

use crate::{
    Root,
    core::{
        context::{LayoutCtx, UpdateCtx},
        error::{Error, Result},
        id::{NodeId, ViewportId},
        layout::Constraints,
        viewport,
    },
    geom::{Point, Rect, Scale, Size},
    widget::Widget,
};

/// Run `f` with the widget taken out of its slot.
pub(crate) fn with_widget<R>(
    root: &mut Root,
    id: NodeId,
    f: impl FnOnce(&mut dyn Widget, &mut Root) -> R,
) -> Result<R> {
    let node = root.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    let mut widget = node.widget.take().ok_or(Error::ReentrantWidgetBorrow(id))?;
    let out = f(widget.as_mut(), root);
    if let Some(node) = root.nodes.get_mut(id)
        && node.widget.is_none()
    {
        node.widget = Some(widget);
    }
    Ok(out)
}

/// Like [`with_widget`], but skips the call if the widget is already in use
/// further up the stack.
fn try_with_widget<R>(
    root: &mut Root,
    id: NodeId,
    f: impl FnOnce(&mut dyn Widget, &mut Root) -> R,
) -> Result<Option<R>> {
    match root.nodes.get(id) {
        None => Err(Error::NodeNotFound(id)),
        Some(n) if n.widget.is_none() => {
            trace!(?id, "widget in use, skipping hook");
            Ok(None)
        }
        Some(_) => with_widget(root, id, f).map(Some),
    }
}

/// Is `ancestor` equal to `node` or one of its ancestors?
pub(crate) fn is_ancestor_or_self(root: &Root, ancestor: NodeId, node: NodeId) -> bool {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if id == ancestor {
            return true;
        }
        cur = root.nodes.get(id).and_then(|n| n.parent);
    }
    false
}

/// All nodes in the subtree at `id`, in pre-order.
pub(crate) fn subtree(root: &Root, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(n) = stack.pop() {
        if let Some(node) = root.nodes.get(n) {
            out.push(n);
            stack.extend(node.children.iter().rev());
        }
    }
    out
}

/// Flag a node and all of its ancestors as needing layout.
pub(crate) fn mark_layout_dirty(root: &mut Root, id: NodeId) {
    let mut cur = Some(id);
    while let Some(n) = cur {
        let Some(node) = root.nodes.get_mut(n) else {
            return;
        };
        node.layout_dirty = true;
        cur = node.parent;
    }
}

/// Link `child` under `parent`, or make it the Root's child when `parent` is
/// `None`. Attaches the subtree if the parent is attached.
pub(crate) fn link(
    root: &mut Root,
    parent: Option<NodeId>,
    child: NodeId,
    index: Option<usize>,
) -> Result<()> {
    let node = root.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
    if node.attached || node.parent.is_some() || root.child == Some(child) {
        return Err(Error::AlreadyAttached(child));
    }
    let (attach_to, parent_attached) = match parent {
        Some(p) => {
            let pn = root.nodes.get(p).ok_or(Error::NodeNotFound(p))?;
            if is_ancestor_or_self(root, child, p) {
                return Err(Error::WouldCreateCycle { parent: p, child });
            }
            (pn.owned_viewport.or(pn.viewport), pn.attached)
        }
        None => {
            if root.child.is_some() {
                return Err(Error::Invalid("root already has a child".into()));
            }
            (Some(root.top), true)
        }
    };
    if parent_attached {
        check_ids(root, child)?;
    }

    match parent {
        Some(p) => {
            let children = &mut root.nodes[p].children;
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, child);
        }
        None => root.child = Some(child),
    }
    root.nodes[child].parent = parent;
    if parent_attached && let Some(vid) = attach_to {
        attach_subtree(root, child, vid);
    }
    mark_layout_dirty(root, child);
    update_active_state(root, child)
}

/// Reject the link if any id in the subtree is already registered.
fn check_ids(root: &Root, child: NodeId) -> Result<()> {
    let mut seen = HashSet::new();
    for n in subtree(root, child) {
        if let Some(id) = root.nodes[n].id.as_ref()
            && (root.ids.contains_key(id) || !seen.insert(id))
        {
            return Err(Error::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

/// Mark a subtree attached within viewport `vid`.
fn attach_subtree(root: &mut Root, id: NodeId, vid: ViewportId) {
    let Some(node) = root.nodes.get_mut(id) else {
        return;
    };
    node.attached = true;
    node.viewport = Some(vid);
    node.layout_dirty = true;
    node.last_constraints = None;
    if let Some(s) = node.id.clone() {
        root.ids.insert(s, id);
    }
    let inner = node.owned_viewport;
    let children = node.children.clone();
    if let Some(ov) = inner
        && let Some(vp) = root.viewports.get_mut(ov)
    {
        vp.parent = Some(vid);
        vp.force_relayout = true;
        if let Some(st) = vp.surface.as_mut() {
            st.force_full = true;
            st.force_resize = true;
        }
    }
    let next = inner.unwrap_or(vid);
    for c in children {
        attach_subtree(root, c, next);
    }
}

/// Unlink a node from its parent or from the Root, detaching its subtree.
pub(crate) fn unlink(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    let parent = node.parent;
    if parent.is_none() && root.child != Some(id) {
        return Err(Error::NotAttached(id));
    }
    mark_whole_as_dirty(root, id);
    match parent {
        Some(p) => {
            if let Some(pn) = root.nodes.get_mut(p) {
                pn.children.retain(|c| *c != id);
            }
            mark_layout_dirty(root, p);
        }
        None => root.child = None,
    }
    root.nodes[id].parent = None;
    for n in subtree(root, id) {
        let node = &mut root.nodes[n];
        node.attached = false;
        node.viewport = None;
        if let Some(s) = node.id.as_ref()
            && root.ids.get(s) == Some(&n)
        {
            root.ids.remove(s);
        }
        if let Some(ov) = node.owned_viewport
            && let Some(vp) = root.viewports.get_mut(ov)
        {
            vp.parent = None;
        }
    }
    update_active_state(root, id)
}

/// Remove a subtree from the arena, unlinking it first if needed.
pub(crate) fn destroy(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if node.parent.is_some() || root.child == Some(id) {
        unlink(root, id)?;
    }
    for n in subtree(root, id) {
        root.focus.forget_capturer(n);
        if let Some(node) = root.nodes.remove(n)
            && let Some(ov) = node.owned_viewport
        {
            root.viewports.remove(ov);
        }
    }
    Ok(())
}

/// Change a node's registered id.
pub(crate) fn set_widget_id(root: &mut Root, id: NodeId, new: Option<String>) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if node.id == new {
        return Ok(());
    }
    if node.attached {
        if let Some(s) = new.as_ref()
            && root.ids.contains_key(s)
        {
            return Err(Error::DuplicateId(s.clone()));
        }
        if let Some(old) = node.id.clone() {
            root.ids.remove(&old);
        }
        if let Some(s) = new.clone() {
            root.ids.insert(s, id);
        }
    }
    root.nodes[id].id = new;
    Ok(())
}

/// Toggle a node's local enabled flag.
pub(crate) fn set_enabled(root: &mut Root, id: NodeId, enabled: bool) -> Result<()> {
    let node = root.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    if node.enabled == enabled {
        return Ok(());
    }
    node.enabled = enabled;
    mark_layout_dirty(root, id);
    update_active_state(root, id)
}

/// Recompute a node's activity. Children are only visited when this node's
/// state actually changed.
pub(crate) fn update_active_state(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    let parent_active = match node.parent {
        Some(p) => root.nodes.get(p).is_some_and(|n| n.active),
        None => root.enabled && root.child == Some(id),
    };
    let active = node.enabled && node.attached && parent_active;
    if active == node.active {
        return Ok(());
    }
    if active {
        root.nodes[id].active = true;
        mark_layout_dirty(root, id);
        try_with_widget(root, id, |w, root| w.activate(&mut UpdateCtx::new(root, id)))?;
        mark_whole_as_dirty(root, id);
    } else {
        mark_whole_as_dirty(root, id);
        root.nodes[id].active = false;
        release(root, id)?;
        try_with_widget(root, id, |w, root| w.deactivate(&mut UpdateCtx::new(root, id)))?;
    }
    let children = root.nodes.get(id).map(|n| n.children.clone()).unwrap_or_default();
    for c in children {
        update_active_state(root, c)?;
    }
    Ok(())
}

/// Drop every focus, pointer style and hover claim held by a node.
fn release(root: &mut Root, id: NodeId) -> Result<()> {
    for ty in root.focus.channels_of(id) {
        root.clear_focus(ty)?;
    }
    root.clear_pointer_styles_from_widget(id);
    root.hovered.retain(|n| *n != id);
    root.hovered_prev.retain(|n| *n != id);
    Ok(())
}

/// Mark a rectangle of a node dirty. No-op if the node is inactive.
pub(crate) fn mark_as_dirty(root: &mut Root, id: NodeId, r: Rect) {
    if root.nodes.get(id).is_some_and(|n| n.active) {
        propagate_dirty_rect(root, id, r);
    }
}

/// Mark a node's whole rounded bounds dirty.
pub(crate) fn mark_whole_as_dirty(root: &mut Root, id: NodeId) {
    if let Some(b) = root.nodes.get(id).map(|n| n.bounds) {
        mark_as_dirty(root, id, b);
    }
}

/// Carry a dirty rectangle up the tree.
///
/// Each nested viewport on the way transforms the rectangle into its
/// enclosing space and clips it to its rect; if nothing is left, propagation
/// stops. Surface-backed viewports also queue the rectangle for their own
/// repaint.
pub(crate) fn propagate_dirty_rect(root: &mut Root, id: NodeId, r: Rect) {
    if r.is_empty() {
        return;
    }
    let mut cur = id;
    let mut r = r;
    loop {
        let Some(node) = root.nodes.get(cur) else {
            return;
        };
        let Some(p) = node.parent else {
            if root.child == Some(cur)
                && let Some(st) = root.viewports.get_mut(root.top).and_then(|v| v.surface.as_mut())
            {
                st.mark_dirty_rect(r);
            }
            return;
        };
        if let Some(vid) = root.nodes.get(p).and_then(|n| n.owned_viewport)
            && let Some(vp) = root.viewports.get_mut(vid)
        {
            if let Some(st) = vp.surface.as_mut() {
                st.mark_dirty_rect(r);
            }
            match vp.child_to_parent(r) {
                Some(pr) => r = pr,
                None => return,
            }
        }
        cur = p;
    }
}

/// Run pre-layout hooks over a subtree.
pub(crate) fn pre_layout_update(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if !node.enabled {
        return Ok(());
    }
    let dirty = with_widget(root, id, |w, root| w.pre_layout(&mut UpdateCtx::new(root, id)))?;
    if dirty {
        mark_layout_dirty(root, id);
    }
    let children = root.nodes.get(id).map(|n| n.children.clone()).unwrap_or_default();
    for c in children {
        pre_layout_update(root, c)?;
    }
    Ok(())
}

/// Run post-layout hooks over a subtree.
pub(crate) fn post_layout_update(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if !node.enabled {
        return Ok(());
    }
    with_widget(root, id, |w, root| w.post_layout(&mut UpdateCtx::new(root, id)))?;
    let children = root.nodes.get(id).map(|n| n.children.clone()).unwrap_or_default();
    for c in children {
        post_layout_update(root, c)?;
    }
    Ok(())
}

/// Resolve a node's ideal dimensions against constraints.
///
/// Constraints are validated first. The sizing hook's result is clamped into
/// the constraints, with an error logged if it had to be. A disabled node is
/// forced to zero size. The layout-dirty flag is cleared in every case.
pub(crate) fn resolve_dimensions(root: &mut Root, id: NodeId, c: Constraints) -> Result<Size> {
    let c = c.validated()?;
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    if !node.layout_dirty && node.last_constraints == Some(c) {
        return Ok(node.ideal.size());
    }
    let old = node.ideal.size();
    let size = if node.enabled {
        let got = with_widget(root, id, |w, root| {
            w.resolve_dimensions(&mut LayoutCtx::new(root, id), c)
        })??;
        let got = Size::finite(got.w, got.h)?;
        if c.contains(got) {
            got
        } else {
            let name = root.nodes.get(id).map_or("", |n| n.name.as_str());
            error!(
                ?id,
                "{name} sized itself {} x {} outside {:?}, clamping", got.w, got.h, c
            );
            c.clamp(got)
        }
    } else {
        Size::zero()
    };
    if size != old {
        mark_whole_as_dirty(root, id);
    }
    let node = root.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    node.ideal.w = size.w;
    node.ideal.h = size.h;
    node.layout_dirty = false;
    node.last_constraints = Some(c);
    Ok(size)
}

/// Resolve dimensions at the top of a tree. If either axis is unbounded, a
/// second pass runs with the first result as the bound on that axis, so
/// children distributing space get a finite reference size.
pub(crate) fn resolve_dimensions_as_top(
    root: &mut Root,
    id: NodeId,
    c: Constraints,
) -> Result<Size> {
    let first = resolve_dimensions(root, id, c)?;
    if !c.is_unbounded() {
        return Ok(first);
    }
    let bounded = Constraints::new(
        c.min_w,
        if c.max_w.is_infinite() { first.w } else { c.max_w },
        c.min_h,
        if c.max_h.is_infinite() { first.h } else { c.max_h },
    );
    if let Some(n) = root.nodes.get_mut(id) {
        n.layout_dirty = true;
    }
    resolve_dimensions(root, id, bounded)
}

/// Assign a node's ideal position and let it position its children.
pub(crate) fn resolve_position(root: &mut Root, id: NodeId, p: Point) -> Result<()> {
    let node = root.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    node.ideal.x = p.x;
    node.ideal.y = p.y;
    if !node.enabled {
        return Ok(());
    }
    with_widget(root, id, |w, root| {
        w.resolve_position(&mut LayoutCtx::new(root, id), p)
    })?
}

/// Round a subtree's ideal geometry to whole pixels at its viewport's
/// effective scale. Nested viewports are placed and laid out on the way.
pub(crate) fn finalize_bounds(root: &mut Root, id: NodeId) -> Result<()> {
    let node = root.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
    let scale = node
        .viewport
        .and_then(|v| root.viewports.get(v))
        .map_or(Scale::UNIT, |v| v.effective_scale);
    let rounded = node.ideal.round_out(scale);
    if rounded != node.bounds {
        mark_whole_as_dirty(root, id);
        root.nodes[id].bounds = rounded;
        mark_whole_as_dirty(root, id);
    }
    let node = &root.nodes[id];
    match node.owned_viewport {
        Some(vid) => {
            if let Some(vp) = root.viewports.get_mut(vid) {
                vp.set_rect(rounded);
            }
            viewport::resolve_layout(root, vid)?;
        }
        None => {
            for c in node.children.clone() {
                finalize_bounds(root, c)?;
            }
        }
    }
    Ok(())
}
