//! Widget-level event dispatch.
//!
//! Trickling events walk down from a viewport's child toward their target,
//! bubbling events walk up from a widget toward the Root, and sticky events
//! go straight to one widget. Every function here re-checks that the node it
//! is working on is still active after running user code, and gives up if it
//! is not.

use std::mem;

use tracing::trace;

use crate::{
    Root,
    core::{
        context::EventCtx,
        error::Result,
        event::{Event, EventKind, Propagation, TabSelect},
        id::NodeId,
        tree, viewport,
    },
};

/// Is the node present and active?
fn is_active(root: &Root, id: NodeId) -> bool {
    root.nodes.get(id).is_some_and(|n| n.active)
}

/// Dispatch an event to a widget. Returns the widget that captured it.
///
/// Inactive (disabled or detached) widgets drop every event.
pub(crate) fn dispatch_to_node(
    root: &mut Root,
    id: NodeId,
    event: &Event,
) -> Result<Option<NodeId>> {
    if !is_active(root, id) {
        return Ok(None);
    }
    match event.propagation() {
        Propagation::Trickling => trickle(root, id, event),
        Propagation::Bubbling => bubble(root, id, event),
        Propagation::Sticky => {
            if run_listeners(root, id, event)? {
                return Ok(Some(id));
            }
            call_handler(root, id, event)
        }
    }
}

/// Deliver a sticky event to a node even if it is inactive. Blur uses this,
/// since it must reach widgets that are being deactivated. A widget whose
/// hook is already running only sees the event through its listeners.
pub(crate) fn deliver_sticky(root: &mut Root, id: NodeId, event: &Event) -> Result<Option<NodeId>> {
    if !root.nodes.contains_key(id) {
        return Ok(None);
    }
    if run_listeners(root, id, event)? {
        return Ok(Some(id));
    }
    if root.nodes.get(id).is_none_or(|n| n.widget.is_none()) {
        trace!(?id, "widget in use, event seen by listeners only");
        return Ok(None);
    }
    call_handler(root, id, event)
}

/// Trickling dispatch at one node.
fn trickle(root: &mut Root, id: NodeId, event: &Event) -> Result<Option<NodeId>> {
    let bounds = root.nodes[id].bounds;
    if let Some(t) = event.target {
        if !tree::is_ancestor_or_self(root, id, t) {
            return Ok(None);
        }
    } else if let Some(p) = event.location()
        && !bounds.contains(p)
    {
        return Ok(None);
    }
    if event.is_positional() && !root.hovered.contains(&id) {
        root.hovered.push(id);
    }

    if run_listeners(root, id, event)? {
        return Ok(Some(id));
    }
    if !is_active(root, id) {
        return Ok(None);
    }

    if let EventKind::TabSelect(ts) = &event.kind {
        if ts.reversed {
            if let Some(c) = call_handler(root, id, event)? {
                return Ok(Some(c));
            }
            return Ok(tab_check(root, id, ts));
        }
        if let Some(c) = tab_check(root, id, ts) {
            return Ok(Some(c));
        }
    }
    call_handler(root, id, event)
}

/// The tab-selection self check: note the relative anchor, or capture if the
/// anchor was already passed and the widget takes tab focus.
fn tab_check(root: &Root, id: NodeId, ts: &TabSelect) -> Option<NodeId> {
    if ts.relative_to == Some(id) {
        ts.mark_reached();
        return None;
    }
    let accepts = root
        .nodes
        .get(id)
        .and_then(|n| n.widget.as_ref())
        .is_some_and(|w| w.accepts_tab_focus());
    (ts.reached() && accepts).then_some(id)
}

/// Bubbling dispatch from `id` upwards. Each widget gets its listeners and
/// handler; the Root's listeners see the event last.
fn bubble(root: &mut Root, id: NodeId, event: &Event) -> Result<Option<NodeId>> {
    let mut cur = id;
    let mut ev = event.clone();
    loop {
        if !is_active(root, cur) {
            return Ok(None);
        }
        if run_listeners(root, cur, &ev)? {
            return Ok(Some(cur));
        }
        if let Some(c) = call_handler(root, cur, &ev)? {
            return Ok(Some(c));
        }
        let Some(node) = root.nodes.get(cur) else {
            return Ok(None);
        };
        if let Some(vid) = node.owned_viewport
            && let Some(vp) = root.viewports.get(vid)
            && let EventKind::AutoScroll(r) = &mut ev.kind
        {
            let o = vp.child_origin();
            *r = r.translate(o.x, o.y);
        }
        match node.parent {
            Some(p) => cur = p,
            None => {
                run_root_listeners(root, &ev)?;
                return Ok(None);
            }
        }
    }
}

/// Forward a trickling event to a node's children.
pub(crate) fn dispatch_to_children(
    root: &mut Root,
    id: NodeId,
    event: &Event,
) -> Result<Option<NodeId>> {
    if event.propagation() != Propagation::Trickling {
        return Ok(None);
    }
    let Some(node) = root.nodes.get(id) else {
        return Ok(None);
    };
    if let Some(vid) = node.owned_viewport {
        return viewport::dispatch_trickling_event(root, vid, event);
    }
    let mut children = node.children.clone();
    if event.is_reversed() {
        children.reverse();
    }
    for c in children {
        if let Some(captured) = dispatch_to_node(root, c, event)? {
            return Ok(Some(captured));
        }
        if !is_active(root, id) {
            break;
        }
    }
    Ok(None)
}

/// Run a widget's event handler.
fn call_handler(root: &mut Root, id: NodeId, event: &Event) -> Result<Option<NodeId>> {
    if !root.nodes.contains_key(id) {
        return Ok(None);
    }
    tree::with_widget(root, id, |w, root| {
        w.handle_event(&mut EventCtx::new(root, id), event)
    })?
}

/// Run a widget's listeners. Returns `true` if one captured the event.
fn run_listeners(root: &mut Root, id: NodeId, event: &Event) -> Result<bool> {
    let Some(node) = root.nodes.get_mut(id) else {
        return Ok(false);
    };
    if node.listeners.is_empty() {
        return Ok(false);
    }
    let mut listeners = mem::take(&mut node.listeners);
    let mut captured = false;
    for (lid, l) in &mut listeners {
        if l(&mut EventCtx::new(root, id), event) {
            trace!(?id, ?lid, "listener captured event");
            captured = true;
            break;
        }
        if !is_active(root, id) {
            break;
        }
    }
    if let Some(node) = root.nodes.get_mut(id) {
        listeners.append(&mut node.listeners);
        node.listeners = listeners;
    }
    Ok(captured)
}

/// Run the Root's listeners. Returns `true` if one captured the event.
pub(crate) fn run_root_listeners(root: &mut Root, event: &Event) -> Result<bool> {
    if root.listeners.is_empty() {
        return Ok(false);
    }
    let mut listeners = mem::take(&mut root.listeners);
    let mut captured = false;
    for (lid, l) in &mut listeners {
        if l(root, event) {
            trace!(?lid, "root listener captured event");
            captured = true;
            break;
        }
    }
    listeners.append(&mut root.listeners);
    root.listeners = listeners;
    Ok(captured)
}
