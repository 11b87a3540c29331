//! Pointer style arbitration.
//!
//! Many widgets may ask for a pointer style at once. Requests are kept in a
//! list ordered by a fixed priority table; only the head of the list is shown.
//! The style handler runs only when the head changes, so the number of handler
//! invocations does not depend on how many low-priority requests are queued.

use tracing::warn;

use crate::core::id::NodeId;

/// Allowed pointer styles, highest priority first.
pub const STYLE_PRIORITY: &[&str] = &[
    "none",
    "not-allowed",
    "wait",
    "progress",
    "grabbing",
    "col-resize",
    "row-resize",
    "ew-resize",
    "ns-resize",
    "nesw-resize",
    "nwse-resize",
    "n-resize",
    "e-resize",
    "s-resize",
    "w-resize",
    "ne-resize",
    "nw-resize",
    "se-resize",
    "sw-resize",
    "move",
    "all-scroll",
    "zoom-in",
    "zoom-out",
    "copy",
    "alias",
    "no-drop",
    "grab",
    "crosshair",
    "cell",
    "vertical-text",
    "text",
    "context-menu",
    "help",
    "pointer",
    "default",
];

/// The style shown when nothing is requested.
pub const DEFAULT_STYLE: &str = "default";

/// Priority of a style, lower is higher priority. `None` if not allowed.
pub fn priority(style: &str) -> Option<usize> {
    STYLE_PRIORITY.iter().position(|s| *s == style)
}

/// One pointer style request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRequest {
    /// Requested style.
    pub style: &'static str,
    /// Requesting widget.
    pub widget: NodeId,
    /// Source key within the widget, for widgets that request several styles.
    pub source: u32,
}

/// Callback invoked with the new head style.
pub type StyleHandler = Box<dyn FnMut(&str)>;

/// Ordered pointer style requests.
#[derive(Default)]
pub struct PointerStyles {
    /// Requests, highest priority first.
    requests: Vec<StyleRequest>,
    /// Invoked when the head changes.
    handler: Option<StyleHandler>,
}

impl PointerStyles {
    /// The style currently shown.
    pub fn current(&self) -> &'static str {
        self.requests.first().map_or(DEFAULT_STYLE, |r| r.style)
    }

    /// All queued requests, highest priority first.
    pub fn requests(&self) -> &[StyleRequest] {
        &self.requests
    }

    /// Install the handler.
    pub fn set_handler(&mut self, handler: StyleHandler) {
        self.handler = Some(handler);
    }

    /// Request a style for `(widget, source)`. Any previous request from the
    /// same pair is replaced. Returns `true` if the shown style changed.
    pub fn request(&mut self, widget: NodeId, source: u32, style: &str) -> bool {
        let Some(prio) = priority(style) else {
            warn!("disallowed pointer style {style:?} requested by {widget:?}");
            return false;
        };
        let style = STYLE_PRIORITY[prio];
        let existing = self
            .requests
            .iter()
            .position(|r| r.widget == widget && r.source == source);
        if let Some(i) = existing
            && self.requests[i].style == style
        {
            return false;
        }
        let before = self.current();
        if let Some(i) = existing {
            self.requests.remove(i);
        }
        let at = self
            .requests
            .iter()
            .position(|r| priority(r.style).unwrap_or(usize::MAX) > prio)
            .unwrap_or(self.requests.len());
        self.requests.insert(
            at,
            StyleRequest {
                style,
                widget,
                source,
            },
        );
        self.notify_if_changed(before)
    }

    /// Clear the request for `(widget, source)`. Returns `true` if the shown
    /// style changed.
    pub fn clear(&mut self, widget: NodeId, source: u32) -> bool {
        let before = self.current();
        self.requests
            .retain(|r| !(r.widget == widget && r.source == source));
        self.notify_if_changed(before)
    }

    /// Clear every request from `widget`. Returns `true` if the shown style
    /// changed.
    pub fn clear_widget(&mut self, widget: NodeId) -> bool {
        let before = self.current();
        self.requests.retain(|r| r.widget != widget);
        self.notify_if_changed(before)
    }

    /// Run the handler if the head differs from `before`.
    fn notify_if_changed(&mut self, before: &'static str) -> bool {
        let now = self.current();
        if now == before {
            return false;
        }
        if let Some(h) = self.handler.as_mut() {
            h(now);
        }
        true
    }
}
