//! Button widget.

use crate::{
    core::{
        context::{EventCtx, LayoutCtx, PaintCtx, ReadCtx},
        error::Result,
        event::{Event, EventKind, key::KeyCode, pointer},
        focus::FocusType,
        id::NodeId,
        layout::Constraints,
        surface::Color,
    },
    geom::{Rect, Size},
    widget::Widget,
};

/// Click callback.
type ClickHandler = Box<dyn FnMut(&mut EventCtx)>;

/// Pointer interaction state of a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Not under the pointer.
    #[default]
    Released,
    /// Under the pointer, not pressed.
    Hover,
    /// Pressed. The button holds pointer focus until the release.
    Hold,
}

/// A clickable, tab-focusable button.
///
/// Pressing the primary button grabs pointer focus, so the release is seen
/// even if the pointer wandered off; a click only counts if the release
/// happens over the button. Enter and Space click the button while it has
/// keyboard focus. Colors come from `button/fill`, `button/hover/fill` and
/// `button/hold/fill`.
pub struct Button {
    /// Natural size.
    size: Size,
    /// Interaction state.
    state: ButtonState,
    /// Completed clicks.
    clicks: usize,
    /// Called on every click.
    on_click: Option<ClickHandler>,
}

impl Button {
    /// A button asking for `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            state: ButtonState::Released,
            clicks: 0,
            on_click: None,
        }
    }

    /// Run `f` on every click.
    pub fn on_click(mut self, f: impl FnMut(&mut EventCtx) + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    /// Current interaction state.
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Number of completed clicks.
    pub fn clicks(&self) -> usize {
        self.clicks
    }

    /// Move to a new state, repainting if it changed.
    fn set_state(&mut self, ctx: &mut EventCtx, state: ButtonState) {
        if self.state != state {
            self.state = state;
            ctx.mark_dirty();
        }
    }

    /// Register a click.
    fn click(&mut self, ctx: &mut EventCtx) {
        self.clicks += 1;
        if let Some(f) = self.on_click.as_mut() {
            f(ctx);
        }
    }

    /// Handle a pointer event. `p` is in viewport space.
    fn pointer(
        &mut self,
        ctx: &mut EventCtx,
        kind: &EventKind,
        p: pointer::Pointer,
    ) -> Option<NodeId> {
        let inside = ctx.bounds().contains(p.location);
        match kind {
            EventKind::PointerMove(_) => {
                if self.state != ButtonState::Hold {
                    let next = if inside {
                        ButtonState::Hover
                    } else {
                        ButtonState::Released
                    };
                    self.set_state(ctx, next);
                }
                if inside {
                    ctx.request_pointer_style(p.source, "pointer");
                } else {
                    ctx.clear_pointer_style(p.source);
                }
            }
            EventKind::PointerPress(_) => {
                if !inside || p.button != Some(pointer::Button::Primary) {
                    return None;
                }
                self.set_state(ctx, ButtonState::Hold);
                ctx.request_focus(FocusType::Pointer);
            }
            EventKind::PointerRelease(_) => {
                if self.state != ButtonState::Hold {
                    return inside.then_some(ctx.id());
                }
                ctx.release_focus(FocusType::Pointer);
                if inside {
                    self.click(ctx);
                    self.set_state(ctx, ButtonState::Hover);
                } else {
                    self.set_state(ctx, ButtonState::Released);
                }
            }
            _ => return None,
        }
        inside.then_some(ctx.id())
    }
}

impl Widget for Button {
    fn resolve_dimensions(&mut self, _ctx: &mut LayoutCtx, c: Constraints) -> Result<Size> {
        Ok(c.clamp(self.size))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, _dirty: Rect) -> Result<()> {
        let path = match self.state {
            ButtonState::Released => "button/fill",
            ButtonState::Hover => "button/hover/fill",
            ButtonState::Hold => "button/hold/fill",
        };
        let color = ctx.theme().color(path, Color::rgb(128, 128, 128));
        ctx.fill(color);
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut EventCtx, event: &Event) -> Result<Option<NodeId>> {
        Ok(match &event.kind {
            EventKind::PointerMove(p) | EventKind::PointerPress(p) | EventKind::PointerRelease(p) => {
                self.pointer(ctx, &event.kind, *p)
            }
            EventKind::Focus(ty) => {
                if *ty == FocusType::Tab {
                    let b = ctx.bounds();
                    ctx.scroll_into_view(b);
                }
                Some(ctx.id())
            }
            EventKind::Blur(FocusType::Pointer) => {
                if self.state == ButtonState::Hold {
                    self.set_state(ctx, ButtonState::Released);
                }
                None
            }
            EventKind::Leave => {
                if self.state != ButtonState::Hold {
                    self.set_state(ctx, ButtonState::Released);
                }
                ctx.clear_pointer_styles();
                None
            }
            EventKind::KeyPress(k) if matches!(k.code, KeyCode::Enter | KeyCode::Char(' ')) => {
                self.click(ctx);
                Some(ctx.id())
            }
            _ => None,
        })
    }

    fn accepts_tab_focus(&self) -> bool {
        true
    }
}
