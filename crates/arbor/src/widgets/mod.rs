//! Built-in widgets.
//!
//! These are small, but each exercises a different part of the widget
//! protocol: sizing, positioning children, focus, pointer styles, nested
//! viewports.

mod block;
mod button;
mod container;
mod flex;
mod viewport_widget;

pub use block::Block;
pub use button::{Button, ButtonState};
pub use container::Container;
pub use flex::{Direction, Flex};
pub use viewport_widget::ViewportWidget;
