//! Core types and traits for the arbor widget toolkit.

/// Root configuration.
pub mod config;
/// Widget hook contexts.
pub mod context;
/// Pointer style arbitration.
pub mod cursor;
/// Driver contract.
pub mod driver;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Input event types.
pub mod event;
/// Focus channels.
pub mod focus;
/// Node ID types.
pub mod id;
/// Layout constraints and the widget layout protocol.
pub mod layout;
/// Node data stored in the arena.
pub mod node;
/// Paint pass and the layout to pixel transform.
pub mod paint;
/// The Root: tree ownership, frame phases and event dispatch.
pub mod root;
/// Drawing surfaces.
pub mod surface;
/// Surface-backed viewports.
mod surface_viewport;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// Theme property provider.
pub mod theme;
/// Widget arena and tree structure.
mod tree;
/// Viewports.
pub mod viewport;
/// Widget-level event dispatch.
mod dispatch;

pub use config::RootConfig;
pub use context::{EventCtx, LayoutCtx, PaintCtx, UpdateCtx};
pub use driver::{Driver, DriverId};
pub use event::{Capture, CaptureList, Capturer};
pub use id::{ListenerId, NodeId, TypedId, ViewportId};
pub use root::{Root, RootListener};
