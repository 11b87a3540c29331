//! Arbor: a retained-mode 2D widget toolkit.
//!
//! Arbor renders a tree of widgets onto raster surfaces, resolves layout,
//! routes input events with focus semantics and repaints only damaged
//! regions. Hosts embed the output anywhere a pixel buffer can go: an
//! on-screen canvas, or a texture consumed by a 3D engine.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Root`] - owns a widget tree, its surface and all focus state
//! - [`Widget`] - the trait implemented by all widgets
//! - [`Driver`] - hooks for host input translators
//!
//! A frame is `pre_layout_update`, `resolve_layout`, `post_layout_update`,
//! `paint`, in that order; [`Root::frame`] runs all four.
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, PixelRect, Scale, etc.)
//! - [`widgets`] - Built-in widget implementations

#![warn(missing_docs)]

// Internal core module - re-export specific items below
mod core;

// Public modules
pub mod widget;
pub mod widgets;

pub use arbor_geom as geom;
#[cfg(any(test, feature = "testing"))]
pub use crate::core::testing;
pub use crate::core::{
    Capture, CaptureList, Capturer, Driver, DriverId, EventCtx, LayoutCtx, ListenerId, NodeId,
    PaintCtx, Root, RootConfig, RootListener, TypedId, UpdateCtx, ViewportId,
};
pub use crate::core::{
    config, context, cursor, driver, dump, error, event, focus, layout, node, paint, surface, theme,
    viewport,
};
pub use widget::Widget;
