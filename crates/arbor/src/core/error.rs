use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::{
    core::id::{NodeId, ViewportId},
    geom,
};

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Every variant here is a programming error that would corrupt shared state
/// if ignored. Recoverable conditions (constraint violations, odd surface
/// sizes) are corrected and logged instead.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// Node does not exist in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// Viewport does not exist in the arena.
    #[error("viewport not found: {0:?}")]
    ViewportNotFound(ViewportId),
    /// Attempted to attach a node that is already attached or parented.
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),
    /// Attempted to detach a node that is not attached.
    #[error("node not attached: {0:?}")]
    NotAttached(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Prospective parent.
        parent: NodeId,
        /// Prospective child.
        child: NodeId,
    },
    /// A widget id is already registered with the root.
    #[error("duplicate widget id: {0}")]
    DuplicateId(String),
    /// A widget hook was re-entered while it was already running.
    #[error("reentrant widget borrow: {0:?}")]
    ReentrantWidgetBorrow(NodeId),
    /// Absurd layout input, such as an infinite minimum dimension.
    #[error("layout: {0}")]
    Layout(String),
    /// Geometry failure.
    #[error("geometry: {0}")]
    Geometry(String),
    /// Invalid operation.
    #[error("invalid: {0}")]
    Invalid(String),
    /// Configuration could not be loaded.
    #[error("config: {0}")]
    Config(String),
    /// Writing diagnostic output failed.
    #[error("io: {0}")]
    Io(String),
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
