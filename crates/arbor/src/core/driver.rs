//! The driver contract.
//!
//! Drivers translate host input (pointer, keyboard, controller rays) into
//! calls on the Root's dispatch and focus API. The core only knows them
//! through this trait.

use crate::{
    Root,
    core::{focus::FocusType, id::NodeId},
};

/// Identifier for a registered driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(pub(crate) u64);

/// Hooks called by the Root. All default to doing nothing.
pub trait Driver {
    /// Called once per pre-layout phase.
    fn update(&mut self, _root: &mut Root) {}

    /// The Root was enabled, or the driver was added to an enabled Root.
    fn on_enable(&mut self, _root: &mut Root) {}

    /// The Root was disabled, or the driver was removed from an enabled Root.
    fn on_disable(&mut self, _root: &mut Root) {}

    /// A focus channel now holds `widget`, or nothing.
    fn on_focus_changed(&mut self, _root: &mut Root, _ty: FocusType, _widget: Option<NodeId>) {}

    /// The last widget to capture an event of this channel's type changed.
    fn on_focus_capturer_changed(
        &mut self,
        _root: &mut Root,
        _ty: FocusType,
        _old: Option<NodeId>,
        _new: Option<NodeId>,
    ) {
    }
}

/// A driver notification waiting for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notification {
    /// [`Driver::on_enable`].
    Enable,
    /// [`Driver::on_disable`].
    Disable,
    /// [`Driver::on_focus_changed`].
    FocusChanged(FocusType, Option<NodeId>),
    /// [`Driver::on_focus_capturer_changed`].
    CapturerChanged(FocusType, Option<NodeId>, Option<NodeId>),
}

impl Notification {
    /// Deliver to one driver.
    pub(crate) fn deliver(self, driver: &mut dyn Driver, root: &mut Root) {
        match self {
            Self::Enable => driver.on_enable(root),
            Self::Disable => driver.on_disable(root),
            Self::FocusChanged(ty, w) => driver.on_focus_changed(root, ty, w),
            Self::CapturerChanged(ty, old, new) => {
                driver.on_focus_capturer_changed(root, ty, old, new);
            }
        }
    }
}
