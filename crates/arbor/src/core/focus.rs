//! Focus channels.
//!
//! The Root tracks three independent channels. Each holds at most one focused
//! widget, plus the widget that last captured an event of that channel's
//! type. The two are distinct: the capturer is used to detect capture changes
//! for driver notification whether or not it currently holds focus.

use std::{fmt, mem};

use crate::core::id::NodeId;

/// A focus channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FocusType {
    /// Pointer capture, for drags and presses.
    Pointer,
    /// Keyboard input focus.
    Keyboard,
    /// Tab navigation focus.
    Tab,
}

impl FocusType {
    /// All channels, in a stable order.
    pub const ALL: [Self; 3] = [Self::Pointer, Self::Keyboard, Self::Tab];

    /// The partner channel. Granting Keyboard or Tab focus also grants the
    /// other one.
    pub fn partner(self) -> Option<Self> {
        match self {
            Self::Pointer => None,
            Self::Keyboard => Some(Self::Tab),
            Self::Tab => Some(Self::Keyboard),
        }
    }

    /// Slot index.
    fn index(self) -> usize {
        match self {
            Self::Pointer => 0,
            Self::Keyboard => 1,
            Self::Tab => 2,
        }
    }
}

impl fmt::Display for FocusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pointer => "pointer",
            Self::Keyboard => "keyboard",
            Self::Tab => "tab",
        };
        f.write_str(s)
    }
}

/// Per-channel focus and capture state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FocusState {
    /// Focused widget per channel.
    focused: [Option<NodeId>; 3],
    /// Last capturer per channel.
    capturers: [Option<NodeId>; 3],
}

impl FocusState {
    /// The widget holding a channel.
    pub fn focused(&self, ty: FocusType) -> Option<NodeId> {
        self.focused[ty.index()]
    }

    /// The widget that last captured an event of this channel's type.
    pub fn capturer(&self, ty: FocusType) -> Option<NodeId> {
        self.capturers[ty.index()]
    }

    /// Replace a channel's holder, returning the previous one.
    pub(crate) fn set_focused(&mut self, ty: FocusType, id: Option<NodeId>) -> Option<NodeId> {
        mem::replace(&mut self.focused[ty.index()], id)
    }

    /// Replace a channel's last capturer, returning the previous one.
    pub(crate) fn set_capturer(&mut self, ty: FocusType, id: Option<NodeId>) -> Option<NodeId> {
        mem::replace(&mut self.capturers[ty.index()], id)
    }

    /// Channels currently held by `id`.
    pub fn channels_of(&self, id: NodeId) -> Vec<FocusType> {
        FocusType::ALL
            .into_iter()
            .filter(|ty| self.focused(*ty) == Some(id))
            .collect()
    }

    /// Forget `id` as a capturer on every channel.
    pub(crate) fn forget_capturer(&mut self, id: NodeId) {
        for c in &mut self.capturers {
            if *c == Some(id) {
                *c = None;
            }
        }
    }

    /// Snapshot of all capturers, for change detection.
    pub(crate) fn capturers(&self) -> [Option<NodeId>; 3] {
        self.capturers
    }
}
