//! Root configuration.

use serde::{Deserialize, Serialize};

use crate::core::{
    error::{Error, Result},
    layout::Constraints,
    surface::Color,
    viewport::DEFAULT_LAYOUT_RETRIES,
};

/// Default maximum surface dimension, in pixels.
pub const DEFAULT_MAX_SURFACE: u32 = 16384;

/// Configuration for a [`Root`](crate::Root) and its surface-backed viewport.
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Pixels per layout unit.
    pub resolution: f64,
    /// Maximum surface width in pixels.
    pub max_surface_width: u32,
    /// Maximum surface height in pixels.
    pub max_surface_height: u32,
    /// Clear stale surface margins when the tree shrinks.
    pub prevent_bleeding: bool,
    /// Constraints for the Root's child.
    pub constraints: Constraints,
    /// Extra layout passes allowed per frame.
    pub layout_retries: usize,
    /// Surface background.
    pub background: Color,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_surface_width: DEFAULT_MAX_SURFACE,
            max_surface_height: DEFAULT_MAX_SURFACE,
            prevent_bleeding: false,
            constraints: Constraints::UNBOUNDED,
            layout_retries: DEFAULT_LAYOUT_RETRIES,
            background: Color::TRANSPARENT,
        }
    }
}

impl RootConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        let c: Self = serde_json::from_str(s)?;
        c.validate()?;
        Ok(c)
    }

    /// Reject values no surface can be built from.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::Config(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.max_surface_width == 0 || self.max_surface_height == 0 {
            return Err(Error::Config(format!(
                "maximum surface size must be non-zero, got {} x {}",
                self.max_surface_width, self.max_surface_height
            )));
        }
        self.constraints.validated()?;
        Ok(())
    }

    /// Set the resolution.
    pub fn resolution(mut self, v: f64) -> Self {
        self.resolution = v;
        self
    }

    /// Set the maximum surface size.
    pub fn max_surface(mut self, width: u32, height: u32) -> Self {
        self.max_surface_width = width;
        self.max_surface_height = height;
        self
    }

    /// Enable or disable bleed prevention.
    pub fn prevent_bleeding(mut self, v: bool) -> Self {
        self.prevent_bleeding = v;
        self
    }

    /// Set the child constraints.
    pub fn constraints(mut self, c: Constraints) -> Self {
        self.constraints = c;
        self
    }

    /// Set the layout retry budget.
    pub fn layout_retries(mut self, n: usize) -> Self {
        self.layout_retries = n;
        self
    }

    /// Set the background.
    pub fn background(mut self, c: Color) -> Self {
        self.background = c;
        self
    }
}
