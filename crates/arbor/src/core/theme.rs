//! Theme property provider.
//!
//! The theme is an opaque map from slash-separated paths to values. Lookups
//! fall back from the most specific path to the least: `button/hover/fill`
//! tries `button/hover/fill`, then `hover/fill`, then `fill`. Every change
//! bumps a generation counter, which the Root uses to schedule relayout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    core::{error::Result, surface::Color},
    geom::Padding,
};

/// A theme value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeValue {
    /// A color.
    Color(Color),
    /// A number, for spacing, sizes and the like.
    Number(f64),
    /// Padding.
    Padding(#[serde(with = "PaddingDef")] Padding),
}

/// Serde mirror of [`Padding`], which lives in the dependency-free geometry
/// crate.
#[derive(Serialize, Deserialize)]
#[serde(remote = "Padding")]
struct PaddingDef {
    /// Left padding.
    left: f64,
    /// Right padding.
    right: f64,
    /// Top padding.
    top: f64,
    /// Bottom padding.
    bottom: f64,
}

impl From<Color> for ThemeValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<f64> for ThemeValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Padding> for ThemeValue {
    fn from(p: Padding) -> Self {
        Self::Padding(p)
    }
}

/// Split a path into components.
fn parse_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Map of theme paths to values.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Path-to-value map. Keys are normalized paths.
    values: HashMap<String, ThemeValue>,
    /// Bumped on every change.
    #[serde(skip)]
    generation: u64,
}

impl Theme {
    /// An empty theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a theme from a JSON object of paths to values.
    pub fn from_json(s: &str) -> Result<Self> {
        let values: HashMap<String, ThemeValue> = serde_json::from_str(s)?;
        let mut t = Self::new();
        for (k, v) in values {
            t.set(&k, v);
        }
        Ok(t)
    }

    /// Change counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Set a value. Returns `true` if anything changed.
    pub fn set(&mut self, path: &str, value: impl Into<ThemeValue>) -> bool {
        let key = parse_path(path).join("/");
        let value = value.into();
        if self.values.get(&key) == Some(&value) {
            return false;
        }
        self.values.insert(key, value);
        self.generation += 1;
        true
    }

    /// Remove a value. Returns `true` if it was present.
    pub fn remove(&mut self, path: &str) -> bool {
        let key = parse_path(path).join("/");
        if self.values.remove(&key).is_some() {
            self.generation += 1;
            true
        } else {
            false
        }
    }

    /// Look up a path, falling back to less specific paths.
    pub fn get(&self, path: &str) -> Option<ThemeValue> {
        let parts = parse_path(path);
        (0..parts.len()).find_map(|i| self.values.get(&parts[i..].join("/")).copied())
    }

    /// A color, or `default`.
    pub fn color(&self, path: &str, default: Color) -> Color {
        match self.get(path) {
            Some(ThemeValue::Color(c)) => c,
            _ => default,
        }
    }

    /// A number, or `default`.
    pub fn number(&self, path: &str, default: f64) -> f64 {
        match self.get(path) {
            Some(ThemeValue::Number(n)) => n,
            _ => default,
        }
    }

    /// Padding, or `default`. A number is taken as uniform padding.
    pub fn padding(&self, path: &str, default: Padding) -> Padding {
        match self.get(path) {
            Some(ThemeValue::Padding(p)) => p,
            Some(ThemeValue::Number(n)) => Padding::uniform(n),
            _ => default,
        }
    }
}
