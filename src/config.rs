// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance configuration.
//!
//! The kernel has exactly one configuration surface: the epsilon values
//! used for vertex welding and plane classification. No plugin system, no
//! environment-variable layer, no hot reload — the kernel runs once per
//! invocation and exits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Epsilon values controlling welding and plane classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Absolute distance cutoff used for plane classification near d=0.
    pub eps_abs: f64,
    /// Relative distance cutoff, scaled by the plane's |d|.
    pub eps_rel: f64,
    /// Distance below which two vertices are considered duplicates.
    pub weld_eps: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps_abs: 1e-9,
            eps_rel: 1e-6,
            weld_eps: 1e-6,
        }
    }
}

impl Tolerance {
    /// The classification cutoff for a plane with signed distance `d`:
    /// `max(eps_abs, eps_rel * |d|)`. Avoids the singularity at d=0 that a
    /// purely relative cutoff has.
    pub fn classify_cutoff(&self, d: f64) -> f64 {
        self.eps_abs.max(self.eps_rel * d.abs())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading tolerance config from {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing tolerance config from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cutoff_is_not_singular_at_origin() {
        let tol = Tolerance::default();
        assert!(tol.classify_cutoff(0.0) > 0.0);
    }

    #[test]
    fn cutoff_scales_with_distance() {
        let tol = Tolerance::default();
        assert!(tol.classify_cutoff(1000.0) > tol.classify_cutoff(0.0));
    }
}
