//! TOML configuration loading for the scoring engine.
//!
//! Provides two loading methods:
//! - `default_config()` - Loads embedded defaults compiled into the binary
//! - `load_config(path)` - Loads a custom configuration from a file path

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Default scoring configuration embedded at compile time.
/// Loaded from `config/scoring.toml`.
const DEFAULT_CONFIG: &str = include_str!("../../config/scoring.toml");

/// Root scoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Sub-score weights for the total score (must sum to ~1.0)
    pub weights: Weights,
    /// Base thresholds applied to every comparison
    pub thresholds: Thresholds,
    /// Per-pose-category threshold overrides keyed by category id
    #[serde(default)]
    pub categories: HashMap<String, ThresholdOverrides>,
}

/// Named, fixed weights for the total-score combination.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Weights {
    pub symmetry: f32,
    pub alignment: f32,
    pub activation: f32,
}

/// Deviation tolerances and feedback cutoffs.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    /// Landmarks below this confidence are excluded from scoring
    pub min_confidence: f32,
    /// Normalized left/right deviation at which a pair scores 0
    pub symmetry_tolerance: f32,
    /// Normalized positional deviation at which a landmark scores 0
    pub alignment_tolerance: f32,
    /// Bend-angle mismatch in degrees at which a limb chain scores 0
    pub activation_tolerance: f32,
    /// Component scores below this emit Medium-importance feedback
    pub medium_cutoff: f32,
    /// Component scores below this emit High-importance feedback
    pub high_cutoff: f32,
}

/// Partial thresholds for a pose category; unset fields fall back to base.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub min_confidence: Option<f32>,
    #[serde(default)]
    pub symmetry_tolerance: Option<f32>,
    #[serde(default)]
    pub alignment_tolerance: Option<f32>,
    #[serde(default)]
    pub activation_tolerance: Option<f32>,
    #[serde(default)]
    pub medium_cutoff: Option<f32>,
    #[serde(default)]
    pub high_cutoff: Option<f32>,
}

impl ScoringConfig {
    /// Resolve the effective thresholds for a pose category.
    /// Unknown or absent categories use the base thresholds.
    pub fn thresholds_for(&self, category: Option<&str>) -> Thresholds {
        let mut t = self.thresholds;
        if let Some(overrides) = category.and_then(|c| self.categories.get(c)) {
            if let Some(v) = overrides.min_confidence {
                t.min_confidence = v;
            }
            if let Some(v) = overrides.symmetry_tolerance {
                t.symmetry_tolerance = v;
            }
            if let Some(v) = overrides.alignment_tolerance {
                t.alignment_tolerance = v;
            }
            if let Some(v) = overrides.activation_tolerance {
                t.activation_tolerance = v;
            }
            if let Some(v) = overrides.medium_cutoff {
                t.medium_cutoff = v;
            }
            if let Some(v) = overrides.high_cutoff {
                t.high_cutoff = v;
            }
        }
        t
    }
}

/// Load a scoring configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<ScoringConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ScoringConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Get the default configuration embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_config() -> ScoringConfig {
    toml::from_str(DEFAULT_CONFIG).expect("embedded scoring.toml must be valid TOML")
}
