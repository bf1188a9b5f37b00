//! Pose comparison scoring.
//!
//! Compares a user's pose snapshot against a stored reference snapshot and
//! produces a `ComparisonResult`: a weighted total score, sub-scores for
//! symmetry, alignment, and muscle activation, and ranked feedback items.
//!
//! The module is pure computation. Landmark acquisition lives in
//! `crate::densepose`; persistence of references and results lives in
//! `crate::catalog` and `crate::history`.

pub mod activation;
pub mod config;
pub mod engine;
pub mod types;

pub use activation::{ActivationModel, LimbExtensionModel};
pub use config::{load_config, ScoringConfig, Thresholds};
pub use engine::PoseScorer;
pub use types::{
    ComparisonResult, FeedbackItem, Importance, Landmark, PoseSnapshot, ScoreError,
};
