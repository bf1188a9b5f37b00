//! posecoach: pose comparison scoring for physique training.
//!
//! A user's photo goes through the DensePose analysis service, becomes a
//! `PoseSnapshot` of named landmarks, and is scored against a stored
//! reference pose. The result carries a total score, three sub-scores
//! (symmetry, alignment, muscle activation), and ranked feedback.

pub mod catalog;
pub mod densepose;
pub mod error;
pub mod history;
pub mod scorer;
pub mod settings;

pub use catalog::{PoseMatch, ReferenceCatalog, ReferencePose};
pub use densepose::DensePoseClient;
pub use error::PoseCoachError;
pub use history::{SessionDetail, SessionHistory, SessionSummary};
pub use scorer::{
    ComparisonResult, FeedbackItem, Importance, Landmark, PoseScorer, PoseSnapshot, ScoreError,
    ScoringConfig,
};
pub use settings::Settings;

/// Initialize tracing from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
