//! Type definitions for the pose comparison scorer.
//!
//! These types support JSON serialization toward the presentation layer
//! (camelCase field names) and deserialization of stored reference poses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CANONICAL LANDMARK SET
// =============================================================================

/// The fixed set of named landmarks a snapshot may carry, in canonical order.
///
/// These are the coarse DensePose body regions. Scoring iterates this array
/// rather than any map, so results are deterministic.
pub const LANDMARK_NAMES: &[&str] = &[
    "head",
    "torso",
    "left_upper_arm",
    "right_upper_arm",
    "left_lower_arm",
    "right_lower_arm",
    "left_hand",
    "right_hand",
    "left_upper_leg",
    "right_upper_leg",
    "left_lower_leg",
    "right_lower_leg",
    "left_foot",
    "right_foot",
];

/// Left/right landmark pairs used by the symmetry sub-score.
pub const LANDMARK_PAIRS: &[(&str, &str, &str)] = &[
    ("upper arm", "left_upper_arm", "right_upper_arm"),
    ("lower arm", "left_lower_arm", "right_lower_arm"),
    ("hand", "left_hand", "right_hand"),
    ("upper leg", "left_upper_leg", "right_upper_leg"),
    ("lower leg", "left_lower_leg", "right_lower_leg"),
    ("foot", "left_foot", "right_foot"),
];

/// Limb chains used by the default muscle-activation model.
/// Each chain is (label, root, joint, end); the bend angle is measured
/// at the middle joint.
pub const LIMB_CHAINS: &[(&str, &str, &str, &str)] = &[
    ("left arm", "left_upper_arm", "left_lower_arm", "left_hand"),
    ("right arm", "right_upper_arm", "right_lower_arm", "right_hand"),
    ("left leg", "left_upper_leg", "left_lower_leg", "left_foot"),
    ("right leg", "right_upper_leg", "right_lower_leg", "right_foot"),
];

// =============================================================================
// INPUT TYPES
// =============================================================================

/// A named anatomical point with a 2D position and a confidence value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    /// Canonical landmark name (e.g., "left_upper_arm")
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Detection confidence / visibility (0.0 - 1.0)
    pub confidence: f32,
}

impl Landmark {
    pub fn new(name: impl Into<String>, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }
}

/// The full set of landmarks detected for one pose instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PoseSnapshot {
    pub landmarks: Vec<Landmark>,
}

impl PoseSnapshot {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Look up a landmark by canonical name.
    pub fn get(&self, name: &str) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

// =============================================================================
// OUTPUT TYPES (serialized to the presentation layer)
// =============================================================================

/// Importance level attached to a feedback item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Low,
    Medium,
    High,
}

/// A discrete, human-readable observation about the compared pose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    /// Human-readable observation text
    pub message: String,
    /// How much the observation matters for the pose
    pub importance: Importance,
    /// Score (0-10) attributable to this specific observation, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Complete result of one pose comparison.
///
/// Sub-scores are `None` when indeterminate (zero usable landmarks for that
/// sub-score); indeterminate sub-scores are skipped from `total_score` with
/// the remaining weights renormalized. Created fresh per comparison and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Weighted combination of the available sub-scores (0-10)
    pub total_score: f32,
    /// Left/right balance within the user's own snapshot (0-10)
    pub symmetry_score: Option<f32>,
    /// Positional match against the reference pose (0-10)
    pub alignment_score: Option<f32>,
    /// Joint-angle tension proxy against the reference pose (0-10)
    pub muscle_activation_score: Option<f32>,
    /// Observations ordered most important first
    pub feedback: Vec<FeedbackItem>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Typed failure of a comparison. Partial landmark coverage is NOT an error;
/// it degrades sub-score coverage instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoreError {
    /// Too few usable landmarks to compute any sub-score
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Malformed snapshot (non-finite values, confidence out of range,
    /// duplicate landmark names)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_names_are_unique_and_paired() {
        let mut names: Vec<&str> = LANDMARK_NAMES.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), LANDMARK_NAMES.len());

        for (_, left, right) in LANDMARK_PAIRS {
            assert!(LANDMARK_NAMES.contains(left), "unknown pair side {}", left);
            assert!(LANDMARK_NAMES.contains(right), "unknown pair side {}", right);
        }
        for (_, a, b, c) in LIMB_CHAINS {
            assert!(LANDMARK_NAMES.contains(a));
            assert!(LANDMARK_NAMES.contains(b));
            assert!(LANDMARK_NAMES.contains(c));
        }
    }

    #[test]
    fn test_importance_ordering() {
        assert!(Importance::High > Importance::Medium);
        assert!(Importance::Medium > Importance::Low);
    }

    #[test]
    fn test_importance_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&Importance::High).unwrap(),
            r#""HIGH""#
        );
        assert_eq!(serde_json::to_string(&Importance::Low).unwrap(), r#""LOW""#);
    }

    #[test]
    fn test_comparison_result_serializes_camel_case() {
        let result = ComparisonResult {
            total_score: 7.5,
            symmetry_score: Some(8.0),
            alignment_score: Some(7.0),
            muscle_activation_score: None,
            feedback: vec![FeedbackItem {
                message: "Left arm sits lower than right".to_string(),
                importance: Importance::Medium,
                score: Some(5.0),
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("totalScore"));
        assert!(json.contains("symmetryScore"));
        assert!(json.contains("alignmentScore"));
        assert!(json.contains("muscleActivationScore"));
        assert!(json.contains("MEDIUM"));
    }

    #[test]
    fn test_feedback_item_omits_missing_score() {
        let item = FeedbackItem {
            message: "note".to_string(),
            importance: Importance::Low,
            score: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("score"));
    }

    #[test]
    fn test_snapshot_lookup() {
        let snap = PoseSnapshot::new(vec![
            Landmark::new("torso", 10.0, 20.0, 0.9),
            Landmark::new("head", 10.0, 5.0, 0.8),
        ]);
        assert_eq!(snap.get("torso").unwrap().y, 20.0);
        assert!(snap.get("left_foot").is_none());
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_deserializes_from_reference_json() {
        let json = r#"{
            "landmarks": [
                {"name": "torso", "x": 128.0, "y": 200.0, "confidence": 0.95},
                {"name": "head", "x": 128.0, "y": 80.0, "confidence": 0.9}
            ]
        }"#;
        let snap: PoseSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.landmarks.len(), 2);
        assert_eq!(snap.get("head").unwrap().confidence, 0.9);
    }
}
