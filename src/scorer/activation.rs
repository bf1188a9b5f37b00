//! Muscle-activation scoring strategies.
//!
//! The activation sub-score has no direct signal in the landmark data, so it
//! is a pluggable heuristic rather than a fixed formula. The default model
//! approximates joint tension from limb-chain bend angles.

use super::config::Thresholds;
use super::types::{FeedbackItem, Importance, Landmark, PoseSnapshot, LIMB_CHAINS};

/// Strategy for computing the muscle-activation sub-score.
///
/// Implementations must be pure: no I/O, no mutation, deterministic for
/// identical inputs. Returns `None` when the snapshots carry no usable
/// signal for this model (the sub-score is then indeterminate).
pub trait ActivationModel: Send + Sync {
    /// Model name for logging and reports.
    fn name(&self) -> &str;

    /// Score muscle activation of `user` against `reference` (0-10),
    /// emitting feedback for chains whose score falls below the cutoffs.
    fn score(
        &self,
        user: &PoseSnapshot,
        reference: &PoseSnapshot,
        thresholds: &Thresholds,
    ) -> Option<(f32, Vec<FeedbackItem>)>;
}

/// Default activation model: compares limb-chain bend angles.
///
/// For each chain (upper segment, joint, end segment) present in both
/// snapshots, the bend angle at the joint is measured; the closer the user's
/// bend is to the reference's, the higher the chain score. A straight arm
/// where the reference flexes (or vice versa) reads as an activation
/// mismatch.
#[derive(Debug, Default)]
pub struct LimbExtensionModel;

impl ActivationModel for LimbExtensionModel {
    fn name(&self) -> &str {
        "limb-extension"
    }

    fn score(
        &self,
        user: &PoseSnapshot,
        reference: &PoseSnapshot,
        thresholds: &Thresholds,
    ) -> Option<(f32, Vec<FeedbackItem>)> {
        let mut chain_scores = Vec::new();
        let mut feedback = Vec::new();

        for (label, root, joint, end) in LIMB_CHAINS {
            let user_angle = chain_bend_angle(user, root, joint, end, thresholds.min_confidence);
            let ref_angle =
                chain_bend_angle(reference, root, joint, end, thresholds.min_confidence);

            let (ua, ra) = match (user_angle, ref_angle) {
                (Some(u), Some(r)) => (u, r),
                _ => continue,
            };

            let diff = (ua - ra).abs();
            let score = 10.0 * (1.0 - (diff / thresholds.activation_tolerance).clamp(0.0, 1.0));
            chain_scores.push(score);

            if score < thresholds.high_cutoff {
                feedback.push(FeedbackItem {
                    message: format!(
                        "Your {} bend is far off the reference ({:.0}\u{b0} vs {:.0}\u{b0})",
                        label, ua, ra
                    ),
                    importance: Importance::High,
                    score: Some(score),
                });
            } else if score < thresholds.medium_cutoff {
                feedback.push(FeedbackItem {
                    message: format!(
                        "Adjust your {} bend to match the reference ({:.0}\u{b0} vs {:.0}\u{b0})",
                        label, ua, ra
                    ),
                    importance: Importance::Medium,
                    score: Some(score),
                });
            }
        }

        if chain_scores.is_empty() {
            return None;
        }

        let mean = chain_scores.iter().sum::<f32>() / chain_scores.len() as f32;
        Some((mean.clamp(0.0, 10.0), feedback))
    }
}

/// Bend angle in degrees at the middle joint of a limb chain, or `None` if
/// any landmark is missing, below confidence, or the segments are degenerate.
fn chain_bend_angle(
    snapshot: &PoseSnapshot,
    root: &str,
    joint: &str,
    end: &str,
    min_confidence: f32,
) -> Option<f32> {
    let a = usable(snapshot, root, min_confidence)?;
    let b = usable(snapshot, joint, min_confidence)?;
    let c = usable(snapshot, end, min_confidence)?;

    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);
    let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if n1 < f32::EPSILON || n2 < f32::EPSILON {
        return None;
    }

    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn usable<'a>(snapshot: &'a PoseSnapshot, name: &str, min_confidence: f32) -> Option<&'a Landmark> {
    snapshot
        .get(name)
        .filter(|l| l.confidence >= min_confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::config::default_config;
    use crate::scorer::types::Landmark;

    fn arm_snapshot(hand_x: f32, hand_y: f32) -> PoseSnapshot {
        PoseSnapshot::new(vec![
            Landmark::new("left_upper_arm", 0.0, 0.0, 0.9),
            Landmark::new("left_lower_arm", 10.0, 0.0, 0.9),
            Landmark::new("left_hand", hand_x, hand_y, 0.9),
        ])
    }

    #[test]
    fn test_straight_chain_is_180_degrees() {
        let snap = arm_snapshot(20.0, 0.0);
        let angle = chain_bend_angle(&snap, "left_upper_arm", "left_lower_arm", "left_hand", 0.3)
            .unwrap();
        assert!((angle - 180.0).abs() < 0.5, "got {}", angle);
    }

    #[test]
    fn test_right_angle_chain_is_90_degrees() {
        let snap = arm_snapshot(10.0, 10.0);
        let angle = chain_bend_angle(&snap, "left_upper_arm", "left_lower_arm", "left_hand", 0.3)
            .unwrap();
        assert!((angle - 90.0).abs() < 0.5, "got {}", angle);
    }

    #[test]
    fn test_missing_landmark_yields_none() {
        let snap = PoseSnapshot::new(vec![
            Landmark::new("left_upper_arm", 0.0, 0.0, 0.9),
            Landmark::new("left_lower_arm", 10.0, 0.0, 0.9),
        ]);
        assert!(
            chain_bend_angle(&snap, "left_upper_arm", "left_lower_arm", "left_hand", 0.3).is_none()
        );
    }

    #[test]
    fn test_low_confidence_landmark_excluded() {
        let snap = PoseSnapshot::new(vec![
            Landmark::new("left_upper_arm", 0.0, 0.0, 0.9),
            Landmark::new("left_lower_arm", 10.0, 0.0, 0.1),
            Landmark::new("left_hand", 20.0, 0.0, 0.9),
        ]);
        assert!(
            chain_bend_angle(&snap, "left_upper_arm", "left_lower_arm", "left_hand", 0.3).is_none()
        );
    }

    #[test]
    fn test_degenerate_segment_yields_none() {
        // Hand coincides with the joint: zero-length segment
        let snap = arm_snapshot(10.0, 0.0);
        assert!(
            chain_bend_angle(&snap, "left_upper_arm", "left_lower_arm", "left_hand", 0.3).is_none()
        );
    }

    #[test]
    fn test_matching_chains_score_ten() {
        let config = default_config();
        let model = LimbExtensionModel;
        let snap = arm_snapshot(10.0, 10.0);

        let (score, feedback) = model.score(&snap, &snap, &config.thresholds).unwrap();
        assert!((score - 10.0).abs() < 0.01, "got {}", score);
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_mismatched_bend_lowers_score_and_emits_feedback() {
        let config = default_config();
        let model = LimbExtensionModel;
        let straight = arm_snapshot(20.0, 0.0); // 180 degrees
        let bent = arm_snapshot(10.0, 10.0); // 90 degrees

        let (score, feedback) = model.score(&bent, &straight, &config.thresholds).unwrap();
        assert!(score < 10.0);
        // 90 degrees off with 90-degree tolerance scores 0 -> High feedback
        assert!(score < config.thresholds.high_cutoff);
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].importance, Importance::High);
        assert!(feedback[0].message.contains("left arm"));
    }

    #[test]
    fn test_no_usable_chains_is_indeterminate() {
        let config = default_config();
        let model = LimbExtensionModel;
        let torso_only = PoseSnapshot::new(vec![Landmark::new("torso", 0.0, 0.0, 0.9)]);

        assert!(model
            .score(&torso_only, &torso_only, &config.thresholds)
            .is_none());
    }
}
