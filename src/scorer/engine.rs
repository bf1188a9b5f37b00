//! Pose comparison engine.
//!
//! `PoseScorer` takes a user snapshot and a reference snapshot, then produces
//! a composite result: total score, three sub-scores (symmetry, alignment,
//! muscle activation), and ranked feedback items.

use tracing::debug;

use super::activation::{ActivationModel, LimbExtensionModel};
use super::config::{ScoringConfig, Thresholds};
use super::types::*;

/// The pose comparison engine.
///
/// Stateless and pure: `compare` performs no I/O, mutates nothing, and is
/// deterministic for identical inputs, so a scorer may be shared across
/// threads and invoked once per frame without coordination.
pub struct PoseScorer {
    config: ScoringConfig,
    activation: Box<dyn ActivationModel>,
}

impl PoseScorer {
    /// Create a scorer with the given configuration and the default
    /// limb-extension activation model.
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            activation: Box::new(LimbExtensionModel),
        }
    }

    /// Create a scorer with a custom activation strategy.
    pub fn with_activation_model(config: ScoringConfig, model: Box<dyn ActivationModel>) -> Self {
        Self {
            config,
            activation: model,
        }
    }

    /// Compare a user snapshot against a reference snapshot using the base
    /// thresholds.
    pub fn compare(
        &self,
        user: &PoseSnapshot,
        reference: &PoseSnapshot,
    ) -> Result<ComparisonResult, ScoreError> {
        self.compare_in_category(user, reference, None)
    }

    /// Compare using the thresholds of a specific pose category (falls back
    /// to base thresholds for unknown categories).
    ///
    /// Landmarks missing or below the confidence threshold in either snapshot
    /// are excluded from the affected sub-score rather than treated as zero.
    /// A sub-score with no usable landmarks is reported as `None` and skipped
    /// from the weighted total.
    pub fn compare_in_category(
        &self,
        user: &PoseSnapshot,
        reference: &PoseSnapshot,
        category: Option<&str>,
    ) -> Result<ComparisonResult, ScoreError> {
        validate_snapshot(user, "user")?;
        validate_snapshot(reference, "reference")?;

        let thresholds = self.config.thresholds_for(category);

        if usable_names(user, &thresholds).is_empty() {
            return Err(ScoreError::InsufficientData(
                "user snapshot has no usable landmarks".to_string(),
            ));
        }
        if usable_names(reference, &thresholds).is_empty() {
            return Err(ScoreError::InsufficientData(
                "reference snapshot has no usable landmarks".to_string(),
            ));
        }

        let mut feedback = Vec::new();

        let symmetry = score_symmetry(user, &thresholds, &mut feedback);
        let alignment = score_alignment(user, reference, &thresholds, &mut feedback);
        let activation = match self.activation.score(user, reference, &thresholds) {
            Some((score, items)) => {
                feedback.extend(items);
                Some(score)
            }
            None => None,
        };

        for (label, value) in [
            ("symmetry", symmetry),
            ("alignment", alignment),
            ("muscle activation", activation),
        ] {
            if value.is_none() {
                feedback.push(FeedbackItem {
                    message: format!("Not enough visible landmarks to assess {}", label),
                    importance: Importance::Low,
                    score: None,
                });
            }
        }

        let total = weighted_total(&self.config, symmetry, alignment, activation)?;

        // Most important first; worst observations first within a level.
        feedback.sort_by(|a, b| {
            b.importance.cmp(&a.importance).then(
                a.score
                    .unwrap_or(f32::MAX)
                    .partial_cmp(&b.score.unwrap_or(f32::MAX))
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        });

        debug!(
            "compare: total={:.2} symmetry={:?} alignment={:?} activation={:?} feedback={}",
            total,
            symmetry,
            alignment,
            activation,
            feedback.len()
        );

        Ok(ComparisonResult {
            total_score: total,
            symmetry_score: symmetry,
            alignment_score: alignment,
            muscle_activation_score: activation,
            feedback,
        })
    }
}

/// Reject malformed snapshots: non-finite values, confidence out of range,
/// duplicate landmark names. Landmarks with unknown names are tolerated and
/// simply never used.
fn validate_snapshot(snapshot: &PoseSnapshot, side: &str) -> Result<(), ScoreError> {
    let mut seen = Vec::with_capacity(snapshot.landmarks.len());
    for l in &snapshot.landmarks {
        if !l.x.is_finite() || !l.y.is_finite() || !l.confidence.is_finite() {
            return Err(ScoreError::InvalidInput(format!(
                "{} snapshot: landmark '{}' has non-finite values",
                side, l.name
            )));
        }
        if !(0.0..=1.0).contains(&l.confidence) {
            return Err(ScoreError::InvalidInput(format!(
                "{} snapshot: landmark '{}' confidence {} outside [0, 1]",
                side, l.name, l.confidence
            )));
        }
        if seen.contains(&l.name.as_str()) {
            return Err(ScoreError::InvalidInput(format!(
                "{} snapshot: duplicate landmark '{}'",
                side, l.name
            )));
        }
        seen.push(l.name.as_str());
    }
    Ok(())
}

/// Canonical landmark names usable for scoring in a snapshot.
fn usable_names(snapshot: &PoseSnapshot, thresholds: &Thresholds) -> Vec<&'static str> {
    LANDMARK_NAMES
        .iter()
        .copied()
        .filter(|name| {
            snapshot
                .get(name)
                .map(|l| l.confidence >= thresholds.min_confidence)
                .unwrap_or(false)
        })
        .collect()
}

fn usable<'a>(
    snapshot: &'a PoseSnapshot,
    name: &str,
    thresholds: &Thresholds,
) -> Option<&'a Landmark> {
    snapshot
        .get(name)
        .filter(|l| l.confidence >= thresholds.min_confidence)
}

/// Left/right balance within the user's own snapshot.
///
/// For each usable pair: how unequal the two sides' distances from the body
/// midline are, plus their vertical offset, normalized by body scale.
fn score_symmetry(
    user: &PoseSnapshot,
    thresholds: &Thresholds,
    feedback: &mut Vec<FeedbackItem>,
) -> Option<f32> {
    let names = usable_names(user, thresholds);
    let points: Vec<(f32, f32)> = names
        .iter()
        .filter_map(|n| user.get(n))
        .map(|l| (l.x, l.y))
        .collect();

    let midline_x = midline(user, thresholds, &points);
    let scale = body_scale(&points);

    let mut pair_scores = Vec::new();
    for (label, left_name, right_name) in LANDMARK_PAIRS {
        let (left, right) = match (
            usable(user, left_name, thresholds),
            usable(user, right_name, thresholds),
        ) {
            (Some(l), Some(r)) => (l, r),
            _ => continue,
        };

        let dx = ((left.x - midline_x).abs() - (right.x - midline_x).abs()).abs() / scale;
        let dy = (left.y - right.y).abs() / scale;
        let deviation = dx + dy;
        let score = 10.0 * (1.0 - (deviation / thresholds.symmetry_tolerance).clamp(0.0, 1.0));
        pair_scores.push(score);

        if score < thresholds.high_cutoff {
            feedback.push(FeedbackItem {
                message: format!("Strong left/right imbalance in your {}s", label),
                importance: Importance::High,
                score: Some(score),
            });
        } else if score < thresholds.medium_cutoff {
            feedback.push(FeedbackItem {
                message: format!("Your left and right {} are uneven", label),
                importance: Importance::Medium,
                score: Some(score),
            });
        }
    }

    if pair_scores.is_empty() {
        return None;
    }
    let mean = pair_scores.iter().sum::<f32>() / pair_scores.len() as f32;
    Some(mean.clamp(0.0, 10.0))
}

/// Body midline x: mean of torso and head when visible, otherwise the
/// centroid of all usable landmarks.
fn midline(user: &PoseSnapshot, thresholds: &Thresholds, points: &[(f32, f32)]) -> f32 {
    let anchors: Vec<f32> = ["torso", "head"]
        .iter()
        .filter_map(|n| usable(user, n, thresholds).map(|l| l.x))
        .collect();
    if !anchors.is_empty() {
        return anchors.iter().sum::<f32>() / anchors.len() as f32;
    }
    points.iter().map(|p| p.0).sum::<f32>() / points.len() as f32
}

/// Body scale: the larger extent of the usable-landmark bounding box.
/// Degenerate snapshots fall back to 1.0 to keep deviations finite.
fn body_scale(points: &[(f32, f32)]) -> f32 {
    let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
    let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
    for (x, y) in points {
        min_x = min_x.min(*x);
        max_x = max_x.max(*x);
        min_y = min_y.min(*y);
        max_y = max_y.max(*y);
    }
    let extent = (max_x - min_x).max(max_y - min_y);
    if extent < f32::EPSILON {
        1.0
    } else {
        extent
    }
}

/// Positional match against the reference, normalized for translation and
/// scale over the landmarks both snapshots share.
fn score_alignment(
    user: &PoseSnapshot,
    reference: &PoseSnapshot,
    thresholds: &Thresholds,
    feedback: &mut Vec<FeedbackItem>,
) -> Option<f32> {
    let shared: Vec<&str> = LANDMARK_NAMES
        .iter()
        .copied()
        .filter(|n| usable(user, n, thresholds).is_some() && usable(reference, n, thresholds).is_some())
        .collect();
    if shared.is_empty() {
        return None;
    }

    let user_points: Vec<(f32, f32)> = shared
        .iter()
        .filter_map(|n| user.get(n))
        .map(|l| (l.x, l.y))
        .collect();
    let ref_points: Vec<(f32, f32)> = shared
        .iter()
        .filter_map(|n| reference.get(n))
        .map(|l| (l.x, l.y))
        .collect();

    let user_norm = normalize(&user_points);
    let ref_norm = normalize(&ref_points);

    let mut scores = Vec::with_capacity(shared.len());
    for (i, name) in shared.iter().enumerate() {
        let (ux, uy) = user_norm[i];
        let (rx, ry) = ref_norm[i];
        let deviation = ((ux - rx).powi(2) + (uy - ry).powi(2)).sqrt();
        let score = 10.0 * (1.0 - (deviation / thresholds.alignment_tolerance).clamp(0.0, 1.0));
        scores.push(score);

        let display = name.replace('_', " ");
        if score < thresholds.high_cutoff {
            feedback.push(FeedbackItem {
                message: format!("Your {} is far out of position for this pose", display),
                importance: Importance::High,
                score: Some(score),
            });
        } else if score < thresholds.medium_cutoff {
            feedback.push(FeedbackItem {
                message: format!("Move your {} closer to the reference position", display),
                importance: Importance::Medium,
                score: Some(score),
            });
        }
    }

    let mean = scores.iter().sum::<f32>() / scores.len() as f32;
    Some(mean.clamp(0.0, 10.0))
}

/// Translate to the centroid and scale to unit RMS distance.
fn normalize(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let n = points.len() as f32;
    let cx = points.iter().map(|p| p.0).sum::<f32>() / n;
    let cy = points.iter().map(|p| p.1).sum::<f32>() / n;
    let rms = (points
        .iter()
        .map(|p| (p.0 - cx).powi(2) + (p.1 - cy).powi(2))
        .sum::<f32>()
        / n)
        .sqrt();
    let scale = if rms < f32::EPSILON { 1.0 } else { rms };
    points
        .iter()
        .map(|p| ((p.0 - cx) / scale, (p.1 - cy) / scale))
        .collect()
}

/// Weighted mean over the available sub-scores; indeterminate sub-scores are
/// skipped and the remaining weights renormalized.
fn weighted_total(
    config: &ScoringConfig,
    symmetry: Option<f32>,
    alignment: Option<f32>,
    activation: Option<f32>,
) -> Result<f32, ScoreError> {
    let parts = [
        (config.weights.symmetry, symmetry),
        (config.weights.alignment, alignment),
        (config.weights.activation, activation),
    ];

    let mut weight_sum = 0.0;
    let mut acc = 0.0;
    for (weight, value) in parts {
        if let Some(score) = value {
            weight_sum += weight;
            acc += weight * score;
        }
    }

    if weight_sum <= f32::EPSILON {
        return Err(ScoreError::InsufficientData(
            "every sub-score is indeterminate".to_string(),
        ));
    }
    Ok((acc / weight_sum).clamp(0.0, 10.0))
}
