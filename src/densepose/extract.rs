//! Landmark extraction from DensePose segmentation output.
//!
//! The service returns a per-instance body-part grid sized to the detection
//! bbox. Each landmark becomes the pixel centroid of its body-part region in
//! image coordinates, with a confidence derived from the detection score and
//! the region's pixel coverage.

use std::collections::HashMap;

use tracing::debug;

use crate::error::PoseCoachError;
use crate::scorer::types::{Landmark, PoseSnapshot};

use super::types::{part_id_to_landmark, InstanceResult};

/// Convert one detected instance into a pose snapshot.
///
/// Body parts with no pixels simply produce no landmark. Confidence per
/// landmark is `score * (0.5 + 0.5 * pixels / max_pixels)`, so sparsely
/// visible parts rank below well-covered ones of the same detection.
pub fn snapshot_from_instance(instance: &InstanceResult) -> Result<PoseSnapshot, PoseCoachError> {
    if instance.bbox.len() != 4 {
        return Err(PoseCoachError::Service(format!(
            "Malformed bbox from pose service: expected 4 values, got {}",
            instance.bbox.len()
        )));
    }
    let (x1, y1, x2, y2) = (
        instance.bbox[0],
        instance.bbox[1],
        instance.bbox[2],
        instance.bbox[3],
    );
    if !(x2 > x1 && y2 > y1) {
        return Err(PoseCoachError::Service(format!(
            "Degenerate bbox from pose service: [{}, {}, {}, {}]",
            x1, y1, x2, y2
        )));
    }

    let rows = instance.body_parts.len();
    if rows == 0 {
        return Ok(PoseSnapshot::default());
    }
    let cols = instance.body_parts[0].len();
    if cols == 0 || instance.body_parts.iter().any(|r| r.len() != cols) {
        return Err(PoseCoachError::Service(
            "Ragged body-part grid from pose service".to_string(),
        ));
    }

    let cell_w = (x2 - x1) / cols as f32;
    let cell_h = (y2 - y1) / rows as f32;

    // Accumulate pixel centroids per landmark in image coordinates
    let mut sums: HashMap<&'static str, (f32, f32, u32)> = HashMap::new();
    for (row, cells) in instance.body_parts.iter().enumerate() {
        for (col, part_id) in cells.iter().enumerate() {
            let Some(name) = part_id_to_landmark(*part_id) else {
                continue;
            };
            let px = x1 + (col as f32 + 0.5) * cell_w;
            let py = y1 + (row as f32 + 0.5) * cell_h;
            let entry = sums.entry(name).or_insert((0.0, 0.0, 0));
            entry.0 += px;
            entry.1 += py;
            entry.2 += 1;
        }
    }

    let max_pixels = sums.values().map(|(_, _, n)| *n).max().unwrap_or(0);
    if max_pixels == 0 {
        debug!("instance had only background pixels");
        return Ok(PoseSnapshot::default());
    }

    let score = instance.score.clamp(0.0, 1.0);
    let mut landmarks = Vec::with_capacity(sums.len());
    // Iterate canonical order so snapshots are deterministic
    for name in crate::scorer::types::LANDMARK_NAMES {
        let Some((sx, sy, n)) = sums.get(name) else {
            continue;
        };
        let coverage = *n as f32 / max_pixels as f32;
        let confidence = (score * (0.5 + 0.5 * coverage)).clamp(0.0, 1.0);
        landmarks.push(Landmark::new(
            *name,
            sx / *n as f32,
            sy / *n as f32,
            confidence,
        ));
    }

    debug!(
        "extracted {} landmarks from instance (score {:.2})",
        landmarks.len(),
        score
    );
    Ok(PoseSnapshot::new(landmarks))
}
