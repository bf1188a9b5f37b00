//! Wire types for the DensePose analysis service.

use serde::{Deserialize, Deserializer};

/// Response body of `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub num_instances: usize,
    #[serde(default)]
    pub instances: Vec<InstanceResult>,
    /// Set instead of instances when the model produced no predictions.
    #[serde(default)]
    pub error: Option<String>,
}

/// One detected person instance.
#[derive(Debug, Deserialize)]
pub struct InstanceResult {
    /// Fine body-part segmentation grid; cell values are DensePose part ids
    /// (0 = background, 1-24 = body parts). Row-major, sized to the bbox.
    #[serde(deserialize_with = "de_part_grid")]
    pub body_parts: Vec<Vec<u8>>,
    /// U surface coordinates per cell, same shape as `body_parts`.
    #[serde(default, deserialize_with = "de_coord_grid")]
    pub u_coordinates: Vec<Vec<f32>>,
    /// V surface coordinates per cell, same shape as `body_parts`.
    #[serde(default, deserialize_with = "de_coord_grid")]
    pub v_coordinates: Vec<Vec<f32>>,
    /// Detection bounding box `[x1, y1, x2, y2]` in image pixels.
    pub bbox: Vec<f32>,
    /// Detection confidence (0.0 - 1.0).
    pub score: f32,
}

/// The service serializes its tensors with `tolist()`, so each grid arrives
/// either as a plain 2-D list or wrapped in a batch-of-one outer list, and
/// cell values may be integers or floats.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NestedGrid {
    Flat(Vec<Vec<f64>>),
    Batched(Vec<Vec<Vec<f64>>>),
}

impl NestedGrid {
    fn into_flat(self) -> Vec<Vec<f64>> {
        match self {
            NestedGrid::Flat(grid) => grid,
            NestedGrid::Batched(mut batch) => {
                if batch.is_empty() {
                    Vec::new()
                } else {
                    batch.swap_remove(0)
                }
            }
        }
    }
}

fn de_part_grid<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let grid = NestedGrid::deserialize(deserializer)?.into_flat();
    Ok(grid
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|v| v.round().clamp(0.0, 255.0) as u8)
                .collect()
        })
        .collect())
}

fn de_coord_grid<'de, D>(deserializer: D) -> Result<Vec<Vec<f32>>, D::Error>
where
    D: Deserializer<'de>,
{
    let grid = NestedGrid::deserialize(deserializer)?.into_flat();
    Ok(grid
        .into_iter()
        .map(|row| row.into_iter().map(|v| v as f32).collect())
        .collect())
}

/// Response body of `GET /health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Map a DensePose fine-segmentation part id to a canonical landmark name.
///
/// Part ids follow the DensePose 24-part chart; front/back charts of the same
/// body region collapse onto one landmark. Returns `None` for background (0)
/// and out-of-range ids.
pub fn part_id_to_landmark(part_id: u8) -> Option<&'static str> {
    match part_id {
        1 | 2 => Some("torso"),
        3 => Some("right_hand"),
        4 => Some("left_hand"),
        5 => Some("left_foot"),
        6 => Some("right_foot"),
        7 | 9 => Some("right_upper_leg"),
        8 | 10 => Some("left_upper_leg"),
        11 | 13 => Some("right_lower_leg"),
        12 | 14 => Some("left_lower_leg"),
        15 | 17 => Some("left_upper_arm"),
        16 | 18 => Some("right_upper_arm"),
        19 | 21 => Some("left_lower_arm"),
        20 | 22 => Some("right_lower_arm"),
        23 | 24 => Some("head"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::types::LANDMARK_NAMES;

    #[test]
    fn test_background_and_unknown_ids_unmapped() {
        assert!(part_id_to_landmark(0).is_none());
        assert!(part_id_to_landmark(25).is_none());
        assert!(part_id_to_landmark(255).is_none());
    }

    #[test]
    fn test_every_part_id_maps_to_canonical_landmark() {
        for id in 1..=24u8 {
            let name = part_id_to_landmark(id)
                .unwrap_or_else(|| panic!("part id {} unmapped", id));
            assert!(LANDMARK_NAMES.contains(&name), "unknown landmark {}", name);
        }
    }

    #[test]
    fn test_front_back_charts_collapse() {
        assert_eq!(part_id_to_landmark(1), part_id_to_landmark(2));
        assert_eq!(part_id_to_landmark(7), part_id_to_landmark(9));
        assert_eq!(part_id_to_landmark(23), part_id_to_landmark(24));
    }

    #[test]
    fn test_analyze_response_deserializes() {
        let json = r#"{
            "num_instances": 1,
            "instances": [{
                "body_parts": [[0, 1], [2, 0]],
                "u_coordinates": [[0.0, 0.5], [0.5, 0.0]],
                "v_coordinates": [[0.0, 0.5], [0.5, 0.0]],
                "bbox": [10.0, 20.0, 110.0, 220.0],
                "score": 0.97
            }]
        }"#;
        let resp: AnalyzeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.num_instances, 1);
        assert_eq!(resp.instances[0].body_parts[0][1], 1);
        assert_eq!(resp.instances[0].bbox, vec![10.0, 20.0, 110.0, 220.0]);
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_batched_tensor_grids_deserialize() {
        // The live service returns `tensor.tolist()` output: every grid is
        // wrapped in a batch-of-one outer list and u/v cells are floats.
        let json = r#"{
            "num_instances": 1,
            "instances": [{
                "body_parts": [[[0, 1], [2, 0]]],
                "u_coordinates": [[[0.0, 0.5], [0.5, 0.0]]],
                "v_coordinates": [[[0.0, 0.5], [0.5, 0.0]]],
                "bbox": [50.0, 50.0, 200.0, 400.0],
                "score": 0.98
            }]
        }"#;
        let resp: AnalyzeResponse = serde_json::from_str(json).unwrap();
        let inst = &resp.instances[0];
        assert_eq!(inst.body_parts, vec![vec![0, 1], vec![2, 0]]);
        assert_eq!(inst.u_coordinates[0][1], 0.5);
        assert_eq!(inst.v_coordinates[1][0], 0.5);
        assert_eq!(inst.bbox, vec![50.0, 50.0, 200.0, 400.0]);
    }

    #[test]
    fn test_float_part_ids_round_to_u8() {
        let json = r#"{
            "body_parts": [[[1.0, 23.0], [0.0, 2.0]]],
            "bbox": [0.0, 0.0, 2.0, 2.0],
            "score": 0.9
        }"#;
        let inst: InstanceResult = serde_json::from_str(json).unwrap();
        assert_eq!(inst.body_parts, vec![vec![1, 23], vec![0, 2]]);
        assert!(inst.u_coordinates.is_empty());
    }

    #[test]
    fn test_error_response_deserializes() {
        let json = r#"{"error": "No DensePose predictions available for this image"}"#;
        let resp: AnalyzeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.num_instances, 0);
        assert!(resp.instances.is_empty());
        assert!(resp.error.is_some());
    }
}
