//! Types for the reference pose catalog.

use serde::{Deserialize, Serialize};

use crate::scorer::types::PoseSnapshot;

/// A stored reference pose: a named snapshot to compare user poses against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePose {
    pub id: i64,
    /// Unique human-readable name, e.g. "front_double_biceps_open"
    pub name: String,
    /// Pose category id used to pick scoring thresholds
    pub category: String,
    /// Athlete the reference was captured from, when known
    pub athlete: Option<String>,
    pub snapshot: PoseSnapshot,
    /// Where the pose came from (file path or "capture")
    pub source: String,
    /// RFC 3339 timestamp of insertion
    pub created_at: String,
}

/// Result from catalog search with match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseMatch {
    pub pose: ReferencePose,
    pub score: f32,
}

/// On-disk JSON format of an importable reference pose file.
#[derive(Debug, Deserialize)]
pub struct ReferencePoseFile {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub athlete: Option<String>,
    #[serde(flatten)]
    pub snapshot: PoseSnapshot,
}
