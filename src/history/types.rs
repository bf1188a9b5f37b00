//! Types for the scoring session history.

use serde::{Deserialize, Serialize};

use crate::scorer::types::ComparisonResult;

/// Lightweight row for session listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub reference_name: String,
    pub created_at: String,
    pub total_score: f32,
}

/// Full details of one recorded scoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: i64,
    pub reference_name: String,
    /// Category the comparison was scored under, when one was used
    pub category: Option<String>,
    pub created_at: String,
    pub result: ComparisonResult,
}
