//! HTTP client for the DensePose analysis service.

use std::time::Duration;

use tracing::{error, info};
use url::Url;

use crate::error::PoseCoachError;
use crate::scorer::types::PoseSnapshot;

use super::extract::snapshot_from_instance;
use super::image::prepare_image;
use super::types::{AnalyzeResponse, HealthResponse};

/// Default base URL of a locally running pose service.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Client for the pose analysis service.
///
/// The service runs model inference per request, so the timeout is generous
/// compared to a typical JSON API.
pub struct DensePoseClient {
    client: reqwest::Client,
    base_url: Url,
}

impl DensePoseClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, PoseCoachError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PoseCoachError::Service(format!("Invalid service URL '{}': {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PoseCoachError::Service(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Check that the service is up and responding.
    pub async fn health(&self) -> Result<bool, PoseCoachError> {
        let url = self.join("health")?;
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| PoseCoachError::Service(format!("Health check failed: {}", e)))?;

        let body = handle_service_response(response).await?;
        let health: HealthResponse = serde_json::from_str(&body)
            .map_err(|e| PoseCoachError::Service(format!("Failed to parse health response: {}", e)))?;
        Ok(health.status == "ok")
    }

    /// Run DensePose analysis on a base64-encoded JPEG.
    pub async fn analyze(&self, image_base64: &str) -> Result<AnalyzeResponse, PoseCoachError> {
        let url = self.join("analyze")?;
        let payload = serde_json::json!({ "image": image_base64 });

        info!("Submitting image to pose service");
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Pose service request failed: {}", e);
                error!("{}", msg);
                PoseCoachError::Service(msg)
            })?;

        let body = handle_service_response(response).await?;
        let parsed: AnalyzeResponse = serde_json::from_str(&body).map_err(|e| {
            PoseCoachError::Service(format!("Failed to parse analyze response: {}", e))
        })?;

        if let Some(err) = &parsed.error {
            return Err(PoseCoachError::Service(err.clone()));
        }
        info!("Pose service returned {} instance(s)", parsed.num_instances);
        Ok(parsed)
    }

    /// Full pipeline: prepare raw image bytes, analyze, and extract a pose
    /// snapshot from the highest-scoring detected instance.
    pub async fn detect_pose(&self, image_bytes: &[u8]) -> Result<PoseSnapshot, PoseCoachError> {
        let encoded = prepare_image(image_bytes)?;
        let analysis = self.analyze(&encoded).await?;

        let best = analysis
            .instances
            .iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| {
                PoseCoachError::Service("No person detected in the image".to_string())
            })?;

        snapshot_from_instance(best)
    }

    fn join(&self, path: &str) -> Result<Url, PoseCoachError> {
        self.base_url
            .join(path)
            .map_err(|e| PoseCoachError::Service(format!("Invalid service path '{}': {}", path, e)))
    }
}

/// Check status and extract body text, truncating large error bodies.
async fn handle_service_response(response: reqwest::Response) -> Result<String, PoseCoachError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let msg = format!(
            "Pose service returned {}: {}",
            status.as_u16(),
            truncate_body(body, 1024)
        );
        error!("{}", msg);
        return Err(PoseCoachError::Service(msg));
    }

    response
        .text()
        .await
        .map_err(|e| PoseCoachError::Service(format!("Failed to read response body: {}", e)))
}

/// Truncate an error body to at most `max` bytes, backing up to a char
/// boundary so multi-byte UTF-8 text never splits mid-character.
fn truncate_body(body: String, max: usize) -> String {
    if body.len() <= max {
        return body;
    }
    let mut cut = max;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(DensePoseClient::new("not a url").is_err());
        assert!(DensePoseClient::new("http://localhost:5000").is_ok());
    }

    #[test]
    fn test_join_builds_endpoint_urls() {
        let client = DensePoseClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.join("analyze").unwrap().as_str(),
            "http://localhost:5000/analyze"
        );
        assert_eq!(
            client.join("health").unwrap().as_str(),
            "http://localhost:5000/health"
        );
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // 3-byte chars, so 1024 falls mid-character (1024 % 3 != 0).
        let body = "…".repeat(400);
        assert_eq!(body.len(), 1200);
        let truncated = truncate_body(body, 1024);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 1024 + 3);
        assert!(truncated.trim_end_matches("...").chars().all(|c| c == '…'));
    }

    #[test]
    fn test_truncate_body_leaves_short_bodies_alone() {
        let body = "model not loaded".to_string();
        assert_eq!(truncate_body(body.clone(), 1024), body);
    }
}
