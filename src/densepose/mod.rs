//! Landmark acquisition via the DensePose analysis service.
//!
//! Pipeline: raw image bytes -> resize/encode (`image`) -> `POST /analyze`
//! (`client`) -> body-part segmentation -> landmark centroids (`extract`) ->
//! `PoseSnapshot` ready for scoring.

pub mod client;
pub mod extract;
pub mod image;
pub mod types;

pub use client::{DensePoseClient, DEFAULT_SERVICE_URL};
pub use extract::snapshot_from_instance;
pub use image::prepare_image;
pub use types::{AnalyzeResponse, InstanceResult};
