use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseCoachError {
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Pose service error: {0}")]
    Service(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("History error: {0}")]
    History(String),
}

impl From<PoseCoachError> for String {
    fn from(err: PoseCoachError) -> Self {
        err.to_string()
    }
}
