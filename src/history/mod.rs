//! Persistent history of scoring sessions.

pub mod store;
pub mod types;

pub use store::SessionHistory;
pub use types::{SessionDetail, SessionSummary};
