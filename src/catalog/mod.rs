//! Reference pose catalog: named snapshots to compare user poses against.
//!
//! Backed by SQLite. Poses arrive either from JSON files on disk
//! (`import_dir`) or from live captures run through the pose service.

pub mod store;
pub mod types;

pub use store::ReferenceCatalog;
pub use types::{PoseMatch, ReferencePose};
