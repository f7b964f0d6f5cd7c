//! Persistent file storage for uploaded images and task results
//!
//! Layout under the data directory:
//! - `images/<hex>.jpg`
//! - `tasks/<task_id>.json`

pub mod images;
pub mod staging;
pub mod tasks;

pub use images::{ImageStore, StagedImage};
pub use staging::{StagedFile, WriteBatch};
pub use tasks::{validate_task_id, TaskStore};
