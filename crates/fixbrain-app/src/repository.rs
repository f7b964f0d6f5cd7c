//! Storage adapters for the configured data directory

use fixbrain_store::{ImageStore, TaskStore};
use fixbrain_types::Result;

use crate::config::Config;

/// Open image storage under the configured data directory
pub fn open_image_store(config: &Config) -> Result<ImageStore> {
    ImageStore::open(&config.data_dir)
}

/// Open task result storage under the configured data directory
pub fn open_task_store(config: &Config) -> Result<TaskStore> {
    TaskStore::open(&config.data_dir)
}
