//! Task result storage (`<data_dir>/tasks/<task_id>.json`)
//!
//! One pretty-printed JSON snapshot per task id. Writing the same id again
//! replaces the previous snapshot.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::staging::StagedFile;
use fixbrain_types::{Error, Result, TaskResult};

const MAX_TASK_ID_LEN: usize = 128;

/// Check that a caller-supplied task id is safe to use as a file name
pub fn validate_task_id(task_id: &str) -> Result<()> {
    let valid = !task_id.is_empty()
        && task_id.len() <= MAX_TASK_ID_LEN
        && !task_id.starts_with('.')
        && task_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidTaskId(task_id.to_string()))
    }
}

/// Directory of task result snapshots
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Open the task directory under `data_dir`, creating it if needed
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("tasks");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the snapshot for `task_id`
    pub fn path_for(&self, task_id: &str) -> Result<PathBuf> {
        validate_task_id(task_id)?;
        Ok(self.dir.join(format!("{}.json", task_id)))
    }

    /// Serialize a result to staging; nothing is visible until commit
    pub fn stage(&self, result: &TaskResult) -> Result<StagedFile> {
        let path = self.path_for(&result.task_id)?;
        let content = serde_json::to_vec_pretty(result)?;
        StagedFile::write(path, &content)
    }

    /// Load a stored result
    pub fn load(&self, task_id: &str) -> Result<Option<TaskResult>> {
        let path = self.path_for(task_id)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let result = serde_json::from_reader(reader)?;
        Ok(Some(result))
    }

    /// Ids of all stored results, sorted
    pub fn task_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if validate_task_id(stem).is_ok() {
                        ids.push(stem.to_string());
                    }
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}
