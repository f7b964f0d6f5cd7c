//! Staged writes
//!
//! Files are written under a hidden temporary name in their destination
//! directory and only moved into place by `commit`. Dropping an uncommitted
//! `StagedFile` deletes the temporary file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use fixbrain_types::Result;

/// A file written to a temporary path, waiting to be renamed into place
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    final_path: PathBuf,
}

impl StagedFile {
    /// Write `bytes` next to `final_path` under a temporary name
    pub fn write(final_path: PathBuf, bytes: &[u8]) -> Result<Self> {
        let dir = final_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir)?;

        let mut temp = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        Ok(Self { temp, final_path })
    }

    /// Where the content can be read before commit
    pub fn staged_path(&self) -> &Path {
        self.temp.path()
    }

    /// Where the content lands after commit
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Atomically rename into place, replacing any existing file
    pub fn commit(self) -> Result<PathBuf> {
        let final_path = self.final_path;
        self.temp.persist(&final_path).map_err(|e| e.error)?;
        debug!(path = %final_path.display(), "committed staged file");
        Ok(final_path)
    }
}

/// Staged files committed together
///
/// Files are committed in insertion order. If one rename fails, files already
/// committed by this batch are removed again and the rest are discarded.
#[derive(Debug, Default)]
pub struct WriteBatch {
    staged: Vec<StagedFile>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: StagedFile) {
        self.staged.push(file);
    }

    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut committed = Vec::with_capacity(self.staged.len());

        for file in self.staged {
            match file.commit() {
                Ok(path) => committed.push(path),
                Err(e) => {
                    for path in &committed {
                        if let Err(remove_err) = fs::remove_file(path) {
                            warn!(
                                path = %path.display(),
                                error = %remove_err,
                                "failed to roll back committed file"
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(committed)
    }
}
