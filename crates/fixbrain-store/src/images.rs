//! Uploaded image storage (`<data_dir>/images/<hex>.jpg`)

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::staging::StagedFile;
use fixbrain_types::Result;

/// Extension every stored image gets, regardless of the uploaded format
pub const IMAGE_EXTENSION: &str = "jpg";

/// Image written to staging, with its generated identifier and content hash
#[derive(Debug)]
pub struct StagedImage {
    pub image_id: String,
    pub sha256: String,
    pub file: StagedFile,
}

impl StagedImage {
    pub fn final_path(&self) -> &Path {
        self.file.final_path()
    }
}

/// Directory of uploaded images
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the image directory under `data_dir`, creating it if needed
    pub fn open(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("images");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Compute hex SHA256 of image bytes
    pub fn hash_bytes(bytes: &[u8]) -> String {
        let hash = Sha256::digest(bytes);
        format!("{:x}", hash)
    }

    /// Stage image bytes under a freshly generated random identifier
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedImage> {
        let image_id = Uuid::new_v4().simple().to_string();
        let final_path = self.dir.join(format!("{}.{}", image_id, IMAGE_EXTENSION));
        let file = StagedFile::write(final_path, bytes)?;

        Ok(StagedImage {
            image_id,
            sha256: Self::hash_bytes(bytes),
            file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_stage_generates_hex_jpg_name() {
        let dir = tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let staged = store.stage(b"\xff\xd8\xff").unwrap();
        assert_eq!(staged.image_id.len(), 32);
        assert!(staged.image_id.chars().all(|c| c.is_ascii_hexdigit()));

        let path = staged.file.commit().unwrap();
        assert_eq!(path.parent().unwrap(), dir.path().join("images"));
        assert_eq!(path.extension().unwrap(), "jpg");
        assert_eq!(fs::read(path).unwrap(), b"\xff\xd8\xff");
    }

    #[test]
    fn test_ids_are_unique() {
        let dir = tempdir().unwrap();
        let store = ImageStore::open(dir.path()).unwrap();

        let a = store.stage(b"same").unwrap();
        let b = store.stage(b"same").unwrap();
        assert_ne!(a.image_id, b.image_id);
        assert_eq!(a.sha256, b.sha256);
    }

    #[test]
    fn test_hash_bytes() {
        assert_eq!(
            ImageStore::hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
