//! Perception - structured scene information from an appliance photo

use std::path::Path;

use fixbrain_types::{DetectedObject, Result, SceneDescription};

/// Extracts a scene description from an image
///
/// Implementations may read the image at `image_path`; the file exists for
/// the duration of the call.
pub trait Perception: Send + Sync {
    fn analyze(&self, image_path: &Path, appliance_type: &str) -> Result<SceneDescription>;
}

/// Placeholder perception: ignores the image and returns a fixed scene
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPerception;

impl Perception for StubPerception {
    fn analyze(&self, _image_path: &Path, appliance_type: &str) -> Result<SceneDescription> {
        Ok(SceneDescription {
            appliance: appliance_type.to_string(),
            objects: vec![DetectedObject {
                label: "pipe".to_string(),
                confidence: 0.8,
                bbox: [100, 120, 200, 260],
            }],
            notes: vec!["Perception is stubbed; this is placeholder data.".to_string()],
        })
    }
}
