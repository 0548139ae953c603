use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while preparing the scene or the display window.
///
/// Lookup misses (unknown texture or material tags) are not errors; they
/// surface as `None` from the registries.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {} has {channels} channel(s); only RGB and RGBA are supported", path.display())]
    UnsupportedChannelLayout { path: PathBuf, channels: u8 },

    #[error("texture tag {0:?} is already registered")]
    DuplicateTextureTag(String),

    #[error("all {0} texture units are in use")]
    TextureUnitsExhausted(usize),

    #[error("failed to upload texture {tag:?}: {reason}")]
    TextureUpload { tag: String, reason: String },

    #[error("failed to create display window: {0}")]
    WindowCreation(String),
}
