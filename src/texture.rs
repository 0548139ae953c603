use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::decode::{DecodedImage, ImageSource};
use crate::error::SceneError;

/// Number of simultaneously bindable texture units.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// Opaque identifier of a texture uploaded to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Uploads decoded images and binds them to texture units.
pub trait TextureUploader {
    /// Uploads an RGB or RGBA image with repeat wrapping, linear filtering
    /// and a full mip chain.
    fn upload_texture(
        &mut self,
        tag: &str,
        image: &DecodedImage,
    ) -> Result<TextureHandle, SceneError>;

    fn bind_texture_unit(&mut self, unit: u32, handle: TextureHandle);

    fn release_texture(&mut self, handle: TextureHandle);
}

/// A loaded texture and the tag scene code refers to it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub tag: String,
    pub handle: TextureHandle,
}

/// Ordered registry of scene textures; entry `i` lives on texture unit `i`.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `path`, uploads it and registers it under `tag`.
    ///
    /// Returns the slot (and texture unit) assigned to the texture. On
    /// failure the registry is left unchanged.
    pub fn load<I, U>(
        &mut self,
        images: &I,
        gpu: &mut U,
        path: &Path,
        tag: &str,
    ) -> Result<usize, SceneError>
    where
        I: ImageSource + ?Sized,
        U: TextureUploader + ?Sized,
    {
        if self.entries.len() >= MAX_TEXTURE_UNITS {
            return Err(SceneError::TextureUnitsExhausted(MAX_TEXTURE_UNITS));
        }
        if self.find_slot(tag).is_some() {
            return Err(SceneError::DuplicateTextureTag(tag.to_string()));
        }

        let image = images.load(path).inspect_err(|err| {
            error!("could not load image {}: {err}", path.display());
        })?;
        if !matches!(image.channels, 3 | 4) {
            error!(
                "not implemented to handle image {} with {} channels",
                path.display(),
                image.channels
            );
            return Err(SceneError::UnsupportedChannelLayout {
                path: path.to_path_buf(),
                channels: image.channels,
            });
        }

        let handle = gpu.upload_texture(tag, &image)?;
        info!(
            "loaded image {} as {tag:?} ({}x{}, {} channels)",
            path.display(),
            image.width,
            image.height,
            image.channels
        );

        self.entries.push(TextureEntry {
            tag: tag.to_string(),
            handle,
        });
        Ok(self.entries.len() - 1)
    }

    /// Binds every registered texture to the unit matching its slot.
    pub fn bind_all<U>(&self, gpu: &mut U)
    where
        U: TextureUploader + ?Sized,
    {
        for (unit, entry) in self.entries.iter().enumerate() {
            gpu.bind_texture_unit(unit as u32, entry.handle);
        }
    }

    pub fn find_handle(&self, tag: &str) -> Option<TextureHandle> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.handle)
    }

    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.tag == tag)
    }

    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Releases every uploaded texture and empties the registry.
    pub fn release_all<U>(&mut self, gpu: &mut U)
    where
        U: TextureUploader + ?Sized,
    {
        for entry in self.entries.drain(..) {
            gpu.release_texture(entry.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;
    use crate::render::RecordingDevice;

    #[derive(Default)]
    struct MemoryImages {
        files: HashMap<PathBuf, DecodedImage>,
    }

    impl MemoryImages {
        fn with(mut self, name: &str, channels: u8) -> Self {
            let image = DecodedImage {
                pixels: vec![128; 4 * channels as usize],
                width: 2,
                height: 2,
                channels,
            };
            self.files.insert(PathBuf::from(name), image);
            self
        }
    }

    impl ImageSource for MemoryImages {
        fn load(&self, path: &Path) -> Result<DecodedImage, SceneError> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| SceneError::ImageDecode {
                    path: path.to_path_buf(),
                    source: image::ImageError::IoError(std::io::Error::from(
                        std::io::ErrorKind::NotFound,
                    )),
                })
        }
    }

    #[test]
    fn slots_follow_registration_order() {
        let tags: Vec<String> = (0..MAX_TEXTURE_UNITS).map(|i| format!("tex{i}")).collect();
        let images = tags
            .iter()
            .fold(MemoryImages::default(), |images, tag| images.with(tag, 4));
        let mut gpu = RecordingDevice::new();
        let mut registry = TextureRegistry::new();

        for (i, tag) in tags.iter().enumerate() {
            let slot = registry
                .load(&images, &mut gpu, Path::new(tag), tag)
                .unwrap();
            assert_eq!(slot, i);
        }
        for (i, tag) in tags.iter().enumerate() {
            assert_eq!(registry.find_slot(tag), Some(i));
        }
        let mut handles: Vec<_> = tags
            .iter()
            .map(|tag| registry.find_handle(tag).unwrap())
            .collect();
        handles.sort();
        handles.dedup();
        assert_eq!(handles.len(), MAX_TEXTURE_UNITS);
    }

    #[test]
    fn lookups_on_empty_registry_are_absent() {
        let registry = TextureRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.find_slot("Leaves1"), None);
        assert_eq!(registry.find_handle("Leaves1"), None);
    }

    #[test]
    fn decode_failure_leaves_registry_unchanged() {
        let images = MemoryImages::default().with("a.png", 3);
        let mut gpu = RecordingDevice::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&images, &mut gpu, Path::new("a.png"), "A")
            .unwrap();

        let err = registry
            .load(&images, &mut gpu, Path::new("missing.png"), "B")
            .unwrap_err();
        assert!(matches!(err, SceneError::ImageDecode { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_slot("B"), None);
    }

    #[test]
    fn rejects_unsupported_channel_layouts() {
        let images = MemoryImages::default().with("gray.png", 1).with("ga.png", 2);
        let mut gpu = RecordingDevice::new();
        let mut registry = TextureRegistry::new();
        for (name, channels) in [("gray.png", 1), ("ga.png", 2)] {
            let err = registry
                .load(&images, &mut gpu, Path::new(name), name)
                .unwrap_err();
            assert!(
                matches!(err, SceneError::UnsupportedChannelLayout { channels: c, .. } if c == channels)
            );
        }
        assert!(registry.is_empty());
        assert!(gpu.uploads().is_empty());
    }

    #[test]
    fn rejects_duplicate_tags_and_overflow() {
        let images = (0..=MAX_TEXTURE_UNITS)
            .fold(MemoryImages::default(), |images, i| {
                images.with(&format!("{i}.png"), 4)
            });
        let mut gpu = RecordingDevice::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&images, &mut gpu, Path::new("0.png"), "same")
            .unwrap();
        let err = registry
            .load(&images, &mut gpu, Path::new("1.png"), "same")
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateTextureTag(_)));

        for i in 1..MAX_TEXTURE_UNITS {
            let name = format!("{i}.png");
            registry
                .load(&images, &mut gpu, Path::new(&name), &name)
                .unwrap();
        }
        let name = format!("{MAX_TEXTURE_UNITS}.png");
        let err = registry
            .load(&images, &mut gpu, Path::new(&name), &name)
            .unwrap_err();
        assert!(matches!(err, SceneError::TextureUnitsExhausted(16)));
        assert_eq!(registry.len(), MAX_TEXTURE_UNITS);
    }

    #[test]
    fn bind_all_and_release_all() {
        let images = MemoryImages::default().with("a.png", 4).with("b.png", 3);
        let mut gpu = RecordingDevice::new();
        let mut registry = TextureRegistry::new();
        registry
            .load(&images, &mut gpu, Path::new("a.png"), "A")
            .unwrap();
        registry
            .load(&images, &mut gpu, Path::new("b.png"), "B")
            .unwrap();
        registry.bind_all(&mut gpu);
        assert_eq!(gpu.bound_unit(0), registry.find_handle("A"));
        assert_eq!(gpu.bound_unit(1), registry.find_handle("B"));
        assert_eq!(gpu.bound_unit(2), None);

        registry.release_all(&mut gpu);
        assert!(registry.is_empty());
        assert_eq!(gpu.released().len(), 2);
        assert_eq!(gpu.bound_unit(0), None);
    }
}
