use std::collections::BTreeMap;

use log::warn;

use crate::decode::DecodedImage;
use crate::error::SceneError;
use crate::meshes::{Shape, ShapeMeshes, Surfaces};
use crate::shader::{ShaderState, UniformBlock, UniformValue};
use crate::texture::{TextureHandle, TextureUploader};

/// One call to [`ShapeMeshes::draw_shape`] with the state bound at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub shape: Shape,
    pub surfaces: Surfaces,
    pub uniforms: UniformBlock,
    pub program_active: bool,
    /// Whether the shape had been loaded before it was drawn.
    pub loaded: bool,
}

/// A texture accepted by [`TextureUploader::upload_texture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub tag: String,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

/// Render device that records every call instead of touching a GPU.
///
/// Drives the headless summary mode and the scene tests.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    uniforms: UniformBlock,
    program_active: bool,
    loaded: Vec<Shape>,
    draws: Vec<DrawRecord>,
    uploads: Vec<UploadRecord>,
    bound: BTreeMap<u32, TextureHandle>,
    released: Vec<TextureHandle>,
    unknown_uniforms: Vec<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// The uniform state as of the last write.
    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    /// Shapes in the order they were first loaded.
    pub fn loaded_shapes(&self) -> &[Shape] {
        &self.loaded
    }

    pub fn uploads(&self) -> &[UploadRecord] {
        &self.uploads
    }

    pub fn bound_unit(&self, unit: u32) -> Option<TextureHandle> {
        self.bound.get(&unit).copied()
    }

    pub fn bound_units(&self) -> Vec<(u32, TextureHandle)> {
        self.bound.iter().map(|(unit, handle)| (*unit, *handle)).collect()
    }

    pub fn released(&self) -> &[TextureHandle] {
        &self.released
    }

    /// Names of uniform writes the shader would not have accepted.
    pub fn unknown_uniforms(&self) -> &[String] {
        &self.unknown_uniforms
    }
}

impl ShaderState for RecordingDevice {
    fn use_program(&mut self) {
        self.program_active = true;
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if !self.uniforms.apply_or_warn(name, value) {
            self.unknown_uniforms.push(name.to_string());
        }
    }
}

impl ShapeMeshes for RecordingDevice {
    fn load_shape(&mut self, shape: Shape) {
        if !self.loaded.contains(&shape) {
            self.loaded.push(shape);
        }
    }

    fn draw_shape(&mut self, shape: Shape, surfaces: Surfaces) {
        let loaded = self.loaded.contains(&shape);
        if !loaded {
            warn!("drawing {shape} before it was loaded");
        }
        self.draws.push(DrawRecord {
            shape,
            surfaces,
            uniforms: self.uniforms.clone(),
            program_active: self.program_active,
            loaded,
        });
    }
}

impl TextureUploader for RecordingDevice {
    fn upload_texture(
        &mut self,
        tag: &str,
        image: &DecodedImage,
    ) -> Result<TextureHandle, SceneError> {
        if image.to_rgba8().is_none() {
            return Err(SceneError::TextureUpload {
                tag: tag.to_string(),
                reason: format!("{} channel(s) cannot be uploaded", image.channels),
            });
        }
        // Handles start at 1 so that 0 never names a live texture.
        let handle = TextureHandle(self.uploads.len() as u32 + 1);
        self.uploads.push(UploadRecord {
            tag: tag.to_string(),
            handle,
            width: image.width,
            height: image.height,
            channels: image.channels,
        });
        Ok(handle)
    }

    fn bind_texture_unit(&mut self, unit: u32, handle: TextureHandle) {
        self.bound.insert(unit, handle);
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        self.bound.retain(|_, bound| *bound != handle);
        self.released.push(handle);
    }
}
