pub mod app;
pub mod camera;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod material;
pub mod meshes;
pub mod render;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod transform;
pub mod view;

pub use camera::{Camera, CameraMovement};
pub use decode::{DecodedImage, FileImageSource, ImageSource};
pub use error::SceneError;
pub use input::{InputState, KeyCode, NamedKey};
pub use lighting::LightSource;
pub use material::{Material, MaterialRegistry};
pub use meshes::{Shape, ShapeMeshes, Surfaces};
pub use render::{GpuDevice, RecordingDevice};
pub use scene::SceneComposer;
pub use shader::{ShaderState, UniformBlock, UniformValue};
pub use texture::{TextureHandle, TextureRegistry, TextureUploader};
pub use transform::Transform;
pub use view::{ProjectionMode, ViewComposer};
