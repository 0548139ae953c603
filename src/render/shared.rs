use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::lighting::{LightSource, MAX_LIGHTS};
use crate::shader::{MaterialState, UniformBlock};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct MaterialUniform {
    ambient_color: [f32; 3],
    ambient_strength: f32,
    diffuse_color: [f32; 3],
    _pad0: f32,
    specular_color: [f32; 3],
    shininess: f32,
}

impl From<&MaterialState> for MaterialUniform {
    fn from(material: &MaterialState) -> Self {
        Self {
            ambient_color: material.ambient_color.into(),
            ambient_strength: material.ambient_strength,
            diffuse_color: material.diffuse_color.into(),
            _pad0: 0.0,
            specular_color: material.specular_color.into(),
            shininess: material.shininess,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct LightUniform {
    position: [f32; 3],
    focal_strength: f32,
    ambient_color: [f32; 3],
    specular_intensity: f32,
    diffuse_color: [f32; 3],
    is_directional: u32,
    specular_color: [f32; 3],
    _pad0: f32,
}

impl From<&LightSource> for LightUniform {
    fn from(light: &LightSource) -> Self {
        Self {
            position: light.position.into(),
            focal_strength: light.focal_strength,
            ambient_color: light.ambient_color.into(),
            specular_intensity: light.specular_intensity,
            diffuse_color: light.diffuse_color.into(),
            is_directional: light.is_directional as u32,
            specular_color: light.specular_color.into(),
            _pad0: 0.0,
        }
    }
}

/// Per-frame camera and light state, bound at group 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct FrameUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_position: [f32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniform {
    pub(crate) fn from_block(block: &UniformBlock) -> Self {
        Self {
            view: block.view.to_cols_array_2d(),
            projection: block.projection.to_cols_array_2d(),
            view_position: block.view_position.extend(1.0).into(),
            lights: block.lights.each_ref().map(LightUniform::from),
        }
    }
}

/// Per-draw transform and shading state, bound at group 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
    uv_scale: [f32; 2],
    use_texture: u32,
    use_lighting: u32,
    material: MaterialUniform,
}

impl ObjectUniform {
    /// Snapshots the per-draw part of `block`. Texturing is switched off
    /// when no texture unit is selected.
    pub(crate) fn from_block(block: &UniformBlock) -> Self {
        let normal = Mat4::from_mat3(normal_matrix(block.model));
        Self {
            model: block.model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: block.object_color.into(),
            uv_scale: block.uv_scale.into(),
            use_texture: (block.use_texture && block.object_texture >= 0) as u32,
            use_lighting: block.use_lighting as u32,
            material: MaterialUniform::from(&block.material),
        }
    }
}

/// Inverse-transpose of the model's upper 3x3; identity for degenerate
/// (zero-scale) transforms.
pub(crate) fn normal_matrix(model: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(model);
    if linear.determinant().abs() <= f32::EPSILON {
        Mat3::IDENTITY
    } else {
        linear.inverse().transpose()
    }
}

/// Phong program reading the uniform layouts above.
pub(crate) const SHADER: &str = r#"
struct Material {
    ambient_color: vec3<f32>,
    ambient_strength: f32,
    diffuse_color: vec3<f32>,
    specular_color: vec3<f32>,
    shininess: f32,
}

struct Light {
    position: vec3<f32>,
    focal_strength: f32,
    ambient_color: vec3<f32>,
    specular_intensity: f32,
    diffuse_color: vec3<f32>,
    is_directional: u32,
    specular_color: vec3<f32>,
}

struct FrameUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_position: vec4<f32>,
    lights: array<Light, 4>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
    color: vec4<f32>,
    uv_scale: vec2<f32>,
    use_texture: u32,
    use_lighting: u32,
    material: Material,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

@group(2) @binding(0)
var object_texture: texture_2d<f32>;
@group(2) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = frame.projection * frame.view * world_position;
    out.world_pos = world_position.xyz;
    out.normal = normalize((object.normal * vec4<f32>(input.normal, 0.0)).xyz);
    out.uv = input.uv * object.uv_scale;
    return out;
}

fn shade(light: Light, normal: vec3<f32>, world_pos: vec3<f32>, view_dir: vec3<f32>) -> vec3<f32> {
    var light_dir: vec3<f32>;
    var attenuation = 1.0;
    if light.is_directional != 0u {
        light_dir = normalize(-light.position);
    } else {
        let to_light = light.position - world_pos;
        let dist = length(to_light);
        light_dir = to_light / max(dist, 0.0001);
        attenuation = 1.0 / (1.0 + dist / max(light.focal_strength, 0.0001));
    }

    let material = object.material;
    let ambient = light.ambient_color * material.ambient_color * material.ambient_strength;
    let diffuse = max(dot(normal, light_dir), 0.0) * light.diffuse_color * material.diffuse_color;

    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), max(material.shininess, 1.0));
    let specular = light.specular_intensity * spec * light.specular_color * material.specular_color;

    return ambient + attenuation * (diffuse + specular);
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(object_texture, object_sampler, input.uv);
    var base = object.color;
    if object.use_texture != 0u {
        base = sampled;
    }
    if object.use_lighting == 0u {
        return base;
    }

    let normal = normalize(input.normal);
    let view_dir = normalize(frame.view_position.xyz - input.world_pos);
    var lighting = vec3<f32>(0.0);
    for (var i = 0u; i < 4u; i = i + 1u) {
        lighting = lighting + shade(frame.lights[i], normal, input.world_pos, view_dir);
    }
    return vec4<f32>(lighting * base.rgb, base.a);
}
"#;

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use glam::{Vec3, Vec4};

    use super::*;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(size_of::<MaterialUniform>(), 48);
        assert_eq!(size_of::<LightUniform>(), 64);
        assert_eq!(size_of::<FrameUniform>(), 400);
        assert_eq!(size_of::<ObjectUniform>(), 208);
    }

    #[test]
    fn texturing_requires_a_selected_unit() {
        let mut block = UniformBlock {
            use_texture: true,
            ..UniformBlock::default()
        };
        assert_eq!(ObjectUniform::from_block(&block).use_texture, 0);
        block.object_texture = 1;
        assert_eq!(ObjectUniform::from_block(&block).use_texture, 1);
        block.object_color = Vec4::new(0.1, 0.2, 0.3, 1.0);
        assert_eq!(ObjectUniform::from_block(&block).color, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let normal = normal_matrix(model) * Vec3::new(1.0, 1.0, 0.0);
        assert!(normal.abs_diff_eq(Vec3::new(0.25, 1.0, 0.0), 1e-6));
        assert_eq!(normal_matrix(Mat4::from_scale(Vec3::ZERO)), Mat3::IDENTITY);
    }
}
