use glam::{Mat4, Vec2, Vec3, Vec4};
use log::warn;

use crate::lighting::{LightSource, MAX_LIGHTS};

/// A typed value bound to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
    Vec3(Vec3),
    Vec2(Vec2),
    Float(f32),
    Int(i32),
    Bool(bool),
    Sampler2D(i32),
}

/// Receives all per-draw shader state.
///
/// Scene code addresses uniforms by the names the fragment shader declares
/// (`model`, `material.shininess`, `lightSources[1].diffuseColor`, ...).
/// Devices mirror those values into a [`UniformBlock`] and snapshot it at
/// every draw call.
pub trait ShaderState {
    /// Activates the shader program for subsequent uniform writes.
    fn use_program(&mut self);

    /// Binds a value to the named uniform.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    /// Points a sampler at a texture unit; `-1` leaves it unbound.
    fn set_sampler2d(&mut self, name: &str, unit: i32) {
        self.set_uniform(name, UniformValue::Sampler2D(unit));
    }
}

/// Surface response parameters as seen by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialState {
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

/// CPU-side mirror of every uniform the fragment shader declares.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
    pub object_color: Vec4,
    pub object_texture: i32,
    pub use_texture: bool,
    pub use_lighting: bool,
    pub uv_scale: Vec2,
    pub material: MaterialState,
    pub lights: [LightSource; MAX_LIGHTS],
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_position: Vec3::ZERO,
            object_color: Vec4::ONE,
            object_texture: -1,
            use_texture: false,
            use_lighting: false,
            uv_scale: Vec2::ONE,
            material: MaterialState::default(),
            lights: [LightSource::OFF; MAX_LIGHTS],
        }
    }
}

impl UniformBlock {
    /// Stores `value` under `name`.
    ///
    /// Returns `false` when the name is not declared by the shader or the
    /// value has the wrong type; the block is left unchanged in that case.
    pub fn apply(&mut self, name: &str, value: UniformValue) -> bool {
        use UniformValue as V;

        if let Some(rest) = name.strip_prefix("lightSources[") {
            return self.apply_light(rest, value);
        }
        if let Some(field) = name.strip_prefix("material.") {
            return self.apply_material(field, value);
        }

        match (name, value) {
            ("model", V::Mat4(m)) => self.model = m,
            ("view", V::Mat4(m)) => self.view = m,
            ("projection", V::Mat4(m)) => self.projection = m,
            ("viewPosition", V::Vec3(v)) => self.view_position = v,
            ("objectColor", V::Vec4(v)) => self.object_color = v,
            ("objectTexture", V::Sampler2D(unit) | V::Int(unit)) => self.object_texture = unit,
            ("bUseTexture", value) => match as_bool(value) {
                Some(flag) => self.use_texture = flag,
                None => return false,
            },
            ("bUseLighting", value) => match as_bool(value) {
                Some(flag) => self.use_lighting = flag,
                None => return false,
            },
            ("UVscale", V::Vec2(v)) => self.uv_scale = v,
            _ => return false,
        }
        true
    }

    fn apply_material(&mut self, field: &str, value: UniformValue) -> bool {
        use UniformValue as V;

        let material = &mut self.material;
        match (field, value) {
            ("ambientColor", V::Vec3(v)) => material.ambient_color = v,
            ("ambientStrength", V::Float(f)) => material.ambient_strength = f,
            ("diffuseColor", V::Vec3(v)) => material.diffuse_color = v,
            ("specularColor", V::Vec3(v)) => material.specular_color = v,
            ("shininess", V::Float(f)) => material.shininess = f,
            _ => return false,
        }
        true
    }

    // `rest` is everything after "lightSources[", e.g. "2].diffuseColor".
    fn apply_light(&mut self, rest: &str, value: UniformValue) -> bool {
        use UniformValue as V;

        let Some((index, field)) = rest.split_once("].") else {
            return false;
        };
        let Ok(index) = index.parse::<usize>() else {
            return false;
        };
        let Some(light) = self.lights.get_mut(index) else {
            return false;
        };

        match (field, value) {
            ("position", V::Vec3(v)) => light.position = v,
            ("ambientColor", V::Vec3(v)) => light.ambient_color = v,
            ("diffuseColor", V::Vec3(v)) => light.diffuse_color = v,
            ("specularColor", V::Vec3(v)) => light.specular_color = v,
            ("focalStrength", V::Float(f)) => light.focal_strength = f,
            ("specularIntensity", V::Float(f)) => light.specular_intensity = f,
            ("isDirectional", value) => match as_bool(value) {
                Some(flag) => light.is_directional = flag,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    /// Like [`apply`](Self::apply), but logs rejected writes.
    pub fn apply_or_warn(&mut self, name: &str, value: UniformValue) -> bool {
        let accepted = self.apply(name, value);
        if !accepted {
            warn!("ignoring uniform {name} = {value:?}");
        }
        accepted
    }
}

fn as_bool(value: UniformValue) -> Option<bool> {
    match value {
        UniformValue::Bool(flag) => Some(flag),
        UniformValue::Int(value) => Some(value != 0),
        _ => None,
    }
}
