use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::shader::ShaderState;

/// Number of light slots declared by the fragment shader.
pub const MAX_LIGHTS: usize = 4;

/// One entry of the shader's `lightSources` array.
///
/// Directional lights keep their (normalized) direction in `position`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightSource {
    pub position: Vec3,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub focal_strength: f32,
    pub specular_intensity: f32,
    pub is_directional: bool,
}

impl LightSource {
    /// A slot that contributes nothing.
    pub const OFF: Self = Self {
        position: Vec3::ZERO,
        ambient_color: Vec3::ZERO,
        diffuse_color: Vec3::ZERO,
        specular_color: Vec3::ZERO,
        focal_strength: 0.0,
        specular_intensity: 0.0,
        is_directional: false,
    };

    /// Creates a directional light shining along `direction`.
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            position: direction.normalize_or_zero(),
            ambient_color: color,
            diffuse_color: color,
            specular_color: Vec3::ONE,
            focal_strength: 32.0,
            specular_intensity: 1.0,
            is_directional: true,
        }
    }

    /// Creates a positional light at `position`.
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            ambient_color: color,
            diffuse_color: color,
            specular_color: color,
            focal_strength: 16.0,
            specular_intensity: 0.5,
            is_directional: false,
        }
    }

    pub fn with_ambient(mut self, color: Vec3) -> Self {
        self.ambient_color = color;
        self
    }

    pub fn with_diffuse(mut self, color: Vec3) -> Self {
        self.diffuse_color = color;
        self
    }

    pub fn with_specular(mut self, color: Vec3, intensity: f32) -> Self {
        self.specular_color = color;
        self.specular_intensity = intensity.clamp(0.0, 1.0);
        self
    }

    pub fn with_focal_strength(mut self, focal_strength: f32) -> Self {
        self.focal_strength = focal_strength;
        self
    }
}

/// The garden's light rig: warm sun, cool fill, soft ground bounce.
pub fn garden_lights() -> [LightSource; MAX_LIGHTS] {
    let sun_color = Vec3::new(1.0, 0.95, 0.85);
    let sun = LightSource::directional(Vec3::new(-0.4, -1.0, -0.3), sun_color)
        .with_ambient(sun_color * 0.4)
        .with_diffuse(sun_color)
        .with_specular(Vec3::ONE, 1.0)
        .with_focal_strength(32.0);

    let fill_color = Vec3::new(0.3, 0.4, 0.6);
    let fill = LightSource::point(Vec3::new(-8.0, 6.0, -8.0), fill_color)
        .with_ambient(fill_color * 0.15)
        .with_diffuse(fill_color * 0.6)
        .with_specular(fill_color * 0.8, 0.5)
        .with_focal_strength(16.0);

    let bounce_color = Vec3::new(0.8, 0.7, 0.6);
    let bounce = LightSource::point(Vec3::new(0.0, 2.0, 0.0), bounce_color)
        .with_ambient(bounce_color * 0.05)
        .with_diffuse(bounce_color * 0.3)
        .with_specular(Vec3::splat(0.4), 0.3)
        .with_focal_strength(8.0);

    [sun, fill, bounce, LightSource::OFF]
}

/// Pushes every light slot into the shader and enables lighting.
pub fn apply_lights<S>(shader: &mut S, lights: &[LightSource; MAX_LIGHTS])
where
    S: ShaderState + ?Sized,
{
    shader.set_bool("bUseLighting", true);
    for (index, light) in lights.iter().enumerate() {
        let prefix = format!("lightSources[{index}]");
        shader.set_vec3(&format!("{prefix}.position"), light.position);
        shader.set_vec3(&format!("{prefix}.ambientColor"), light.ambient_color);
        shader.set_vec3(&format!("{prefix}.diffuseColor"), light.diffuse_color);
        shader.set_vec3(&format!("{prefix}.specularColor"), light.specular_color);
        shader.set_float(&format!("{prefix}.focalStrength"), light.focal_strength);
        shader.set_float(
            &format!("{prefix}.specularIntensity"),
            light.specular_intensity,
        );
        shader.set_bool(&format!("{prefix}.isDirectional"), light.is_directional);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingDevice;

    #[test]
    fn sun_direction_is_normalized() {
        let lights = garden_lights();
        assert!(lights[0].is_directional);
        assert!((lights[0].position.length() - 1.0).abs() < 1e-5);
        assert!(!lights[1].is_directional);
        assert_eq!(lights[1].position, Vec3::new(-8.0, 6.0, -8.0));
    }

    #[test]
    fn unused_slot_is_zeroed() {
        let lights = garden_lights();
        assert_eq!(lights[3], LightSource::OFF);
        assert_eq!(LightSource::default(), LightSource::OFF);
    }

    #[test]
    fn apply_lights_fills_every_slot() {
        let mut device = RecordingDevice::new();
        let lights = garden_lights();
        apply_lights(&mut device, &lights);
        let uniforms = device.uniforms();
        assert!(uniforms.use_lighting);
        assert_eq!(uniforms.lights, lights);
        assert!(device.unknown_uniforms().is_empty());
    }
}
