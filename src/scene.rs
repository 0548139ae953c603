use std::collections::HashSet;
use std::path::PathBuf;

use glam::{Vec2, Vec3, Vec4};
use log::{debug, info, warn};

use crate::decode::{FileImageSource, ImageSource};
use crate::error::SceneError;
use crate::lighting::{apply_lights, garden_lights, LightSource, MAX_LIGHTS};
use crate::material::MaterialRegistry;
use crate::meshes::{Shape, ShapeMeshes, Surfaces};
use crate::shader::ShaderState;
use crate::texture::{TextureRegistry, TextureUploader};
use crate::transform::Transform;

pub const DEFAULT_TEXTURE_DIR: &str = "Textures";

/// Files loaded by [`SceneComposer::prepare_scene`], in texture-unit order.
pub const SCENE_TEXTURES: [(&str, &str); 3] = [
    ("leaves1.jpg", "Leaves1"),
    ("leaves2.jpg", "Leaves2"),
    ("gravel1.jpg", "Gravel1"),
];

const HEDGE_WALL_THICKNESS: f32 = 1.0;
const TIP_RADIUS_FACTOR: f32 = 1.1;
const TIP_SINK_FACTOR: f32 = 0.7;

const FOLIAGE_FALLBACK: Vec4 = Vec4::new(0.25, 0.55, 0.25, 1.0);
const GRAVEL_FALLBACK: Vec4 = Vec4::new(0.6, 0.6, 0.6, 1.0);

/// One box of a hedge with the texture tiling that keeps leaves unstretched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeWall {
    pub transform: Transform,
    pub uv_scale: Vec2,
}

/// Placement of the sphere that caps a tapered cylinder of the given size.
///
/// The sphere is slightly wider than the cylinder's top ring and sunk into it
/// so no seam shows.
pub fn sphere_tip_transform(base: Vec3, height: f32, radius: f32) -> Transform {
    let top_y = base.y + height;
    let sphere_radius = crate::geometry::CYLINDER_TOP_RATIO * radius * TIP_RADIUS_FACTOR;
    let center_y = top_y - sphere_radius * TIP_SINK_FACTOR;
    Transform::scaled_at(
        Vec3::splat(sphere_radius * 2.0),
        Vec3::new(base.x, center_y, base.z),
    )
}

/// The four walls of a rectangular hedge centred on `center`.
///
/// Walls are one unit thick. Left and right walls run along Z and sit
/// `length - 1` apart; front and back walls run along X and sit `width - 1`
/// apart. Order: left, right, front, back.
pub fn hedge_walls(center: Vec3, length: f32, width: f32, height: f32) -> [HedgeWall; 4] {
    let t = HEDGE_WALL_THICKNESS;
    let y = center.y + height * 0.5;
    let x_offset = (length - t) * 0.5;
    let z_offset = (width - t) * 0.5;

    let side = |x: f32| HedgeWall {
        transform: Transform::scaled_at(
            Vec3::new(t, height, width - t),
            Vec3::new(x, y, center.z),
        ),
        uv_scale: Vec2::new((width - t) * 0.5, height * 0.5),
    };
    let end = |z: f32| HedgeWall {
        transform: Transform::scaled_at(Vec3::new(length, height, t), Vec3::new(center.x, y, z)),
        uv_scale: Vec2::new(length * 0.5, height * 0.5),
    };

    [
        side(center.x - x_offset),
        side(center.x + x_offset),
        end(center.z - z_offset),
        end(center.z + z_offset),
    ]
}

/// Length of a diagonal spanning the inside of a hedge with walls of
/// `thickness`.
pub fn inner_diagonal_length(length: f32, width: f32, thickness: f32) -> f32 {
    let inner_length = length - 2.0 * thickness;
    let inner_width = width - 2.0 * thickness;
    inner_length.hypot(inner_width)
}

/// Builds and draws the garden: texture, material and light setup plus the
/// fixed sequence of draws issued every frame.
pub struct SceneComposer {
    textures: TextureRegistry,
    materials: MaterialRegistry,
    lights: [LightSource; MAX_LIGHTS],
    images: Box<dyn ImageSource>,
    texture_dir: PathBuf,
    reported_missing: HashSet<String>,
}

impl SceneComposer {
    /// Composer that reads texture files from `texture_dir`.
    pub fn new(texture_dir: impl Into<PathBuf>) -> Self {
        Self::with_image_source(texture_dir, Box::new(FileImageSource))
    }

    pub fn with_image_source(texture_dir: impl Into<PathBuf>, images: Box<dyn ImageSource>) -> Self {
        Self {
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::new(),
            lights: [LightSource::OFF; MAX_LIGHTS],
            images,
            texture_dir: texture_dir.into(),
            reported_missing: HashSet::new(),
        }
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// Loads textures, lights, materials and meshes.
    ///
    /// Texture loading stops at the first failure; the error is returned and
    /// nothing after the textures is configured.
    pub fn prepare_scene<D>(&mut self, device: &mut D) -> Result<(), SceneError>
    where
        D: ShaderState + ShapeMeshes + TextureUploader + ?Sized,
    {
        self.load_scene_textures(device)?;

        self.lights = garden_lights();
        apply_lights(device, &self.lights);
        self.materials.define_all();

        for shape in Shape::ALL {
            device.load_shape(shape);
        }
        info!(
            "scene prepared: {} texture(s), {} material(s)",
            self.textures.len(),
            self.materials.len()
        );
        Ok(())
    }

    fn load_scene_textures<D>(&mut self, device: &mut D) -> Result<(), SceneError>
    where
        D: TextureUploader + ?Sized,
    {
        for (file, tag) in SCENE_TEXTURES {
            let path = self.texture_dir.join(file);
            self.textures
                .load(self.images.as_ref(), device, &path, tag)
                .inspect_err(|err| warn!("failed to load {tag}: {err}"))?;
        }
        self.textures.bind_all(device);
        Ok(())
    }

    /// Releases every uploaded texture.
    pub fn release_textures<U>(&mut self, gpu: &mut U)
    where
        U: TextureUploader + ?Sized,
    {
        self.textures.release_all(gpu);
    }

    /// Issues the full garden. The ground plane is left out of the
    /// orthographic overview.
    pub fn render_scene<D>(&mut self, device: &mut D, orthographic: bool)
    where
        D: ShaderState + ShapeMeshes + ?Sized,
    {
        if !orthographic {
            self.set_transformations(
                device,
                &Transform::scaled_at(Vec3::new(60.0, 1.0, 30.0), Vec3::ZERO),
            );
            device.use_program();
            self.set_shader_material(device, "Ground");
            device.set_bool("bUseLighting", true);
            self.apply_texture_or_color(device, "Gravel1", GRAVEL_FALLBACK);
            self.set_texture_uv_scale(device, 20.0, 20.0);
            device.draw_shape(Shape::Plane, Surfaces::ALL);
        }

        self.draw_cylinder_with_sphere_tip(device, Vec3::new(0.0, 0.0, 3.0), 7.0, 2.5);
        self.draw_cylinder_with_sphere_tip(device, Vec3::new(-12.0, 0.0, -2.0), 6.0, 2.0);

        // Ring hedge around the central topiary.
        self.set_transformations(
            device,
            &Transform::new(
                Vec3::splat(5.0),
                Vec3::new(90.0, 0.0, 0.0),
                Vec3::new(0.0, 0.5, 3.0),
            ),
        );
        device.use_program();
        self.set_shader_material(device, "Foliage");
        device.set_bool("bUseLighting", true);
        self.apply_texture_or_color(device, "Leaves2", FOLIAGE_FALLBACK);
        device.set_vec3("material.specularColor", Vec3::splat(0.3));
        device.set_float("material.shininess", 8.0);
        self.set_texture_uv_scale(device, 5.0, 5.0);
        device.draw_shape(Shape::Torus, Surfaces::ALL);

        self.draw_rectangular_hedge(device, Vec3::new(-12.0, 0.0, -2.0), 10.0, 6.0, 2.0);

        let outer_center = Vec3::new(0.0, 0.0, 18.0);
        let (outer_length, outer_width, hedge_height) = (8.0, 10.0, 2.0);
        self.draw_rectangular_hedge(device, outer_center, outer_length, outer_width, hedge_height);

        // Criss-cross hedges inside the outer one.
        let diagonal =
            inner_diagonal_length(outer_length, outer_width, HEDGE_WALL_THICKNESS);
        for angle in [45.0, -45.0] {
            let wall = HedgeWall {
                transform: Transform::new(
                    Vec3::new(diagonal, hedge_height, HEDGE_WALL_THICKNESS),
                    Vec3::new(0.0, angle, 0.0),
                    outer_center,
                ),
                uv_scale: Vec2::new(diagonal * 0.5, hedge_height * 0.5),
            };
            self.draw_hedge_wall(device, &wall, "Leaves2");
        }
    }

    pub fn set_transformations<S>(&self, shader: &mut S, transform: &Transform)
    where
        S: ShaderState + ?Sized,
    {
        shader.set_mat4("model", transform.model_matrix());
    }

    /// Switches the next draw to a flat colour.
    pub fn set_shader_color<S>(&self, shader: &mut S, color: Vec4)
    where
        S: ShaderState + ?Sized,
    {
        shader.set_bool("bUseTexture", false);
        shader.set_vec4("objectColor", color);
    }

    /// Switches the next draw to the texture registered as `tag`. An
    /// unknown tag selects unit `-1`.
    pub fn set_shader_texture<S>(&self, shader: &mut S, tag: &str)
    where
        S: ShaderState + ?Sized,
    {
        shader.set_bool("bUseTexture", true);
        let unit = self
            .textures
            .find_slot(tag)
            .and_then(|slot| i32::try_from(slot).ok())
            .unwrap_or(-1);
        shader.set_sampler2d("objectTexture", unit);
    }

    /// Uses the texture `tag` when it is loaded and `fallback` otherwise.
    ///
    /// A missing tag means setup stopped before lights and materials were
    /// configured, so the fallback colour is drawn unlit.
    pub fn apply_texture_or_color<S>(&mut self, shader: &mut S, tag: &str, fallback: Vec4)
    where
        S: ShaderState + ?Sized,
    {
        if self.textures.find_slot(tag).is_some() {
            self.set_shader_texture(shader, tag);
            return;
        }
        if self.reported_missing.insert(tag.to_string()) {
            warn!("texture {tag:?} is not loaded; drawing with a flat colour");
        }
        self.set_shader_color(shader, fallback);
        shader.set_bool("bUseLighting", false);
    }

    pub fn set_texture_uv_scale<S>(&self, shader: &mut S, u: f32, v: f32)
    where
        S: ShaderState + ?Sized,
    {
        shader.set_vec2("UVscale", Vec2::new(u, v));
    }

    /// Pushes the material registered as `tag`; unknown tags leave the
    /// shader untouched.
    pub fn set_shader_material<S>(&self, shader: &mut S, tag: &str)
    where
        S: ShaderState + ?Sized,
    {
        let Some(material) = self.materials.find(tag) else {
            debug!("material {tag:?} is not defined");
            return;
        };
        shader.set_vec3("material.ambientColor", material.ambient_color);
        shader.set_float("material.ambientStrength", material.ambient_strength);
        shader.set_vec3("material.diffuseColor", material.diffuse_color);
        shader.set_vec3("material.specularColor", material.specular_color);
        shader.set_float("material.shininess", material.shininess);
    }

    /// Leafy tapered cylinder standing on `base`, capped with a sphere.
    pub fn draw_cylinder_with_sphere_tip<D>(
        &mut self,
        device: &mut D,
        base: Vec3,
        height: f32,
        radius: f32,
    ) where
        D: ShaderState + ShapeMeshes + ?Sized,
    {
        self.set_transformations(
            device,
            &Transform::scaled_at(Vec3::new(radius, height, radius), base),
        );
        self.apply_foliage(device, "Leaves1", Vec2::ONE);
        device.draw_shape(Shape::TaperedCylinder, Surfaces::SIDES);

        self.set_transformations(device, &sphere_tip_transform(base, height, radius));
        self.apply_foliage(device, "Leaves1", Vec2::ONE);
        device.draw_shape(Shape::Sphere, Surfaces::ALL);
    }

    pub fn draw_rectangular_hedge<D>(
        &mut self,
        device: &mut D,
        center: Vec3,
        length: f32,
        width: f32,
        height: f32,
    ) where
        D: ShaderState + ShapeMeshes + ?Sized,
    {
        for wall in hedge_walls(center, length, width, height) {
            self.draw_hedge_wall(device, &wall, "Leaves2");
        }
    }

    pub fn draw_hedge_wall<D>(&mut self, device: &mut D, wall: &HedgeWall, texture: &str)
    where
        D: ShaderState + ShapeMeshes + ?Sized,
    {
        self.set_transformations(device, &wall.transform);
        self.apply_foliage(device, texture, wall.uv_scale);
        device.draw_shape(Shape::Box, Surfaces::ALL);
    }

    fn apply_foliage<S>(&mut self, shader: &mut S, texture: &str, uv_scale: Vec2)
    where
        S: ShaderState + ?Sized,
    {
        shader.use_program();
        self.set_shader_material(shader, "Foliage");
        shader.set_bool("bUseLighting", true);
        self.apply_texture_or_color(shader, texture, FOLIAGE_FALLBACK);
        self.set_texture_uv_scale(shader, uv_scale.x, uv_scale.y);
    }
}
