use std::f32::consts::{PI, TAU};
use std::ops::Range;

use glam::{Vec2, Vec3};

use crate::meshes::{Shape, Surfaces};

/// Floats per interleaved vertex: `position.xyz`, `normal.xyz`, `uv.xy`.
pub const FLOATS_PER_VERTEX: usize = 8;

/// Radius of the tapered cylinder's top ring relative to its base.
pub const CYLINDER_TOP_RATIO: f32 = 0.05;

const ROUND_SEGMENTS: u32 = 36;
const SPHERE_STACKS: u32 = 18;
const TORUS_MAJOR_RADIUS: f32 = 1.0;
const TORUS_MINOR_RADIUS: f32 = 0.1;
const TORUS_SIDES: u32 = 16;

/// Part of a mesh that can be drawn on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Top,
    Bottom,
    Side,
}

impl Section {
    pub fn is_selected(self, surfaces: Surfaces) -> bool {
        match self {
            Section::Top => surfaces.top,
            Section::Bottom => surfaces.bottom,
            Section::Side => surfaces.sides,
        }
    }
}

/// CPU-side geometry ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub sections: Vec<(Section, Range<u32>)>,
}

impl MeshData {
    /// Generates the geometry for `shape` in its unit-sized local frame.
    ///
    /// Plane: ±1 on X/Z at y = 0. Box: unit cube centred on the origin.
    /// Tapered cylinder: radius 1 at y = 0 narrowing to
    /// [`CYLINDER_TOP_RATIO`] at y = 1. Sphere: radius 1. Torus: ring of
    /// radius 1 in the XY plane.
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Plane => plane(),
            Shape::Box => unit_box(),
            Shape::TaperedCylinder => tapered_cylinder(CYLINDER_TOP_RATIO, ROUND_SEGMENTS),
            Shape::Sphere => uv_sphere(SPHERE_STACKS, ROUND_SEGMENTS),
            Shape::Torus => torus(
                TORUS_MAJOR_RADIUS,
                TORUS_MINOR_RADIUS,
                ROUND_SEGMENTS,
                TORUS_SIDES,
            ),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * FLOATS_PER_VERTEX + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    /// Index ranges to draw for the requested surfaces.
    pub fn index_ranges(&self, surfaces: Surfaces) -> Vec<Range<u32>> {
        self.sections
            .iter()
            .filter(|(section, _)| section.is_selected(surfaces))
            .map(|(_, range)| range.clone())
            .collect()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z, uv.x, uv.y,
        ]);
        index
    }

    fn begin_section(&self) -> u32 {
        self.indices.len() as u32
    }

    fn end_section(&mut self, section: Section, start: u32) {
        let end = self.indices.len() as u32;
        if end > start {
            self.sections.push((section, start..end));
        }
    }

    // Quad corners in counter-clockwise order seen from the front.
    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

fn plane() -> MeshData {
    let mut mesh = MeshData::default();
    let start = mesh.begin_section();
    let corners = [
        (Vec3::new(-1.0, 0.0, 1.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(1.0, 0.0, 1.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(1.0, 0.0, -1.0), Vec2::new(1.0, 1.0)),
        (Vec3::new(-1.0, 0.0, -1.0), Vec2::new(0.0, 1.0)),
    ];
    let ids = corners.map(|(position, uv)| mesh.push_vertex(position, Vec3::Y, uv));
    mesh.push_quad(ids[0], ids[1], ids[2], ids[3]);
    mesh.end_section(Section::Side, start);
    mesh
}

fn unit_box() -> MeshData {
    let mut mesh = MeshData::default();
    let start = mesh.begin_section();
    // (normal, u axis, v axis) per face; u × v == normal keeps CCW winding.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    for (normal, u, v) in faces {
        let center = normal * 0.5;
        let corner = |su: f32, sv: f32| center + u * (su * 0.5) + v * (sv * 0.5);
        let a = mesh.push_vertex(corner(-1.0, -1.0), normal, Vec2::new(0.0, 0.0));
        let b = mesh.push_vertex(corner(1.0, -1.0), normal, Vec2::new(1.0, 0.0));
        let c = mesh.push_vertex(corner(1.0, 1.0), normal, Vec2::new(1.0, 1.0));
        let d = mesh.push_vertex(corner(-1.0, 1.0), normal, Vec2::new(0.0, 1.0));
        mesh.push_quad(a, b, c, d);
    }
    mesh.end_section(Section::Side, start);
    mesh
}

fn tapered_cylinder(top_ratio: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let slope = 1.0 - top_ratio;

    let start = mesh.begin_section();
    let ring: Vec<(u32, u32)> = (0..=segments)
        .map(|i| {
            let u = i as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = Vec3::new(cos, slope, sin).normalize();
            let bottom = mesh.push_vertex(Vec3::new(cos, 0.0, sin), normal, Vec2::new(u, 0.0));
            let top = mesh.push_vertex(
                Vec3::new(cos * top_ratio, 1.0, sin * top_ratio),
                normal,
                Vec2::new(u, 1.0),
            );
            (bottom, top)
        })
        .collect();
    for pair in ring.windows(2) {
        let (b0, t0) = pair[0];
        let (b1, t1) = pair[1];
        mesh.push_quad(b0, t0, t1, b1);
    }
    mesh.end_section(Section::Side, start);

    for (section, y, radius, normal) in [
        (Section::Top, 1.0, top_ratio, Vec3::Y),
        (Section::Bottom, 0.0, 1.0, Vec3::NEG_Y),
    ] {
        let start = mesh.begin_section();
        let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let rim: Vec<u32> = (0..=segments)
            .map(|i| {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                mesh.push_vertex(
                    Vec3::new(cos * radius, y, sin * radius),
                    normal,
                    Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
                )
            })
            .collect();
        for pair in rim.windows(2) {
            if section == Section::Top {
                mesh.indices.extend_from_slice(&[center, pair[1], pair[0]]);
            } else {
                mesh.indices.extend_from_slice(&[center, pair[0], pair[1]]);
            }
        }
        mesh.end_section(section, start);
    }
    mesh
}

fn uv_sphere(stacks: u32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let start = mesh.begin_section();
    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let (ring_radius, y) = (v * PI).sin_cos();
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let position = Vec3::new(ring_radius * cos, y, ring_radius * sin);
            mesh.push_vertex(position, position, Vec2::new(u, 1.0 - v));
        }
    }
    let row = slices + 1;
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh.end_section(Section::Side, start);
    mesh
}

fn torus(major: f32, minor: f32, rings: u32, sides: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let start = mesh.begin_section();
    for ring in 0..=rings {
        let u = ring as f32 / rings as f32;
        let (sin_u, cos_u) = (u * TAU).sin_cos();
        for side in 0..=sides {
            let v = side as f32 / sides as f32;
            let (sin_v, cos_v) = (v * TAU).sin_cos();
            let normal = Vec3::new(cos_v * cos_u, cos_v * sin_u, sin_v);
            let position = Vec3::new(major * cos_u, major * sin_u, 0.0) + normal * minor;
            mesh.push_vertex(position, normal, Vec2::new(u, v));
        }
    }
    let row = sides + 1;
    for ring in 0..rings {
        for side in 0..sides {
            let a = ring * row + side;
            let b = a + row;
            mesh.push_quad(a, b, b + 1, a + 1);
        }
    }
    mesh.end_section(Section::Side, start);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_has_valid_indices() {
        for shape in Shape::ALL {
            let mesh = MeshData::for_shape(shape);
            assert_eq!(mesh.vertices.len() % FLOATS_PER_VERTEX, 0);
            assert_eq!(mesh.indices.len() % 3, 0, "{shape} is not triangulated");
            let count = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count), "{shape} index out of range");
            for i in 0..mesh.vertex_count() {
                assert!((mesh.normal(i).length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_radius() {
        let mesh = MeshData::for_shape(Shape::Sphere);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.position(i).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn box_spans_unit_cube() {
        let mesh = MeshData::for_shape(Shape::Box);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            assert!((p.abs() - Vec3::splat(0.5)).abs().max_element() < 1e-6);
        }
    }

    #[test]
    fn cylinder_sections_cover_all_indices() {
        let mesh = MeshData::for_shape(Shape::TaperedCylinder);
        let all: u32 = mesh
            .index_ranges(Surfaces::ALL)
            .iter()
            .map(|range| range.end - range.start)
            .sum();
        assert_eq!(all as usize, mesh.indices.len());

        let sides = mesh.index_ranges(Surfaces::SIDES);
        assert_eq!(sides.len(), 1);
        assert!(sides[0].end as usize <= mesh.indices.len());
        assert!(sides[0].end - sides[0].start < all);
    }

    #[test]
    fn cylinder_narrows_towards_the_top() {
        let mesh = MeshData::for_shape(Shape::TaperedCylinder);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let radius = Vec2::new(p.x, p.z).length();
            if (p.y - 1.0).abs() < 1e-6 {
                assert!(radius <= CYLINDER_TOP_RATIO + 1e-5);
            }
        }
    }

    #[test]
    fn shapes_without_caps_ignore_cap_flags() {
        let mesh = MeshData::for_shape(Shape::Torus);
        assert_eq!(mesh.index_ranges(Surfaces::SIDES), mesh.index_ranges(Surfaces::ALL));
        assert_eq!(mesh.index_ranges(Surfaces::SIDES)[0], 0..mesh.indices.len() as u32);
    }
}
