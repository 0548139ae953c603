use std::fmt;

use serde::{Deserialize, Serialize};

/// Base shapes the scene is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Plane,
    TaperedCylinder,
    Sphere,
    Torus,
    Box,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Plane,
        Shape::TaperedCylinder,
        Shape::Sphere,
        Shape::Torus,
        Shape::Box,
    ];
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Plane => "plane",
            Shape::TaperedCylinder => "tapered cylinder",
            Shape::Sphere => "sphere",
            Shape::Torus => "torus",
            Shape::Box => "box",
        };
        f.write_str(name)
    }
}

/// Which parts of a capped shape to emit. Shapes without caps only look at
/// `sides`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Surfaces {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl Surfaces {
    pub const ALL: Self = Self {
        top: true,
        bottom: true,
        sides: true,
    };

    pub const SIDES: Self = Self {
        top: false,
        bottom: false,
        sides: true,
    };
}

impl Default for Surfaces {
    fn default() -> Self {
        Self::ALL
    }
}

/// Uploads and draws primitive geometry using the current shader state.
pub trait ShapeMeshes {
    /// Uploads the geometry for `shape`. Repeated calls are no-ops.
    fn load_shape(&mut self, shape: Shape);

    /// Issues the geometry for `shape` with whatever transform and shading
    /// state is currently bound.
    fn draw_shape(&mut self, shape: Shape, surfaces: Surfaces);
}
