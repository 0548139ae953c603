use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

/// Named surface response parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

/// Ordered catalogue of materials, looked up by tag.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the garden catalogue. Only the first call has an effect.
    pub fn define_all(&mut self) {
        if !self.materials.is_empty() {
            debug!("materials already defined; skipping");
            return;
        }

        self.define(Material {
            tag: "Foliage".to_string(),
            ambient_color: Vec3::new(0.2, 0.4, 0.2),
            ambient_strength: 0.5,
            diffuse_color: Vec3::new(0.3, 0.7, 0.3),
            specular_color: Vec3::new(0.9, 0.9, 0.9),
            shininess: 16.0,
        });
        self.define(Material {
            tag: "Ground".to_string(),
            ambient_color: Vec3::new(0.4, 0.4, 0.4),
            ambient_strength: 0.4,
            diffuse_color: Vec3::new(0.6, 0.6, 0.6),
            specular_color: Vec3::new(0.8, 0.8, 0.8),
            shininess: 8.0,
        });
    }

    /// Appends a material. Tags are not deduplicated; lookups return the
    /// first match.
    pub fn define(&mut self, material: Material) {
        self.materials.push(material);
    }

    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|material| material.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_foliage_and_ground() {
        let mut registry = MaterialRegistry::new();
        registry.define_all();
        let tags: Vec<_> = registry.iter().map(|m| m.tag.as_str()).collect();
        assert_eq!(tags, ["Foliage", "Ground"]);

        let ground = registry.find("Ground").unwrap();
        assert_eq!(ground.shininess, 8.0);
        assert_eq!(ground.ambient_strength, 0.4);
    }

    #[test]
    fn define_all_runs_once() {
        let mut registry = MaterialRegistry::new();
        registry.define_all();
        registry.define_all();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn missing_material_is_absent() {
        let empty = MaterialRegistry::new();
        assert!(empty.find("Foliage").is_none());

        let mut registry = MaterialRegistry::new();
        registry.define_all();
        assert!(registry.find("Bark").is_none());
    }

    #[test]
    fn duplicate_tags_resolve_to_first_definition() {
        let mut registry = MaterialRegistry::new();
        registry.define_all();
        let mut shiny = registry.find("Foliage").unwrap().clone();
        shiny.shininess = 64.0;
        registry.define(shiny);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.find("Foliage").unwrap().shininess, 16.0);
    }
}
