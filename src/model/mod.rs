//! In-memory model representation and glTF import.
//!
//! A [`ModelData`] is the flattened, world-space result of importing a
//! glTF/GLB document: triangle primitives, materials, and decoded RGBA8
//! images. It is plain CPU data so it can be produced on a loader thread
//! and handed to the renderer.

pub mod bounds;
pub mod gltf_import;
pub mod material;
pub mod mesh;

use std::sync::Arc;

use bounds::Aabb;
pub use gltf_import::{import_bytes, import_path};
use material::{Material, TextureImage};
use mesh::MeshPrimitive;

use crate::options::MaterialOptions;

/// A loaded model, flattened into world space.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// Scene (or file) name, if known.
    pub name: Option<String>,
    /// Triangle primitives in world space.
    pub primitives: Vec<MeshPrimitive>,
    /// Materials referenced by [`MeshPrimitive::material`].
    pub materials: Vec<Material>,
    /// Decoded images referenced by [`Material::base_color_texture`];
    /// `None` where the image could not be converted.
    pub images: Vec<Option<Arc<TextureImage>>>,
}

impl ModelData {
    /// World-space bounds of every vertex. Empty for a model with no
    /// geometry.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::empty(), |acc, p| acc.union(&p.bounds()))
    }

    /// Total triangle count.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(MeshPrimitive::triangle_count).sum()
    }

    /// `true` when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.iter().all(|p| p.indices.is_empty())
    }

    /// Material for a primitive's material slot; the default material for
    /// `None` or a dangling index.
    #[must_use]
    pub fn material(&self, index: Option<usize>) -> Material {
        index
            .and_then(|i| self.materials.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// Image for a texture slot, if it exists and decoded.
    #[must_use]
    pub fn image(&self, index: Option<usize>) -> Option<&Arc<TextureImage>> {
        index.and_then(|i| self.images.get(i)).and_then(Option::as_ref)
    }

    /// Apply [`Material::normalize`] to every material.
    pub fn normalize_materials(&mut self, options: &MaterialOptions) {
        for material in &mut self.materials {
            material.normalize(options);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::model::mesh::Vertex;

    fn tri(offset: f32) -> MeshPrimitive {
        let v = |x: f32, y: f32| Vertex {
            position: [x + offset, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [0.0; 2],
        };
        MeshPrimitive {
            vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)],
            indices: vec![0, 1, 2],
            material: Some(7),
        }
    }

    #[test]
    fn bounds_cover_all_primitives() {
        let model = ModelData {
            primitives: vec![tri(0.0), tri(4.0)],
            ..ModelData::default()
        };
        let b = model.bounds();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(5.0, 1.0, 0.0));
        assert_eq!(model.triangle_count(), 2);
        assert!(!model.is_empty());
    }

    #[test]
    fn default_model_is_empty() {
        let model = ModelData::default();
        assert!(model.is_empty());
        assert!(model.bounds().is_empty());
    }

    #[test]
    fn dangling_material_falls_back_to_default() {
        let model = ModelData {
            primitives: vec![tri(0.0)],
            ..ModelData::default()
        };
        assert_eq!(model.material(Some(7)), Material::default());
        assert!(model.image(Some(0)).is_none());
    }

    #[test]
    fn normalize_touches_every_material() {
        let mut model = ModelData {
            materials: vec![
                Material {
                    roughness: 0.0,
                    ..Material::default()
                };
                3
            ],
            ..ModelData::default()
        };
        model.normalize_materials(&MaterialOptions::default());
        assert!(model.materials.iter().all(|m| m.roughness == 0.25));
    }
}
