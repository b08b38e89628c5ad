//! glTF 2.0 import.
//!
//! Flattens the scene graph into world-space [`MeshPrimitive`]s so the
//! renderer and the framer both work with a single transform (the
//! recentering translation).

use std::path::Path;

use glam::{Mat3, Mat4, Vec3};

use super::material::{Material, TextureImage};
use super::mesh::{compute_normals, MeshPrimitive, Vertex};
use super::ModelData;
use crate::error::VitrineError;

/// Parse a `.gltf` (with embedded or data-URI buffers) or `.glb` document
/// held in memory.
pub fn import_bytes(bytes: &[u8]) -> Result<ModelData, VitrineError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;
    Ok(build_model(&document, &buffers, &images))
}

/// Parse a document from disk, resolving external buffers and images
/// relative to its directory.
pub fn import_path(path: &Path) -> Result<ModelData, VitrineError> {
    let (document, buffers, images) = gltf::import(path)?;
    let mut model = build_model(&document, &buffers, &images);
    if model.name.is_none() {
        model.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned);
    }
    Ok(model)
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> ModelData {
    let mut model = ModelData {
        materials: document.materials().map(|m| Material::from_gltf(&m)).collect(),
        images: images
            .iter()
            .map(|data| {
                TextureImage::from_gltf(data).map(std::sync::Arc::new)
            })
            .collect(),
        ..ModelData::default()
    };

    let scene = document.default_scene().or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        model.name = scene.name().map(str::to_owned);
        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, buffers, &mut model);
        }
    } else {
        // No scene: show every mesh untransformed.
        for mesh in document.meshes() {
            read_mesh(&mesh, Mat4::IDENTITY, buffers, &mut model);
        }
    }

    log::debug!(
        "imported {} primitives, {} triangles, {} materials, {} images",
        model.primitives.len(),
        model.triangle_count(),
        model.materials.len(),
        model.images.len()
    );
    model
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        read_mesh(&mesh, world, buffers, model);
    }
    for child in node.children() {
        visit_node(&child, world, buffers, model);
    }
}

fn read_mesh(
    mesh: &gltf::Mesh<'_>,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!(
                "skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }
        if let Some(prim) = read_primitive(&primitive, world, buffers) {
            model.primitives.push(prim);
        }
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshPrimitive> {
    let reader = primitive
        .reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let vertex_count = positions.len() as u32;

    let mut indices: Vec<u32> = reader.read_indices().map_or_else(
        || (0..vertex_count).collect(),
        |indices| indices.into_u32().collect(),
    );
    indices.truncate(indices.len() - indices.len() % 3);
    let before = indices.len();
    indices = indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| i < vertex_count))
        .flatten()
        .copied()
        .collect();
    if indices.len() != before {
        log::warn!(
            "dropped {} triangles with out-of-range indices",
            (before - indices.len()) / 3
        );
    }

    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(Iterator::collect::<Vec<_>>)
        .filter(|n| n.len() == positions.len())
        .unwrap_or_else(|| compute_normals(&positions, &indices));
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|tc| tc.into_f32().collect::<Vec<_>>())
        .filter(|uv| uv.len() == positions.len())
        .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let vertices = positions
        .iter()
        .zip(&normals)
        .zip(&uvs)
        .map(|((p, n), uv)| Vertex {
            position: world.transform_point3(Vec3::from(*p)).to_array(),
            normal: (normal_matrix * Vec3::from(*n))
                .try_normalize()
                .unwrap_or(Vec3::Y)
                .to_array(),
            uv: *uv,
        })
        .collect();

    // Mirroring transforms flip triangle winding.
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    Some(MeshPrimitive {
        vertices,
        indices,
        material: primitive.material().index(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    use super::*;

    /// A single triangle `(0,0,0) (size,0,0) (0,size,0)` under a node with
    /// the given translation, as a self-contained `.gltf` with a data-URI
    /// buffer.
    pub(crate) fn triangle_gltf(size: f32, translation: [f32; 3]) -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0, 0.0, 0.0], [size, 0.0, 0.0], [0.0, size, 0.0]] {
            for c in v {
                bin.extend_from_slice(&f32::to_le_bytes(c));
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);

        let uri = format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(&bin)
        );
        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "name": "tri", "nodes": [0] }],
            "nodes": [{ "mesh": 0, "translation": translation }],
            "meshes": [{ "primitives": [{
                "attributes": { "POSITION": 0 },
                "indices": 1,
                "material": 0
            }]}],
            "materials": [{
                "pbrMetallicRoughness": {
                    "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
                    "metallicFactor": 0.0,
                    "roughnessFactor": 0.1
                }
            }],
            "buffers": [{ "byteLength": bin.len(), "uri": uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
            ],
            "accessors": [
                {
                    "bufferView": 0, "componentType": 5126, "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [size, size, 0.0]
                },
                {
                    "bufferView": 1, "componentType": 5123, "count": 3,
                    "type": "SCALAR"
                }
            ]
        });
        serde_json::to_vec(&json).unwrap()
    }

    #[test]
    fn imports_embedded_triangle_in_world_space() {
        let model = import_bytes(&triangle_gltf(2.0, [10.0, 0.0, -4.0])).unwrap();
        assert_eq!(model.name.as_deref(), Some("tri"));
        assert_eq!(model.primitives.len(), 1);
        assert_eq!(model.triangle_count(), 1);

        let bounds = model.bounds();
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, -4.0));
        assert_eq!(bounds.max, Vec3::new(12.0, 2.0, -4.0));

        // No normals in the file: computed from winding (+Z).
        let n = Vec3::from(model.primitives[0].vertices[0].normal);
        assert!((n - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn reads_material_factors() {
        let model = import_bytes(&triangle_gltf(1.0, [0.0; 3])).unwrap();
        assert_eq!(model.primitives[0].material, Some(0));
        let mat = &model.materials[0];
        assert_eq!(mat.base_color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(mat.metallic, 0.0);
        assert!((mat.roughness - 0.1).abs() < 1e-6);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = import_bytes(b"definitely not a model").unwrap_err();
        assert!(matches!(err, VitrineError::ModelParse(_)));
    }

    #[test]
    fn document_without_meshes_is_empty_not_an_error() {
        let json = br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[]}],"scene":0}"#;
        let model = import_bytes(json).unwrap();
        assert!(model.primitives.is_empty());
        assert!(model.bounds().is_empty());
    }
}
