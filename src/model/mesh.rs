//! Mesh primitives and vertex layout.

use glam::Vec3;

use super::bounds::Aabb;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position (before recentering).
    pub position: [f32; 3],
    /// World-space unit normal.
    pub normal: [f32; 3],
    /// Texture coordinate set 0.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    /// Vertex buffer layout matching the mesh shader's `VertexInput`.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One indexed triangle list with a single material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshPrimitive {
    /// Vertices in world space.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`](super::ModelData::materials);
    /// `None` uses the default material.
    pub material: Option<usize>,
}

impl MeshPrimitive {
    /// Bounds of every vertex.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Area-weighted vertex normals for a triangle list. Vertices touched by no
/// (non-degenerate) triangle get `+Y`.
#[must_use]
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(pa), Some(pb), Some(pc)) =
            (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
        // Unnormalized cross product weights by triangle area.
        let n = (pb - pa).cross(pc - pa);
        accum[a] += n;
        accum[b] += n;
        accum[c] += n;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(Vertex::layout().array_stride, 32);
    }

    #[test]
    fn flat_quad_normals_point_up() {
        let positions = [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ];
        let normals = compute_normals(&positions, &[0, 1, 2, 0, 2, 3]);
        for n in normals {
            assert!((Vec3::from(n) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn orphan_and_out_of_range_vertices_default_up() {
        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0; 3]];
        let normals = compute_normals(&positions, &[0, 1, 2, 0, 1, 99]);
        assert_eq!(normals.len(), 4);
        assert!((Vec3::from(normals[0]) - Vec3::Z).length() < 1e-6);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn primitive_bounds_and_triangles() {
        let prim = MeshPrimitive {
            vertices: vec![
                Vertex {
                    position: [-1.0, 0.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [0.0; 2],
                },
                Vertex {
                    position: [1.0, 2.0, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [0.0; 2],
                },
                Vertex {
                    position: [0.0, 0.0, 3.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [0.0; 2],
                },
            ],
            indices: vec![0, 1, 2],
            material: None,
        };
        assert_eq!(prim.triangle_count(), 1);
        assert_eq!(prim.bounds().size(), Vec3::new(2.0, 2.0, 3.0));
    }
}
