//! GPU-resident copy of a [`ModelData`].

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::pipeline::{MeshPipelines, PipelineKey};
use crate::gpu::texture::upload_rgba;
use crate::model::material::{AlphaMode, Material};
use crate::model::ModelData;

/// Material factors as laid out in `mesh.wgsl` (64 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear RGBA base color factor.
    pub base_color: [f32; 4],
    /// Linear RGB emissive; `w` unused.
    pub emissive: [f32; 4],
    /// Metalness.
    pub metallic: f32,
    /// Roughness.
    pub roughness: f32,
    /// Environment term multiplier.
    pub env_intensity: f32,
    /// Mask cutoff (only read in mask mode).
    pub alpha_cutoff: f32,
    /// 0 opaque, 1 mask, 2 blend.
    pub alpha_mode: u32,
    _pad: [u32; 3],
}

impl From<&Material> for MaterialUniform {
    fn from(m: &Material) -> Self {
        let (alpha_mode, alpha_cutoff) = match m.alpha_mode {
            AlphaMode::Opaque => (0, 0.0),
            AlphaMode::Mask { cutoff } => (1, cutoff),
            AlphaMode::Blend => (2, 0.0),
        };
        Self {
            base_color: m.base_color,
            emissive: [m.emissive[0], m.emissive[1], m.emissive[2], 0.0],
            metallic: m.metallic,
            roughness: m.roughness,
            env_intensity: m.env_intensity,
            alpha_cutoff,
            alpha_mode,
            _pad: [0; 3],
        }
    }
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    key: PipelineKey,
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: usize,
}

/// Every GPU resource belonging to one loaded model: vertex/index buffers,
/// textures, material uniforms and bind groups, and the recentering
/// transform.
pub struct GpuModel {
    primitives: Vec<GpuPrimitive>,
    materials: Vec<GpuMaterial>,
    textures: Vec<wgpu::Texture>,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    triangle_count: usize,
}

impl GpuModel {
    /// Upload `model`, translated by `translation` (the framer's
    /// recentering offset).
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &MeshPipelines,
        model: &ModelData,
        translation: Vec3,
    ) -> Self {
        let mut textures = Vec::new();
        let image_views: Vec<Option<wgpu::TextureView>> = model
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| {
                image.as_ref().map(|img| {
                    let texture = upload_rgba(
                        device,
                        queue,
                        &format!("Model Texture {i}"),
                        img.width,
                        img.height,
                        &img.rgba,
                    );
                    let view =
                        texture.create_view(&wgpu::TextureViewDescriptor::default());
                    textures.push(texture);
                    view
                })
            })
            .collect();

        // The extra trailing slot is the default material.
        let default_material = Material::default();
        let materials: Vec<GpuMaterial> = model
            .materials
            .iter()
            .chain(std::iter::once(&default_material))
            .map(|m| {
                let view = m
                    .base_color_texture
                    .and_then(|i| image_views.get(i))
                    .and_then(Option::as_ref)
                    .unwrap_or(&pipelines.white_view);
                create_material(device, pipelines, m, view)
            })
            .collect();
        let default_slot = materials.len() - 1;

        let primitives = model
            .primitives
            .iter()
            .filter(|p| !p.indices.is_empty())
            .enumerate()
            .map(|(i, p)| GpuPrimitive {
                vertex_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Primitive {i} Vertices")),
                        contents: bytemuck::cast_slice(&p.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                ),
                index_buffer: device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Primitive {i} Indices")),
                        contents: bytemuck::cast_slice(&p.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    },
                ),
                index_count: p.indices.len() as u32,
                material: p
                    .material
                    .filter(|&m| m < default_slot)
                    .unwrap_or(default_slot),
            })
            .collect();

        let transform = Mat4::from_translation(translation).to_cols_array_2d();
        let transform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Transform Buffer"),
                contents: bytemuck::cast_slice(&[transform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let transform_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model Transform Bind Group"),
                layout: &pipelines.layouts.transform,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buffer.as_entire_binding(),
                }],
            });

        log::debug!(
            "uploaded model: {} primitives, {} materials, {} textures",
            model.primitives.len(),
            materials.len(),
            textures.len()
        );

        Self {
            primitives,
            materials,
            textures,
            transform_buffer,
            transform_bind_group,
            triangle_count: model.triangle_count(),
        }
    }

    /// Triangles uploaded.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Replace the model transform.
    pub fn set_translation(&self, queue: &wgpu::Queue, translation: Vec3) {
        let transform = Mat4::from_translation(translation).to_cols_array_2d();
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&[transform]));
    }

    /// Record draws: opaque and masked primitives first, then blended ones.
    /// Camera and light bind groups (0 and 1) must already be set.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipelines: &'a MeshPipelines,
    ) {
        pass.set_bind_group(2, &self.transform_bind_group, &[]);
        for blend in [false, true] {
            for prim in &self.primitives {
                let material = &self.materials[prim.material];
                if material.key.blend != blend {
                    continue;
                }
                pass.set_pipeline(pipelines.get(material.key));
                pass.set_bind_group(3, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                pass.set_index_buffer(
                    prim.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..prim.index_count, 0, 0..1);
            }
        }
    }

    /// Free every buffer and texture immediately.
    pub fn dispose(&mut self) {
        for prim in self.primitives.drain(..) {
            prim.vertex_buffer.destroy();
            prim.index_buffer.destroy();
        }
        for material in self.materials.drain(..) {
            material.buffer.destroy();
        }
        for texture in self.textures.drain(..) {
            texture.destroy();
        }
        self.transform_buffer.destroy();
        self.triangle_count = 0;
    }
}

fn create_material(
    device: &wgpu::Device,
    pipelines: &MeshPipelines,
    material: &Material,
    view: &wgpu::TextureView,
) -> GpuMaterial {
    let uniform = MaterialUniform::from(material);
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Material Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(material.name.as_deref().unwrap_or("Material Bind Group")),
        layout: &pipelines.layouts.material,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
            },
        ],
    });
    GpuMaterial {
        buffer,
        bind_group,
        key: PipelineKey {
            blend: material.alpha_mode == AlphaMode::Blend,
            double_sided: material.double_sided,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_uniform_matches_shader_size() {
        assert_eq!(size_of::<MaterialUniform>(), 64);
    }

    #[test]
    fn alpha_modes_encode_for_shader() {
        let masked = Material {
            alpha_mode: AlphaMode::Mask { cutoff: 0.3 },
            ..Material::default()
        };
        let u = MaterialUniform::from(&masked);
        assert_eq!(u.alpha_mode, 1);
        assert!((u.alpha_cutoff - 0.3).abs() < 1e-6);

        let blended = Material {
            alpha_mode: AlphaMode::Blend,
            ..Material::default()
        };
        assert_eq!(MaterialUniform::from(&blended).alpha_mode, 2);
    }
}
