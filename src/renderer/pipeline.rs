//! Mesh pipeline: bind group layouts, the four pipeline variants, and the
//! shared sampler / fallback texture.

use crate::gpu::texture::{upload_rgba, DEPTH_FORMAT};
use crate::model::mesh::Vertex;

/// Bind group layouts used by the mesh shader, one per group.
pub struct MeshLayouts {
    /// Group 0: camera uniform.
    pub camera: wgpu::BindGroupLayout,
    /// Group 2: per-model transform uniform.
    pub transform: wgpu::BindGroupLayout,
    /// Group 3: material uniform, base color texture, sampler.
    pub material: wgpu::BindGroupLayout,
}

impl MeshLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let camera = uniform_layout(
            device,
            "Camera Bind Group Layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let transform = uniform_layout(
            device,
            "Model Transform Bind Group Layout",
            wgpu::ShaderStages::VERTEX,
        );
        let material =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    // Binding 0: material factors
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    // Binding 1: base color texture
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float {
                                filterable: true,
                            },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    // Binding 2: sampler
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(
                            wgpu::SamplerBindingType::Filtering,
                        ),
                        count: None,
                    },
                ],
            });
        Self {
            camera,
            transform,
            material,
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Which pipeline variant a material draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// Alpha-blended: drawn after opaque geometry without depth writes.
    pub blend: bool,
    /// Back faces are drawn too.
    pub double_sided: bool,
}

impl PipelineKey {
    const ALL: [Self; 4] = [
        Self {
            blend: false,
            double_sided: false,
        },
        Self {
            blend: false,
            double_sided: true,
        },
        Self {
            blend: true,
            double_sided: false,
        },
        Self {
            blend: true,
            double_sided: true,
        },
    ];

    fn index(self) -> usize {
        usize::from(self.blend) * 2 + usize::from(self.double_sided)
    }
}

/// Everything needed to draw a [`GpuModel`](super::GpuModel): layouts,
/// pipelines, a linear sampler and a 1x1 white texture for untextured
/// materials.
pub struct MeshPipelines {
    /// Bind group layouts.
    pub layouts: MeshLayouts,
    pipelines: [wgpu::RenderPipeline; 4],
    /// Linear, repeating sampler.
    pub sampler: wgpu::Sampler,
    white: wgpu::Texture,
    /// View of the 1x1 white texture.
    pub white_view: wgpu::TextureView,
}

impl MeshPipelines {
    /// Build every pipeline variant for `color_format`.
    /// `light_layout` is bind group 1.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layouts = MeshLayouts::new(device);
        let shader = device
            .create_shader_module(wgpu::include_wgsl!("../../assets/shaders/mesh.wgsl"));
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[
                    &layouts.camera,
                    light_layout,
                    &layouts.transform,
                    &layouts.material,
                ],
                push_constant_ranges: &[],
            });
        let pipelines = PipelineKey::ALL.map(|key| {
            create_pipeline(device, &shader, &pipeline_layout, color_format, key)
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let white = upload_rgba(device, queue, "White Texture", 1, 1, &[255; 4]);
        let white_view = white.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            layouts,
            pipelines,
            sampler,
            white,
            white_view,
        }
    }

    /// Pipeline for a variant.
    #[must_use]
    pub fn get(&self, key: PipelineKey) -> &wgpu::RenderPipeline {
        &self.pipelines[key.index()]
    }

    /// Release the fallback texture.
    pub fn destroy(&self) {
        self.white.destroy();
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let label = format!(
        "Mesh Pipeline ({}, {})",
        if key.blend { "blend" } else { "opaque" },
        if key.double_sided { "double-sided" } else { "culled" }
    );
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: if key.double_sided {
                None
            } else {
                Some(wgpu::Face::Back)
            },
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: !key.blend,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_keys_index_uniquely() {
        let mut seen = [false; 4];
        for key in PipelineKey::ALL {
            assert!(!seen[key.index()]);
            seen[key.index()] = true;
        }
    }
}
