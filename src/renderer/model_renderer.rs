//! One-model scene renderer shared by the interactive viewer and the
//! thumbnail generator.

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::gpu_model::GpuModel;
use super::pipeline::MeshPipelines;
use crate::camera::core::{Camera, CameraUniform};
use crate::gpu::lighting::{LightRig, LightRigUniform};
use crate::gpu::texture::DepthTarget;
use crate::model::ModelData;

/// Draws at most one model with a camera and a light rig into any color
/// view of the configured format. Owns its depth buffer, which follows the
/// size passed to [`resize`](Self::resize).
pub struct ModelRenderer {
    pipelines: MeshPipelines,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lights: LightRig,
    depth: DepthTarget,
    model: Option<GpuModel>,
}

impl ModelRenderer {
    /// Build pipelines for `format` and a depth buffer of `size`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        lighting: LightRigUniform,
    ) -> Self {
        let lights = LightRig::new(device, lighting);
        let pipelines = MeshPipelines::new(device, queue, format, &lights.layout);

        let camera_uniform = CameraUniform::new();
        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera Bind Group"),
                layout: &pipelines.layouts.camera,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                }],
            });

        Self {
            pipelines,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            lights,
            depth: DepthTarget::new(device, size.0, size.1),
            model: None,
        }
    }

    /// Upload `model` (replacing and freeing any previous one), shifted by
    /// `translation`.
    pub fn set_model(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: &ModelData,
        translation: Vec3,
    ) {
        self.clear_model();
        self.model = Some(GpuModel::new(
            device,
            queue,
            &self.pipelines,
            model,
            translation,
        ));
    }

    /// Free the current model's GPU resources.
    pub fn clear_model(&mut self) {
        if let Some(mut model) = self.model.take() {
            model.dispose();
        }
    }

    /// The uploaded model, if any.
    #[must_use]
    pub fn model(&self) -> Option<&GpuModel> {
        self.model.as_ref()
    }

    /// Replace the light rig.
    pub fn set_lighting(&mut self, queue: &wgpu::Queue, lighting: LightRigUniform) {
        self.lights.update(queue, lighting);
    }

    /// Recreate the depth buffer if the target size changed. Zero sizes are
    /// ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || self.depth.size() == (width, height) {
            return;
        }
        self.depth.destroy();
        self.depth = DepthTarget::new(device, width, height);
    }

    /// Upload the camera's current matrices.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, camera: &Camera) {
        self.camera_uniform.update_view_proj(camera);
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Record a pass that clears `target` to transparent and draws the
    /// model.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Model Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        if let Some(model) = &self.model {
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.set_bind_group(1, &self.lights.bind_group, &[]);
            model.draw(&mut pass, &self.pipelines);
        }
    }

    /// Free every GPU resource this renderer owns.
    pub fn dispose(&mut self) {
        self.clear_model();
        self.depth.destroy();
        self.camera_buffer.destroy();
        self.lights.buffer.destroy();
        self.pipelines.destroy();
    }
}
