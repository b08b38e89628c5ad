use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::options::{LightingOptions, RenderOptions};

/// Directional lights the shader evaluates; extra lights are ignored.
pub const MAX_LIGHTS: usize = 4;

/// One directional light.
///
/// WGSL layout:
///   direction: vec4<f32>  (xyz toward the light, w intensity)
///   color: vec4<f32>      (rgb, w unused)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Unit direction from the surface toward the light; `w` is intensity.
    pub direction: [f32; 4],
    /// Linear RGB color; `w` unused.
    pub color: [f32; 4],
}

/// Scene lighting and output transform shared by every draw.
/// NOTE: Must match `SceneLighting` in `mesh.wgsl` exactly (192 bytes).
///
///   lights: array<Light, 4>   (offset 0, 128 bytes)
///   ambient: vec4<f32>        (offset 128; rgb premultiplied by intensity)
///   sky: vec4<f32>            (offset 144; rgb, w environment strength)
///   ground: vec4<f32>         (offset 160; rgb)
///   light_count: u32          (offset 176)
///   tone_mapping: u32         (offset 180)
///   exposure: f32             (offset 184)
///   encode_srgb: u32          (offset 188)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRigUniform {
    /// Directional lights; only the first `light_count` are read.
    pub lights: [LightUniform; MAX_LIGHTS],
    /// Ambient color times intensity.
    pub ambient: [f32; 4],
    /// Environment color from above; `w` is the environment strength.
    pub sky: [f32; 4],
    /// Environment color from below.
    pub ground: [f32; 4],
    /// Number of active lights.
    pub light_count: u32,
    /// 0 = clamp, 1 = ACES filmic.
    pub tone_mapping: u32,
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// 1 when the color target is not an sRGB format and the shader must
    /// gamma-encode itself.
    pub encode_srgb: u32,
}

impl LightRigUniform {
    /// Build the uniform from options. `target_format` decides whether the
    /// shader gamma-encodes its output.
    #[must_use]
    pub fn new(
        lighting: &LightingOptions,
        render: &RenderOptions,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        if lighting.lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} directional lights configured, only the first {MAX_LIGHTS} are used",
                lighting.lights.len()
            );
        }
        let mut lights = [LightUniform::default(); MAX_LIGHTS];
        let mut count = 0;
        for light in lighting.lights.iter().take(MAX_LIGHTS) {
            let Some(dir) = Vec3::from(light.position).try_normalize() else {
                continue;
            };
            lights[count] = LightUniform {
                direction: dir.extend(light.intensity.max(0.0)).to_array(),
                color: Vec3::from(light.color).extend(0.0).to_array(),
            };
            count += 1;
        }
        let ambient = Vec3::from(lighting.ambient_color) * lighting.ambient.max(0.0);
        Self {
            lights,
            ambient: ambient.extend(0.0).to_array(),
            sky: Vec3::from(lighting.sky_color)
                .extend(lighting.environment.max(0.0))
                .to_array(),
            ground: Vec3::from(lighting.ground_color).extend(0.0).to_array(),
            light_count: count as u32,
            tone_mapping: render.tone_mapping.shader_mode(),
            exposure: render.exposure.max(0.0),
            encode_srgb: u32::from(!target_format.is_srgb()),
        }
    }
}

/// The light rig's GPU buffer and bind group (group 1 of the mesh
/// pipeline).
pub struct LightRig {
    /// Current CPU-side copy.
    pub uniform: LightRigUniform,
    /// Uniform buffer.
    pub buffer: wgpu::Buffer,
    /// Bind group layout (binding 0: uniform, fragment stage).
    pub layout: wgpu::BindGroupLayout,
    /// Bind group.
    pub bind_group: wgpu::BindGroup,
}

impl LightRig {
    /// Upload a rig.
    #[must_use]
    pub fn new(device: &wgpu::Device, uniform: LightRigUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Rig Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Light Rig Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light Rig Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Replace the rig's contents.
    pub fn update(&mut self, queue: &wgpu::Queue, uniform: LightRigUniform) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DirectionalLightOptions, ToneMapping};

    #[test]
    fn uniform_matches_shader_size() {
        assert_eq!(size_of::<LightRigUniform>(), 192);
    }

    #[test]
    fn studio_rig_uses_all_four_lights() {
        let u = LightRigUniform::new(
            &LightingOptions::studio(),
            &RenderOptions::default(),
            wgpu::TextureFormat::Bgra8UnormSrgb,
        );
        assert_eq!(u.light_count, 4);
        assert_eq!(u.lights[0].direction, [0.0, 1.0, 0.0, 0.35]);
        assert!((u.ambient[0] - 0.95).abs() < 1e-6);
        assert_eq!(u.tone_mapping, ToneMapping::AcesFilmic.shader_mode());
        assert_eq!(u.encode_srgb, 0);
    }

    #[test]
    fn linear_target_requests_shader_encoding() {
        let u = LightRigUniform::new(
            &LightingOptions::thumbnail(),
            &RenderOptions::default(),
            wgpu::TextureFormat::Rgba8Unorm,
        );
        assert_eq!(u.light_count, 1);
        assert_eq!(u.encode_srgb, 1);
        assert!((u.ambient[1] - 1.4).abs() < 1e-6);
    }

    #[test]
    fn zero_direction_and_overflow_lights_are_dropped() {
        let mut lighting = LightingOptions::studio();
        lighting.lights.insert(
            0,
            DirectionalLightOptions {
                position: [0.0; 3],
                ..DirectionalLightOptions::default()
            },
        );
        lighting.lights.push(DirectionalLightOptions::default());
        let u = LightRigUniform::new(
            &lighting,
            &RenderOptions::default(),
            wgpu::TextureFormat::Rgba8UnormSrgb,
        );
        // Six configured: the degenerate one is skipped, the sixth is past
        // the cap.
        assert_eq!(u.light_count, 3);
    }
}
