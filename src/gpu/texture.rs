//! Offscreen render targets, depth buffers, texture upload and pixel
//! readback.

use crate::error::VitrineError;

/// Depth buffer format used by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A render-target texture and its default view.
///
/// Created with `RENDER_ATTACHMENT | TEXTURE_BINDING | COPY_SRC` usage so it
/// can be drawn into and then read back.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    /// Create a new render-target texture with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("RenderTarget"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Copy the whole texture to the CPU as tightly packed 4-byte texels.
    ///
    /// Natively the device is polled until the copy lands; in the browser
    /// the mapping completes on the event loop.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Readback`] if mapping the staging buffer fails or the
    /// format is not 4 bytes per texel.
    pub async fn read_pixels(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u8>, VitrineError> {
        let (width, height) = self.size();
        let texel = self
            .texture
            .format()
            .block_copy_size(None)
            .filter(|&b| b == 4)
            .ok_or_else(|| {
                VitrineError::Readback(format!(
                    "unsupported readback format {:?}",
                    self.texture.format()
                ))
            })?;
        let layout = RowLayout::new(width, texel);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging Buffer"),
            size: u64::from(layout.padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(layout.padded),
                    rows_per_image: Some(height),
                },
            },
            extent(width, height),
        );
        let _ = queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| VitrineError::Readback(e.to_string()))?;
        receiver
            .await
            .map_err(|e| VitrineError::Readback(e.to_string()))?
            .map_err(|e| VitrineError::Readback(e.to_string()))?;

        let pixels = {
            let mapped = slice.get_mapped_range();
            layout.strip(&mapped, height)
        };
        staging.unmap();
        staging.destroy();
        Ok(pixels)
    }

    /// Release the GPU memory now rather than on drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// A depth attachment sized to match a color target.
pub struct DepthTarget {
    texture: wgpu::Texture,
    /// View for render pass attachment.
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    /// Create a [`DEPTH_FORMAT`] texture of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Release the GPU memory now rather than on drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Upload an RGBA8 image as a sampled sRGB texture.
#[must_use]
pub fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(width, height),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent(width, height),
    );
    texture
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

/// Row sizes for a texture-to-buffer copy, whose rows must be aligned to
/// `COPY_BYTES_PER_ROW_ALIGNMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowLayout {
    unpadded: u32,
    padded: u32,
}

impl RowLayout {
    fn new(width: u32, bytes_per_texel: u32) -> Self {
        let unpadded = width * bytes_per_texel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        Self {
            unpadded,
            padded: unpadded.div_ceil(align) * align,
        }
    }

    fn strip(self, padded: &[u8], height: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.unpadded * height) as usize);
        for row in padded.chunks(self.padded as usize).take(height as usize) {
            out.extend_from_slice(&row[..self.unpadded as usize]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_width_rows_are_padded_to_256() {
        let layout = RowLayout::new(300, 4);
        assert_eq!(layout.unpadded, 1200);
        assert_eq!(layout.padded, 1280);
        assert_eq!(RowLayout::new(64, 4).padded, 256);
    }

    #[test]
    fn strip_drops_row_padding() {
        let layout = RowLayout::new(2, 4);
        let mut padded = vec![0u8; layout.padded as usize * 2];
        padded[..8].copy_from_slice(&[1; 8]);
        padded[256..264].copy_from_slice(&[2; 8]);
        let out = layout.strip(&padded, 2);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..8], &[1; 8]);
        assert_eq!(&out[8..], &[2; 8]);
    }
}
