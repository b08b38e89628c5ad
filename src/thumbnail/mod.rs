//! Offscreen thumbnail rendering.
//!
//! [`ThumbnailRenderer`] draws one frame of a model into a fixed-size
//! transparent texture, reads it back, and encodes it as a PNG and a
//! `data:image/png;base64,...` URL. [`form::ThumbnailForm`] holds the state
//! of the upload form that embeds the result.

pub mod encode;
pub mod form;

pub use encode::{encode_png, png_data_url, unpremultiply, PNG_DATA_URL_PREFIX};
pub use form::{SubmitControl, ThumbnailForm};

use crate::camera::core::Camera;
use crate::camera::framing::frame_bounds;
use crate::error::VitrineError;
use crate::gpu::lighting::LightRigUniform;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::RenderTarget;
use crate::model::ModelData;
use crate::options::{Options, ThumbnailOptions};
use crate::renderer::ModelRenderer;

/// Color format of the offscreen target. sRGB so the readback is already
/// display-encoded.
pub const THUMBNAIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A rendered thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 pixels, row-major, top row first.
    pub rgba: Vec<u8>,
    /// PNG encoding of `rgba`.
    pub png: Vec<u8>,
    /// `data:image/png;base64,...` form of `png`.
    pub data_url: String,
}

impl Thumbnail {
    /// Build a thumbnail from premultiplied pixels as read back from the
    /// GPU.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Encode`] if the pixels do not match the size.
    pub fn from_premultiplied(
        width: u32,
        height: u32,
        mut rgba: Vec<u8>,
    ) -> Result<Self, VitrineError> {
        unpremultiply(&mut rgba);
        let png = encode_png(width, height, rgba.clone())?;
        let data_url = png_data_url(&png);
        Ok(Self {
            width,
            height,
            rgba,
            png,
            data_url,
        })
    }

    /// Whether every pixel is fully transparent (nothing was drawn).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.rgba.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Renders models to thumbnails with a private offscreen target.
pub struct ThumbnailRenderer {
    context: RenderContext,
    renderer: ModelRenderer,
    target: RenderTarget,
    options: ThumbnailOptions,
}

impl ThumbnailRenderer {
    /// Create a renderer on a fresh headless GPU context.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Gpu`] if no adapter or device is available.
    pub async fn new(options: &Options) -> Result<Self, VitrineError> {
        let (width, height) = options.thumbnail.pixel_size();
        let context = RenderContext::new_headless(
            options.render.power_preference,
            THUMBNAIL_FORMAT,
            width,
            height,
        )
        .await?;
        Ok(Self::with_context(context, options))
    }

    /// Create a renderer on an existing context. Only its device and queue
    /// are used; the context's surface, if any, is never presented.
    #[must_use]
    pub fn with_context(context: RenderContext, options: &Options) -> Self {
        let thumb = options.thumbnail.clone();
        let (width, height) = thumb.pixel_size();
        let lighting = LightRigUniform::new(&thumb.lighting, &options.render, THUMBNAIL_FORMAT);
        let renderer = ModelRenderer::new(
            &context.device,
            &context.queue,
            THUMBNAIL_FORMAT,
            (width, height),
            lighting,
        );
        let target = RenderTarget::new(&context.device, width, height, THUMBNAIL_FORMAT);
        log::debug!("thumbnail renderer ready at {width}x{height}");
        Self {
            context,
            renderer,
            target,
            options: thumb,
        }
    }

    /// Output size in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Render `model` framed for a thumbnail and encode the result.
    ///
    /// Materials are drawn as authored, without the viewer's
    /// normalization.
    ///
    /// # Errors
    ///
    /// [`VitrineError::Readback`] if the pixels cannot be read back,
    /// [`VitrineError::Encode`] if PNG encoding fails.
    pub async fn render(&mut self, model: &ModelData) -> Result<Thumbnail, VitrineError> {
        let (width, height) = self.size();
        let framing = frame_bounds(&model.bounds(), &self.options.framing_params());
        let mut camera = Camera::new(
            self.options.fovy,
            width as f32 / height as f32,
            framing.near,
            framing.far,
        );
        framing.apply(&mut camera, None);

        let device = &self.context.device;
        let queue = &self.context.queue;
        self.renderer.set_model(device, queue, model, framing.translation);
        self.renderer.update_camera(queue, &camera);

        let mut encoder = self.context.create_encoder();
        self.renderer.encode(&mut encoder, &self.target.view);
        let _ = self.context.submit(encoder);

        let pixels = self.target.read_pixels(device, queue).await;
        self.renderer.clear_model();
        let thumbnail = Thumbnail::from_premultiplied(width, height, pixels?)?;
        log::info!(
            "rendered {}x{} thumbnail ({} byte PNG)",
            width,
            height,
            thumbnail.png.len()
        );
        Ok(thumbnail)
    }
}

impl Drop for ThumbnailRenderer {
    fn drop(&mut self) {
        self.renderer.dispose();
        self.target.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_readback_becomes_straight_png() {
        let thumb = Thumbnail::from_premultiplied(1, 2, vec![100, 50, 0, 200, 0, 0, 0, 0])
            .unwrap();
        assert_eq!(thumb.rgba, vec![128, 64, 0, 200, 0, 0, 0, 0]);
        assert!(thumb.data_url.starts_with(PNG_DATA_URL_PREFIX));
        assert!(!thumb.is_blank());

        let decoded = image::load_from_memory(&thumb.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (1, 2));
        assert_eq!(decoded.get_pixel(0, 1).0[3], 0);
    }

    #[test]
    fn transparent_frame_is_blank() {
        let thumb = Thumbnail::from_premultiplied(2, 2, vec![0; 16]).unwrap();
        assert!(thumb.is_blank());
    }

    #[test]
    fn default_output_size() {
        let options = Options::default();
        assert_eq!(options.thumbnail.pixel_size(), (300, 220));
    }
}
