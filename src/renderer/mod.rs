//! Mesh rendering for loaded models.
//!
//! [`ModelRenderer`] owns the pipelines, camera and light uniforms, depth
//! buffer, and at most one [`GpuModel`]. It renders into any color view, so
//! the same code draws to a window surface, a browser canvas, or an
//! offscreen thumbnail target.

pub mod gpu_model;
pub mod model_renderer;
pub mod pipeline;

pub use gpu_model::GpuModel;
pub use model_renderer::ModelRenderer;
