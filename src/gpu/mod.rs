//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, offscreen render targets
//! with pixel readback, and the shared light-rig uniform.

/// Light-rig uniform and bind group.
pub mod lighting;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Render targets, depth buffers, texture upload and readback.
pub mod texture;
