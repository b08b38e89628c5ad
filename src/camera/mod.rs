//! Camera system for 3D model viewing.
//!
//! Provides a perspective camera, orbit controls with damping and distance
//! limits, and the auto-framer that fits a model's bounding box in view.

/// Orbit-style camera interaction (rotate, pan, zoom, damping).
pub mod controls;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Fits a bounding box in view and derives clip planes and orbit limits.
pub mod framing;
