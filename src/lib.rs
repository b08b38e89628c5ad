// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Test code may unwrap
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! glTF model previews on wgpu.
//!
//! Vitrine shows a glTF 2.0 model in an orbit-controllable view whose
//! camera is framed automatically from the model's bounding box, and
//! renders single offscreen frames as PNG data URLs for thumbnails.
//!
//! # Key entry points
//!
//! - [`viewer::ModelViewer`] - interactive viewer bound to one host region
//! - [`viewer::window::ViewerWindow`] - native window host (`viewer`
//!   feature)
//! - [`thumbnail::ThumbnailRenderer`] - offscreen thumbnail rendering
//! - [`camera::framing`] - camera auto-framing
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Architecture
//!
//! Model bytes are fetched and parsed off the render thread by an
//! [`asset::LoadTask`], which reports progress and exactly one outcome
//! through a channel. The render thread polls it once per frame, uploads
//! the model, frames the camera and draws with a single forward pass.
//! Hosts (the winit window, or the browser when built with the `web`
//! feature) only translate platform events and mirror the region state.

pub mod asset;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod model;
pub mod options;
pub mod renderer;
pub mod thumbnail;
pub mod viewer;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

pub use error::VitrineError;
