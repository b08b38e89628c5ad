use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::lighting::LightingOptions;
use crate::camera::framing::{EyeOffset, FramingParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Thumbnail", inline)]
#[serde(default)]
/// Offscreen thumbnail render parameters.
pub struct ThumbnailOptions {
    /// Output width in CSS pixels.
    #[schemars(title = "Width", range(min = 16, max = 4096))]
    pub width: u32,
    /// Output height in CSS pixels.
    #[schemars(title = "Height", range(min = 16, max = 4096))]
    pub height: u32,
    /// Pixel ratio; the encoded image is `width * ratio` by
    /// `height * ratio`.
    #[schemars(skip)]
    pub pixel_ratio: f64,
    /// Vertical field of view in degrees.
    #[schemars(skip)]
    pub fovy: f32,
    /// Framing distance multiplier.
    #[schemars(title = "Framing Margin", range(min = 1.0, max = 3.0), extend("step" = 0.05))]
    pub margin: f32,
    /// Light rig for the thumbnail scene.
    #[schemars(skip)]
    pub lighting: LightingOptions,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 220,
            pixel_ratio: 1.0,
            fovy: 45.0,
            margin: 1.6,
            lighting: LightingOptions::thumbnail(),
        }
    }
}

impl ThumbnailOptions {
    /// Output size in physical pixels (never zero).
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        };
        (
            ((f64::from(self.width) * ratio).round() as u32).max(1),
            ((f64::from(self.height) * ratio).round() as u32).max(1),
        )
    }

    /// Framing parameters: three-quarter view with the thumbnail margin.
    #[must_use]
    pub fn framing_params(&self) -> FramingParams {
        FramingParams {
            fovy_degrees: self.fovy,
            margin: self.margin,
            eye_offset: EyeOffset::THUMBNAIL,
            ..FramingParams::default()
        }
    }
}
