use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tone-mapping curve applied before sRGB output.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Clamp only.
    None,
    /// ACES filmic approximation.
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Value passed to the shader.
    #[must_use]
    pub fn shader_mode(self) -> u32 {
        match self {
            Self::None => 0,
            Self::AcesFilmic => 1,
        }
    }
}

/// Adapter preference when requesting a GPU.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PowerPreference {
    /// Prefer an integrated GPU.
    #[default]
    LowPower,
    /// Prefer a discrete GPU.
    HighPerformance,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(pref: PowerPreference) -> Self {
        match pref {
            PowerPreference::LowPower => Self::LowPower,
            PowerPreference::HighPerformance => Self::HighPerformance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Render", inline)]
#[serde(default)]
/// Renderer output parameters.
pub struct RenderOptions {
    /// Tone-mapping curve.
    #[schemars(title = "Tone Mapping")]
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier applied before tone mapping.
    #[schemars(title = "Exposure", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub exposure: f32,
    /// Upper bound on the device pixel ratio used for the render target.
    #[schemars(skip)]
    pub max_pixel_ratio: f64,
    /// GPU adapter preference.
    #[schemars(skip)]
    pub power_preference: PowerPreference,
    /// How long the finished loading overlay lingers before removal, in
    /// milliseconds.
    #[schemars(skip)]
    pub overlay_fade_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            max_pixel_ratio: 2.0,
            power_preference: PowerPreference::LowPower,
            overlay_fade_ms: 250,
        }
    }
}

impl RenderOptions {
    /// Device pixel ratio clamped to `[1, max_pixel_ratio]`.
    #[must_use]
    pub fn pixel_ratio(&self, device_ratio: f64) -> f64 {
        if device_ratio.is_finite() && device_ratio > 0.0 {
            device_ratio.clamp(1.0, self.max_pixel_ratio.max(1.0))
        } else {
            1.0
        }
    }
}
