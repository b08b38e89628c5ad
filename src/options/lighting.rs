use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A directional light shining from `position` toward the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct DirectionalLightOptions {
    /// Position the light shines from (only the direction matters).
    pub position: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
}

impl Default for DirectionalLightOptions {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 0.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

impl DirectionalLightOptions {
    fn white(position: [f32; 3], intensity: f32) -> Self {
        Self {
            position,
            color: [1.0, 1.0, 1.0],
            intensity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Light rig: flat ambient fill, a soft sky/ground environment term, and up
/// to [`MAX_LIGHTS`](crate::gpu::lighting::MAX_LIGHTS) directional lights.
pub struct LightingOptions {
    /// Ambient fill intensity.
    #[schemars(title = "Ambient", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub ambient: f32,
    /// Ambient fill color.
    #[schemars(skip)]
    pub ambient_color: [f32; 3],
    /// Environment (sky/ground) light strength. Scaled per material by its
    /// environment intensity.
    #[schemars(title = "Environment", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub environment: f32,
    /// Environment color from above.
    #[schemars(skip)]
    pub sky_color: [f32; 3],
    /// Environment color from below.
    #[schemars(skip)]
    pub ground_color: [f32; 3],
    /// Directional lights.
    #[schemars(skip)]
    pub lights: Vec<DirectionalLightOptions>,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self::studio()
    }
}

impl LightingOptions {
    /// Even studio lighting for the interactive viewer: strong soft fill,
    /// three low-power lights around the model, and a faint blue rim from
    /// behind.
    #[must_use]
    pub fn studio() -> Self {
        Self {
            ambient: 0.95,
            ambient_color: [1.0, 1.0, 1.0],
            environment: 0.6,
            sky_color: [1.0, 1.0, 1.0],
            ground_color: [0.55, 0.55, 0.6],
            lights: vec![
                DirectionalLightOptions::white([0.0, 6.0, 0.0], 0.35),
                DirectionalLightOptions::white([0.0, 1.5, 6.0], 0.45),
                DirectionalLightOptions::white([6.0, 1.5, 0.0], 0.35),
                DirectionalLightOptions {
                    position: [-3.0, 3.5, -6.0],
                    color: [0x9f as f32 / 255.0, 0xd6 as f32 / 255.0, 1.0],
                    intensity: 0.28,
                },
            ],
        }
    }

    /// Bright, flat lighting for thumbnails.
    #[must_use]
    pub fn thumbnail() -> Self {
        Self {
            ambient: 1.4,
            ambient_color: [1.0, 1.0, 1.0],
            environment: 0.0,
            sky_color: [1.0, 1.0, 1.0],
            ground_color: [1.0, 1.0, 1.0],
            lights: vec![DirectionalLightOptions::white([5.0, 10.0, 7.0], 1.2)],
        }
    }
}
