use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Materials", inline)]
#[serde(default)]
/// Material normalization applied to every loaded model so models from
/// different authoring tools read consistently under the same lights.
pub struct MaterialOptions {
    /// Apply normalization at all.
    #[schemars(title = "Normalize")]
    pub normalize: bool,
    /// Environment light multiplier written into every material.
    #[schemars(title = "Env Intensity", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub env_intensity: f32,
    /// Allowed roughness range.
    #[schemars(skip)]
    pub roughness_range: [f32; 2],
    /// Allowed metalness range.
    #[schemars(skip)]
    pub metalness_range: [f32; 2],
}

impl Default for MaterialOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            env_intensity: 0.85,
            roughness_range: [0.25, 1.0],
            metalness_range: [0.0, 1.0],
        }
    }
}
