use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Orbit control behaviour.
pub struct ControlOptions {
    /// Ease camera motion out after input stops.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of pending motion applied per frame when damping.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Allow moving the orbit target.
    #[schemars(title = "Pan")]
    pub enable_pan: bool,
    /// Rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Pan sensitivity multiplier.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub pan_speed: f32,
    /// Zoom sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub zoom_speed: f32,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.06,
            enable_pan: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}
