use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::framing::{EyeOffset, FramingParams};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and auto-framing parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane used before a model is framed.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane used before a model is framed.
    #[schemars(skip)]
    pub zfar: f32,
    /// Framing distance multiplier (>1.0 leaves a gap around the model).
    #[schemars(title = "Framing Margin", range(min = 1.0, max = 3.0), extend("step" = 0.05))]
    pub margin: f32,
    /// Smallest framing distance, used for zero-size models.
    #[schemars(skip)]
    pub min_distance: f32,
    /// Smallest near clip plane.
    #[schemars(skip)]
    pub near_epsilon: f32,
    /// Smallest far clip plane.
    #[schemars(skip)]
    pub far_floor: f32,
    /// Smallest "closest orbit distance".
    #[schemars(skip)]
    pub min_orbit_floor: f32,
    /// Smallest "farthest orbit distance".
    #[schemars(skip)]
    pub max_orbit_floor: f32,
    /// Eye height as a fraction of the model's largest dimension.
    #[schemars(title = "Elevation", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub elevation: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.1,
            zfar: 2000.0,
            margin: 1.55,
            min_distance: 1.0,
            near_epsilon: 0.01,
            far_floor: 1000.0,
            min_orbit_floor: 0.05,
            max_orbit_floor: 50.0,
            elevation: 0.45,
        }
    }
}

impl CameraOptions {
    /// Framing parameters for the interactive viewer.
    #[must_use]
    pub fn framing_params(&self) -> FramingParams {
        FramingParams {
            fovy_degrees: self.fovy,
            margin: self.margin,
            min_distance: self.min_distance,
            near_epsilon: self.near_epsilon,
            far_floor: self.far_floor,
            min_orbit_floor: self.min_orbit_floor,
            max_orbit_floor: self.max_orbit_floor,
            eye_offset: EyeOffset::Elevated {
                elevation: self.elevation,
            },
        }
    }
}
