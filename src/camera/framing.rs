//! Camera auto-framing.
//!
//! Given a model's bounding box and a perspective field of view, computes
//! how far back the camera must sit for the largest dimension to fit in
//! view with a margin, clip planes that scale with the model instead of
//! fixed constants, the translation that moves the model's center to the
//! world origin, and orbit distance limits proportional to the model.

use glam::Vec3;

use super::controls::OrbitControls;
use super::core::Camera;
use crate::model::bounds::Aabb;

/// Smallest and largest field of view the framer will compute with. Angles
/// outside this range make `tan(fov / 2)` zero or infinite.
const FOVY_RANGE: (f32, f32) = (1.0, 179.0);

/// Where the eye sits relative to the framed model, as a multiple of
/// either the model's largest dimension or the computed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EyeOffset {
    /// Eye at `(0, max_dim * elevation, distance)`: straight down the depth
    /// axis, raised in proportion to the model.
    Elevated {
        /// Height as a fraction of the model's largest dimension.
        elevation: f32,
    },
    /// Eye at `distance * direction`: a three-quarter view whose direction
    /// components scale with the distance.
    Scaled {
        /// Per-axis multiplier applied to the distance.
        direction: Vec3,
    },
}

impl EyeOffset {
    /// Front view raised by 45% of the model's size.
    pub const VIEWER: Self = Self::Elevated { elevation: 0.45 };
    /// Three-quarter view from the right, above, and in front.
    pub const THUMBNAIL: Self = Self::Scaled {
        direction: Vec3::new(0.55, 0.45, 1.0),
    };

    fn eye(self, max_dim: f32, distance: f32) -> Vec3 {
        match self {
            Self::Elevated { elevation } => {
                Vec3::new(0.0, max_dim * elevation, distance)
            }
            Self::Scaled { direction } => direction * distance,
        }
    }
}

/// Inputs to the framer besides the model itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingParams {
    /// Vertical field of view in degrees.
    pub fovy_degrees: f32,
    /// Distance multiplier; values above 1.0 leave a gap around the model.
    pub margin: f32,
    /// Lower bound on the computed distance (guards zero-size models).
    pub min_distance: f32,
    /// Lower bound on the near clip plane.
    pub near_epsilon: f32,
    /// Lower bound on the far clip plane.
    pub far_floor: f32,
    /// Lower bound on the closest orbit distance.
    pub min_orbit_floor: f32,
    /// Lower bound on the farthest orbit distance.
    pub max_orbit_floor: f32,
    /// Eye placement.
    pub eye_offset: EyeOffset,
}

impl Default for FramingParams {
    fn default() -> Self {
        Self {
            fovy_degrees: 45.0,
            margin: 1.55,
            min_distance: 1.0,
            near_epsilon: 0.01,
            far_floor: 1000.0,
            min_orbit_floor: 0.05,
            max_orbit_floor: 50.0,
            eye_offset: EyeOffset::VIEWER,
        }
    }
}

/// Result of framing a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    /// Largest extent of the model.
    pub max_dim: f32,
    /// Camera distance from the (recentered) model along the depth axis.
    pub distance: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Translation to apply to the model so its bounds center lands on the
    /// world origin.
    pub translation: Vec3,
    /// Eye position; the look-at target is always the origin.
    pub eye: Vec3,
    /// Closest permitted orbit distance.
    pub min_orbit_distance: f32,
    /// Farthest permitted orbit distance.
    pub max_orbit_distance: f32,
}

/// Frame a model of the given per-axis size (no recentering translation).
#[must_use]
pub fn frame_size(size: Vec3, params: &FramingParams) -> Framing {
    let size = size.max(Vec3::ZERO);
    let max_dim = if size.is_finite() { size.max_element() } else { 0.0 };

    let fovy = params
        .fovy_degrees
        .clamp(FOVY_RANGE.0, FOVY_RANGE.1)
        .to_radians();
    let mut distance = ((max_dim / 2.0) / (fovy / 2.0).tan()).abs() * params.margin;
    if !distance.is_finite() {
        distance = 0.0;
    }
    let distance = distance.max(params.min_distance);

    Framing {
        max_dim,
        distance,
        near: params.near_epsilon.max(max_dim / 100.0),
        far: params.far_floor.max(max_dim * 100.0),
        translation: Vec3::ZERO,
        eye: params.eye_offset.eye(max_dim, distance),
        min_orbit_distance: params.min_orbit_floor.max(max_dim / 100.0),
        max_orbit_distance: params.max_orbit_floor.max(max_dim * 10.0),
    }
}

/// Frame a model by its bounds, including the recentering translation.
#[must_use]
pub fn frame_bounds(bounds: &Aabb, params: &FramingParams) -> Framing {
    Framing {
        translation: -bounds.center(),
        ..frame_size(bounds.size(), params)
    }
}

impl Framing {
    /// Point the camera at the origin from the framed eye position, adopt
    /// the framed clip planes, and (when present) retarget the orbit
    /// controls with distance limits.
    pub fn apply(&self, camera: &mut Camera, controls: Option<&mut OrbitControls>) {
        camera.znear = self.near;
        camera.zfar = self.far;
        camera.eye = self.eye;
        camera.target = Vec3::ZERO;
        camera.up = Vec3::Y;

        if let Some(controls) = controls {
            controls.set_limits(self.min_orbit_distance, self.max_orbit_distance);
            controls.look_from(self.eye, Vec3::ZERO);
            let _ = controls.update(camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(margin: f32) -> FramingParams {
        FramingParams {
            margin,
            ..FramingParams::default()
        }
    }

    #[test]
    fn reference_scenario() {
        let framing = frame_size(Vec3::new(10.0, 4.0, 2.0), &params(1.5));
        let expected = 5.0 / 22.5_f32.to_radians().tan() * 1.5;
        assert!((framing.distance - expected).abs() < 1e-4);
        assert!((framing.distance - 18.107).abs() < 1e-2);
        assert!((framing.near - 0.1).abs() < 1e-6);
        assert!((framing.far - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn distance_grows_with_largest_dimension() {
        let p = params(1.5);
        let mut last = 0.0;
        for dim in [1.0, 2.0, 5.0, 10.0, 50.0, 1000.0, 1.0e5] {
            let d = frame_size(Vec3::new(dim, dim * 0.5, 0.1), &p).distance;
            assert!(d > last, "distance {d} not above {last} at dim {dim}");
            last = d;
        }
    }

    #[test]
    fn degenerate_size_clamps_to_floor() {
        let framing = frame_size(Vec3::ZERO, &params(1.5));
        assert_eq!(framing.distance, 1.0);
        assert!(framing.distance.is_finite());
        assert_eq!(framing.near, 0.01);
        assert_eq!(framing.far, 1000.0);
    }

    #[test]
    fn non_finite_size_clamps_to_floor() {
        let framing = frame_size(Vec3::splat(f32::INFINITY), &params(1.5));
        assert_eq!(framing.distance, 1.0);
    }

    #[test]
    fn near_is_always_below_far() {
        let p = FramingParams::default();
        for dim in [1.0e-6, 0.01, 1.0, 123.0, 1.0e4, 1.0e7] {
            let framing = frame_size(Vec3::splat(dim), &p);
            assert!(framing.near < framing.far, "dim {dim}");
        }
    }

    #[test]
    fn clip_planes_scale_with_huge_models() {
        let framing = frame_size(Vec3::splat(50_000.0), &FramingParams::default());
        assert_eq!(framing.near, 500.0);
        assert_eq!(framing.far, 5_000_000.0);
    }

    #[test]
    fn recentering_moves_center_to_origin() {
        let bounds = Aabb::new(Vec3::new(10.0, 20.0, 30.0), Vec3::new(14.0, 21.0, 38.0));
        let framing = frame_bounds(&bounds, &FramingParams::default());
        let moved = bounds.translated(framing.translation);
        assert!(moved.center().length() < 1e-5);
    }

    #[test]
    fn eye_presets() {
        let mut p = FramingParams::default();
        let framing = frame_size(Vec3::splat(2.0), &p);
        assert_eq!(framing.eye.x, 0.0);
        assert!((framing.eye.y - 0.9).abs() < 1e-6);
        assert_eq!(framing.eye.z, framing.distance);

        p.eye_offset = EyeOffset::THUMBNAIL;
        let framing = frame_size(Vec3::splat(2.0), &p);
        assert!((framing.eye.x - framing.distance * 0.55).abs() < 1e-5);
        assert!((framing.eye.y - framing.distance * 0.45).abs() < 1e-5);
    }

    #[test]
    fn orbit_limits_scale_with_model() {
        let small = frame_size(Vec3::splat(0.5), &FramingParams::default());
        assert_eq!(small.min_orbit_distance, 0.05);
        assert_eq!(small.max_orbit_distance, 50.0);

        let big = frame_size(Vec3::splat(300.0), &FramingParams::default());
        assert_eq!(big.min_orbit_distance, 3.0);
        assert_eq!(big.max_orbit_distance, 3000.0);
    }

    #[test]
    fn out_of_contract_fov_stays_finite() {
        for fovy in [0.0, 180.0, -10.0, 500.0] {
            let p = FramingParams {
                fovy_degrees: fovy,
                ..FramingParams::default()
            };
            let framing = frame_size(Vec3::splat(3.0), &p);
            assert!(framing.distance.is_finite() && framing.distance > 0.0);
        }
    }

    #[test]
    fn apply_sets_camera_and_controls() {
        let mut camera = Camera::new(45.0, 1.0, 0.1, 2000.0);
        let mut controls = OrbitControls::default();
        let framing = frame_size(Vec3::splat(10.0), &FramingParams::default());
        framing.apply(&mut camera, Some(&mut controls));

        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.znear, framing.near);
        assert_eq!(camera.zfar, framing.far);
        assert!((camera.eye - framing.eye).length() < 1e-3);
        assert_eq!(controls.target(), Vec3::ZERO);
        assert_eq!(controls.min_distance(), framing.min_orbit_distance);
        assert_eq!(controls.max_distance(), framing.max_orbit_distance);
    }
}
