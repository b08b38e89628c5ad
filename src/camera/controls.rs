use glam::{Vec2, Vec3};

use super::core::Camera;
use crate::options::ControlOptions;

/// Keeps the polar angle away from the poles, where the view basis flips.
const POLAR_EPSILON: f32 = 1.0e-6;

/// Base of the multiplicative zoom step per unit of scroll.
const ZOOM_BASE: f32 = 0.95;

/// Remaining motion below this magnitude is dropped instead of decaying
/// forever.
const REST_THRESHOLD: f32 = 1.0e-6;

/// Spherical coordinates of the eye relative to the orbit target.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: std::f32::consts::FRAC_PI_2,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit-style camera interaction around a fixed target point.
///
/// Input methods ([`rotate`](Self::rotate), [`pan`](Self::pan),
/// [`zoom`](Self::zoom)) only accumulate motion; [`update`](Self::update)
/// applies it to a [`Camera`] once per frame. With damping enabled each
/// update applies a fraction of the pending motion and decays the rest, so
/// the camera eases to a stop after the user lets go.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    spherical: Spherical,
    min_distance: f32,
    max_distance: f32,

    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    pending_scale: f32,

    viewport_height: f32,
    fovy: f32,
    /// Cached camera basis for screen-space panning.
    right: Vec3,
    up: Vec3,

    enabled: bool,
    enable_damping: bool,
    damping_factor: f32,
    enable_pan: bool,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(&ControlOptions::default())
    }
}

impl OrbitControls {
    /// Controls orbiting the origin from `(0, 0, 5)`.
    #[must_use]
    pub fn new(options: &ControlOptions) -> Self {
        Self {
            target: Vec3::ZERO,
            spherical: Spherical::from_offset(Vec3::new(0.0, 0.0, 5.0)),
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
            viewport_height: 1.0,
            fovy: 45.0,
            right: Vec3::X,
            up: Vec3::Y,
            enabled: true,
            enable_damping: options.enable_damping,
            damping_factor: options.damping_factor.clamp(0.0, 1.0),
            enable_pan: options.enable_pan,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
        }
    }

    /// Current orbit target.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Current distance from eye to target.
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Closest permitted distance.
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Farthest permitted distance.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Whether the controls still react to input.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether any accumulated motion is still waiting to be applied.
    pub fn is_moving(&self) -> bool {
        self.pending_theta.abs() > REST_THRESHOLD
            || self.pending_phi.abs() > REST_THRESHOLD
            || self.pending_pan.length_squared() > REST_THRESHOLD
            || (self.pending_scale - 1.0).abs() > REST_THRESHOLD
    }

    /// Set the permitted distance range. The current distance is clamped
    /// on the next [`update`](Self::update).
    pub fn set_limits(&mut self, min_distance: f32, max_distance: f32) {
        self.min_distance = min_distance.max(0.0);
        self.max_distance = max_distance.max(self.min_distance);
    }

    /// Place the eye at `eye` looking at `target`, discarding any pending
    /// motion.
    pub fn look_from(&mut self, eye: Vec3, target: Vec3) {
        self.target = target;
        self.spherical = Spherical::from_offset(eye - target);
        self.stop();
    }

    /// Viewport height in pixels; drag deltas are measured against it.
    pub fn set_viewport(&mut self, _width: u32, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Orbit by a drag of `delta` pixels. A drag across the full viewport
    /// height turns the camera by one full revolution.
    pub fn rotate(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        let scale = std::f32::consts::TAU * self.rotate_speed / self.viewport_height;
        self.pending_theta -= delta.x * scale;
        self.pending_phi -= delta.y * scale;
    }

    /// Move the target by a drag of `delta` pixels, keeping the point under
    /// the cursor under the cursor.
    pub fn pan(&mut self, delta: Vec2) {
        if !self.enabled || !self.enable_pan {
            return;
        }
        let half_height =
            self.spherical.radius * (self.fovy.to_radians() / 2.0).tan();
        let world_per_pixel =
            2.0 * half_height * self.pan_speed / self.viewport_height;
        self.pending_pan += self.right * (-delta.x * world_per_pixel)
            + self.up * (delta.y * world_per_pixel);
    }

    /// Dolly toward (positive `delta`) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enabled {
            return;
        }
        self.pending_scale *= ZOOM_BASE.powf(delta * self.zoom_speed * 10.0);
    }

    /// Drop all pending motion.
    pub fn stop(&mut self) {
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_scale = 1.0;
    }

    /// Detach from input for good. Further input is ignored.
    pub fn dispose(&mut self) {
        self.stop();
        self.enabled = false;
    }

    /// Apply pending motion to `camera`. Returns `true` if the eye or target
    /// moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        self.fovy = camera.fovy;
        let before = (camera.eye, camera.target);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        self.spherical.theta += self.pending_theta * step;
        self.spherical.phi = (self.spherical.phi + self.pending_phi * step)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        self.spherical.radius = (self.spherical.radius * self.pending_scale)
            .clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * step;

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
            self.pending_pan *= 1.0 - self.damping_factor;
            if !self.is_moving() {
                self.stop();
            }
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_pan = Vec3::ZERO;
        }
        self.pending_scale = 1.0;

        camera.target = self.target;
        camera.eye = self.target + self.spherical.to_offset();
        camera.up = Vec3::Y;

        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        if right != Vec3::ZERO {
            self.right = right;
            self.up = right.cross(forward);
        }

        before != (camera.eye, camera.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> OrbitControls {
        OrbitControls::new(&ControlOptions {
            enable_damping: false,
            ..ControlOptions::default()
        })
    }

    fn camera() -> Camera {
        Camera::new(45.0, 1.0, 0.1, 1000.0)
    }

    #[test]
    fn spherical_round_trips_offset() {
        let offset = Vec3::new(3.0, -2.0, 7.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-4);
    }

    #[test]
    fn update_keeps_distance_without_input() {
        let mut controls = undamped();
        let mut cam = camera();
        controls.look_from(Vec3::new(0.0, 4.0, 10.0), Vec3::ZERO);
        let _ = controls.update(&mut cam);
        assert!((cam.eye.length() - Vec3::new(0.0, 4.0, 10.0).length()).abs() < 1e-4);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut controls = undamped();
        let mut cam = camera();
        controls.set_limits(2.0, 8.0);
        controls.look_from(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);

        for _ in 0..100 {
            controls.zoom(5.0);
            let _ = controls.update(&mut cam);
        }
        assert!((controls.distance() - 2.0).abs() < 1e-5);

        for _ in 0..100 {
            controls.zoom(-5.0);
            let _ = controls.update(&mut cam);
        }
        assert!((controls.distance() - 8.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_never_crosses_the_pole() {
        let mut controls = undamped();
        let mut cam = camera();
        controls.set_viewport(800, 600);
        controls.rotate(Vec2::new(0.0, 10_000.0));
        let _ = controls.update(&mut cam);
        assert!(cam.eye.is_finite());
        assert!(controls.spherical.phi > 0.0);
    }

    #[test]
    fn damping_eases_out() {
        let mut controls = OrbitControls::default();
        let mut cam = camera();
        controls.set_viewport(800, 600);
        controls.rotate(Vec2::new(100.0, 0.0));

        let _ = controls.update(&mut cam);
        let first_eye = cam.eye;
        assert!(controls.is_moving());

        let _ = controls.update(&mut cam);
        let second_step = (cam.eye - first_eye).length();
        assert!(second_step > 0.0);

        for _ in 0..2_000 {
            let _ = controls.update(&mut cam);
        }
        assert!(!controls.is_moving());
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn pan_moves_target_unless_disabled() {
        let mut controls = undamped();
        let mut cam = camera();
        controls.set_viewport(800, 600);
        let _ = controls.update(&mut cam);
        controls.pan(Vec2::new(50.0, 0.0));
        let _ = controls.update(&mut cam);
        assert!(cam.target.x < 0.0);

        let mut locked = OrbitControls::new(&ControlOptions {
            enable_pan: false,
            ..ControlOptions::default()
        });
        locked.pan(Vec2::new(50.0, 0.0));
        assert!(!locked.is_moving());
    }

    #[test]
    fn disposed_controls_ignore_input() {
        let mut controls = undamped();
        controls.dispose();
        controls.rotate(Vec2::new(10.0, 10.0));
        controls.zoom(1.0);
        assert!(!controls.is_enabled());
        assert!(!controls.is_moving());
    }
}
