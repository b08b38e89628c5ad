//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box in model or world space.
///
/// An empty box (no points added yet) has `min > max`; its
/// [`center`](Self::center) and [`size`](Self::size) are both zero so
/// downstream math never sees infinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// A box containing nothing. Extending it with a point yields a
    /// zero-volume box at that point.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Box spanning two corners (in any order).
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point. Non-finite points are skipped.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.extend_point(p);
        }
        aabb
    }

    /// Whether no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
            || self.min.y > self.max.y
            || self.min.z > self.max.z
    }

    /// Grow the box to contain `p`.
    pub fn extend_point(&mut self, p: Vec3) {
        if !p.is_finite() {
            return;
        }
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    /// Largest extent.
    #[must_use]
    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }

    /// The box shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Bounds of the eight corners after transformation by `m`.
    #[must_use]
    pub fn transformed(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Self::from_points((0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            m.transform_point3(corner)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_has_zero_size_and_center() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), Vec3::ZERO);
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.max_dim(), 0.0);
    }

    #[test]
    fn from_points_tracks_extremes() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.5, 0.0, 7.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 7.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 6.0, 7.0));
        assert_eq!(aabb.max_dim(), 7.0);
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let aabb = Aabb::from_points([Vec3::ONE, Vec3::splat(f32::NAN)]);
        assert_eq!(aabb.min, Vec3::ONE);
        assert_eq!(aabb.max, Vec3::ONE);
    }

    #[test]
    fn translating_by_negative_center_recenters() {
        let aabb = Aabb::new(Vec3::new(3.0, 5.0, -9.0), Vec3::new(7.0, 6.0, 1.0));
        let moved = aabb.translated(-aabb.center());
        assert!(moved.center().length() < 1e-6);
        assert_eq!(moved.size(), aabb.size());
    }

    #[test]
    fn union_with_empty_is_identity() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.union(&Aabb::empty()), aabb);
        assert_eq!(Aabb::empty().union(&aabb), aabb);
    }

    #[test]
    fn transformed_rotation_grows_box() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rot = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let rotated = aabb.transformed(&rot);
        let expected = 2.0_f32.sqrt();
        assert!((rotated.max.x - expected).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }
}
