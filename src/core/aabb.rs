//! Axis-aligned bounding box with ray intersection.
//!
//! The grid's world-space bounds are an AABB; every ray is clipped against it
//! before sampling. Intersection uses the slab method.

use crate::core::Ray;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box defined by min/max corners.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box centered at `center` with full side lengths `extents`.
    pub fn from_center_extents(center: Vector3<f32>, extents: Vector3<f32>) -> Self {
        let half = extents * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        (0..3).all(|a| p[a] >= self.min[a] && p[a] <= self.max[a])
    }

    /// Intersect a ray with the box (slab method).
    ///
    /// Returns the parametric span `(t_near, t_far)` of the ray inside the
    /// box, clamped to `t >= 0`, or `None` when the ray misses the box or the
    /// box lies entirely behind the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];

            if d.abs() < 1e-12 {
                // Ray parallel to this slab: must start inside it.
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }
}
