//! Rays, ray bundles, and the chunk partitioner.
//!
//! A `RayBundle` is flat storage for the rays of one render call (typically
//! one per pixel, row-major). Large bundles are never processed at once:
//! `chunk_ranges` partitions them into bounded-size index ranges so the
//! renderer's working memory stays flat regardless of image size.

use nalgebra::Vector3;
use std::ops::Range;

/// A single ray with world-space origin and (normalized) direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray: o + t * d
    pub fn at(&self, t: f32) -> Vector3<f32> {
        self.origin + t * self.direction
    }
}

/// Flat storage for a set of rays.
///
/// Origins and directions are kept in parallel vectors; index `i` addresses
/// one ray. For camera-generated bundles, rays are in row-major pixel order.
#[derive(Clone, Debug, Default)]
pub struct RayBundle {
    origins: Vec<Vector3<f32>>,
    directions: Vec<Vector3<f32>>,
}

impl RayBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            origins: Vec::with_capacity(capacity),
            directions: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, ray: Ray) {
        self.origins.push(ray.origin);
        self.directions.push(ray.direction);
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn get(&self, index: usize) -> Ray {
        Ray {
            origin: self.origins[index],
            direction: self.directions[index],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Ray> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

/// Partition `0..len` into contiguous ranges of at most `chunk_size`.
///
/// The ranges are yielded in order and cover every index exactly once.
/// A `chunk_size` of zero is treated as one.
pub fn chunk_ranges(len: usize, chunk_size: usize) -> impl Iterator<Item = Range<usize>> {
    let chunk = chunk_size.max(1);
    (0..len)
        .step_by(chunk)
        .map(move |start| start..(start + chunk).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let p = ray.at(2.5);
        approx::assert_relative_eq!(p.x, 1.0);
        approx::assert_relative_eq!(p.z, 2.5);
    }

    #[test]
    fn test_chunk_ranges_cover_exactly() {
        let ranges: Vec<_> = chunk_ranges(10, 3).collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn test_chunk_ranges_single_chunk() {
        let ranges: Vec<_> = chunk_ranges(5, 100).collect();
        assert_eq!(ranges, vec![0..5]);
    }

    #[test]
    fn test_chunk_ranges_empty() {
        assert_eq!(chunk_ranges(0, 8).count(), 0);
    }

    #[test]
    fn test_chunk_ranges_zero_chunk_size() {
        // Degenerate chunk size falls back to one ray per chunk.
        let ranges: Vec<_> = chunk_ranges(3, 0).collect();
        assert_eq!(ranges, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_bundle_roundtrip() {
        let mut bundle = RayBundle::new();
        bundle.push(Ray::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0)));
        bundle.push(Ray::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 0.0, 0.0)));

        assert_eq!(bundle.len(), 2);
        let r = bundle.get(1);
        approx::assert_relative_eq!(r.origin.y, 2.0);
        approx::assert_relative_eq!(r.direction.x, 1.0);
    }
}
