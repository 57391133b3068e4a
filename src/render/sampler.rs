//! Sample placement along rays.
//!
//! Each ray is clipped against the grid bounds; samples are placed uniformly
//! over the clipped span, either at bin midpoints (deterministic) or with one
//! uniform draw per bin (stratified jitter, used during optimization where
//! fixed sample positions would alias).

use crate::core::{Aabb, Ray};
use rand::Rng;

/// Ordered sample depths along one ray plus inter-sample distances.
///
/// `depths` and `deltas` always have equal length. The last delta covers the
/// remaining distance to the span's exit point, floored at the mean step so
/// the final bin never collapses to zero width.
#[derive(Clone, Debug, Default)]
pub struct RaySamples {
    pub depths: Vec<f32>,
    pub deltas: Vec<f32>,
}

impl RaySamples {
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// Place `num_samples` depths along `ray` inside `aabb`.
///
/// Returns an empty sample set when the ray misses the box. A degenerate
/// span (entry == exit, e.g. grazing a corner) yields a single zero-width
/// sample.
pub fn sample_along_ray<R: Rng>(
    ray: &Ray,
    aabb: &Aabb,
    num_samples: usize,
    jitter: Option<&mut R>,
) -> RaySamples {
    let Some((t_near, t_far)) = aabb.intersect(ray) else {
        return RaySamples::default();
    };

    let span = t_far - t_near;
    if span <= 0.0 || num_samples == 0 {
        return RaySamples {
            depths: vec![t_near],
            deltas: vec![0.0],
        };
    }

    let dt = span / num_samples as f32;
    let mut depths = Vec::with_capacity(num_samples);

    match jitter {
        Some(rng) => {
            for i in 0..num_samples {
                let u: f32 = rng.gen();
                depths.push(t_near + (i as f32 + u) * dt);
            }
        }
        None => {
            for i in 0..num_samples {
                depths.push(t_near + (i as f32 + 0.5) * dt);
            }
        }
    }

    let mut deltas = Vec::with_capacity(num_samples);
    for i in 0..num_samples - 1 {
        deltas.push(depths[i + 1] - depths[i]);
    }
    deltas.push((t_far - depths[num_samples - 1]).max(dt));

    RaySamples { depths, deltas }
}
