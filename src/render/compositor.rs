//! Front-to-back alpha compositing.
//!
//! Converts per-sample densities into alphas (`1 - exp(-sigma * delta)`) and
//! accumulates weighted color, expected depth, and attention along the ray.
//! Compositing stops early once transmittance drops below
//! `MIN_TRANSMITTANCE`; everything past that point is invisible.

use crate::render::sampler::RaySamples;
use nalgebra::Vector3;

/// Transmittance below which the remainder of the ray is skipped.
pub const MIN_TRANSMITTANCE: f32 = 1e-4;

/// Per-ray compositing result.
#[derive(Clone, Copy, Debug)]
pub struct RayAccum {
    /// Accumulated color including background blending.
    pub color: Vector3<f32>,

    /// Expected termination depth: sum of weight * depth.
    pub depth: f32,

    /// Total accumulated opacity (sum of weights, in [0, 1]).
    pub alpha: f32,
}

/// Composite one ray front to back.
///
/// `sigmas` and `colors` hold one value per sample; `attn` holds
/// `attn_channels` values per sample (empty when no attention field is
/// rendered) and the per-ray accumulation is written to `attn_out`.
///
/// The background is blended behind the accumulated content with the
/// remaining transmittance: `color += (1 - alpha) * background`.
pub fn composite_ray(
    samples: &RaySamples,
    sigmas: &[f32],
    colors: &[Vector3<f32>],
    attn: &[f32],
    attn_channels: usize,
    background: Vector3<f32>,
    attn_out: &mut [f32],
) -> RayAccum {
    debug_assert_eq!(sigmas.len(), samples.len());
    debug_assert_eq!(colors.len(), samples.len());
    debug_assert_eq!(attn.len(), samples.len() * attn_channels);
    debug_assert_eq!(attn_out.len(), attn_channels);

    let mut color = Vector3::<f32>::zeros();
    let mut depth = 0.0f32;
    let mut accumulated = 0.0f32;
    let mut transmittance = 1.0f32;
    attn_out.fill(0.0);

    for i in 0..samples.len() {
        let alpha = 1.0 - (-sigmas[i] * samples.deltas[i]).exp();
        if alpha <= 0.0 {
            continue;
        }

        let weight = transmittance * alpha;
        color += weight * colors[i];
        depth += weight * samples.depths[i];
        for c in 0..attn_channels {
            attn_out[c] += weight * attn[i * attn_channels + c];
        }

        accumulated += weight;
        transmittance *= 1.0 - alpha;
        if transmittance < MIN_TRANSMITTANCE {
            break;
        }
    }

    color += (1.0 - accumulated) * background;

    RayAccum {
        color,
        depth,
        alpha: accumulated,
    }
}
