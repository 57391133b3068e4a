//! Volumetric ray-marching pipeline (CPU implementation).
//!
//! This module implements the forward rendering pass over a voxel grid:
//! - Clip each ray against the grid bounds and place samples along it
//! - Interpolate density/features/attention at every sample
//! - Alpha composite front to back into per-ray color, depth, and attention
//!
//! Rays are processed in bounded-size chunks; within a chunk they are
//! rendered in parallel with rayon.

mod compositor;
mod renderer;
mod sampler;

pub use compositor::{composite_ray, RayAccum, MIN_TRANSMITTANCE};
pub use renderer::{GridRenderer, ImageRender, RenderOutput};
pub use sampler::{sample_along_ray, RaySamples};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("num_samples_per_ray must be at least 1")]
    NoSamples,
}

/// Activation applied to raw interpolated density before compositing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityActivation {
    /// max(0, x): raw grid values may be negative (optimized in free space).
    #[default]
    Relu,
    /// Pass raw values through unchanged (caller guarantees nonnegative).
    Identity,
}

impl DensityActivation {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            DensityActivation::Relu => x.max(0.0),
            DensityActivation::Identity => x,
        }
    }
}

/// Color composited behind the accumulated scene content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Background {
    #[default]
    Black,
    White,
    Color([f32; 3]),
}

impl Background {
    pub fn color(self) -> Vector3<f32> {
        match self {
            Background::Black => Vector3::zeros(),
            Background::White => Vector3::new(1.0, 1.0, 1.0),
            Background::Color([r, g, b]) => Vector3::new(r, g, b),
        }
    }
}

/// Renderer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Samples placed along each ray's span through the grid.
    pub num_samples_per_ray: usize,

    /// Rays processed per chunk (bounds peak memory).
    pub num_rays_chunk: usize,

    /// Stratified jitter of sample depths instead of bin midpoints.
    pub perturb_samples: bool,

    /// Multiplies raw density before activation.
    pub density_scale: f32,

    /// Applied to scaled raw density.
    pub density_activation: DensityActivation,

    pub background: Background,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            num_samples_per_ray: 256,
            num_rays_chunk: 32768,
            perturb_samples: false,
            density_scale: 1.0,
            density_activation: DensityActivation::Relu,
            background: Background::Black,
        }
    }
}
