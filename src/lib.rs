//! # voxfield: SH voxel-grid volume rendering in Rust
//!
//! This crate implements a CPU volumetric ray-marching renderer over a dense
//! voxel grid. Each voxel stores a density and spherical harmonics (SH)
//! coefficients for view-dependent color; an optional auxiliary field carries
//! per-voxel attention values that are accumulated alongside color.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - `core`: Fundamental data structures (cameras, rays, bounding boxes, SH)
//! - `grid`: The voxel field (density + SH features + attention) and
//!   trilinear interpolation
//! - `render`: Ray sampling, alpha compositing, and the chunked renderer
//!
//! ## Rendering pipeline
//!
//! 1. A `Camera` generates one ray per pixel (`RayBundle`)
//! 2. Each ray is intersected with the grid bounds and sampled along its span
//! 3. Density and features are trilinearly interpolated at each sample
//! 4. Per-sample values are alpha-composited front to back into per-ray
//!    color, expected depth, opacity, and attention
//!
//! Rays are processed in bounded-size chunks so memory stays flat for large
//! images; rays within a chunk are rendered in parallel with rayon.

// Fundamental data structures and math
pub mod core;

// Voxel field storage and interpolation
pub mod grid;

// Ray sampling, compositing, chunked rendering
pub mod render;

// Re-export commonly used types at crate root for convenience
pub use core::{Camera, Ray, RayBundle};
pub use grid::{GridError, VoxelGrid};
pub use render::{GridRenderer, RenderConfig, RenderError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
