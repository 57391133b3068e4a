//! Core data structures and mathematical operations.
//!
//! This module contains the fundamental types used throughout the system:
//! - `Camera`: Camera intrinsics, extrinsics, and per-pixel ray generation
//! - `Ray` / `RayBundle`: Ray storage plus the chunk partitioner
//! - `Aabb`: Axis-aligned bounds with ray intersection
//! - Spherical harmonics evaluation for view-dependent color
//!
//! All types here are "pure data" - no I/O, no rendering logic.

mod aabb;
mod camera;
mod math;
pub mod poses;
mod ray;
mod sh;

// Re-export public types
pub use aabb::Aabb;
pub use camera::Camera;
pub use math::lerp;
pub use ray::{chunk_ranges, Ray, RayBundle};
pub use sh::{evaluate_sh, num_sh_coeffs, sh_basis, sh_degree_from_coeffs};
