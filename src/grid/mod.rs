//! Voxel field storage and interpolation.
//!
//! A `VoxelGrid` is the discrete scene representation: per-voxel density,
//! spherical harmonics color features, and an optional attention field.
//! Sampling at arbitrary world points is trilinear with zero padding outside
//! the grid.

mod resample;
mod voxel;

pub use voxel::{AttnField, GridError, VoxelGrid, VoxelSize};
