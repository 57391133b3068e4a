//! The voxel grid: density + SH features + optional attention.
//!
//! Values live at voxel centers. The grid occupies a world-space box of
//! `dims * voxel_size` centered at `center`; queries outside that box
//! interpolate against zero (zero padding), so density and features fade to
//! nothing at the boundary rather than clamping.
//!
//! Storage is flat with x fastest: `index = (z * ny + y) * nx + x`.

use crate::core::{sh_degree_from_coeffs, Aabb};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-axis world-space size of one voxel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VoxelSize {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl VoxelSize {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Cubic voxels.
    pub fn uniform(size: f32) -> Self {
        Self::new(size, size, size)
    }
}

/// Errors raised when constructing a grid from raw buffers.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("density buffer has {got} values, expected {expected} ({nx}x{ny}x{nz})")]
    DensityLength {
        got: usize,
        expected: usize,
        nx: usize,
        ny: usize,
        nz: usize,
    },

    #[error("feature buffer has {got} values, expected {expected} (feature_dim {feature_dim})")]
    FeatureLength {
        got: usize,
        expected: usize,
        feature_dim: usize,
    },

    #[error("feature_dim {0} is not 3 x a supported SH coefficient count (1, 4, 9 or 16)")]
    UnsupportedFeatureDim(usize),

    #[error("attention buffer has {got} values, expected {expected} ({channels} channels)")]
    AttnLength {
        got: usize,
        expected: usize,
        channels: usize,
    },

    #[error("attention field must have at least one channel")]
    NoAttnChannels,

    #[error("grid dimensions must be nonzero, got {0}x{1}x{2}")]
    EmptyDims(usize, usize, usize),

    #[error("voxel size must be positive on every axis, got ({0}, {1}, {2})")]
    NonPositiveVoxelSize(f32, f32, f32),
}

/// Auxiliary per-voxel attention values (one or more channels).
#[derive(Clone, Debug)]
pub struct AttnField {
    pub channels: usize,
    pub values: Vec<f32>,
}

/// Dense voxel grid holding density and SH color features.
///
/// `features` stores `feature_dim` floats per voxel, laid out channel-major
/// per voxel: `[R coeffs..., G coeffs..., B coeffs...]`. `feature_dim` must
/// be three times a supported SH coefficient count.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    dims: [usize; 3],
    voxel_size: VoxelSize,
    center: Vector3<f32>,
    densities: Vec<f32>,
    features: Vec<f32>,
    feature_dim: usize,
    attn: Option<AttnField>,
}

impl VoxelGrid {
    /// Build a grid from raw buffers, validating all lengths.
    pub fn new(
        dims: [usize; 3],
        voxel_size: VoxelSize,
        center: Vector3<f32>,
        densities: Vec<f32>,
        features: Vec<f32>,
        feature_dim: usize,
    ) -> Result<Self, GridError> {
        let [nx, ny, nz] = dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(GridError::EmptyDims(nx, ny, nz));
        }
        // A non-positive (or NaN) voxel size would poison interpolation.
        if !(voxel_size.x > 0.0 && voxel_size.y > 0.0 && voxel_size.z > 0.0) {
            return Err(GridError::NonPositiveVoxelSize(
                voxel_size.x,
                voxel_size.y,
                voxel_size.z,
            ));
        }

        let n = nx * ny * nz;
        if densities.len() != n {
            return Err(GridError::DensityLength {
                got: densities.len(),
                expected: n,
                nx,
                ny,
                nz,
            });
        }

        if feature_dim % 3 != 0 || sh_degree_from_coeffs(feature_dim / 3).is_none() {
            return Err(GridError::UnsupportedFeatureDim(feature_dim));
        }
        if features.len() != n * feature_dim {
            return Err(GridError::FeatureLength {
                got: features.len(),
                expected: n * feature_dim,
                feature_dim,
            });
        }

        Ok(Self {
            dims,
            voxel_size,
            center,
            densities,
            features,
            feature_dim,
            attn: None,
        })
    }

    /// Uniform grid with zero density and zero features (degree from
    /// `sh_coeffs_per_channel`).
    pub fn zeros(
        dims: [usize; 3],
        voxel_size: VoxelSize,
        center: Vector3<f32>,
        sh_coeffs_per_channel: usize,
    ) -> Result<Self, GridError> {
        let n = dims[0] * dims[1] * dims[2];
        let feature_dim = 3 * sh_coeffs_per_channel;
        Self::new(
            dims,
            voxel_size,
            center,
            vec![0.0; n],
            vec![0.0; n * feature_dim],
            feature_dim,
        )
    }

    /// Attach an attention field, validating its length.
    pub fn with_attn(mut self, channels: usize, values: Vec<f32>) -> Result<Self, GridError> {
        if channels == 0 {
            return Err(GridError::NoAttnChannels);
        }
        let expected = self.num_voxels() * channels;
        if values.len() != expected {
            return Err(GridError::AttnLength {
                got: values.len(),
                expected,
                channels,
            });
        }
        self.attn = Some(AttnField { channels, values });
        Ok(self)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn voxel_size(&self) -> VoxelSize {
        self.voxel_size
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// SH coefficients per color channel.
    pub fn sh_coeffs_per_channel(&self) -> usize {
        self.feature_dim / 3
    }

    pub fn num_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn attn(&self) -> Option<&AttnField> {
        self.attn.as_ref()
    }

    pub fn attn_channels(&self) -> usize {
        self.attn.as_ref().map_or(0, |a| a.channels)
    }

    pub fn densities(&self) -> &[f32] {
        &self.densities
    }

    pub fn densities_mut(&mut self) -> &mut [f32] {
        &mut self.densities
    }

    pub fn features(&self) -> &[f32] {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut [f32] {
        &mut self.features
    }

    /// World-space bounds of the grid.
    pub fn aabb(&self) -> Aabb {
        let extents = Vector3::new(
            self.dims[0] as f32 * self.voxel_size.x,
            self.dims[1] as f32 * self.voxel_size.y,
            self.dims[2] as f32 * self.voxel_size.z,
        );
        Aabb::from_center_extents(self.center, extents)
    }

    /// Flat index of voxel (x, y, z). Caller guarantees bounds.
    #[inline]
    pub fn voxel_index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dims[1] + y) * self.dims[0] + x
    }

    /// Continuous voxel-center coordinates of a world point.
    ///
    /// Voxel (i, j, k)'s center maps to exactly (i, j, k); the grid spans
    /// [-0.5, dims - 0.5] in these coordinates.
    #[inline]
    fn grid_coords(&self, p: &Vector3<f32>) -> Vector3<f32> {
        let min = self.aabb().min;
        Vector3::new(
            (p.x - min.x) / self.voxel_size.x - 0.5,
            (p.y - min.y) / self.voxel_size.y - 0.5,
            (p.z - min.z) / self.voxel_size.z - 0.5,
        )
    }

    /// The eight trilinear corner indices and weights around a world point.
    ///
    /// Corners falling outside the grid get `None`, which samplers treat as
    /// zero (zero padding).
    #[inline]
    fn corner_weights(&self, p: &Vector3<f32>) -> [(Option<usize>, f32); 8] {
        let g = self.grid_coords(p);
        let base = [g.x.floor(), g.y.floor(), g.z.floor()];
        let frac = [g.x - base[0], g.y - base[1], g.z - base[2]];

        let mut out = [(None, 0.0f32); 8];
        for (corner, slot) in out.iter_mut().enumerate() {
            let dx = corner & 1;
            let dy = (corner >> 1) & 1;
            let dz = (corner >> 2) & 1;

            let w = (if dx == 1 { frac[0] } else { 1.0 - frac[0] })
                * (if dy == 1 { frac[1] } else { 1.0 - frac[1] })
                * (if dz == 1 { frac[2] } else { 1.0 - frac[2] });

            let ix = base[0] as isize + dx as isize;
            let iy = base[1] as isize + dy as isize;
            let iz = base[2] as isize + dz as isize;

            let in_bounds = ix >= 0
                && iy >= 0
                && iz >= 0
                && (ix as usize) < self.dims[0]
                && (iy as usize) < self.dims[1]
                && (iz as usize) < self.dims[2];

            *slot = if in_bounds {
                (
                    Some(self.voxel_index(ix as usize, iy as usize, iz as usize)),
                    w,
                )
            } else {
                (None, w)
            };
        }
        out
    }

    /// Trilinearly interpolated raw density at a world point.
    pub fn sample_density(&self, p: &Vector3<f32>) -> f32 {
        let mut sum = 0.0;
        for (idx, w) in self.corner_weights(p) {
            if let Some(i) = idx {
                sum += w * self.densities[i];
            }
        }
        sum
    }

    /// Trilinearly interpolated feature vector at a world point.
    ///
    /// Writes `feature_dim` values into `out` (which must be that long).
    pub fn sample_features(&self, p: &Vector3<f32>, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.feature_dim);
        out.fill(0.0);
        for (idx, w) in self.corner_weights(p) {
            if let Some(i) = idx {
                let base = i * self.feature_dim;
                let voxel = &self.features[base..base + self.feature_dim];
                for (o, v) in out.iter_mut().zip(voxel) {
                    *o += w * v;
                }
            }
        }
    }

    /// Trilinearly interpolated attention values at a world point.
    ///
    /// Writes one value per channel into `out`; no-op if the grid carries no
    /// attention field.
    pub fn sample_attn(&self, p: &Vector3<f32>, out: &mut [f32]) {
        let Some(attn) = &self.attn else {
            return;
        };
        debug_assert_eq!(out.len(), attn.channels);
        out.fill(0.0);
        for (idx, w) in self.corner_weights(p) {
            if let Some(i) = idx {
                let base = i * attn.channels;
                let voxel = &attn.values[base..base + attn.channels];
                for (o, v) in out.iter_mut().zip(voxel) {
                    *o += w * v;
                }
            }
        }
    }

    /// World position of voxel (x, y, z)'s center.
    pub fn voxel_center(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        let min = self.aabb().min;
        Vector3::new(
            min.x + (x as f32 + 0.5) * self.voxel_size.x,
            min.y + (y as f32 + 0.5) * self.voxel_size.y,
            min.z + (z as f32 + 0.5) * self.voxel_size.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_grid() -> VoxelGrid {
        // 2x2x2 grid of unit voxels centered at the origin.
        let mut grid = VoxelGrid::zeros(
            [2, 2, 2],
            VoxelSize::uniform(1.0),
            Vector3::zeros(),
            1, // degree 0
        )
        .unwrap();
        for (i, d) in grid.densities_mut().iter_mut().enumerate() {
            *d = i as f32;
        }
        grid
    }

    #[test]
    fn test_construction_validates_lengths() {
        let err = VoxelGrid::new(
            [2, 2, 2],
            VoxelSize::uniform(1.0),
            Vector3::zeros(),
            vec![0.0; 7], // should be 8
            vec![0.0; 24],
            3,
        );
        assert!(matches!(err, Err(GridError::DensityLength { .. })));

        let err = VoxelGrid::new(
            [2, 2, 2],
            VoxelSize::uniform(1.0),
            Vector3::zeros(),
            vec![0.0; 8],
            vec![0.0; 8 * 6],
            6, // 2 coeffs per channel: not a valid SH count
        );
        assert!(matches!(err, Err(GridError::UnsupportedFeatureDim(6))));
    }

    #[test]
    fn test_construction_rejects_non_positive_voxel_size() {
        for size in [
            VoxelSize::uniform(0.0),
            VoxelSize::new(1.0, -0.5, 1.0),
            VoxelSize::new(1.0, 1.0, f32::NAN),
        ] {
            let err = VoxelGrid::zeros([2, 2, 2], size, Vector3::zeros(), 1);
            assert!(matches!(err, Err(GridError::NonPositiveVoxelSize(..))));
        }
    }

    #[test]
    fn test_aabb_from_dims() {
        let grid = small_grid();
        let aabb = grid.aabb();
        assert_relative_eq!(aabb.min.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(aabb.max.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_density_exact_at_voxel_centers() {
        let grid = small_grid();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    let p = grid.voxel_center(x, y, z);
                    let expected = grid.voxel_index(x, y, z) as f32;
                    assert_relative_eq!(grid.sample_density(&p), expected, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_density_midpoint_is_average() {
        let grid = small_grid();
        // Grid center is equidistant from all 8 voxel centers.
        let avg = (0..8).map(|i| i as f32).sum::<f32>() / 8.0;
        assert_relative_eq!(grid.sample_density(&Vector3::zeros()), avg, epsilon = 1e-5);
    }

    #[test]
    fn test_density_fades_to_zero_outside() {
        let grid = small_grid();
        // Just past the boundary, zero padding pulls values down; far outside
        // every corner is out of bounds.
        assert_relative_eq!(
            grid.sample_density(&Vector3::new(5.0, 0.0, 0.0)),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_feature_interpolation() {
        let mut grid = small_grid();
        // Set all voxels' R DC coefficient to 2.0.
        for v in 0..8 {
            grid.features_mut()[v * 3] = 2.0;
        }
        let mut out = [0.0f32; 3];
        grid.sample_features(&Vector3::zeros(), &mut out);
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(out[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_attn_field_validation_and_sampling() {
        let grid = small_grid();
        assert!(grid.clone().with_attn(0, vec![]).is_err());
        assert!(grid.clone().with_attn(2, vec![0.0; 5]).is_err());

        let grid = grid.with_attn(1, vec![1.0; 8]).unwrap();
        let mut out = [0.0f32; 1];
        grid.sample_attn(&Vector3::zeros(), &mut out);
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-5);
    }
}
