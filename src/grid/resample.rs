//! Trilinear grid rescaling.
//!
//! Used to grow a coarse grid to a finer resolution (or shrink it) while
//! keeping the same world-space footprint: voxel sizes shrink as dims grow.
//! Source lookups clamp at the grid edge so borders keep their values
//! instead of fading against the zero padding used for rendering.

use crate::grid::{GridError, VoxelGrid, VoxelSize};
use log::debug;

/// Per-axis source interpolation: clamped index pair + blend factor.
struct AxisTap {
    i0: usize,
    i1: usize,
    t: f32,
}

/// Half-pixel (align_corners = false) mapping from output index to source
/// coordinates, clamped at the edges.
fn axis_taps(n_src: usize, n_dst: usize) -> Vec<AxisTap> {
    let scale = n_src as f32 / n_dst as f32;
    (0..n_dst)
        .map(|i| {
            let src = (i as f32 + 0.5) * scale - 0.5;
            let floor = src.floor();
            let t = (src - floor).clamp(0.0, 1.0);
            let i0 = (floor.max(0.0) as usize).min(n_src - 1);
            let i1 = ((floor + 1.0).max(0.0) as usize).min(n_src - 1);
            AxisTap { i0, i1, t }
        })
        .collect()
}

impl VoxelGrid {
    /// New grid at `new_dims` covering the same world-space box.
    ///
    /// Densities, features, and the attention field (if present) are all
    /// resampled trilinearly.
    pub fn resampled(&self, new_dims: [usize; 3]) -> Result<VoxelGrid, GridError> {
        let [nx, ny, nz] = new_dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(GridError::EmptyDims(nx, ny, nz));
        }
        debug!(
            "resampling grid {:?} -> {:?} ({} values per voxel)",
            self.dims(),
            new_dims,
            1 + self.feature_dim() + self.attn_channels()
        );

        let old_dims = self.dims();
        let extents = self.aabb().extents();
        let voxel_size = VoxelSize::new(
            extents.x / nx as f32,
            extents.y / ny as f32,
            extents.z / nz as f32,
        );

        let taps_x = axis_taps(old_dims[0], nx);
        let taps_y = axis_taps(old_dims[1], ny);
        let taps_z = axis_taps(old_dims[2], nz);

        let n = nx * ny * nz;
        let feature_dim = self.feature_dim();
        let mut densities = vec![0.0f32; n];
        let mut features = vec![0.0f32; n * feature_dim];
        let attn_channels = self.attn_channels();
        let mut attn_values = vec![0.0f32; n * attn_channels];

        let mut out_idx = 0;
        for tz in &taps_z {
            for ty in &taps_y {
                for tx in &taps_x {
                    // Eight clamped source corners with trilinear weights.
                    let corners = [
                        (tx.i0, ty.i0, tz.i0, (1.0 - tx.t) * (1.0 - ty.t) * (1.0 - tz.t)),
                        (tx.i1, ty.i0, tz.i0, tx.t * (1.0 - ty.t) * (1.0 - tz.t)),
                        (tx.i0, ty.i1, tz.i0, (1.0 - tx.t) * ty.t * (1.0 - tz.t)),
                        (tx.i1, ty.i1, tz.i0, tx.t * ty.t * (1.0 - tz.t)),
                        (tx.i0, ty.i0, tz.i1, (1.0 - tx.t) * (1.0 - ty.t) * tz.t),
                        (tx.i1, ty.i0, tz.i1, tx.t * (1.0 - ty.t) * tz.t),
                        (tx.i0, ty.i1, tz.i1, (1.0 - tx.t) * ty.t * tz.t),
                        (tx.i1, ty.i1, tz.i1, tx.t * ty.t * tz.t),
                    ];

                    for (cx, cy, cz, w) in corners {
                        let src = self.voxel_index(cx, cy, cz);
                        densities[out_idx] += w * self.densities()[src];

                        let src_base = src * feature_dim;
                        let dst_base = out_idx * feature_dim;
                        for k in 0..feature_dim {
                            features[dst_base + k] += w * self.features()[src_base + k];
                        }

                        if let Some(attn) = self.attn() {
                            let src_base = src * attn_channels;
                            let dst_base = out_idx * attn_channels;
                            for k in 0..attn_channels {
                                attn_values[dst_base + k] += w * attn.values[src_base + k];
                            }
                        }
                    }

                    out_idx += 1;
                }
            }
        }

        let grid = VoxelGrid::new(
            new_dims,
            voxel_size,
            self.center(),
            densities,
            features,
            feature_dim,
        )?;
        if attn_channels > 0 {
            grid.with_attn(attn_channels, attn_values)
        } else {
            Ok(grid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn ramp_grid(dims: [usize; 3]) -> VoxelGrid {
        let mut grid = VoxelGrid::zeros(dims, VoxelSize::uniform(1.0), Vector3::zeros(), 1).unwrap();
        let [nx, _, _] = dims;
        let n = grid.num_voxels();
        for i in 0..n {
            // Density is a linear ramp along x.
            grid.densities_mut()[i] = (i % nx) as f32;
        }
        grid
    }

    #[test]
    fn test_identity_resample_preserves_values() {
        let grid = ramp_grid([4, 3, 2]);
        let same = grid.resampled([4, 3, 2]).unwrap();
        for (a, b) in grid.densities().iter().zip(same.densities()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_upsample_keeps_world_bounds() {
        let grid = ramp_grid([4, 4, 4]);
        let fine = grid.resampled([8, 8, 8]).unwrap();

        let a = grid.aabb();
        let b = fine.aabb();
        assert_relative_eq!(a.min.x, b.min.x, epsilon = 1e-5);
        assert_relative_eq!(a.max.z, b.max.z, epsilon = 1e-5);
        assert_relative_eq!(fine.voxel_size().x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_upsample_interpolates_ramp() {
        let grid = ramp_grid([4, 1, 1]);
        let fine = grid.resampled([8, 1, 1]).unwrap();

        // The interior of a linear ramp stays linear under trilinear
        // resampling; successive interior samples differ by scale * slope.
        let d = fine.densities();
        assert_relative_eq!(d[3] - d[2], 0.5, epsilon = 1e-5);
        assert_relative_eq!(d[4] - d[3], 0.5, epsilon = 1e-5);
        // Edge values clamp rather than overshoot.
        assert!(d[0] >= 0.0 && d[7] <= 3.0 + 1e-5);
    }

    #[test]
    fn test_resample_carries_attn() {
        let grid = ramp_grid([2, 2, 2]).with_attn(1, vec![1.0; 8]).unwrap();
        let fine = grid.resampled([4, 4, 4]).unwrap();
        let attn = fine.attn().unwrap();
        assert_eq!(attn.channels, 1);
        assert_eq!(attn.values.len(), 64);
        for v in &attn.values {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_resample_rejects_empty_dims() {
        let grid = ramp_grid([2, 2, 2]);
        assert!(grid.resampled([0, 2, 2]).is_err());
    }
}
