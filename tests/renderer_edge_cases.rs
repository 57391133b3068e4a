//! Edge-case coverage for the ray marcher: rays that miss, empty fields,
//! degenerate configs, and chunking extremes.

use anyhow::Result;
use nalgebra::{Matrix3, Vector3};
use voxfield::core::{Ray, RayBundle};
use voxfield::grid::{VoxelGrid, VoxelSize};
use voxfield::render::{Background, DensityActivation, GridRenderer, RenderConfig};
use voxfield::Camera;

fn empty_grid() -> VoxelGrid {
    VoxelGrid::zeros([8, 8, 8], VoxelSize::uniform(0.25), Vector3::zeros(), 1).unwrap()
}

fn renderer(config: RenderConfig) -> GridRenderer {
    GridRenderer::new(config)
}

#[test]
fn test_zero_density_grid_is_pure_background() -> Result<()> {
    let grid = empty_grid();
    let camera = Camera::new(
        30.0,
        30.0,
        12.0,
        12.0,
        24,
        24,
        Matrix3::identity(),
        Vector3::new(0.0, 0.0, 4.0), // camera at z = -4 looking at the grid
    );

    let render = renderer(RenderConfig {
        background: Background::Color([0.1, 0.2, 0.3]),
        ..Default::default()
    })
    .render(&grid, &camera)?;

    for (i, c) in render.output.colors.iter().enumerate() {
        assert!((c.x - 0.1).abs() < 1e-5, "ray {i}: {c:?}");
        assert!((c.y - 0.2).abs() < 1e-5);
        assert!((c.z - 0.3).abs() < 1e-5);
    }
    assert!(render.output.alphas.iter().all(|&a| a == 0.0));
    assert!(render.output.depths.iter().all(|&d| d == 0.0));
    Ok(())
}

#[test]
fn test_rays_pointing_away_miss() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 100.0;
    }

    let mut bundle = RayBundle::new();
    // Origin outside the grid, marching away from it.
    bundle.push(Ray::new(
        Vector3::new(0.0, 0.0, 5.0),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let out = renderer(RenderConfig {
        background: Background::White,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;

    assert_eq!(out.colors.len(), 1);
    assert!((out.colors[0].x - 1.0).abs() < 1e-6);
    assert_eq!(out.alphas[0], 0.0);
    Ok(())
}

#[test]
fn test_grazing_ray_composites_to_background() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 1e6;
    }

    // Equal x/z direction components from (-2, 0, 0) touch the box exactly
    // at the (-1, 0, 1) edge: entry and exit coincide, so the ray gets one
    // zero-width sample whose alpha is zero regardless of density.
    let mut bundle = RayBundle::new();
    bundle.push(Ray::new(
        Vector3::new(-2.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 1.0).normalize(),
    ));

    let out = renderer(RenderConfig {
        background: Background::White,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;

    assert!(out.colors[0].iter().all(|c| c.is_finite()));
    assert!((out.colors[0].x - 1.0).abs() < 1e-6);
    assert_eq!(out.alphas[0], 0.0);
    assert_eq!(out.depths[0], 0.0);
    Ok(())
}

#[test]
fn test_empty_bundle_renders_empty_output() -> Result<()> {
    let grid = empty_grid();
    let out = renderer(RenderConfig::default()).render_rays(&grid, &RayBundle::new())?;
    assert!(out.colors.is_empty());
    assert!(out.attn.is_empty());
    Ok(())
}

#[test]
fn test_single_sample_per_ray() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 1000.0;
    }

    let mut bundle = RayBundle::new();
    bundle.push(Ray::new(
        Vector3::new(0.0, 0.0, -4.0),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let out = renderer(RenderConfig {
        num_samples_per_ray: 1,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;

    // One sample across the whole 2-unit span at sigma 1000: fully opaque,
    // depth at the span midpoint (t = 4).
    assert!(out.alphas[0] > 0.999);
    assert!((out.depths[0] - 4.0).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_negative_density_clamped_by_relu() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = -5.0;
    }

    let mut bundle = RayBundle::new();
    bundle.push(Ray::new(
        Vector3::new(0.0, 0.0, -4.0),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let cfg = RenderConfig {
        density_activation: DensityActivation::Relu,
        background: Background::White,
        ..Default::default()
    };
    let out = renderer(cfg).render_rays(&grid, &bundle)?;
    assert_eq!(out.alphas[0], 0.0);
    assert!((out.colors[0].x - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_density_scale_thickens_media() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 0.5;
    }

    let mut bundle = RayBundle::new();
    bundle.push(Ray::new(
        Vector3::new(0.0, 0.0, -4.0),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let thin = renderer(RenderConfig {
        density_scale: 1.0,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;
    let thick = renderer(RenderConfig {
        density_scale: 10.0,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;

    assert!(thick.alphas[0] > thin.alphas[0]);
    Ok(())
}

#[test]
fn test_chunk_size_one() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 20.0;
    }

    let camera = Camera::new(
        20.0,
        20.0,
        8.0,
        8.0,
        16,
        16,
        Matrix3::identity(),
        Vector3::new(0.0, 0.0, 4.0),
    );

    let a = renderer(RenderConfig {
        num_rays_chunk: 1,
        num_samples_per_ray: 32,
        ..Default::default()
    })
    .render(&grid, &camera)?;
    let b = renderer(RenderConfig {
        num_rays_chunk: 4096,
        num_samples_per_ray: 32,
        ..Default::default()
    })
    .render(&grid, &camera)?;

    for (ca, cb) in a.output.colors.iter().zip(&b.output.colors) {
        assert!((ca - cb).norm() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_perturbed_sampling_stays_close_to_uniform() -> Result<()> {
    let mut grid = empty_grid();
    for d in grid.densities_mut() {
        *d = 5.0;
    }

    let mut bundle = RayBundle::new();
    bundle.push(Ray::new(
        Vector3::new(0.0, 0.0, -4.0),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let uniform = renderer(RenderConfig {
        num_samples_per_ray: 256,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;
    let jittered = renderer(RenderConfig {
        num_samples_per_ray: 256,
        perturb_samples: true,
        ..Default::default()
    })
    .render_rays(&grid, &bundle)?;

    // Homogeneous media: jitter changes sample positions but not the
    // integral; opacity must agree to a tight tolerance at 256 samples.
    assert!((uniform.alphas[0] - jittered.alphas[0]).abs() < 1e-2);
    Ok(())
}
