//! Chunked volumetric renderer.
//!
//! Ties the pipeline together: ray generation (or a caller-provided bundle),
//! per-ray sampling and field evaluation, compositing, and image conversion.
//! Large bundles are split into bounded-size chunks so peak memory does not
//! grow with image size; rays within a chunk render in parallel via rayon.
//! Output ordering matches the input bundle regardless of chunking.

use crate::core::{chunk_ranges, evaluate_sh, Camera, Ray, RayBundle};
use crate::grid::VoxelGrid;
use crate::render::{composite_ray, sample_along_ray, RenderConfig, RenderError};
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::debug;
use nalgebra::Vector3;
use rayon::prelude::*;

/// Per-ray render result of one compositing pass.
type RayResult = (Vector3<f32>, f32, f32, Vec<f32>);

/// Flat per-ray output buffers, in bundle order.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Composited color per ray (background already blended in).
    pub colors: Vec<Vector3<f32>>,

    /// Expected termination depth per ray.
    pub depths: Vec<f32>,

    /// Accumulated opacity per ray.
    pub alphas: Vec<f32>,

    /// Accumulated attention, `attn_channels` values per ray.
    pub attn: Vec<f32>,

    pub attn_channels: usize,
}

/// Renders a `VoxelGrid` along arbitrary ray bundles or full camera views.
#[derive(Clone, Debug, Default)]
pub struct GridRenderer {
    pub config: RenderConfig,
}

impl GridRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render every ray of `rays` against `grid`.
    pub fn render_rays(
        &self,
        grid: &VoxelGrid,
        rays: &RayBundle,
    ) -> Result<RenderOutput, RenderError> {
        if self.config.num_samples_per_ray == 0 {
            return Err(RenderError::NoSamples);
        }

        let num_rays = rays.len();
        let channels = grid.attn_channels();
        let mut output = RenderOutput {
            colors: vec![Vector3::zeros(); num_rays],
            depths: vec![0.0; num_rays],
            alphas: vec![0.0; num_rays],
            attn: vec![0.0; num_rays * channels],
            attn_channels: channels,
        };

        let chunk = self.config.num_rays_chunk;
        debug!(
            "rendering {} rays, {} samples/ray, chunks of {}",
            num_rays, self.config.num_samples_per_ray, chunk
        );

        for range in chunk_ranges(num_rays, chunk) {
            let results: Vec<RayResult> = range
                .clone()
                .into_par_iter()
                .map(|i| self.render_one(grid, rays.get(i)))
                .collect();

            for (offset, (color, depth, alpha, attn)) in results.into_iter().enumerate() {
                let i = range.start + offset;
                output.colors[i] = color;
                output.depths[i] = depth;
                output.alphas[i] = alpha;
                if channels > 0 {
                    output.attn[i * channels..(i + 1) * channels].copy_from_slice(&attn);
                }
            }
        }

        Ok(output)
    }

    /// Render a full camera view.
    pub fn render(&self, grid: &VoxelGrid, camera: &Camera) -> Result<ImageRender, RenderError> {
        let rays = camera.rays();
        let output = self.render_rays(grid, &rays)?;
        Ok(ImageRender {
            output,
            width: camera.width,
            height: camera.height,
        })
    }

    /// March a single ray: sample, evaluate the field, composite.
    fn render_one(&self, grid: &VoxelGrid, ray: Ray) -> RayResult {
        let cfg = &self.config;
        let channels = grid.attn_channels();
        let mut attn_out = vec![0.0f32; channels];

        let aabb = grid.aabb();
        let samples = if cfg.perturb_samples {
            sample_along_ray(&ray, &aabb, cfg.num_samples_per_ray, Some(&mut rand::thread_rng()))
        } else {
            sample_along_ray::<rand::rngs::ThreadRng>(&ray, &aabb, cfg.num_samples_per_ray, None)
        };

        if samples.is_empty() {
            // Ray never enters the grid.
            return (cfg.background.color(), 0.0, 0.0, attn_out);
        }

        let n = samples.len();
        let mut sigmas = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut attn = vec![0.0f32; n * channels];
        let mut feature_buf = vec![0.0f32; grid.feature_dim()];

        for (i, &t) in samples.depths.iter().enumerate() {
            let p = ray.at(t);
            let sigma = cfg
                .density_activation
                .apply(cfg.density_scale * grid.sample_density(&p));
            sigmas.push(sigma);

            if sigma > 0.0 {
                grid.sample_features(&p, &mut feature_buf);
                colors.push(evaluate_sh(&feature_buf, &ray.direction));
                if channels > 0 {
                    grid.sample_attn(&p, &mut attn[i * channels..(i + 1) * channels]);
                }
            } else {
                // Zero weight: color/attention never contribute.
                colors.push(Vector3::zeros());
            }
        }

        let accum = composite_ray(
            &samples,
            &sigmas,
            &colors,
            &attn,
            channels,
            cfg.background.color(),
            &mut attn_out,
        );
        (accum.color, accum.depth, accum.alpha, attn_out)
    }
}

/// A full-image render with conversions to `image` buffers.
#[derive(Clone, Debug)]
pub struct ImageRender {
    pub output: RenderOutput,
    pub width: u32,
    pub height: u32,
}

impl ImageRender {
    fn to_u8(v: f32) -> u8 {
        (v * 255.0).clamp(0.0, 255.0) as u8
    }

    /// Composited color as an 8-bit RGB image.
    pub fn color_image(&self) -> RgbImage {
        let mut img = RgbImage::new(self.width, self.height);
        for (i, c) in self.output.colors.iter().enumerate() {
            let x = (i as u32) % self.width;
            let y = (i as u32) / self.width;
            img.put_pixel(
                x,
                y,
                Rgb([Self::to_u8(c.x), Self::to_u8(c.y), Self::to_u8(c.z)]),
            );
        }
        img
    }

    /// Expected depth as a grayscale image, normalized by the maximum depth.
    pub fn depth_image(&self) -> GrayImage {
        let max = self.output.depths.iter().cloned().fold(0.0f32, f32::max);
        let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
        self.gray_from(|i| self.output.depths[i] * scale)
    }

    /// Accumulated opacity as a grayscale image.
    pub fn alpha_image(&self) -> GrayImage {
        self.gray_from(|i| self.output.alphas[i])
    }

    /// One attention channel as a grayscale image, normalized by its maximum.
    ///
    /// Returns `None` if the channel does not exist.
    pub fn attn_image(&self, channel: usize) -> Option<GrayImage> {
        let ch = self.output.attn_channels;
        if channel >= ch {
            return None;
        }
        let max = (0..self.output.depths.len())
            .map(|i| self.output.attn[i * ch + channel])
            .fold(0.0f32, f32::max);
        let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
        Some(self.gray_from(|i| self.output.attn[i * ch + channel] * scale))
    }

    fn gray_from(&self, value: impl Fn(usize) -> f32) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        for i in 0..self.width as usize * self.height as usize {
            let x = (i as u32) % self.width;
            let y = (i as u32) / self.width;
            img.put_pixel(x, y, Luma([Self::to_u8(value(i))]));
        }
        img
    }
}
