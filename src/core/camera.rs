//! Camera model (pinhole camera with intrinsics and extrinsics).
//!
//! Cameras are used to:
//! - Generate one world-space ray per pixel for the ray marcher
//! - Compute viewing directions for SH evaluation

use crate::core::{Ray, RayBundle};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A pinhole camera with intrinsic and extrinsic parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    // Intrinsic parameters (camera internals)
    /// Focal length in X (pixels)
    pub fx: f32,

    /// Focal length in Y (pixels)
    pub fy: f32,

    /// Principal point X (pixels)
    pub cx: f32,

    /// Principal point Y (pixels)
    pub cy: f32,

    /// Image width (pixels)
    pub width: u32,

    /// Image height (pixels)
    pub height: u32,

    // Extrinsic parameters (camera pose in world)
    /// Rotation from world to camera coordinates
    pub rotation: Matrix3<f32>,

    /// Translation from world to camera coordinates
    pub translation: Vector3<f32>,
}

impl Camera {
    /// Create a new camera with given parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fx: f32,
        fy: f32,
        cx: f32,
        cy: f32,
        width: u32,
        height: u32,
        rotation: Matrix3<f32>,
        translation: Vector3<f32>,
    ) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
            rotation,
            translation,
        }
    }

    /// Transform a point from world coordinates to camera coordinates.
    ///
    /// p_camera = R * p_world + t
    pub fn world_to_camera(&self, point_world: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * point_world + self.translation
    }

    /// Get the camera center in world coordinates.
    ///
    /// The camera looks from this point.
    pub fn camera_center(&self) -> Vector3<f32> {
        // Camera center in world: C = -R^T * t
        -self.rotation.transpose() * self.translation
    }

    /// World-space ray through the center of pixel `(px, py)`.
    ///
    /// Camera-space direction is `((u - cx)/fx, (v - cy)/fy, 1)` with
    /// `(u, v) = (px + 0.5, py + 0.5)`, rotated back into world space and
    /// normalized. The z component of 1 guarantees a nonzero direction.
    pub fn pixel_ray(&self, px: u32, py: u32) -> Ray {
        let u = px as f32 + 0.5;
        let v = py as f32 + 0.5;

        let dir_camera = Vector3::new((u - self.cx) / self.fx, (v - self.cy) / self.fy, 1.0);
        let dir_world = (self.rotation.transpose() * dir_camera).normalize();

        Ray::new(self.camera_center(), dir_world)
    }

    /// Total pixel count, widened so huge images cannot overflow `u32`.
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Generate rays for every pixel of the image, row-major.
    pub fn rays(&self) -> RayBundle {
        let mut bundle = RayBundle::with_capacity(self.num_pixels());
        for py in 0..self.height {
            for px in 0..self.width {
                bundle.push(self.pixel_ray(px, py));
            }
        }
        bundle
    }

    /// Camera with resolution and intrinsics scaled by `factor`.
    ///
    /// Used to render at a different resolution than the nominal intrinsics
    /// (e.g. a 2x supersampled turntable render).
    pub fn scaled(&self, factor: f32) -> Camera {
        let width = ((self.width as f32) * factor).round().max(1.0) as u32;
        let height = ((self.height as f32) * factor).round().max(1.0) as u32;

        Camera::new(
            self.fx * factor,
            self.fy * factor,
            self.cx * factor,
            self.cy * factor,
            width,
            height,
            self.rotation,
            self.translation,
        )
    }
}
