//! Camera path generation (turntable and spiral orbits).
//!
//! These produce the poses used for offline renders of a trained grid: a
//! camera on a hemisphere around the scene origin, swept either at fixed
//! pitch (turntable) or spiraling between two orbit radii.
//!
//! Conventions: z is up, yaw rotates around z, pitch is elevation above the
//! xy plane. All cameras look at the world origin.

use crate::core::Camera;
use nalgebra::{Matrix3, Vector3};

/// World-to-camera rotation and translation for a camera at `eye` looking
/// at `target`.
///
/// The camera frame is x-right, y-down, z-forward (pinhole convention with
/// positive depth in front of the camera).
pub fn look_at(eye: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> (Matrix3<f32>, Vector3<f32>) {
    let forward = (target - eye).normalize();

    let mut right = forward.cross(&up);
    if right.norm() < 1e-6 {
        // Looking straight along `up`: pick any perpendicular axis.
        right = forward.cross(&Vector3::new(0.0, 1.0, 0.0));
        if right.norm() < 1e-6 {
            right = forward.cross(&Vector3::new(1.0, 0.0, 0.0));
        }
    }
    let right = right.normalize();
    let down = forward.cross(&right);

    let rotation = Matrix3::from_rows(&[
        right.transpose(),
        down.transpose(),
        forward.transpose(),
    ]);
    let translation = -rotation * eye;

    (rotation, translation)
}

/// Position on a sphere of given radius at (yaw, pitch) in degrees.
pub fn spherical_position(radius: f32, yaw_deg: f32, pitch_deg: f32) -> Vector3<f32> {
    let yaw = yaw_deg.to_radians();
    let pitch = pitch_deg.to_radians();
    Vector3::new(
        radius * pitch.cos() * yaw.cos(),
        radius * pitch.cos() * yaw.sin(),
        radius * pitch.sin(),
    )
}

/// Camera on a hemisphere around the origin, using the intrinsics of `base`.
pub fn pose_on_hemisphere(base: &Camera, radius: f32, yaw_deg: f32, pitch_deg: f32) -> Camera {
    let eye = spherical_position(radius, yaw_deg, pitch_deg);
    let (rotation, translation) = look_at(eye, Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));

    Camera::new(
        base.fx,
        base.fy,
        base.cx,
        base.cy,
        base.width,
        base.height,
        rotation,
        translation,
    )
}

/// Full 360° yaw sweep at fixed pitch: `num_poses` cameras on the orbit.
pub fn turntable_poses(base: &Camera, radius: f32, pitch_deg: f32, num_poses: usize) -> Vec<Camera> {
    (0..num_poses)
        .map(|i| {
            let yaw = 360.0 * (i as f32) / (num_poses as f32);
            pose_on_hemisphere(base, radius, yaw, pitch_deg)
        })
        .collect()
}

/// Spiral orbit at fixed camera height.
///
/// The horizontal orbit radius sweeps linearly from `radius_range.0` to
/// `radius_range.1` while the yaw completes `num_rounds` revolutions.
pub fn spiral_poses(
    base: &Camera,
    radius_range: (f32, f32),
    camera_height: f32,
    num_rounds: usize,
    num_poses: usize,
) -> Vec<Camera> {
    let (r0, r1) = radius_range;
    (0..num_poses)
        .map(|i| {
            let t = if num_poses > 1 {
                (i as f32) / ((num_poses - 1) as f32)
            } else {
                0.0
            };
            let radius = crate::core::lerp(r0, r1, t);
            let yaw = (360.0 * num_rounds as f32 * t).to_radians();

            let eye = Vector3::new(radius * yaw.cos(), radius * yaw.sin(), camera_height);
            let (rotation, translation) =
                look_at(eye, Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));

            Camera::new(
                base.fx,
                base.fy,
                base.cx,
                base.cy,
                base.width,
                base.height,
                rotation,
                translation,
            )
        })
        .collect()
}
