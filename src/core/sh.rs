//! Spherical harmonics evaluation for view-dependent color.
//!
//! Voxels store color as spherical harmonics coefficients rather than a
//! single RGB value, which allows view-dependent effects (specular
//! highlights, etc.).
//!
//! Coefficients per channel determine the degree: 1 (degree 0) up to 16
//! (degree 3). Basis functions use the standard real-SH constants and are
//! ordered DC first, then degree 1, 2, 3.

use nalgebra::Vector3;

const C0: f32 = 0.282_094_8;
const C1: f32 = 0.488_602_5;
const C2: [f32; 5] = [1.092_548_4, -1.092_548_4, 0.315_391_57, -1.092_548_4, 0.546_274_2];
const C3: [f32; 7] = [
    -0.590_043_6,
    2.890_611_4,
    -0.457_045_8,
    0.373_176_33,
    -0.457_045_8,
    1.445_305_7,
    -0.590_043_6,
];

/// Number of SH coefficients per channel for a given degree.
pub const fn num_sh_coeffs(degree: usize) -> usize {
    (degree + 1) * (degree + 1)
}

/// Infer the SH degree from the number of coefficients per channel.
///
/// Returns `None` for counts that do not correspond to a supported degree.
pub fn sh_degree_from_coeffs(coeffs_per_channel: usize) -> Option<usize> {
    match coeffs_per_channel {
        1 => Some(0),
        4 => Some(1),
        9 => Some(2),
        16 => Some(3),
        _ => None,
    }
}

/// Evaluate the real SH basis functions up to degree 3.
///
/// Given a normalized direction vector, returns all 16 basis values; callers
/// using a lower degree read only the leading coefficients.
pub fn sh_basis(direction: &Vector3<f32>) -> [f32; 16] {
    let x = direction.x;
    let y = direction.y;
    let z = direction.z;

    let xx = x * x;
    let yy = y * y;
    let zz = z * z;

    let mut basis = [0.0f32; 16];

    // Degree 0
    basis[0] = C0;

    // Degree 1
    basis[1] = -C1 * y;
    basis[2] = C1 * z;
    basis[3] = -C1 * x;

    // Degree 2
    basis[4] = C2[0] * x * y;
    basis[5] = C2[1] * y * z;
    basis[6] = C2[2] * (2.0 * zz - xx - yy);
    basis[7] = C2[3] * x * z;
    basis[8] = C2[4] * (xx - yy);

    // Degree 3
    basis[9] = C3[0] * y * (3.0 * xx - yy);
    basis[10] = C3[1] * x * y * z;
    basis[11] = C3[2] * y * (4.0 * zz - xx - yy);
    basis[12] = C3[3] * z * (2.0 * zz - 3.0 * xx - 3.0 * yy);
    basis[13] = C3[4] * x * (4.0 * zz - xx - yy);
    basis[14] = C3[5] * z * (xx - yy);
    basis[15] = C3[6] * x * (xx - 3.0 * yy);

    basis
}

/// Evaluate view-dependent RGB color from SH coefficients.
///
/// `coeffs` holds the three channels back to back: `[R..., G..., B...]`,
/// each `coeffs.len() / 3` values long. The result is clamped to [0, 1]
/// (SH can produce negative values or values > 1).
pub fn evaluate_sh(coeffs: &[f32], direction: &Vector3<f32>) -> Vector3<f32> {
    debug_assert_eq!(coeffs.len() % 3, 0);
    let n = coeffs.len() / 3;

    // Normalize direction (should already be normalized, but be safe)
    let dir = direction.normalize();
    let basis = sh_basis(&dir);

    let mut color = Vector3::<f32>::zeros();
    for k in 0..n {
        let b = basis[k];
        color.x += b * coeffs[k];
        color.y += b * coeffs[n + k];
        color.z += b * coeffs[2 * n + k];
    }

    Vector3::new(
        color.x.clamp(0.0, 1.0),
        color.y.clamp(0.0, 1.0),
        color.z.clamp(0.0, 1.0),
    )
}
