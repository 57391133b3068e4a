//! Small shared math helpers.

/// Linear interpolation between `a` and `b` at parameter `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
