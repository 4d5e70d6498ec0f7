// extensions/easing.rs
//
// Interpolation helpers. No dependencies on Entity/Scene; just math.

use glam::Vec3;

/// Linear interpolation with `t` clamped to [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Vector linear interpolation with `t` clamped to [0, 1], so a large
/// `dt * rate` factor lands exactly on `b` instead of overshooting.
#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t.clamp(0.0, 1.0))
}
