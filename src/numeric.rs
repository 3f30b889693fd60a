/*

    Declare numeric types used throughout this crate.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change both of these:
    pub type Float = f32;
    pub type Vector3 = Vec3;

    @date: 2 Oct, 2025
*/

use bevy_math::{DMat4, DVec3, DVec4};
pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update Vector3 and Matrix4 types
pub type Vector3 = DVec3;
pub type Matrix4 = DMat4;
pub type Vector4 = DVec4;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn transform_point(mat: &Matrix4, v: &Vector3) -> Vector3 {
    let v4 = Vector4::new(v.x, v.y, v.z, 1.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

/// Returns the `axis`-th component (0 = x, 1 = y, anything else = z).
#[inline]
pub fn component(v: &Vector3, axis: usize) -> Float {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

pub fn is_finite_vec(v: &Vector3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
