//! 4x4 Matrix utilities for rigid 3D transformations
//!
//! Matrices are column-major (`m[column][row]`) and act on column vectors,
//! so `transform_point(m, p)` computes `M * p`. Object frames are built with
//! [`look_at`], which produces a world-to-local matrix whose local -Z axis
//! points from the eye towards the target.

use crate::{Vec3, Vec4};

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Squared length below which a direction is treated as degenerate
const DEGENERATE_EPSILON_SQ: f32 = 1e-12;

/// Pure translation matrix
pub fn translation(offset: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    set_translation(&mut m, offset);
    m
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a Vec4 by a 4x4 matrix (column-major)
///
/// result = M * v
pub fn transform(m: Mat4, v: Vec4) -> Vec4 {
    Vec4::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z + m[3][0] * v.w,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z + m[3][1] * v.w,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z + m[3][2] * v.w,
        m[0][3] * v.x + m[1][3] * v.y + m[2][3] * v.z + m[3][3] * v.w,
    )
}

/// Transform a point (w = 1), including translation
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    transform(m, Vec4::from_vec3(p, 1.0)).xyz()
}

/// Transform a direction (w = 0), ignoring translation
pub fn transform_direction(m: Mat4, d: Vec3) -> Vec3 {
    transform(m, Vec4::from_vec3(d, 0.0)).xyz()
}

/// The translation part of an affine matrix
pub fn get_translation(m: Mat4) -> Vec3 {
    Vec3::new(m[3][0], m[3][1], m[3][2])
}

/// Replace the translation part of an affine matrix
pub fn set_translation(m: &mut Mat4, offset: Vec3) {
    m[3][0] = offset.x;
    m[3][1] = offset.y;
    m[3][2] = offset.z;
}

/// Inverse of a rigid transform (orthonormal rotation plus translation)
///
/// The rotation block is transposed and the translation is rotated back and
/// negated. Matrices with scale or shear are not handled.
pub fn affine_inverse(m: Mat4) -> Mat4 {
    let mut result = IDENTITY;

    for col in 0..3 {
        for row in 0..3 {
            result[col][row] = m[row][col];
        }
    }

    let t = get_translation(m);
    let inv_t = -transform_direction(result, t);
    set_translation(&mut result, inv_t);

    result
}

/// An up vector orthogonal to `front`, built from the coordinate axis least
/// aligned with it
///
/// The chosen axis has the component of `front` subtracted from it, which
/// stays well conditioned even when `front` is nearly parallel to one axis.
/// A zero `front` yields +Z.
pub fn perpendicular_up(front: Vec3) -> Vec3 {
    let axis = Vec3::unit_axis(front.least_aligned_axis());
    let f = front.normalized();
    (axis - f * axis.dot(f)).normalized()
}

/// World-to-local matrix for a frame at `eye` looking at `target`
///
/// Local axes: +X right, +Y up, -Z towards the target. When `eye` equals
/// `target` the frame looks down -Z; when `up` is parallel to the view
/// direction it is replaced by [`perpendicular_up`]. The result never
/// contains NaN for finite inputs.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let mut z = eye - target;
    if z.length_squared() < DEGENERATE_EPSILON_SQ {
        z = Vec3::Z;
    }
    let z = z.normalized();

    let mut x = up.cross(z);
    if x.length_squared() < DEGENERATE_EPSILON_SQ {
        x = perpendicular_up(z).cross(z);
    }
    let x = x.normalized();
    let y = z.cross(x);

    [
        [x.x, y.x, z.x, 0.0],
        [x.y, y.y, z.y, 0.0],
        [x.z, y.z, z.z, 0.0],
        [-x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0],
    ]
}

/// True if every element is finite
pub fn is_finite(m: Mat4) -> bool {
    m.iter().all(|col| col.iter().all(|v| v.is_finite()))
}
