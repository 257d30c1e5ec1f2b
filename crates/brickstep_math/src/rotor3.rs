//! 3D Rotor for representing piece orientations
//!
//! In 3D, rotations happen in one of three planes (XY, XZ, YZ) or any
//! combination of them. A rotor has 4 components:
//! - 1 scalar
//! - 3 bivectors (one for each plane)

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};
use crate::Vec3;
use crate::mat4::Mat4;

/// The 3 rotation planes in 3D space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationPlane {
    /// XY plane - rotates X towards Y (right-handed about +Z)
    XY,
    /// XZ plane - rotates X towards Z (right-handed about -Y)
    XZ,
    /// YZ plane - rotates Y towards Z (right-handed about +X)
    YZ,
}

/// 3D Rotor
///
/// R = s + b_xy*e12 + b_xz*e13 + b_yz*e23
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rotor3 {
    /// Scalar component
    pub s: f32,
    /// Bivector component for XY plane (e12)
    pub b_xy: f32,
    /// Bivector component for XZ plane (e13)
    pub b_xz: f32,
    /// Bivector component for YZ plane (e23)
    pub b_yz: f32,
}

impl Default for Rotor3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotor3 {
    /// Identity rotor (no rotation)
    pub const IDENTITY: Self = Self { s: 1.0, b_xy: 0.0, b_xz: 0.0, b_yz: 0.0 };

    /// Create a rotor for rotation in a single plane
    ///
    /// R = cos(θ/2) - sin(θ/2) * B, where B is the unit bivector of the plane.
    pub fn from_plane_angle(plane: RotationPlane, angle: f32) -> Self {
        let half = angle * 0.5;
        let mut r = Self::IDENTITY;
        r.s = half.cos();

        match plane {
            RotationPlane::XY => r.b_xy = -half.sin(),
            RotationPlane::XZ => r.b_xz = -half.sin(),
            RotationPlane::YZ => r.b_yz = -half.sin(),
        }

        r
    }

    /// Create a rotor rotating `angle` radians right-handed about `axis`
    ///
    /// A zero axis gives the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let n = axis.normalized();
        if n == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let half = angle * 0.5;
        let sin_h = half.sin();

        Self {
            s: half.cos(),
            b_xy: -sin_h * n.z,
            b_xz: sin_h * n.y,
            b_yz: -sin_h * n.x,
        }
    }

    /// Compute the squared magnitude of the rotor
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.s * self.s + self.b_xy * self.b_xy + self.b_xz * self.b_xz + self.b_yz * self.b_yz
    }

    /// Compute the magnitude of the rotor
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Normalize the rotor to unit magnitude
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            let inv_mag = 1.0 / mag;
            Self {
                s: self.s * inv_mag,
                b_xy: self.b_xy * inv_mag,
                b_xz: self.b_xz * inv_mag,
                b_yz: self.b_yz * inv_mag,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Reverse (conjugate); the inverse rotation for unit rotors
    pub fn reverse(&self) -> Self {
        Self {
            s: self.s,
            b_xy: -self.b_xy,
            b_xz: -self.b_xz,
            b_yz: -self.b_yz,
        }
    }

    /// Inner product of the rotor components
    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.s * other.s + self.b_xy * other.b_xy + self.b_xz * other.b_xz + self.b_yz * other.b_yz
    }

    /// Rotate a vector using the sandwich product: v' = R * v * R†
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let s = self.s;
        let b12 = self.b_xy;
        let b13 = self.b_xz;
        let b23 = self.b_yz;

        let s2 = s * s;
        let b12_2 = b12 * b12;
        let b13_2 = b13 * b13;
        let b23_2 = b23 * b23;

        let x = v.x * (s2 - b12_2 - b13_2 + b23_2)
            + 2.0 * v.y * (s * b12 - b13 * b23)
            + 2.0 * v.z * (s * b13 + b12 * b23);

        let y = 2.0 * v.x * (-s * b12 - b13 * b23)
            + v.y * (s2 - b12_2 + b13_2 - b23_2)
            + 2.0 * v.z * (s * b23 - b12 * b13);

        let z = 2.0 * v.x * (-s * b13 + b12 * b23)
            + 2.0 * v.y * (-s * b23 - b12 * b13)
            + v.z * (s2 + b12_2 - b13_2 - b23_2);

        Vec3::new(x, y, z)
    }

    /// Compose two rotations: result = self * other
    /// The composed rotation applies `other` first, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        let a = self;
        let b = other;

        Self {
            s: a.s * b.s - a.b_xy * b.b_xy - a.b_xz * b.b_xz - a.b_yz * b.b_yz,
            b_xy: a.s * b.b_xy + a.b_xy * b.s - a.b_xz * b.b_yz + a.b_yz * b.b_xz,
            b_xz: a.s * b.b_xz + a.b_xz * b.s + a.b_xy * b.b_yz - a.b_yz * b.b_xy,
            b_yz: a.s * b.b_yz + a.b_yz * b.s - a.b_xy * b.b_xz + a.b_xz * b.b_xy,
        }
    }

    /// Normalized linear interpolation along the shorter arc
    pub fn nlerp(&self, other: &Self, t: f32) -> Self {
        let target = if self.dot(other) < 0.0 {
            Self {
                s: -other.s,
                b_xy: -other.b_xy,
                b_xz: -other.b_xz,
                b_yz: -other.b_yz,
            }
        } else {
            *other
        };

        Self {
            s: self.s + (target.s - self.s) * t,
            b_xy: self.b_xy + (target.b_xy - self.b_xy) * t,
            b_xz: self.b_xz + (target.b_xz - self.b_xz) * t,
            b_yz: self.b_yz + (target.b_yz - self.b_yz) * t,
        }
        .normalize()
    }

    /// Convert rotor to a column-major 4x4 rotation matrix
    pub fn to_matrix(&self) -> Mat4 {
        let x_col = self.rotate(Vec3::X);
        let y_col = self.rotate(Vec3::Y);
        let z_col = self.rotate(Vec3::Z);

        [
            [x_col.x, x_col.y, x_col.z, 0.0],
            [y_col.x, y_col.y, y_col.z, 0.0],
            [z_col.x, z_col.y, z_col.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}
