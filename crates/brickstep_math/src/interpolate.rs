//! Linear interpolation for keyframed values

use crate::{Rotor3, Vec3, Vec4};

/// A value that can be blended between two keyframes
///
/// `t` is in `[0, 1]`; `t = 0` yields `self` and `t = 1` yields `other`.
pub trait Interpolate: Copy {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

impl Interpolate for Vec4 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, t)
    }
}

/// Rotations blend along the shorter arc and stay normalized
impl Interpolate for Rotor3 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.nlerp(other, t)
    }
}
