//! Analytic bounding volumes used for picking
//!
//! These are lightweight primitives for hit-testing, separate from any
//! renderable mesh data.

use serde::{Serialize, Deserialize};
use crate::{Vec3, Vec4};
use crate::mat4::{self, Mat4};

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere at the given center with the given radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// An inverted box that any call to [`Aabb::extend`] replaces
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// A cube centered at the origin with the given half edge length
    pub fn cube(half_edge: f32) -> Self {
        Self::from_center_half_extents(Vec3::ZERO, Vec3::splat(half_edge))
    }

    /// True if no point has been added yet
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow the box to include a point
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min_components(point);
        self.max = self.max.max_components(point);
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// The 8 corners, indexed by bits (bit 0 = x, bit 1 = y, bit 2 = z)
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
        }
        corners
    }
}

/// A plane defined by normal and offset
///
/// The plane equation is: normal · point + d = 0. Points with a positive
/// signed distance are outside; selection volumes keep the non-positive side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Normal vector pointing to the outside
    pub normal: Vec3,
    /// Offset term of the plane equation
    pub d: f32,
}

impl Plane {
    /// Create a new plane from a normal and offset
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Create a plane from `(nx, ny, nz, d)`
    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(v.xyz(), v.w)
    }

    /// Signed distance scaled by the normal length
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Express this world-space plane in the frame of a rigid world-to-local
    /// matrix
    pub fn to_local(&self, world_to_local: Mat4) -> Self {
        let normal = mat4::transform_direction(world_to_local, self.normal);
        let d = self.d - mat4::get_translation(world_to_local).dot(normal);
        Self { normal, d }
    }
}
