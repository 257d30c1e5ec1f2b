//! Mathematics for the brickstep scene editor
//!
//! This crate provides the 3D vector, rotation and bounding types that
//! animated scene objects are built from.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector for positions and directions
//! - [`Vec4`] - 4-component vector for colours and planes
//! - [`Rotor3`] - 3D rotation using geometric algebra
//! - [`Mat4`] - 4x4 matrix for rigid transformations
//!
//! ## Picking
//!
//! - [`Aabb`], [`Sphere`], [`Plane`] - analytic bounding volumes
//! - [`intersect`] - ray and selection-volume tests against them

mod vec3;
mod vec4;
mod rotor3;
mod interpolate;
pub mod mat4;
pub mod bounds;
pub mod intersect;

pub use vec3::Vec3;
pub use vec4::Vec4;
pub use rotor3::{Rotor3, RotationPlane};
pub use mat4::Mat4;
pub use interpolate::Interpolate;
pub use bounds::{Aabb, Plane, Sphere};
pub use intersect::RayHit;
