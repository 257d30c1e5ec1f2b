//! Animated scene objects for the brickstep editor
//!
//! A scene is organised into sequential build steps. Every object keeps its
//! animatable attributes in keyframe tracks indexed by step:
//!
//! - [`KeyframeTrack`] - step-keyed values with linear interpolation
//! - [`SelectionState`] - per-section selection and focus
//! - [`AnimatedObject`] - capability trait shared by every object kind
//! - [`Light`], [`Camera`], [`Piece`] - the concrete object kinds
//! - [`Scene`] - container for all objects plus the step timeline
//!
//! Hit-testing runs as sweeps over the scene: [`Scene::ray_test`] keeps the
//! closest hit and [`Scene::box_test`] collects everything inside a volume.

mod keys;
mod selection;
mod object;
pub mod interface;
mod light;
mod camera;
mod piece;
mod scene;

pub use keys::{Key, KeyframeTrack, Step, TrackError, STEP_MAX};
pub use selection::{SectionId, SectionMask, SelectionState};
pub use object::{
    create_name, AnimatedObject, ObjectBoxTest, ObjectHit, ObjectKey, ObjectKind, ObjectRayTest, Section,
};
pub use interface::{Highlight, InterfaceColors, InterfaceContext};
pub use light::{Light, LightFlags, LightSection};
pub use camera::{Camera, CameraFlags, CameraSection};
pub use piece::{Piece, PieceFlags, PieceSection, MAX_CONTROL_POINTS};
pub use scene::{Scene, SceneError};

// Re-export commonly used types from brickstep_math for convenience
pub use brickstep_math::{Aabb, Interpolate, Mat4, Plane, Rotor3, Sphere, Vec3, Vec4};
