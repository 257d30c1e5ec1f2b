//! The animated object capability shared by lights, cameras and pieces
//!
//! Objects live in the [`Scene`](crate::Scene) as `Box<dyn AnimatedObject>`
//! under generational [`ObjectKey`]s. Every object owns its keyframe tracks,
//! caches the values for the last step passed to
//! [`AnimatedObject::update_position`], and answers hit-testing and drawing
//! queries from that cache.

use std::any::Any;
use brickstep_math::intersect::{self, RayHit};
use brickstep_math::mat4::{self, Mat4};
use brickstep_math::{Aabb, Plane, Sphere, Vec3, Vec4};
use slotmap::new_key_type;
use crate::camera::CameraSection;
use crate::interface::{InterfaceColors, InterfaceContext};
use crate::keys::Step;
use crate::light::LightSection;
use crate::piece::PieceSection;
use crate::selection::{SectionId, SectionMask, SelectionState};

new_key_type! {
    /// Key to an animated object in the scene
    ///
    /// Generational, so a key to a removed object never resolves to the
    /// object that later reuses its slot.
    pub struct ObjectKey;
}

/// The kind of an animated object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Light,
    Camera,
    Piece,
}

impl ObjectKind {
    /// Prefix used when generating default names
    pub fn name_prefix(self) -> &'static str {
        match self {
            ObjectKind::Light => "Light ",
            ObjectKind::Camera => "Camera ",
            ObjectKind::Piece => "Piece ",
        }
    }
}

/// A selectable part of any kind of object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Light(LightSection),
    Camera(CameraSection),
    Piece(PieceSection),
}

impl Section {
    /// The object kind this section belongs to
    pub fn kind(self) -> ObjectKind {
        match self {
            Section::Light(_) => ObjectKind::Light,
            Section::Camera(_) => ObjectKind::Camera,
            Section::Piece(_) => ObjectKind::Piece,
        }
    }
}

impl SectionId for Section {
    fn index(self) -> u32 {
        match self {
            Section::Light(s) => s.index(),
            Section::Camera(s) => s.index(),
            Section::Piece(s) => s.index(),
        }
    }
}

impl From<LightSection> for Section {
    fn from(s: LightSection) -> Self {
        Section::Light(s)
    }
}

impl From<CameraSection> for Section {
    fn from(s: CameraSection) -> Self {
        Section::Camera(s)
    }
}

impl From<PieceSection> for Section {
    fn from(s: PieceSection) -> Self {
        Section::Piece(s)
    }
}

/// The closest object hit by a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectHit {
    pub key: ObjectKey,
    pub section: Section,
    /// World distance from the ray start
    pub distance: f32,
    /// World-space normal of the surface that was hit
    pub normal: Vec3,
}

/// A ray sweep across objects, keeping the closest hit
#[derive(Clone, Debug)]
pub struct ObjectRayTest {
    pub start: Vec3,
    pub end: Vec3,
    /// Closest distance found so far
    pub distance: f32,
    pub hit: Option<ObjectHit>,
}

impl ObjectRayTest {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            distance: f32::MAX,
            hit: None,
        }
    }

    /// Record a hit if it is strictly closer than the current best
    pub fn offer(&mut self, key: ObjectKey, section: Section, distance: f32, normal: Vec3) -> bool {
        if distance < self.distance {
            self.distance = distance;
            self.hit = Some(ObjectHit { key, section, distance, normal });
            true
        } else {
            false
        }
    }

    /// Test a box given in the frame of a rigid world-to-local matrix
    pub fn test_box(&mut self, key: ObjectKey, section: Section, world_to_local: Mat4, aabb: &Aabb) -> bool {
        let start = mat4::transform_point(world_to_local, self.start);
        let end = mat4::transform_point(world_to_local, self.end);

        match intersect::aabb_ray_intersect(aabb, start, end) {
            Some(RayHit { distance, normal, .. }) => {
                let normal = mat4::transform_direction(mat4::affine_inverse(world_to_local), normal);
                self.offer(key, section, distance, normal)
            }
            None => false,
        }
    }

    /// Test a sphere given in world space
    pub fn test_sphere(&mut self, key: ObjectKey, section: Section, sphere: &Sphere) -> bool {
        match intersect::sphere_ray_intersect(sphere, self.start, self.end) {
            Some(hit) => self.offer(key, section, hit.distance, hit.normal),
            None => false,
        }
    }
}

/// A selection volume sweep, collecting every object that overlaps it
#[derive(Clone, Debug)]
pub struct ObjectBoxTest {
    /// World planes `(nx, ny, nz, d)`; the inside is `n·p + d <= 0`
    pub planes: [Vec4; 6],
    pub objects: Vec<ObjectKey>,
}

impl ObjectBoxTest {
    pub fn new(planes: [Vec4; 6]) -> Self {
        Self {
            planes,
            objects: Vec::new(),
        }
    }

    /// The volume enclosed by a world-space axis-aligned box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new([
            Vec4::new(-1.0, 0.0, 0.0, aabb.min.x),
            Vec4::new(1.0, 0.0, 0.0, -aabb.max.x),
            Vec4::new(0.0, -1.0, 0.0, aabb.min.y),
            Vec4::new(0.0, 1.0, 0.0, -aabb.max.y),
            Vec4::new(0.0, 0.0, -1.0, aabb.min.z),
            Vec4::new(0.0, 0.0, 1.0, -aabb.max.z),
        ])
    }

    /// The planes in world space
    pub fn world_planes(&self) -> [Plane; 6] {
        self.planes.map(Plane::from_vec4)
    }

    /// The planes expressed in the frame of a rigid world-to-local matrix
    pub fn local_planes(&self, world_to_local: Mat4) -> [Plane; 6] {
        self.planes.map(|p| Plane::from_vec4(p).to_local(world_to_local))
    }

    /// True if a box in the given local frame overlaps the volume
    pub fn intersects_box(&self, world_to_local: Mat4, aabb: &Aabb) -> bool {
        intersect::aabb_intersects_volume(aabb, &self.local_planes(world_to_local))
    }

    /// True if a world-space sphere overlaps the volume
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        intersect::sphere_intersects_volume(sphere, &self.world_planes())
    }

    /// Add an object to the result set, once
    pub fn add(&mut self, key: ObjectKey) {
        if !self.objects.contains(&key) {
            self.objects.push(key);
        }
    }
}

/// Generate a name for an object of the given prefix
///
/// A non-empty `current` name that no entry in `existing` uses is kept.
/// Otherwise the result is `prefix` followed by one more than the largest
/// number found after `prefix` in `existing`, or the smallest unused number
/// once that would overflow.
pub fn create_name(prefix: &str, current: &str, existing: &[&str]) -> String {
    if !current.is_empty() && !existing.contains(&current) {
        return current.to_string();
    }

    let max_number = existing
        .iter()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    if let Some(next) = max_number.checked_add(1) {
        return format!("{}{}", prefix, next);
    }

    // The largest number is taken, fall back to the first free one
    let mut number = 1u32;
    loop {
        let candidate = format!("{}{}", prefix, number);
        if !existing.contains(&candidate.as_str()) || number == u32::MAX {
            return candidate;
        }
        number += 1;
    }
}

/// Shared behaviour of every animated scene object
pub trait AnimatedObject: Any {
    fn kind(&self) -> ObjectKind;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// False for hidden objects, which are neither hit nor drawn
    fn is_visible(&self) -> bool;

    fn selection(&self) -> &SelectionState;

    fn selection_mut(&mut self) -> &mut SelectionState;

    /// Sections this object currently offers for selection
    fn available_sections(&self) -> SectionMask;

    /// Section for a bit index of this object
    fn section_at(&self, index: u32) -> Option<Section>;

    /// Recompute every current value and derived matrix for `step`
    fn update_position(&mut self, step: Step);

    /// Move every selected section by `delta` and key the result at `step`
    fn move_selected(&mut self, step: Step, add_key: bool, delta: Vec3);

    fn insert_time(&mut self, start: Step, count: Step);

    fn remove_time(&mut self, start: Step, count: Step);

    /// Collapse every track to a single step-1 key holding the current value
    fn remove_key_frames(&mut self);

    /// World-to-object matrix for the current step
    fn world_matrix(&self) -> Mat4;

    /// Grow `bbox` to include this object's handles
    fn compare_bounding_box(&self, bbox: &mut Aabb);

    /// Greatest step at which anything about this object changes
    fn last_step(&self) -> Step;

    fn ray_test(&self, key: ObjectKey, test: &mut ObjectRayTest);

    fn box_test(&self, key: ObjectKey, test: &mut ObjectBoxTest);

    fn draw_interface(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Give this object a unique name among `existing`
    fn create_name(&mut self, existing: &[&str]) {
        let name = create_name(self.kind().name_prefix(), self.name(), existing);
        self.set_name(name);
    }

    fn is_selected(&self, section: Section) -> bool {
        section.kind() == self.kind() && self.selection().is_selected(section)
    }

    fn is_focused(&self, section: Section) -> bool {
        section.kind() == self.kind() && self.selection().is_focused(section)
    }

    fn is_any_selected(&self) -> bool {
        self.selection().is_any_selected()
    }

    fn is_any_focused(&self) -> bool {
        self.selection().is_any_focused()
    }

    /// True if `section` belongs to this object and is currently available
    fn has_section(&self, section: Section) -> bool {
        section.kind() == self.kind() && self.available_sections().intersects(SectionMask::single(section.index()))
    }

    fn set_selected(&mut self, section: Section, selected: bool) {
        if self.has_section(section) {
            self.selection_mut().set_selected(section, selected);
        }
    }

    fn set_focused(&mut self, section: Section, focused: bool) {
        if self.has_section(section) {
            self.selection_mut().set_focused(section, focused);
        }
    }

    fn set_all_selected(&mut self, selected: bool) {
        let available = self.available_sections();
        self.selection_mut().set_all_selected(selected, available);
    }

    fn clear_focus(&mut self) {
        self.selection_mut().clear_focus();
    }

    fn focused_section(&self) -> Option<Section> {
        self.selection().focused_index().and_then(|index| self.section_at(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn test_key() -> ObjectKey {
        let mut keys: SlotMap<ObjectKey, ()> = SlotMap::with_key();
        keys.insert(())
    }

    #[test]
    fn test_create_name_keeps_unique_name() {
        assert_eq!(create_name("Light ", "Sun", &["Light 1", "Moon"]), "Sun");
    }

    #[test]
    fn test_create_name_replaces_duplicate() {
        assert_eq!(create_name("Light ", "Light 2", &["Light 2", "Light 7"]), "Light 8");
    }

    #[test]
    fn test_create_name_empty() {
        assert_eq!(create_name("Camera ", "", &[]), "Camera 1");
        assert_eq!(create_name("Camera ", "", &["Camera x", "Light 4", "Camera 3"]), "Camera 4");
    }

    #[test]
    fn test_create_name_after_largest_number() {
        let existing = ["Light 4294967295", "Light 1", "Light 3"];
        assert_eq!(create_name("Light ", "", &existing), "Light 2");
        assert_eq!(create_name("Light ", "Light 1", &existing), "Light 2");
    }

    #[test]
    fn test_section_kind_and_index() {
        let section = Section::from(PieceSection::ControlPoint(2));
        assert_eq!(section.kind(), ObjectKind::Piece);
        assert_eq!(section.index(), 3);
        assert_eq!(Section::from(CameraSection::UpVector).index(), 2);
    }

    #[test]
    fn test_ray_test_keeps_strictly_closer() {
        let key = test_key();
        let mut test = ObjectRayTest::new(Vec3::ZERO, Vec3::X);
        let position = Section::Light(LightSection::Position);
        let target = Section::Light(LightSection::Target);

        assert!(test.offer(key, position, 10.0, Vec3::X));
        assert!(!test.offer(key, target, 10.0, Vec3::X));
        assert!(!test.offer(key, target, 12.0, Vec3::X));
        assert!(test.offer(key, target, 4.0, Vec3::Y));

        let hit = test.hit.unwrap();
        assert_eq!(hit.section, target);
        assert_eq!(test.distance, 4.0);
    }

    #[test]
    fn test_box_test_in_translated_frame() {
        let key = test_key();
        let mut test = ObjectRayTest::new(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        let world_to_local = mat4::translation(Vec3::new(-10.0, 0.0, 0.0));

        // Box centered at world x = 10 misses a ray along x = 0
        assert!(!test.test_box(key, Section::Light(LightSection::Position), world_to_local, &Aabb::cube(5.0)));

        // Box at the origin is entered through its +Z face
        let hit = test.test_box(key, Section::Light(LightSection::Position), mat4::IDENTITY, &Aabb::cube(5.0));
        assert!(hit);
        assert!((test.distance - 45.0).abs() < 0.0001);
        assert_eq!(test.hit.unwrap().normal, Vec3::Z);
    }

    #[test]
    fn test_box_volume_from_aabb() {
        let key = test_key();
        let mut test = ObjectBoxTest::from_aabb(&Aabb::cube(10.0));

        assert!(test.intersects_sphere(&Sphere::new(Vec3::new(12.0, 0.0, 0.0), 5.0)));
        assert!(!test.intersects_sphere(&Sphere::new(Vec3::new(20.0, 0.0, 0.0), 5.0)));
        assert!(test.intersects_box(mat4::IDENTITY, &Aabb::cube(1.0)));

        test.add(key);
        test.add(key);
        assert_eq!(test.objects.len(), 1);
    }
}
