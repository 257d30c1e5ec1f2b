//! The scene: every animated object plus the build-step timeline
//!
//! The scene owns its objects, keeps them updated to the current step, and
//! runs editing commands and hit-testing sweeps across all of them.

use slotmap::SlotMap;
use brickstep_math::{Aabb, Rotor3, Vec3, Vec4};
use crate::camera::Camera;
use crate::interface::{InterfaceColors, InterfaceContext};
use crate::keys::Step;
use crate::light::Light;
use crate::object::{AnimatedObject, ObjectBoxTest, ObjectHit, ObjectKey, ObjectKind, ObjectRayTest, Section};
use crate::piece::{Piece, PieceSection};

/// Error from a scene command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The key does not name an object in this scene
    UnknownObject(ObjectKey),
    /// The object has no such section, or not currently
    UnavailableSection(ObjectKey, Section),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::UnknownObject(key) => write!(f, "Unknown object: {:?}", key),
            SceneError::UnavailableSection(key, section) => {
                write!(f, "Object {:?} has no section {:?}", key, section)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Container for all animated objects
pub struct Scene {
    objects: SlotMap<ObjectKey, Box<dyn AnimatedObject>>,
    current_step: Step,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene at step 1
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
            current_step: 1,
        }
    }

    /// Add an object, giving it a unique name among objects of its kind
    pub fn add_object<O: AnimatedObject>(&mut self, object: O) -> ObjectKey {
        let mut object: Box<dyn AnimatedObject> = Box::new(object);

        let names: Vec<&str> = self
            .objects
            .values()
            .filter(|o| o.kind() == object.kind())
            .map(|o| o.name())
            .collect();
        object.create_name(&names);
        object.update_position(self.current_step);

        log::debug!("Adding {:?} '{}'", object.kind(), object.name());
        self.objects.insert(object)
    }

    /// Remove an object and return it
    pub fn remove_object(&mut self, key: ObjectKey) -> Result<Box<dyn AnimatedObject>, SceneError> {
        self.objects.remove(key).ok_or(SceneError::UnknownObject(key))
    }

    pub fn get(&self, key: ObjectKey) -> Option<&dyn AnimatedObject> {
        self.objects.get(key).map(|o| o.as_ref())
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut dyn AnimatedObject> {
        match self.objects.get_mut(key) {
            Some(object) => Some(object.as_mut()),
            None => None,
        }
    }

    fn get_mut_or_err(&mut self, key: ObjectKey) -> Result<&mut Box<dyn AnimatedObject>, SceneError> {
        self.objects.get_mut(key).ok_or(SceneError::UnknownObject(key))
    }

    pub fn light(&self, key: ObjectKey) -> Option<&Light> {
        self.get(key)?.as_any().downcast_ref()
    }

    pub fn light_mut(&mut self, key: ObjectKey) -> Option<&mut Light> {
        self.objects.get_mut(key)?.as_any_mut().downcast_mut()
    }

    pub fn camera(&self, key: ObjectKey) -> Option<&Camera> {
        self.get(key)?.as_any().downcast_ref()
    }

    pub fn camera_mut(&mut self, key: ObjectKey) -> Option<&mut Camera> {
        self.objects.get_mut(key)?.as_any_mut().downcast_mut()
    }

    pub fn piece(&self, key: ObjectKey) -> Option<&Piece> {
        self.get(key)?.as_any().downcast_ref()
    }

    pub fn piece_mut(&mut self, key: ObjectKey) -> Option<&mut Piece> {
        self.objects.get_mut(key)?.as_any_mut().downcast_mut()
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects with their keys
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &dyn AnimatedObject)> {
        self.objects.iter().map(|(key, o)| (key, o.as_ref()))
    }

    /// Keys of every object of one kind
    pub fn keys_of_kind(&self, kind: ObjectKind) -> Vec<ObjectKey> {
        self.iter().filter(|(_, o)| o.kind() == kind).map(|(key, _)| key).collect()
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    /// Move the timeline to `step` and update every object
    pub fn set_current_step(&mut self, step: Step) {
        if step == 0 {
            log::trace!("Ignoring step 0");
            return;
        }
        self.current_step = step;
        self.update_all();
    }

    fn update_all(&mut self) {
        let step = self.current_step;
        for object in self.objects.values_mut() {
            object.update_position(step);
        }
    }

    /// Greatest step used by any object, at least 1
    pub fn last_step(&self) -> Step {
        self.objects.values().map(|o| o.last_step()).max().unwrap_or(1).max(1)
    }

    /// Open an empty step at `step`, pushing later keys back by one
    pub fn insert_step(&mut self, step: Step) {
        if step == 0 {
            log::trace!("Ignoring insert at step 0");
            return;
        }
        log::debug!("Inserting step {}", step);
        for object in self.objects.values_mut() {
            object.insert_time(step, 1);
        }
        self.update_all();
    }

    /// Delete `step`, pulling later keys forward by one
    pub fn remove_step(&mut self, step: Step) {
        if step == 0 {
            log::trace!("Ignoring removal of step 0");
            return;
        }
        log::debug!("Removing step {}", step);
        for object in self.objects.values_mut() {
            object.remove_time(step, 1);
        }
        self.update_all();
    }

    /// Deselect every section of every object
    pub fn clear_selection(&mut self) {
        for object in self.objects.values_mut() {
            object.set_all_selected(false);
        }
    }

    /// Select or deselect one section
    pub fn set_selected(&mut self, key: ObjectKey, section: Section, selected: bool) -> Result<(), SceneError> {
        self.get_mut_or_err(key)?.set_selected(section, selected);
        Ok(())
    }

    /// Select or deselect every section of an object
    pub fn set_object_selected(&mut self, key: ObjectKey, selected: bool) -> Result<(), SceneError> {
        self.get_mut_or_err(key)?.set_all_selected(selected);
        Ok(())
    }

    /// Focus a section; focus is unique, so every other focus is cleared first
    ///
    /// Focusing a section the object does not have fails and leaves focus alone.
    pub fn set_focused(&mut self, key: ObjectKey, section: Section, focused: bool) -> Result<(), SceneError> {
        let object = self.objects.get(key).ok_or(SceneError::UnknownObject(key))?;
        if focused {
            if !object.has_section(section) {
                return Err(SceneError::UnavailableSection(key, section));
            }
            for object in self.objects.values_mut() {
                object.clear_focus();
            }
        }
        self.get_mut_or_err(key)?.set_focused(section, focused);
        Ok(())
    }

    /// Keys of every object with at least one selected section
    pub fn selected_keys(&self) -> Vec<ObjectKey> {
        self.iter().filter(|(_, o)| o.is_any_selected()).map(|(key, _)| key).collect()
    }

    /// The focused object and section, if any
    pub fn focused(&self) -> Option<(ObjectKey, Section)> {
        self.iter().find_map(|(key, o)| o.focused_section().map(|section| (key, section)))
    }

    /// Move every selected section by `delta`, keyed at the current step
    pub fn move_selection(&mut self, delta: Vec3, add_key: bool) {
        let step = self.current_step;
        for object in self.objects.values_mut().filter(|o| o.is_any_selected()) {
            object.move_selected(step, add_key, delta);
            object.update_position(step);
        }
    }

    /// Rotate every piece whose body is selected about a world pivot
    pub fn rotate_selection(&mut self, rotor: Rotor3, pivot: Vec3, add_key: bool) {
        let step = self.current_step;
        for object in self.objects.values_mut() {
            if !object.is_selected(Section::Piece(PieceSection::Position)) {
                continue;
            }
            if let Some(piece) = object.as_any_mut().downcast_mut::<Piece>() {
                piece.rotate(step, add_key, rotor, pivot);
                piece.update_position(step);
            }
        }
    }

    /// Freeze every selected object in its current pose
    pub fn remove_key_frames_selected(&mut self) {
        for object in self.objects.values_mut().filter(|o| o.is_any_selected()) {
            object.remove_key_frames();
        }
        self.update_all();
    }

    /// Box around every object's handles; empty for an empty scene
    pub fn bounding_box(&self) -> Aabb {
        let mut bbox = Aabb::EMPTY;
        for object in self.objects.values() {
            object.compare_bounding_box(&mut bbox);
        }
        bbox
    }

    /// Closest visible object along the ray from `start` through `end`
    pub fn ray_test(&self, start: Vec3, end: Vec3) -> Option<ObjectHit> {
        let mut test = ObjectRayTest::new(start, end);
        for (key, object) in self.objects.iter().filter(|(_, o)| o.is_visible()) {
            object.ray_test(key, &mut test);
        }

        if let Some(hit) = &test.hit {
            log::trace!("Ray hit {:?} at {}", hit.section, hit.distance);
        }
        test.hit
    }

    /// Every visible object overlapping the volume bounded by `planes`
    pub fn box_test(&self, planes: [Vec4; 6]) -> Vec<ObjectKey> {
        let mut test = ObjectBoxTest::new(planes);
        for (key, object) in self.objects.iter().filter(|(_, o)| o.is_visible()) {
            object.box_test(key, &mut test);
        }
        log::debug!("Box test found {} objects", test.objects.len());
        test.objects
    }

    /// Draw the interface handles of every visible light and camera, and the
    /// selection boxes of pieces
    pub fn draw_interface(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        for object in self.objects.values().filter(|o| o.is_visible()) {
            object.draw_interface(ctx, colors);
        }
    }
}
