//! Editor session
//!
//! Headless command layer over a [`Scene`]: step navigation, timeline edits,
//! the "add keys" toggle, picking and marquee selection.

use brickstep_core::{
    Aabb, Camera, InterfaceColors, InterfaceContext, Light, ObjectBoxTest, ObjectHit, ObjectKey,
    Rotor3, Scene, SceneError, Step, Vec3, STEP_MAX,
};

use crate::config::AppConfig;

/// Editing state for one scene
pub struct EditorSession {
    scene: Scene,
    /// Key edits at the current step instead of only changing existing keys
    add_keys: bool,
    colors: InterfaceColors,
    default_light_position: Vec3,
    default_camera_position: Vec3,
    default_camera_target: Vec3,
}

impl EditorSession {
    /// Create a session over an empty scene
    pub fn new(config: &AppConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    /// Create a session over an existing scene
    pub fn with_scene(scene: Scene, config: &AppConfig) -> Self {
        Self {
            scene,
            add_keys: config.editing.add_keys,
            colors: config.interface.to_interface_colors(),
            default_light_position: config.editing.light_position(),
            default_camera_position: config.editing.camera_position(),
            default_camera_target: config.editing.camera_target(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn current_step(&self) -> Step {
        self.scene.current_step()
    }

    pub fn add_keys(&self) -> bool {
        self.add_keys
    }

    pub fn set_add_keys(&mut self, add_keys: bool) {
        self.add_keys = add_keys;
    }

    pub fn toggle_add_keys(&mut self) {
        self.add_keys = !self.add_keys;
        log::debug!("Add keys {}", if self.add_keys { "on" } else { "off" });
    }

    // Step navigation

    pub fn show_first_step(&mut self) {
        self.scene.set_current_step(1);
    }

    pub fn show_previous_step(&mut self) {
        let step = self.current_step();
        if step > 1 {
            self.scene.set_current_step(step - 1);
        }
    }

    pub fn show_next_step(&mut self) {
        let step = self.current_step();
        if step < STEP_MAX {
            self.scene.set_current_step(step + 1);
        }
    }

    pub fn show_last_step(&mut self) {
        let last = self.scene.last_step();
        self.scene.set_current_step(last);
    }

    // Timeline edits

    /// Open an empty step at the current step
    pub fn insert_step_before(&mut self) {
        self.scene.insert_step(self.current_step());
    }

    /// Open an empty step after the current step
    pub fn insert_step_after(&mut self) {
        match self.current_step().checked_add(1) {
            Some(step) => self.scene.insert_step(step),
            None => log::trace!("No step after the last possible step"),
        }
    }

    /// Delete the current step
    pub fn delete_step(&mut self) {
        self.scene.remove_step(self.current_step());
    }

    // Objects

    /// Add a point light at the configured default position
    pub fn add_light(&mut self) -> ObjectKey {
        self.scene.add_object(Light::point(self.default_light_position))
    }

    /// Add a camera at the configured default position
    pub fn add_camera(&mut self) -> ObjectKey {
        self.scene.add_object(Camera::new(
            self.default_camera_position,
            self.default_camera_target,
            Vec3::Z,
        ))
    }

    // Selection

    /// Pick along a ray and focus whatever is hit
    ///
    /// Without `extend` the previous selection is dropped first, even when
    /// nothing is hit.
    pub fn pick(&mut self, start: Vec3, end: Vec3, extend: bool) -> Result<Option<ObjectHit>, SceneError> {
        if !extend {
            self.scene.clear_selection();
        }

        let hit = self.scene.ray_test(start, end);
        if let Some(hit) = &hit {
            self.scene.set_focused(hit.key, hit.section, true)?;
        }
        Ok(hit)
    }

    /// Select every object overlapping a world box
    pub fn select_in_volume(&mut self, volume: &Aabb, extend: bool) -> Result<Vec<ObjectKey>, SceneError> {
        if !extend {
            self.scene.clear_selection();
        }

        let keys = self.scene.box_test(ObjectBoxTest::from_aabb(volume).planes);
        for key in &keys {
            self.scene.set_object_selected(*key, true)?;
        }
        Ok(keys)
    }

    // Editing

    /// Move the selection, keying the result if add keys is on
    pub fn move_selection(&mut self, delta: Vec3) {
        self.scene.move_selection(delta, self.add_keys);
    }

    /// Rotate the selected pieces about a world pivot
    pub fn rotate_selection(&mut self, rotor: Rotor3, pivot: Vec3) {
        self.scene.rotate_selection(rotor, pivot, self.add_keys);
    }

    /// Drop every key of the selected objects, keeping the current pose
    pub fn freeze_selection(&mut self) {
        self.scene.remove_key_frames_selected();
    }

    /// Names of the selected objects
    pub fn selected_names(&self) -> Vec<String> {
        self.scene
            .selected_keys()
            .into_iter()
            .filter_map(|key| self.scene.get(key).map(|o| o.name().to_string()))
            .collect()
    }

    pub fn draw_interface(&self, ctx: &mut dyn InterfaceContext) {
        self.scene.draw_interface(ctx, &self.colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickstep_core::{LightSection, Piece, PieceSection, Section};

    const EPSILON: f32 = 0.0001;

    fn session() -> EditorSession {
        EditorSession::new(&AppConfig::default())
    }

    #[test]
    fn test_step_navigation() {
        let mut session = session();
        let key = session.add_light();
        session
            .scene_mut()
            .light_mut(key)
            .unwrap()
            .set_position(Vec3::ZERO, 6, true);

        session.show_previous_step();
        assert_eq!(session.current_step(), 1);

        session.show_next_step();
        assert_eq!(session.current_step(), 2);

        session.show_last_step();
        assert_eq!(session.current_step(), 6);

        session.show_first_step();
        assert_eq!(session.current_step(), 1);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut session = session();
        let key = session.add_light();
        session
            .scene_mut()
            .light_mut(key)
            .unwrap()
            .set_position(Vec3::ZERO, 3, true);

        session.scene_mut().set_current_step(3);
        session.insert_step_after();
        assert_eq!(session.scene().last_step(), 3);

        session.insert_step_before();
        assert_eq!(session.scene().last_step(), 4);

        session.delete_step();
        assert_eq!(session.scene().last_step(), 3);
    }

    #[test]
    fn test_add_keys_controls_keying() {
        let mut session = session();
        let key = session.add_light();
        session.scene_mut().set_current_step(4);
        session
            .scene_mut()
            .set_selected(key, Section::Light(LightSection::Position), true)
            .unwrap();

        session.move_selection(Vec3::X);
        assert_eq!(session.scene().light(key).unwrap().position_keys().len(), 1);

        session.toggle_add_keys();
        session.move_selection(Vec3::X);
        let light = session.scene().light(key).unwrap();
        assert_eq!(light.position_keys().len(), 2);
        assert_eq!(light.position_keys().last_step(), 4);
    }

    #[test]
    fn test_pick_focuses_hit() {
        let mut session = session();
        let key = session.add_light();
        let position = session.scene().light(key).unwrap().position();

        let hit = session
            .pick(position + Vec3::new(0.0, 0.0, 50.0), position, false)
            .unwrap()
            .unwrap();
        assert_eq!(hit.key, key);
        assert!((hit.distance - 45.0).abs() < EPSILON);
        assert_eq!(session.scene().focused(), Some((key, Section::Light(LightSection::Position))));

        // A miss without extend clears the selection
        let miss = session.pick(Vec3::new(1000.0, 0.0, 0.0), Vec3::new(1000.0, 0.0, -1.0), false);
        assert!(miss.unwrap().is_none());
        assert!(session.scene().selected_keys().is_empty());
    }

    #[test]
    fn test_select_in_volume() {
        let mut session = session();
        let piece = session.scene_mut().add_object(Piece::new(
            "3001",
            4,
            Aabb::cube(10.0),
            Vec3::ZERO,
            Rotor3::IDENTITY,
        ));
        session.add_light();

        let found = session
            .select_in_volume(&Aabb::new(Vec3::splat(-20.0), Vec3::splat(20.0)), false)
            .unwrap();
        assert_eq!(found, vec![piece]);
        assert!(session.scene().get(piece).unwrap().is_selected(Section::Piece(PieceSection::Position)));
        assert_eq!(session.selected_names(), vec!["Piece 1".to_string()]);
    }

    #[test]
    fn test_freeze_selection() {
        let mut session = session();
        session.set_add_keys(true);
        let key = session.add_light();
        session.scene_mut().set_object_selected(key, true).unwrap();

        session.scene_mut().set_current_step(5);
        session.move_selection(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(session.scene().light(key).unwrap().position_keys().len(), 2);

        session.freeze_selection();
        let keys = session.scene().light(key).unwrap().position_keys().keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].step, 1);
    }
}
