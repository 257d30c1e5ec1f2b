//! Integration tests for the scene timeline and picking pipeline
//!
//! These drive a whole scene through editing commands and step changes and
//! check what the sweeps report afterwards.

use brickstep_core::{
    Aabb, Camera, CameraSection, InterfaceColors, InterfaceContext, Light, LightSection, Mat4,
    ObjectBoxTest, Piece, PieceSection, Rotor3, Scene, Section, Vec3, Vec4, STEP_MAX,
};

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Point light keyed at (0,0,0) on step 1 and (100,0,0) on step 10
fn keyed_light_scene() -> (Scene, brickstep_core::ObjectKey) {
    let mut scene = Scene::new();
    let key = scene.add_object(Light::point(Vec3::ZERO));

    scene.set_current_step(10);
    scene.set_selected(key, Section::Light(LightSection::Position), true).unwrap();
    scene.move_selection(Vec3::new(100.0, 0.0, 0.0), true);
    scene.clear_selection();

    (scene, key)
}

#[test]
fn test_interpolation_through_scene() {
    let (mut scene, key) = keyed_light_scene();
    assert_eq!(scene.last_step(), 10);

    scene.set_current_step(5);
    let light = scene.light(key).unwrap();
    assert!(approx_eq(light.position().x, 400.0 / 9.0));

    // Clamped outside the keyed range
    scene.set_current_step(50);
    assert!(approx_eq(scene.light(key).unwrap().position().x, 100.0));
    scene.set_current_step(1);
    assert!(approx_eq(scene.light(key).unwrap().position().x, 0.0));
}

#[test]
fn test_interpolation_is_monotonic() {
    let (mut scene, key) = keyed_light_scene();

    let mut previous = f32::MIN;
    for step in 1..=12 {
        scene.set_current_step(step);
        let x = scene.light(key).unwrap().position().x;
        assert!(x >= previous, "step {} went backwards", step);
        previous = x;
    }
}

#[test]
fn test_insert_then_remove_step_round_trip() {
    let (mut scene, key) = keyed_light_scene();

    scene.insert_step(3);
    assert_eq!(scene.last_step(), 11);
    let steps: Vec<_> = scene.light(key).unwrap().position_keys().keys().iter().map(|k| k.step).collect();
    assert_eq!(steps, vec![1, 11]);

    scene.remove_step(3);
    assert_eq!(scene.last_step(), 10);
    let keys = scene.light(key).unwrap().position_keys().keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[1].step, 10);
    assert!(approx_eq(keys[1].value.x, 100.0));
}

#[test]
fn test_rekey_same_value_is_idempotent() {
    let (mut scene, key) = keyed_light_scene();
    scene.set_current_step(10);
    scene.set_selected(key, Section::Light(LightSection::Position), true).unwrap();

    scene.move_selection(Vec3::ZERO, true);
    scene.move_selection(Vec3::ZERO, true);

    let keys = scene.light(key).unwrap().position_keys().keys();
    assert_eq!(keys.len(), 2);
    assert!(approx_eq(keys[1].value.x, 100.0));
}

#[test]
fn test_move_without_add_key_between_keys() {
    let (mut scene, key) = keyed_light_scene();
    scene.set_current_step(5);
    scene.set_selected(key, Section::Light(LightSection::Position), true).unwrap();

    scene.move_selection(Vec3::new(0.0, 50.0, 0.0), false);

    // No key at step 5, so nothing is stored
    assert_eq!(scene.light(key).unwrap().position_keys().len(), 2);
    assert!(approx_eq(scene.light(key).unwrap().position().y, 0.0));
}

#[test]
fn test_point_light_ray_hit() {
    let mut scene = Scene::new();
    let key = scene.add_object(Light::point(Vec3::new(0.0, 0.0, 10.0)));

    let hit = scene
        .ray_test(Vec3::new(0.0, 0.0, 100.0), Vec3::new(0.0, 0.0, -100.0))
        .unwrap();

    assert_eq!(hit.key, key);
    assert_eq!(hit.section, Section::Light(LightSection::Position));
    assert!(approx_eq(hit.distance, 85.0));
    assert!(approx_eq(hit.normal.z, 1.0));
}

#[test]
fn test_ray_keeps_closest_in_any_order() {
    let far = Light::point(Vec3::new(0.0, 0.0, 10.0));
    let near = Light::point(Vec3::new(0.0, 0.0, 50.0));
    let start = Vec3::new(0.0, 0.0, 100.0);
    let end = Vec3::ZERO;

    let mut scene = Scene::new();
    scene.add_object(far.clone());
    let near_key = scene.add_object(near.clone());
    let hit = scene.ray_test(start, end).unwrap();
    assert_eq!(hit.key, near_key);
    assert!(approx_eq(hit.distance, 45.0));

    let mut scene = Scene::new();
    let near_key = scene.add_object(near);
    scene.add_object(far);
    let hit = scene.ray_test(start, end).unwrap();
    assert_eq!(hit.key, near_key);
    assert!(approx_eq(hit.distance, 45.0));
}

#[test]
fn test_remove_key_frames_freezes_current_pose() {
    let mut scene = Scene::new();
    let key = scene.add_object(Light::point(Vec3::ZERO));
    {
        let light = scene.light_mut(key).unwrap();
        light.set_position(Vec3::new(10.0, 0.0, 0.0), 5, true);
        light.set_position(Vec3::new(20.0, 0.0, 0.0), 10, true);
        assert_eq!(light.position_keys().len(), 3);
    }

    scene.set_current_step(5);
    scene.set_object_selected(key, true).unwrap();
    scene.remove_key_frames_selected();

    let light = scene.light(key).unwrap();
    let keys = light.position_keys().keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].step, 1);
    assert!(approx_eq(keys[0].value.x, 10.0));

    scene.set_current_step(10);
    assert!(approx_eq(scene.light(key).unwrap().position().x, 10.0));
}

#[test]
fn test_focus_implies_selection() {
    let mut scene = Scene::new();
    let key = scene.add_object(Light::spot(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO));
    let position = Section::Light(LightSection::Position);

    scene.set_focused(key, position, true).unwrap();

    let light = scene.get(key).unwrap();
    assert!(light.is_selected(position));
    assert!(light.is_focused(position));
    assert!(!light.is_selected(Section::Light(LightSection::Target)));
    assert_eq!(scene.focused(), Some((key, position)));
}

#[test]
fn test_piece_window_follows_timeline() {
    let mut scene = Scene::new();
    let piece = Piece::new("3001", 4, Aabb::cube(10.0), Vec3::ZERO, Rotor3::IDENTITY).with_steps(3, STEP_MAX);
    let key = scene.add_object(piece);

    let start = Vec3::new(0.0, 0.0, 100.0);
    assert!(scene.ray_test(start, Vec3::ZERO).is_none());

    scene.set_current_step(3);
    let hit = scene.ray_test(start, Vec3::ZERO).unwrap();
    assert_eq!(hit.key, key);
    assert_eq!(hit.section, Section::Piece(PieceSection::Position));
    assert!(approx_eq(hit.distance, 90.0));

    // Opening a step before the piece pushes it out of view at step 3
    scene.insert_step(2);
    assert_eq!(scene.piece(key).unwrap().step_show(), 4);
    assert!(scene.ray_test(start, Vec3::ZERO).is_none());

    scene.remove_step(2);
    assert_eq!(scene.piece(key).unwrap().step_show(), 3);
    assert!(scene.ray_test(start, Vec3::ZERO).is_some());
}

#[test]
fn test_camera_handles_are_picked() {
    let mut scene = Scene::new();
    let key = scene.add_object(Camera::new(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO, Vec3::Y));

    // Straight down the view axis the position handle is in front of the target
    let hit = scene
        .ray_test(Vec3::new(0.0, 0.0, 200.0), Vec3::new(0.0, 0.0, -200.0))
        .unwrap();
    assert_eq!(hit.key, key);
    assert_eq!(hit.section, Section::Camera(CameraSection::Position));

    // From below, the target handle is hit first
    let hit = scene
        .ray_test(Vec3::new(0.0, 0.0, -200.0), Vec3::new(0.0, 0.0, 200.0))
        .unwrap();
    assert_eq!(hit.section, Section::Camera(CameraSection::Target));
}

#[test]
fn test_box_selection_volume() {
    let mut scene = Scene::new();
    let inside = scene.add_object(Light::point(Vec3::ZERO));
    let outside = scene.add_object(Light::point(Vec3::new(100.0, 0.0, 0.0)));
    let piece = scene.add_object(Piece::new(
        "3003",
        1,
        Aabb::cube(10.0),
        Vec3::new(0.0, 25.0, 0.0),
        Rotor3::IDENTITY,
    ));

    let volume = ObjectBoxTest::from_aabb(&Aabb::new(Vec3::splat(-20.0), Vec3::splat(20.0)));
    let found = scene.box_test(volume.planes);

    assert!(found.contains(&inside));
    assert!(found.contains(&piece));
    assert!(!found.contains(&outside));
}

#[test]
fn test_scene_bounding_box() {
    let mut scene = Scene::new();
    scene.add_object(Light::spot(Vec3::new(0.0, 0.0, 100.0), Vec3::new(-50.0, 0.0, 0.0)));
    scene.add_object(Light::point(Vec3::new(20.0, 30.0, -10.0)));

    let bbox = scene.bounding_box();
    assert_eq!(bbox.min, Vec3::new(-50.0, 0.0, -10.0));
    assert_eq!(bbox.max, Vec3::new(20.0, 30.0, 100.0));
}

#[derive(Default)]
struct CountingContext {
    lines: usize,
    triangles: usize,
}

impl InterfaceContext for CountingContext {
    fn set_world_matrix(&mut self, _local_to_world: Mat4) {}

    fn set_color(&mut self, _color: Vec4) {}

    fn set_line_width(&mut self, _width: f32) {}

    fn draw_lines(&mut self, _vertices: &[Vec3], _indices: &[u16]) {
        self.lines += 1;
    }

    fn draw_triangles(&mut self, _vertices: &[Vec3], _indices: &[u16]) {
        self.triangles += 1;
    }
}

#[test]
fn test_draw_interface_skips_hidden() {
    let mut scene = Scene::new();
    scene.add_object(Light::point(Vec3::ZERO));
    let hidden = scene.add_object(Light::point(Vec3::X));
    scene.light_mut(hidden).unwrap().set_hidden(true);
    // Unselected pieces draw nothing
    scene.add_object(Piece::new("3001", 4, Aabb::cube(10.0), Vec3::ZERO, Rotor3::IDENTITY));

    let mut ctx = CountingContext::default();
    scene.draw_interface(&mut ctx, &InterfaceColors::default());

    assert_eq!(ctx.triangles, 1);
    assert_eq!(ctx.lines, 0);
}
