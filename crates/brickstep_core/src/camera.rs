//! Scene cameras with position, target and up-vector handles

use std::any::Any;
use bitflags::bitflags;
use brickstep_math::mat4::{self, Mat4};
use brickstep_math::{Aabb, Vec3};
use crate::interface::{self, Highlight, InterfaceColors, InterfaceContext};
use crate::keys::{KeyframeTrack, Step};
use crate::object::{AnimatedObject, ObjectBoxTest, ObjectKey, ObjectKind, ObjectRayTest, Section};
use crate::selection::{SectionMask, SelectionState};

/// Half edge of the position and target handles
pub const CAMERA_HANDLE_EDGE: f32 = 7.5;
/// Half edge of the up-vector handle
pub const CAMERA_UP_EDGE: f32 = 2.5;
/// Distance of the up-vector handle from the camera position
pub const CAMERA_UP_DISTANCE: f32 = 25.0;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CameraFlags: u32 {
        const HIDDEN = 1 << 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraSection {
    Position,
    Target,
    UpVector,
}

impl crate::selection::SectionId for CameraSection {
    fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    name: String,
    flags: CameraFlags,
    selection: SelectionState,

    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    position_keys: KeyframeTrack<Vec3>,
    target_keys: KeyframeTrack<Vec3>,
    up_keys: KeyframeTrack<Vec3>,

    position: Vec3,
    target: Vec3,
    up: Vec3,

    world_view: Mat4,
}

/// `up` made unit length and orthogonal to the view direction
fn orthogonal_up(position: Vec3, target: Vec3, up: Vec3) -> Vec3 {
    let front = target - position;
    let side = front.cross(up);
    if side.length_squared() < 1e-12 {
        log::trace!("Camera up vector parallel to view direction, using fallback");
        return mat4::perpendicular_up(front);
    }
    side.cross(front).normalized()
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let up = orthogonal_up(position, target, up);
        let mut camera = Self {
            name: String::new(),
            flags: CameraFlags::empty(),
            selection: SelectionState::new(),
            fov: 30.0,
            near: 25.0,
            far: 50000.0,
            position_keys: KeyframeTrack::new(position),
            target_keys: KeyframeTrack::new(target),
            up_keys: KeyframeTrack::new(up),
            position,
            target,
            up,
            world_view: mat4::IDENTITY,
        };
        camera.update_position(1);
        camera
    }

    /// Set the name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the projection parameters (builder pattern)
    pub fn with_projection(mut self, fov: f32, near: f32, far: f32) -> Self {
        self.fov = fov;
        self.near = near;
        self.far = far;
        self
    }

    pub fn flags(&self) -> CameraFlags {
        self.flags
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.flags.set(CameraFlags::HIDDEN, hidden);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Unit up vector, orthogonal to the view direction
    pub fn up_vector(&self) -> Vec3 {
        self.up
    }

    pub fn set_position(&mut self, position: Vec3, step: Step, add_key: bool) {
        self.position_keys.change_key(position, step, add_key);
    }

    pub fn set_target(&mut self, target: Vec3, step: Step, add_key: bool) {
        self.target_keys.change_key(target, step, add_key);
    }

    pub fn set_up_vector(&mut self, up: Vec3, step: Step, add_key: bool) {
        self.up_keys.change_key(up.normalized(), step, add_key);
    }

    pub fn position_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.position_keys
    }

    pub fn target_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.target_keys
    }

    pub fn up_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.up_keys
    }

    /// World position of the up-vector handle
    pub fn up_handle(&self) -> Vec3 {
        self.position + self.up * CAMERA_UP_DISTANCE
    }

    /// The view frame recentered on a world point
    fn world_at(&self, point: Vec3) -> Mat4 {
        let mut m = self.world_view;
        let translation = mat4::transform_direction(m, -point);
        mat4::set_translation(&mut m, translation);
        m
    }

    fn handles(&self) -> [(CameraSection, Mat4, Aabb); 3] {
        [
            (CameraSection::Position, self.world_view, Aabb::cube(CAMERA_HANDLE_EDGE)),
            (CameraSection::Target, self.world_at(self.target), Aabb::cube(CAMERA_HANDLE_EDGE)),
            (CameraSection::UpVector, self.world_at(self.up_handle()), Aabb::cube(CAMERA_UP_EDGE)),
        ]
    }
}

impl AnimatedObject for Camera {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Camera
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_visible(&self) -> bool {
        !self.flags.contains(CameraFlags::HIDDEN)
    }

    fn selection(&self) -> &SelectionState {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    fn available_sections(&self) -> SectionMask {
        SectionMask::first_n(3)
    }

    fn section_at(&self, index: u32) -> Option<Section> {
        let section = match index {
            0 => CameraSection::Position,
            1 => CameraSection::Target,
            2 => CameraSection::UpVector,
            _ => return None,
        };
        Some(Section::Camera(section))
    }

    fn update_position(&mut self, step: Step) {
        self.position = self.position_keys.calculate_key(step);
        self.target = self.target_keys.calculate_key(step);
        self.up = orthogonal_up(self.position, self.target, self.up_keys.calculate_key(step));
        self.world_view = mat4::look_at(self.position, self.target, self.up);
    }

    fn move_selected(&mut self, step: Step, add_key: bool, delta: Vec3) {
        // Dragged handle, measured before the position moves
        let handle = self.up_handle() + delta;

        if self.selection.is_selected(CameraSection::Position) {
            self.position += delta;
            self.position_keys.change_key(self.position, step, add_key);
        }

        if self.selection.is_selected(CameraSection::Target) {
            self.target += delta;
            self.target_keys.change_key(self.target, step, add_key);
        }

        if self.selection.is_selected(CameraSection::UpVector) {
            self.up = orthogonal_up(self.position, self.target, handle - self.position);
            self.up_keys.change_key(self.up, step, add_key);
        } else {
            self.up = orthogonal_up(self.position, self.target, self.up);
        }

        self.world_view = mat4::look_at(self.position, self.target, self.up);
    }

    fn insert_time(&mut self, start: Step, count: Step) {
        self.position_keys.insert_time(start, count);
        self.target_keys.insert_time(start, count);
        self.up_keys.insert_time(start, count);
    }

    fn remove_time(&mut self, start: Step, count: Step) {
        self.position_keys.remove_time(start, count);
        self.target_keys.remove_time(start, count);
        self.up_keys.remove_time(start, count);
    }

    fn remove_key_frames(&mut self) {
        self.position_keys.reset(self.position);
        self.target_keys.reset(self.target);
        self.up_keys.reset(self.up);
    }

    fn world_matrix(&self) -> Mat4 {
        self.world_view
    }

    fn compare_bounding_box(&self, bbox: &mut Aabb) {
        bbox.extend(self.position);
        bbox.extend(self.target);
    }

    fn last_step(&self) -> Step {
        self.position_keys
            .last_step()
            .max(self.target_keys.last_step())
            .max(self.up_keys.last_step())
    }

    fn ray_test(&self, key: ObjectKey, test: &mut ObjectRayTest) {
        for (section, world_to_local, aabb) in self.handles() {
            test.test_box(key, Section::Camera(section), world_to_local, &aabb);
        }
    }

    fn box_test(&self, key: ObjectKey, test: &mut ObjectBoxTest) {
        let inside = self
            .handles()
            .iter()
            .any(|(_, world_to_local, aabb)| test.intersects_box(*world_to_local, aabb));

        if inside {
            test.add(key);
        }
    }

    fn draw_interface(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        for (section, world_to_local, aabb) in self.handles() {
            let highlight = Highlight::from_state(
                self.selection.is_selected(section),
                self.selection.is_focused(section),
            );
            ctx.set_world_matrix(mat4::affine_inverse(world_to_local));
            colors.apply(ctx, highlight, colors.camera);
            interface::draw_box_lines(ctx, &aabb);
        }

        // View line to the target and the up-vector stem
        ctx.set_world_matrix(mat4::IDENTITY);
        colors.apply(ctx, Highlight::Normal, colors.camera);
        ctx.draw_lines(&[self.position, self.target, self.up_handle()], &[0, 1, 0, 2]);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
