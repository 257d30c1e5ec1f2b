//! Point and spot lights
//!
//! A point light is a sphere handle at its position. A spot light has a
//! position handle and a target handle, both boxes aligned with the light
//! frame, which looks from the position towards the target.

use std::any::Any;
use bitflags::bitflags;
use brickstep_math::mat4::{self, Mat4};
use brickstep_math::{Aabb, Sphere, Vec3, Vec4};
use crate::interface::{self, Highlight, InterfaceColors, InterfaceContext};
use crate::keys::{KeyframeTrack, Step};
use crate::object::{AnimatedObject, ObjectBoxTest, ObjectKey, ObjectKind, ObjectRayTest, Section};
use crate::selection::{SectionId, SectionMask, SelectionState};

/// Radius of the point light handle
pub const LIGHT_SPHERE_RADIUS: f32 = 5.0;
/// Half edge of the spot light position handle
pub const LIGHT_POSITION_EDGE: f32 = 7.5;
/// Half edge of the spot light target handle
pub const LIGHT_TARGET_EDGE: f32 = 5.0;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LightFlags: u32 {
        /// Spot light with a target; otherwise an omnidirectional point light
        const SPOT = 1 << 0;
        const HIDDEN = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightSection {
    Position,
    Target,
}

impl SectionId for LightSection {
    fn index(self) -> u32 {
        self as u32
    }
}

/// A point or spot light with animated position, target and colours
#[derive(Clone, Debug)]
pub struct Light {
    name: String,
    flags: LightFlags,
    selection: SelectionState,

    position_keys: KeyframeTrack<Vec3>,
    target_keys: KeyframeTrack<Vec3>,
    ambient_keys: KeyframeTrack<Vec4>,
    diffuse_keys: KeyframeTrack<Vec4>,
    specular_keys: KeyframeTrack<Vec4>,
    attenuation_keys: KeyframeTrack<Vec3>,
    cutoff_keys: KeyframeTrack<f32>,
    exponent_keys: KeyframeTrack<f32>,

    position: Vec3,
    target: Vec3,
    ambient: Vec4,
    diffuse: Vec4,
    specular: Vec4,
    attenuation: Vec3,
    cutoff: f32,
    exponent: f32,

    world_light: Mat4,
}

impl Light {
    fn with_flags(position: Vec3, target: Vec3, flags: LightFlags) -> Self {
        let ambient = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let diffuse = Vec4::new(0.8, 0.8, 0.8, 1.0);
        let specular = Vec4::ONE;
        let attenuation = Vec3::new(1.0, 0.0, 0.0);
        let cutoff = 30.0;
        let exponent = 0.0;

        let mut light = Self {
            name: String::new(),
            flags,
            selection: SelectionState::new(),
            position_keys: KeyframeTrack::new(position),
            target_keys: KeyframeTrack::new(target),
            ambient_keys: KeyframeTrack::new(ambient),
            diffuse_keys: KeyframeTrack::new(diffuse),
            specular_keys: KeyframeTrack::new(specular),
            attenuation_keys: KeyframeTrack::new(attenuation),
            cutoff_keys: KeyframeTrack::new(cutoff),
            exponent_keys: KeyframeTrack::new(exponent),
            position,
            target,
            ambient,
            diffuse,
            specular,
            attenuation,
            cutoff,
            exponent,
            world_light: mat4::IDENTITY,
        };
        light.update_position(1);
        light
    }

    /// Create an omnidirectional light
    pub fn point(position: Vec3) -> Self {
        Self::with_flags(position, Vec3::ZERO, LightFlags::empty())
    }

    /// Create a spot light shining from `position` towards `target`
    pub fn spot(position: Vec3, target: Vec3) -> Self {
        Self::with_flags(position, target, LightFlags::SPOT)
    }

    /// Set the name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn flags(&self) -> LightFlags {
        self.flags
    }

    pub fn is_point_light(&self) -> bool {
        !self.flags.contains(LightFlags::SPOT)
    }

    pub fn is_spot_light(&self) -> bool {
        self.flags.contains(LightFlags::SPOT)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.flags.set(LightFlags::HIDDEN, hidden);
    }

    // Current values at the last updated step

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn ambient_color(&self) -> Vec4 {
        self.ambient
    }

    pub fn diffuse_color(&self) -> Vec4 {
        self.diffuse
    }

    pub fn specular_color(&self) -> Vec4 {
        self.specular
    }

    pub fn attenuation(&self) -> Vec3 {
        self.attenuation
    }

    /// Spot cone half angle in degrees
    pub fn spot_cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn spot_exponent(&self) -> f32 {
        self.exponent
    }

    // Keyed edits; current values change on the next update_position

    pub fn set_position(&mut self, position: Vec3, step: Step, add_key: bool) {
        self.position_keys.change_key(position, step, add_key);
    }

    pub fn set_target(&mut self, target: Vec3, step: Step, add_key: bool) {
        self.target_keys.change_key(target, step, add_key);
    }

    pub fn set_ambient_color(&mut self, color: Vec4, step: Step, add_key: bool) {
        self.ambient_keys.change_key(color, step, add_key);
    }

    pub fn set_diffuse_color(&mut self, color: Vec4, step: Step, add_key: bool) {
        self.diffuse_keys.change_key(color, step, add_key);
    }

    pub fn set_specular_color(&mut self, color: Vec4, step: Step, add_key: bool) {
        self.specular_keys.change_key(color, step, add_key);
    }

    pub fn set_attenuation(&mut self, attenuation: Vec3, step: Step, add_key: bool) {
        self.attenuation_keys.change_key(attenuation, step, add_key);
    }

    pub fn set_spot_cutoff(&mut self, degrees: f32, step: Step, add_key: bool) {
        self.cutoff_keys.change_key(degrees, step, add_key);
    }

    pub fn set_spot_exponent(&mut self, exponent: f32, step: Step, add_key: bool) {
        self.exponent_keys.change_key(exponent, step, add_key);
    }

    // Track access for serialization

    pub fn position_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.position_keys
    }

    pub fn target_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.target_keys
    }

    pub fn ambient_keys(&self) -> &KeyframeTrack<Vec4> {
        &self.ambient_keys
    }

    pub fn diffuse_keys(&self) -> &KeyframeTrack<Vec4> {
        &self.diffuse_keys
    }

    pub fn specular_keys(&self) -> &KeyframeTrack<Vec4> {
        &self.specular_keys
    }

    pub fn attenuation_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.attenuation_keys
    }

    pub fn cutoff_keys(&self) -> &KeyframeTrack<f32> {
        &self.cutoff_keys
    }

    pub fn exponent_keys(&self) -> &KeyframeTrack<f32> {
        &self.exponent_keys
    }

    /// World-to-target-handle matrix: the light frame recentered on the target
    fn world_target(&self) -> Mat4 {
        let mut m = self.world_light;
        let translation = mat4::transform_direction(m, -self.target);
        mat4::set_translation(&mut m, translation);
        m
    }

    fn position_box() -> Aabb {
        Aabb::cube(LIGHT_POSITION_EDGE)
    }

    fn target_box() -> Aabb {
        Aabb::cube(LIGHT_TARGET_EDGE)
    }

    fn draw_point_light(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        let (vertices, indices) = interface::sphere_mesh(LIGHT_SPHERE_RADIUS, 6);
        let highlight = Highlight::from_state(
            self.selection.is_selected(LightSection::Position),
            self.selection.is_focused(LightSection::Position),
        );

        ctx.set_world_matrix(mat4::translation(self.position));
        ctx.set_color(colors.highlight_color(highlight, colors.light));
        ctx.draw_triangles(&vertices, &indices);
    }

    fn draw_spot_light(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        let length = (self.target - self.position).length();
        let section_highlight = |section: LightSection| {
            Highlight::from_state(self.selection.is_selected(section), self.selection.is_focused(section))
        };

        // Light frame placed at the position: local -Z runs towards the target
        ctx.set_world_matrix(mat4::affine_inverse(self.world_light));

        // Position handle: an octagonal barrel with a square rim at the front
        let mut vertices = Vec::with_capacity(20);
        for edge in 0..8 {
            let angle = edge as f32 / 4.0 * std::f32::consts::PI;
            let c = angle.cos() * LIGHT_POSITION_EDGE;
            let s = angle.sin() * LIGHT_POSITION_EDGE;
            vertices.push(Vec3::new(c, s, LIGHT_POSITION_EDGE));
            vertices.push(Vec3::new(c, s, -LIGHT_POSITION_EDGE));
        }
        let rim = 12.5;
        vertices.push(Vec3::new(-rim, -rim, -LIGHT_POSITION_EDGE));
        vertices.push(Vec3::new(rim, -rim, -LIGHT_POSITION_EDGE));
        vertices.push(Vec3::new(rim, rim, -LIGHT_POSITION_EDGE));
        vertices.push(Vec3::new(-rim, rim, -LIGHT_POSITION_EDGE));

        let mut indices: Vec<u16> = Vec::with_capacity(56);
        for edge in 0..8u16 {
            let next = (edge + 1) % 8;
            indices.extend_from_slice(&[2 * edge, 2 * edge + 1]);
            indices.extend_from_slice(&[2 * edge, 2 * next]);
            indices.extend_from_slice(&[2 * edge + 1, 2 * next + 1]);
        }
        indices.extend_from_slice(&[16, 17, 17, 18, 18, 19, 19, 16]);

        colors.apply(ctx, section_highlight(LightSection::Position), colors.light);
        ctx.draw_lines(&vertices, &indices);

        // Target handle
        let target_box = Self::target_box().translated(Vec3::new(0.0, 0.0, -length));
        colors.apply(ctx, section_highlight(LightSection::Target), colors.light);
        interface::draw_box_lines(ctx, &target_box);

        // Direction line, plus the spot cone while selected
        let mut vertices = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, -length)];
        let mut indices: Vec<u16> = vec![0, 1];

        if self.selection.is_any_selected() {
            let radius = self.cutoff.to_radians().tan() * length;
            for edge in 0..16u16 {
                let angle = edge as f32 / 16.0 * std::f32::consts::TAU;
                vertices.push(Vec3::new(angle.cos() * radius, angle.sin() * radius, -length));
                indices.extend_from_slice(&[2 + edge, 2 + (edge + 1) % 16]);
            }
            for edge in [0u16, 4, 8, 12] {
                indices.extend_from_slice(&[0, 2 + edge]);
            }
        }

        colors.apply(ctx, Highlight::Normal, colors.light);
        ctx.draw_lines(&vertices, &indices);
    }
}

impl AnimatedObject for Light {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Light
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_visible(&self) -> bool {
        !self.flags.contains(LightFlags::HIDDEN)
    }

    fn selection(&self) -> &SelectionState {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    fn available_sections(&self) -> SectionMask {
        if self.is_point_light() {
            SectionMask::single(LightSection::Position.index())
        } else {
            SectionMask::first_n(2)
        }
    }

    fn section_at(&self, index: u32) -> Option<Section> {
        match index {
            0 => Some(Section::Light(LightSection::Position)),
            1 if self.is_spot_light() => Some(Section::Light(LightSection::Target)),
            _ => None,
        }
    }

    fn update_position(&mut self, step: Step) {
        self.position = self.position_keys.calculate_key(step);
        self.target = self.target_keys.calculate_key(step);
        self.ambient = self.ambient_keys.calculate_key(step);
        self.diffuse = self.diffuse_keys.calculate_key(step);
        self.specular = self.specular_keys.calculate_key(step);
        self.attenuation = self.attenuation_keys.calculate_key(step);
        self.cutoff = self.cutoff_keys.calculate_key(step);
        self.exponent = self.exponent_keys.calculate_key(step);

        self.world_light = if self.is_point_light() {
            mat4::translation(-self.position)
        } else {
            let up = mat4::perpendicular_up(self.target - self.position);
            mat4::look_at(self.position, self.target, up)
        };
    }

    fn move_selected(&mut self, step: Step, add_key: bool, delta: Vec3) {
        if self.selection.is_selected(LightSection::Position) {
            self.position += delta;
            self.position_keys.change_key(self.position, step, add_key);
        }

        if self.selection.is_selected(LightSection::Target) {
            self.target += delta;
            self.target_keys.change_key(self.target, step, add_key);
        }
    }

    fn insert_time(&mut self, start: Step, count: Step) {
        self.position_keys.insert_time(start, count);
        self.target_keys.insert_time(start, count);
        self.ambient_keys.insert_time(start, count);
        self.diffuse_keys.insert_time(start, count);
        self.specular_keys.insert_time(start, count);
        self.attenuation_keys.insert_time(start, count);
        self.cutoff_keys.insert_time(start, count);
        self.exponent_keys.insert_time(start, count);
    }

    fn remove_time(&mut self, start: Step, count: Step) {
        self.position_keys.remove_time(start, count);
        self.target_keys.remove_time(start, count);
        self.ambient_keys.remove_time(start, count);
        self.diffuse_keys.remove_time(start, count);
        self.specular_keys.remove_time(start, count);
        self.attenuation_keys.remove_time(start, count);
        self.cutoff_keys.remove_time(start, count);
        self.exponent_keys.remove_time(start, count);
    }

    fn remove_key_frames(&mut self) {
        self.position_keys.reset(self.position);
        self.target_keys.reset(self.target);
        self.ambient_keys.reset(self.ambient);
        self.diffuse_keys.reset(self.diffuse);
        self.specular_keys.reset(self.specular);
        self.attenuation_keys.reset(self.attenuation);
        self.cutoff_keys.reset(self.cutoff);
        self.exponent_keys.reset(self.exponent);
    }

    fn world_matrix(&self) -> Mat4 {
        self.world_light
    }

    fn compare_bounding_box(&self, bbox: &mut Aabb) {
        bbox.extend(self.position);
        if self.is_spot_light() {
            bbox.extend(self.target);
        }
    }

    fn last_step(&self) -> Step {
        [
            self.position_keys.last_step(),
            self.target_keys.last_step(),
            self.ambient_keys.last_step(),
            self.diffuse_keys.last_step(),
            self.specular_keys.last_step(),
            self.attenuation_keys.last_step(),
            self.cutoff_keys.last_step(),
            self.exponent_keys.last_step(),
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }

    fn ray_test(&self, key: ObjectKey, test: &mut ObjectRayTest) {
        if self.is_point_light() {
            let sphere = Sphere::new(self.position, LIGHT_SPHERE_RADIUS);
            test.test_sphere(key, Section::Light(LightSection::Position), &sphere);
            return;
        }

        test.test_box(key, Section::Light(LightSection::Position), self.world_light, &Self::position_box());
        test.test_box(key, Section::Light(LightSection::Target), self.world_target(), &Self::target_box());
    }

    fn box_test(&self, key: ObjectKey, test: &mut ObjectBoxTest) {
        let inside = if self.is_point_light() {
            test.intersects_sphere(&Sphere::new(self.position, LIGHT_SPHERE_RADIUS))
        } else {
            test.intersects_box(self.world_light, &Self::position_box())
                || test.intersects_box(self.world_target(), &Self::target_box())
        };

        if inside {
            test.add(key);
        }
    }

    fn draw_interface(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        if self.is_point_light() {
            self.draw_point_light(ctx, colors);
        } else {
            self.draw_spot_light(ctx, colors);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
