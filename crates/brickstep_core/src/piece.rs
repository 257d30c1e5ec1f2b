//! Pieces placed in the model
//!
//! A piece is a part instance with an animated position and rotation, a
//! local bounding box used for picking, an optional set of control points,
//! and a visibility window `[step_show, step_hide)` over the build steps.

use std::any::Any;
use bitflags::bitflags;
use brickstep_math::mat4::{self, Mat4};
use brickstep_math::{Aabb, Rotor3, Vec3};
use crate::interface::{self, Highlight, InterfaceColors, InterfaceContext};
use crate::keys::{KeyframeTrack, Step, STEP_MAX};
use crate::object::{AnimatedObject, ObjectBoxTest, ObjectKey, ObjectKind, ObjectRayTest, Section};
use crate::selection::{SectionId, SectionMask, SelectionState};

/// Most control points a piece can carry; section bits are 32 wide and the
/// first bit belongs to the piece body
pub const MAX_CONTROL_POINTS: usize = 31;

/// Half edge of a control point handle
pub const CONTROL_POINT_EDGE: f32 = 5.0;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PieceFlags: u32 {
        const HIDDEN = 1 << 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceSection {
    /// The piece body
    Position,
    ControlPoint(u8),
}

impl SectionId for PieceSection {
    fn index(self) -> u32 {
        match self {
            PieceSection::Position => 0,
            PieceSection::ControlPoint(i) => 1 + i as u32,
        }
    }
}

/// A placed part with an animated pose and a step visibility window
#[derive(Clone, Debug)]
pub struct Piece {
    name: String,
    flags: PieceFlags,
    selection: SelectionState,

    part_id: String,
    color_code: u32,
    bounding_box: Aabb,
    step_show: Step,
    step_hide: Step,
    control_points: Vec<Vec3>,

    position_keys: KeyframeTrack<Vec3>,
    rotation_keys: KeyframeTrack<Rotor3>,

    step: Step,
    position: Vec3,
    rotation: Rotor3,
    model_world: Mat4,
    world_model: Mat4,
}

impl Piece {
    /// Create a piece shown from step 1 onwards
    pub fn new(part_id: impl Into<String>, color_code: u32, bounding_box: Aabb, position: Vec3, rotation: Rotor3) -> Self {
        let rotation = rotation.normalize();
        let mut piece = Self {
            name: String::new(),
            flags: PieceFlags::empty(),
            selection: SelectionState::new(),
            part_id: part_id.into(),
            color_code,
            bounding_box,
            step_show: 1,
            step_hide: STEP_MAX,
            control_points: Vec::new(),
            position_keys: KeyframeTrack::new(position),
            rotation_keys: KeyframeTrack::new(rotation),
            step: 1,
            position,
            rotation,
            model_world: mat4::IDENTITY,
            world_model: mat4::IDENTITY,
        };
        piece.update_position(1);
        piece
    }

    /// Set the name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the visibility window (builder pattern)
    pub fn with_steps(mut self, show: Step, hide: Step) -> Self {
        self.set_step_show(show);
        self.set_step_hide(hide);
        self
    }

    /// Set the control points (builder pattern)
    pub fn with_control_points(mut self, points: Vec<Vec3>) -> Self {
        self.set_control_points(points);
        self
    }

    pub fn part_id(&self) -> &str {
        &self.part_id
    }

    pub fn color_code(&self) -> u32 {
        self.color_code
    }

    pub fn set_color_code(&mut self, color_code: u32) {
        self.color_code = color_code;
    }

    /// Bounding box in the piece's local frame
    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    pub fn flags(&self) -> PieceFlags {
        self.flags
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.flags.set(PieceFlags::HIDDEN, hidden);
    }

    pub fn step_show(&self) -> Step {
        self.step_show
    }

    /// First step without this piece; [`STEP_MAX`] means never hidden
    pub fn step_hide(&self) -> Step {
        self.step_hide
    }

    /// Set the step the piece appears at, pushing the hide step later if needed
    pub fn set_step_show(&mut self, step: Step) {
        if step == 0 {
            return;
        }
        self.step_show = step;
        self.fix_step_window();
    }

    /// Set the step the piece disappears at; never at or before `step_show`
    pub fn set_step_hide(&mut self, step: Step) {
        self.step_hide = step.max(self.step_show.saturating_add(1));
    }

    /// True if the piece is not hidden and `step` lies in its window
    pub fn is_visible_at(&self, step: Step) -> bool {
        !self.flags.contains(PieceFlags::HIDDEN) && self.step_show <= step && step < self.step_hide
    }

    /// Control points in the local frame
    pub fn control_points(&self) -> &[Vec3] {
        &self.control_points
    }

    /// Replace the control points, keeping at most [`MAX_CONTROL_POINTS`]
    pub fn set_control_points(&mut self, mut points: Vec<Vec3>) {
        if points.len() > MAX_CONTROL_POINTS {
            log::warn!(
                "Piece {} has {} control points, keeping the first {}",
                self.part_id,
                points.len(),
                MAX_CONTROL_POINTS
            );
            points.truncate(MAX_CONTROL_POINTS);
        }
        self.control_points = points;

        let available = self.available_sections();
        self.selection.retain(available);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Rotor3 {
        self.rotation
    }

    /// Local-to-world matrix
    pub fn model_world(&self) -> Mat4 {
        self.model_world
    }

    pub fn set_position(&mut self, position: Vec3, step: Step, add_key: bool) {
        self.position_keys.change_key(position, step, add_key);
    }

    pub fn set_rotation(&mut self, rotation: Rotor3, step: Step, add_key: bool) {
        self.rotation_keys.change_key(rotation.normalize(), step, add_key);
    }

    pub fn position_keys(&self) -> &KeyframeTrack<Vec3> {
        &self.position_keys
    }

    pub fn rotation_keys(&self) -> &KeyframeTrack<Rotor3> {
        &self.rotation_keys
    }

    /// Rotate the piece by `rotor` about a world `pivot` and key the new pose
    pub fn rotate(&mut self, step: Step, add_key: bool, rotor: Rotor3, pivot: Vec3) {
        self.position = pivot + rotor.rotate(self.position - pivot);
        self.rotation = rotor.compose(&self.rotation).normalize();

        self.position_keys.change_key(self.position, step, add_key);
        self.rotation_keys.change_key(self.rotation, step, add_key);
        self.update_matrices();
    }

    fn update_matrices(&mut self) {
        self.model_world = mat4::mul(mat4::translation(self.position), self.rotation.to_matrix());
        self.world_model = mat4::affine_inverse(self.model_world);
    }

    fn fix_step_window(&mut self) {
        if self.step_hide <= self.step_show {
            if self.step_show == STEP_MAX {
                self.step_show = STEP_MAX - 1;
            }
            self.step_hide = self.step_show + 1;
        }
    }

    /// World-to-handle matrix for a control point
    fn world_control_point(&self, point: Vec3) -> Mat4 {
        mat4::mul(mat4::translation(-point), self.world_model)
    }
}

impl AnimatedObject for Piece {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Piece
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_visible(&self) -> bool {
        self.is_visible_at(self.step)
    }

    fn selection(&self) -> &SelectionState {
        &self.selection
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    fn available_sections(&self) -> SectionMask {
        SectionMask::first_n(1 + self.control_points.len() as u32)
    }

    fn section_at(&self, index: u32) -> Option<Section> {
        match index {
            0 => Some(Section::Piece(PieceSection::Position)),
            i if (i as usize) <= self.control_points.len() => {
                Some(Section::Piece(PieceSection::ControlPoint((i - 1) as u8)))
            }
            _ => None,
        }
    }

    fn update_position(&mut self, step: Step) {
        self.step = step;
        self.position = self.position_keys.calculate_key(step);
        self.rotation = self.rotation_keys.calculate_key(step);
        self.update_matrices();
    }

    fn move_selected(&mut self, step: Step, add_key: bool, delta: Vec3) {
        // A focused control point moves on its own, in the local frame
        if let Some(Section::Piece(PieceSection::ControlPoint(i))) = self.focused_section() {
            let local_delta = self.rotation.reverse().rotate(delta);
            if let Some(point) = self.control_points.get_mut(i as usize) {
                *point += local_delta;
            }
            return;
        }

        if self.selection.is_selected(PieceSection::Position) {
            self.position += delta;
            self.position_keys.change_key(self.position, step, add_key);
            self.update_matrices();
        }
    }

    fn insert_time(&mut self, start: Step, count: Step) {
        self.position_keys.insert_time(start, count);
        self.rotation_keys.insert_time(start, count);

        if start == 0 || count == 0 {
            return;
        }
        let shift = |step: Step| if step >= start { step.saturating_add(count) } else { step };
        self.step_show = shift(self.step_show);
        self.step_hide = shift(self.step_hide);
        self.fix_step_window();
    }

    fn remove_time(&mut self, start: Step, count: Step) {
        self.position_keys.remove_time(start, count);
        self.rotation_keys.remove_time(start, count);

        if start == 0 || count == 0 {
            return;
        }
        let end = start as u64 + count as u64;
        let collapse = |step: Step| {
            if step < start || step == STEP_MAX {
                step
            } else if (step as u64) < end {
                start
            } else {
                step - count
            }
        };
        self.step_show = collapse(self.step_show);
        self.step_hide = collapse(self.step_hide);
        self.fix_step_window();
    }

    fn remove_key_frames(&mut self) {
        self.position_keys.reset(self.position);
        self.rotation_keys.reset(self.rotation);
    }

    fn world_matrix(&self) -> Mat4 {
        self.world_model
    }

    fn compare_bounding_box(&self, bbox: &mut Aabb) {
        for corner in self.bounding_box.corners() {
            bbox.extend(mat4::transform_point(self.model_world, corner));
        }
    }

    fn last_step(&self) -> Step {
        self.position_keys
            .last_step()
            .max(self.rotation_keys.last_step())
            .max(self.step_show)
    }

    fn ray_test(&self, key: ObjectKey, test: &mut ObjectRayTest) {
        if !self.is_visible() {
            return;
        }

        test.test_box(key, Section::Piece(PieceSection::Position), self.world_model, &self.bounding_box);

        if self.selection.is_any_focused() {
            let handle = Aabb::cube(CONTROL_POINT_EDGE);
            for (i, point) in self.control_points.iter().enumerate() {
                let section = Section::Piece(PieceSection::ControlPoint(i as u8));
                test.test_box(key, section, self.world_control_point(*point), &handle);
            }
        }
    }

    fn box_test(&self, key: ObjectKey, test: &mut ObjectBoxTest) {
        if self.is_visible() && test.intersects_box(self.world_model, &self.bounding_box) {
            test.add(key);
        }
    }

    fn draw_interface(&self, ctx: &mut dyn InterfaceContext, colors: &InterfaceColors) {
        if !self.is_visible() || !self.selection.is_any_selected() {
            return;
        }

        ctx.set_world_matrix(self.model_world);

        let highlight = if self.selection.is_focused(PieceSection::Position) {
            Highlight::Focused
        } else {
            Highlight::Selected
        };
        colors.apply(ctx, highlight, colors.object_selected);
        interface::draw_box_lines(ctx, &self.bounding_box);

        if !self.selection.is_any_focused() {
            return;
        }

        for (i, point) in self.control_points.iter().enumerate() {
            let color = if self.selection.is_focused(PieceSection::ControlPoint(i as u8)) {
                colors.control_point_focused
            } else {
                colors.control_point
            };
            ctx.set_color(color);
            interface::draw_box_solid(ctx, &Aabb::cube(CONTROL_POINT_EDGE).translated(*point));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
