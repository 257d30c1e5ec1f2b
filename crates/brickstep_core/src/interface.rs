//! Drawing of editor handles (light gizmos, camera handles, selection boxes)
//!
//! Objects describe their interface geometry through [`InterfaceContext`]
//! and never talk to a GPU directly; a renderer implements the trait.

use brickstep_math::mat4::Mat4;
use brickstep_math::{Aabb, Vec3, Vec4};

/// Sink for interface drawing commands
pub trait InterfaceContext {
    /// Local-to-world matrix for the following draws
    fn set_world_matrix(&mut self, local_to_world: Mat4);

    fn set_color(&mut self, color: Vec4);

    fn set_line_width(&mut self, width: f32);

    /// Draw pairs of indices as line segments
    fn draw_lines(&mut self, vertices: &[Vec3], indices: &[u16]);

    /// Draw triples of indices as triangles
    fn draw_triangles(&mut self, vertices: &[Vec3], indices: &[u16]);
}

/// Colours and widths used for interface drawing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterfaceColors {
    pub line_width: f32,
    pub object_selected: Vec4,
    pub object_focused: Vec4,
    pub light: Vec4,
    pub camera: Vec4,
    pub control_point: Vec4,
    pub control_point_focused: Vec4,
}

impl Default for InterfaceColors {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            object_selected: Vec4::new(0.898, 0.298, 0.4, 1.0),
            object_focused: Vec4::new(0.4, 0.298, 0.898, 1.0),
            light: Vec4::new(0.0, 0.0, 0.0, 1.0),
            camera: Vec4::new(0.0, 0.0, 0.0, 1.0),
            control_point: Vec4::new(0.5, 0.8, 0.5, 0.5),
            control_point_focused: Vec4::new(0.4, 0.6, 0.9, 0.6),
        }
    }
}

/// How a handle is highlighted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Selected,
    Focused,
}

impl Highlight {
    pub fn from_state(selected: bool, focused: bool) -> Self {
        if focused {
            Highlight::Focused
        } else if selected {
            Highlight::Selected
        } else {
            Highlight::Normal
        }
    }
}

impl InterfaceColors {
    /// Colour for a handle whose unhighlighted colour is `base`
    pub fn highlight_color(&self, highlight: Highlight, base: Vec4) -> Vec4 {
        match highlight {
            Highlight::Normal => base,
            Highlight::Selected => self.object_selected,
            Highlight::Focused => self.object_focused,
        }
    }

    /// Line width for a handle; highlighted handles are drawn twice as thick
    pub fn highlight_width(&self, highlight: Highlight) -> f32 {
        match highlight {
            Highlight::Normal => self.line_width,
            Highlight::Selected | Highlight::Focused => 2.0 * self.line_width,
        }
    }

    /// Set colour and line width on `ctx` for a handle
    pub fn apply(&self, ctx: &mut dyn InterfaceContext, highlight: Highlight, base: Vec4) {
        ctx.set_line_width(self.highlight_width(highlight));
        ctx.set_color(self.highlight_color(highlight, base));
    }
}

/// Index pairs for the 12 edges of the corners returned by [`Aabb::corners`]
pub const BOX_EDGE_INDICES: [u16; 24] = [
    0, 1, 2, 3, 4, 5, 6, 7, // along X
    0, 2, 1, 3, 4, 6, 5, 7, // along Y
    0, 4, 1, 5, 2, 6, 3, 7, // along Z
];

/// Index triples for the 12 face triangles of the corners returned by
/// [`Aabb::corners`]
pub const BOX_FACE_INDICES: [u16; 36] = [
    0, 4, 6, 0, 6, 2, // -X
    1, 3, 7, 1, 7, 5, // +X
    0, 1, 5, 0, 5, 4, // -Y
    2, 6, 7, 2, 7, 3, // +Y
    0, 2, 3, 0, 3, 1, // -Z
    4, 5, 7, 4, 7, 6, // +Z
];

/// Draw the wireframe of a box in the current world matrix
pub fn draw_box_lines(ctx: &mut dyn InterfaceContext, aabb: &Aabb) {
    ctx.draw_lines(&aabb.corners(), &BOX_EDGE_INDICES);
}

/// Draw a filled box in the current world matrix
pub fn draw_box_solid(ctx: &mut dyn InterfaceContext, aabb: &Aabb) {
    ctx.draw_triangles(&aabb.corners(), &BOX_FACE_INDICES);
}

/// Triangle mesh of a UV sphere centered at the origin
///
/// The mesh has a vertex at each pole and `slices - 1` rings of `slices`
/// vertices in between.
pub fn sphere_mesh(radius: f32, slices: u16) -> (Vec<Vec3>, Vec<u16>) {
    let slices = slices.max(3);
    let rings = slices - 1;
    let mut vertices = Vec::with_capacity((rings * slices + 2) as usize);
    let mut indices = Vec::new();

    let pi = std::f32::consts::PI;
    vertices.push(Vec3::new(0.0, 0.0, radius));
    for i in 1..slices {
        let theta = i as f32 * (pi / slices as f32);
        let r = radius * theta.sin();
        let z = radius * theta.cos();
        for j in 0..slices {
            let phi = j as f32 * (2.0 * pi / slices as f32);
            vertices.push(Vec3::new(r * phi.sin(), r * phi.cos(), z));
        }
    }
    let bottom = vertices.len() as u16;
    vertices.push(Vec3::new(0.0, 0.0, -radius));

    let ring_start = |ring: u16| 1 + ring * slices;

    // Top cap
    for j in 0..slices {
        let next = (j + 1) % slices;
        indices.extend_from_slice(&[0, ring_start(0) + j, ring_start(0) + next]);
    }

    // Bands between rings
    for ring in 0..rings - 1 {
        let row1 = ring_start(ring);
        let row2 = ring_start(ring + 1);
        for j in 0..slices {
            let next = (j + 1) % slices;
            indices.extend_from_slice(&[row1 + j, row2 + next, row2 + j]);
            indices.extend_from_slice(&[row1 + j, row1 + next, row2 + next]);
        }
    }

    // Bottom cap
    let last = ring_start(rings - 1);
    for j in 0..slices {
        let next = (j + 1) % slices;
        indices.extend_from_slice(&[bottom, last + next, last + j]);
    }

    (vertices, indices)
}

#[cfg(test)]
pub(crate) mod testing {
    //! An [`InterfaceContext`] that records what it was asked to draw

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawCall {
        Lines { vertices: usize, indices: usize, color: Vec4, width: f32 },
        Triangles { vertices: usize, indices: usize, color: Vec4 },
    }

    #[derive(Default)]
    pub struct RecordingContext {
        pub world: Option<Mat4>,
        pub color: Vec4,
        pub width: f32,
        pub calls: Vec<DrawCall>,
    }

    impl InterfaceContext for RecordingContext {
        fn set_world_matrix(&mut self, local_to_world: Mat4) {
            self.world = Some(local_to_world);
        }

        fn set_color(&mut self, color: Vec4) {
            self.color = color;
        }

        fn set_line_width(&mut self, width: f32) {
            self.width = width;
        }

        fn draw_lines(&mut self, vertices: &[Vec3], indices: &[u16]) {
            assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
            self.calls.push(DrawCall::Lines {
                vertices: vertices.len(),
                indices: indices.len(),
                color: self.color,
                width: self.width,
            });
        }

        fn draw_triangles(&mut self, vertices: &[Vec3], indices: &[u16]) {
            assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
            self.calls.push(DrawCall::Triangles {
                vertices: vertices.len(),
                indices: indices.len(),
                color: self.color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::{DrawCall, RecordingContext};

    #[test]
    fn test_sphere_mesh_counts() {
        let (vertices, indices) = sphere_mesh(5.0, 6);
        // Two poles plus five rings of six
        assert_eq!(vertices.len(), 32);
        // Two caps of six triangles plus four bands of twelve
        assert_eq!(indices.len(), 3 * (6 + 6 + 4 * 12));
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        assert!(vertices.iter().all(|v| (v.length() - 5.0).abs() < 0.0001));
    }

    #[test]
    fn test_box_edges_are_axis_aligned() {
        let corners = Aabb::cube(1.0).corners();
        for pair in BOX_EDGE_INDICES.chunks(2) {
            let d = corners[pair[1] as usize] - corners[pair[0] as usize];
            assert_eq!(d.length(), 2.0);
        }
    }

    #[test]
    fn test_box_faces_cover_every_corner() {
        for corner in 0..8u16 {
            let uses = BOX_FACE_INDICES.iter().filter(|&&i| i == corner).count();
            assert!(uses >= 3, "corner {} used {} times", corner, uses);
        }
    }

    #[test]
    fn test_highlight_colors() {
        let colors = InterfaceColors::default();
        let base = Vec4::ONE;
        assert_eq!(colors.highlight_color(Highlight::Normal, base), base);
        assert_eq!(colors.highlight_color(Highlight::Selected, base), colors.object_selected);
        assert_eq!(colors.highlight_color(Highlight::Focused, base), colors.object_focused);
        assert_eq!(Highlight::from_state(true, true), Highlight::Focused);
        assert_eq!(Highlight::from_state(true, false), Highlight::Selected);
    }

    #[test]
    fn test_apply_sets_width_and_color() {
        let colors = InterfaceColors::default();
        let mut ctx = RecordingContext::default();
        colors.apply(&mut ctx, Highlight::Selected, Vec4::ONE);
        draw_box_lines(&mut ctx, &Aabb::cube(1.0));
        assert_eq!(
            ctx.calls,
            vec![DrawCall::Lines { vertices: 8, indices: 24, color: colors.object_selected, width: 2.0 }]
        );
    }
}
