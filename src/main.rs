//! brickstep - animated scene editor, headless demo
//!
//! Builds a small scene, walks its timeline and exercises picking, logging
//! what the editor sees at each step.

use brickstep::config::AppConfig;
use brickstep::session::EditorSession;
use brickstep_core::{Aabb, InterfaceContext, Light, Mat4, Piece, Rotor3, Vec3, Vec4, STEP_MAX};

/// Interface sink that only tallies draw calls
#[derive(Default)]
struct DrawStats {
    line_batches: usize,
    triangle_batches: usize,
    primitives: usize,
}

impl InterfaceContext for DrawStats {
    fn set_world_matrix(&mut self, _local_to_world: Mat4) {}

    fn set_color(&mut self, _color: Vec4) {}

    fn set_line_width(&mut self, _width: f32) {}

    fn draw_lines(&mut self, _vertices: &[Vec3], indices: &[u16]) {
        self.line_batches += 1;
        self.primitives += indices.len() / 2;
    }

    fn draw_triangles(&mut self, _vertices: &[Vec3], indices: &[u16]) {
        self.triangle_batches += 1;
        self.primitives += indices.len() / 3;
    }
}

fn build_demo_scene(session: &mut EditorSession) {
    session.add_light();
    session.add_camera();

    let spot = session
        .scene_mut()
        .add_object(Light::spot(Vec3::new(100.0, 0.0, 200.0), Vec3::ZERO).with_name("Spot"));
    if let Some(light) = session.scene_mut().light_mut(spot) {
        light.set_position(Vec3::new(-100.0, 0.0, 200.0), 4, true);
        light.set_diffuse_color(Vec4::new(1.0, 0.5, 0.2, 1.0), 4, true);
    }

    // A 2x4 brick in LDraw units
    let brick = Aabb::new(Vec3::new(-40.0, -20.0, -24.0), Vec3::new(40.0, 20.0, 4.0));
    for (i, show) in [1, 2, 3].into_iter().enumerate() {
        let position = Vec3::new(0.0, i as f32 * 40.0, 0.0);
        let piece = Piece::new("3001", 4, brick, position, Rotor3::IDENTITY).with_steps(show, STEP_MAX);
        session.scene_mut().add_object(piece);
    }
}

fn main() {
    let config = AppConfig::load();
    let level = config.as_ref().map(|c| c.debug.log_level.clone()).unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    log::info!("Starting brickstep");
    let mut session = EditorSession::new(&config);
    build_demo_scene(&mut session);
    log::info!(
        "Scene has {} objects over {} steps",
        session.scene().len(),
        session.scene().last_step()
    );

    // Walk the timeline
    session.show_first_step();
    loop {
        let step = session.current_step();
        let visible = session.scene().iter().filter(|(_, o)| o.is_visible()).count();
        log::info!("Step {}: {} visible objects", step, visible);

        if step >= session.scene().last_step() {
            break;
        }
        session.show_next_step();
    }

    // Pick straight down through the pieces
    match session.pick(Vec3::new(0.0, 40.0, 500.0), Vec3::new(0.0, 40.0, 0.0), false) {
        Ok(Some(hit)) => {
            let name = session.scene().get(hit.key).map(|o| o.name().to_string()).unwrap_or_default();
            log::info!("Picked {} ({:?}) at distance {:.2}", name, hit.section, hit.distance);
        }
        Ok(None) => log::info!("Pick missed"),
        Err(e) => log::error!("Pick failed: {}", e),
    }

    // Drag the picked piece at step 2 with keys on
    session.show_first_step();
    session.show_next_step();
    session.set_add_keys(true);
    session.move_selection(Vec3::new(0.0, 0.0, 24.0));

    match session.select_in_volume(&Aabb::new(Vec3::splat(-50.0), Vec3::splat(50.0)), false) {
        Ok(keys) => log::info!("Marquee selected {}: {:?}", keys.len(), session.selected_names()),
        Err(e) => log::error!("Marquee failed: {}", e),
    }

    let mut stats = DrawStats::default();
    session.draw_interface(&mut stats);
    log::info!(
        "Interface: {} line batches, {} triangle batches, {} primitives",
        stats.line_batches,
        stats.triangle_batches,
        stats.primitives
    );

    let bbox = session.scene().bounding_box();
    log::info!("Scene bounds {:?} to {:?}", bbox.min, bbox.max);
}
