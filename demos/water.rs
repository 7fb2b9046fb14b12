//! # Simple Water
//!
//! A reflective, refractive water plane with scrolling DUDV distortion over a
//! few objects that poke through the surface.
//!
//! ## Usage:
//! ```bash
//! cargo run --example water
//! ```
//!
//! The shapes bob through the surface so both the reflection and the
//! refraction are visible.

use cgmath::Vector3;
use lantern::{
    gfx::{
        lighting::{BaseLight, DirectionalLight},
        scene::Scene,
        water::SimpleWater,
    },
    GameCallbacks, LanternApp, RenderConfig,
};

const WATER_SIZE: u32 = 64;
const WORLD_SCALE: f32 = 4.0;

struct Pillars {
    bob: f32,
}

impl GameCallbacks for Pillars {
    fn on_frame(&mut self, scene: &mut Scene, elapsed_millis: u64) {
        self.bob += elapsed_millis as f32 * 0.001;
        let ids: Vec<_> = scene.render_list().to_vec();
        for (i, id) in ids.into_iter().enumerate() {
            if let Ok(object) = scene.object_mut(id) {
                let phase = self.bob + i as f32;
                object.set_position(i as f32 * 4.0 - 6.0, phase.sin() * 0.5, 12.0);
            }
        }
    }
}

fn build_scene(scene: &mut Scene) -> anyhow::Result<()> {
    let colors = [
        [0.9, 0.3, 0.2, 1.0],
        [0.3, 0.8, 0.3, 1.0],
        [0.9, 0.8, 0.2, 1.0],
        [0.6, 0.3, 0.8, 1.0],
    ];
    for (i, color) in colors.into_iter().enumerate() {
        let shape = if i % 2 == 0 { "cube" } else { "sphere" };
        let id = scene.create_scene_object_from_shape(shape)?;
        let object = scene.object_mut(id)?;
        object.set_scale(1.5);
        object.set_flat_color(color);
        scene.add_to_render_list(id);
    }

    scene.add_dir_light(DirectionalLight::new(
        BaseLight::new(Vector3::new(1.0, 0.95, 0.85), 0.25, 0.9),
        Vector3::new(-0.3, -1.0, 0.6),
    ));
    scene.set_camera(Vector3::new(0.0, 4.0, -6.0), Vector3::new(0.0, -0.3, 1.0));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    lantern::init_logging();

    let config = RenderConfig::default()
        .with_title("Lantern Water")
        .with_clear_color([0.45, 0.65, 0.9, 1.0]);
    let mut app = LanternApp::new(config);
    build_scene(app.scene_mut())?;

    let mut water = SimpleWater::new(WATER_SIZE, WORLD_SCALE);
    water.set_water_height(0.0);
    water.wave_strength = 0.02;
    app.set_water(water);

    app.with_callbacks(Pillars { bob: 0.0 }).run()?;

    Ok(())
}
