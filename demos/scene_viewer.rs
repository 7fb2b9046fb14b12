//! # Scene Viewer
//!
//! Loads a model or glTF scene and lights it with the Phong renderer.
//!
//! ## Usage:
//! ```bash
//! cargo run --example scene_viewer -- assets/models/lit_scene.gltf
//! ```
//!
//! Without an argument the OBJ crate is shown next to the built-in shapes.
//! W/S/A/D/PageUp/PageDown move the camera, holding the left mouse button
//! looks around, Escape or Q quits. Space toggles the spinning cube.

use cgmath::Vector3;
use lantern::{
    gfx::{
        lighting::{BaseLight, DirectionalLight, LightAttenuation, PointLight},
        scene::{Scene, SceneObjectId},
    },
    GameCallbacks, LanternApp, RenderConfig,
};
use winit::keyboard::KeyCode;

struct Viewer {
    spinner: SceneObjectId,
    angle: f32,
    spinning: bool,
}

impl GameCallbacks for Viewer {
    fn on_frame(&mut self, scene: &mut Scene, elapsed_millis: u64) {
        if !self.spinning {
            return;
        }
        self.angle = (self.angle + elapsed_millis as f32 * 0.05) % 360.0;
        if let Ok(object) = scene.object_mut(self.spinner) {
            object.set_rotation(0.0, self.angle, 0.0);
        }
    }

    fn on_keyboard(&mut self, key: KeyCode, pressed: bool) -> bool {
        if key == KeyCode::Space {
            if pressed {
                self.spinning = !self.spinning;
            }
            return true;
        }
        false
    }
}

fn main() -> anyhow::Result<()> {
    lantern::init_logging();

    let config = RenderConfig::default()
        .with_title("Lantern Scene Viewer")
        .with_clear_color([0.05, 0.05, 0.08, 1.0])
        .with_env_overrides();
    let mut app = LanternApp::new(config);
    let scene = app.scene_mut();

    let spinner = match std::env::args().nth(1) {
        Some(path) => scene.load_scene(path)?,
        None => {
            let crate_box = scene.load_scene(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/models/cube.obj"))?;
            scene.object_mut(crate_box)?.set_scale(2.0);

            let sphere = scene.create_scene_object_from_shape("sphere")?;
            let sphere_object = scene.object_mut(sphere)?;
            sphere_object.set_position(3.0, 0.0, 0.0);
            sphere_object.set_flat_color([0.2, 0.6, 0.9, 1.0]);
            scene.add_to_render_list(sphere);

            scene.set_camera(Vector3::new(0.0, 1.5, -8.0), Vector3::new(0.0, -0.15, 1.0));
            crate_box
        }
    };

    if scene.dir_lights().is_empty() {
        scene.add_dir_light(DirectionalLight::new(
            BaseLight::new(Vector3::new(1.0, 1.0, 1.0), 0.2, 0.8),
            Vector3::new(1.0, -1.0, 1.0),
        ));
        scene.add_point_light(PointLight::new(
            BaseLight::new(Vector3::new(1.0, 0.6, 0.2), 0.0, 1.0),
            Vector3::new(-3.0, 1.0, -2.0),
            LightAttenuation {
                constant: 1.0,
                linear: 0.1,
                exp: 0.0,
            },
        ));
    }

    log::info!("{:?}", scene.statistics());

    app.with_callbacks(Viewer {
        spinner,
        angle: 0.0,
        spinning: true,
    })
    .run()?;

    Ok(())
}
