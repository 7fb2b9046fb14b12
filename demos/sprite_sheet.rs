//! # Sprite Sheet
//!
//! Draws every tile of a 4×4 sprite sheet in a single instanced draw call,
//! on top of a lit floor.
//!
//! ## Usage:
//! ```bash
//! cargo run --example sprite_sheet
//! ```
//!
//! The mouse position is reported in normalized device coordinates while the
//! left button is held.

use cgmath::Vector3;
use lantern::{
    gfx::lighting::{BaseLight, DirectionalLight},
    GameCallbacks, LanternApp, RenderConfig,
};
use winit::event::MouseButton;

const SPRITES_X: u32 = 4;
const SPRITES_Y: u32 = 4;

struct Pointer {
    window: (u32, u32),
    dragging: bool,
}

impl GameCallbacks for Pointer {
    fn on_mouse_move(&mut self, x: f64, y: f64) -> bool {
        if self.dragging {
            let ndc_x = 2.0 * x as f32 / self.window.0 as f32 - 1.0;
            let ndc_y = 2.0 * y as f32 / self.window.1 as f32 - 1.0;
            log::info!("pointer at ndc ({ndc_x:.3}, {ndc_y:.3})");
        }
        // Consumed while dragging so the camera stays put.
        self.dragging
    }

    fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button == MouseButton::Left {
            self.dragging = pressed;
        }
    }
}

fn main() -> anyhow::Result<()> {
    lantern::init_logging();

    let config = RenderConfig::default()
        .with_title("Lantern Sprite Sheet")
        .with_clear_color([0.1, 0.1, 0.1, 1.0]);
    let window = (config.width, config.height);

    let mut app = LanternApp::new(config);
    let scene = app.scene_mut();
    scene.initialize_default()?;
    scene.add_dir_light(DirectionalLight::new(
        BaseLight::new(Vector3::new(1.0, 1.0, 1.0), 0.3, 0.7),
        Vector3::new(0.0, -1.0, 0.5),
    ));
    scene.set_camera(Vector3::new(0.0, 5.0, -10.0), Vector3::new(0.0, -0.4, 1.0));

    app.set_sprite_sheet(
        concat!(env!("CARGO_MANIFEST_DIR"), "/assets/sprites/sheet.png"),
        SPRITES_X,
        SPRITES_Y,
    );

    app.with_callbacks(Pointer {
        window,
        dragging: false,
    })
    .run()?;

    Ok(())
}
