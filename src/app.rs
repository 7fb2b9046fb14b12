use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::RenderConfig,
    error::{LanternError, Result},
    gfx::{
        camera::CameraController,
        lighting::PhongRenderer,
        rendering::RenderEngine,
        resources::SamplingOptions,
        scene::Scene,
        sprite::SpriteBatch,
        water::SimpleWater,
    },
};

const ROTATE_SPEED: f32 = 0.1;
const ZOOM_SPEED: f32 = 1.0;

/// Initializes `env_logger` with an `info` default, overridable through `RUST_LOG`.
///
/// Safe to call more than once. Returns `false` when a logger was already
/// installed, in which case that logger stays in place.
pub fn init_logging() -> bool {
    match env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init() {
        Ok(()) => true,
        Err(e) => {
            debug!("Logger already initialized: {e}");
            false
        }
    }
}

/// Hooks a game can implement to drive the scene and intercept input.
///
/// Every method has a no-op default. Input hooks return `true` when they
/// consumed the event, which keeps it away from the camera controller.
pub trait GameCallbacks {
    /// Called once per frame before rendering, with the time since the previous frame.
    fn on_frame(&mut self, _scene: &mut Scene, _elapsed_millis: u64) {}

    fn on_keyboard(&mut self, _key: KeyCode, _pressed: bool) -> bool {
        false
    }

    /// Cursor position in physical pixels, origin top-left.
    fn on_mouse_move(&mut self, _x: f64, _y: f64) -> bool {
        false
    }

    fn on_mouse_button(&mut self, _button: MouseButton, _pressed: bool) {}
}

struct NoCallbacks;

impl GameCallbacks for NoCallbacks {}

struct SpriteSheetRequest {
    path: PathBuf,
    sprites_x: u32,
    sprites_y: u32,
}

/// Window, event loop and frame loop around a [`Scene`].
pub struct LanternApp {
    app_state: AppState,
}

struct AppState {
    config: RenderConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    phong: PhongRenderer,
    controller: CameraController,
    callbacks: Box<dyn GameCallbacks>,
    water: Option<SimpleWater>,
    sprite_request: Option<SpriteSheetRequest>,
    sprites: Option<SpriteBatch>,
    mouse_captured: bool,
    last_frame: Instant,
    error: Option<LanternError>,
}

impl LanternApp {
    pub fn new(config: RenderConfig) -> Self {
        let mut scene = Scene::new(config.width, config.height, config.load_basic_shapes);
        scene.clear_color = config.clear_color;
        scene.camera_mut().set_speed(config.camera_speed);

        Self {
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                scene,
                phong: PhongRenderer::new(),
                controller: CameraController::new(ROTATE_SPEED, ZOOM_SPEED),
                callbacks: Box::new(NoCallbacks),
                water: None,
                sprite_request: None,
                sprites: None,
                mouse_captured: false,
                last_frame: Instant::now(),
                error: None,
            },
        }
    }

    pub fn with_callbacks(mut self, callbacks: impl GameCallbacks + 'static) -> Self {
        self.app_state.callbacks = Box::new(callbacks);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.app_state.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    pub fn set_water(&mut self, water: SimpleWater) {
        self.app_state.water = Some(water);
    }

    /// Draws every tile of a `sprites_x × sprites_y` sheet over the scene.
    ///
    /// The sheet is loaded once the window and device exist.
    pub fn set_sprite_sheet(&mut self, path: impl Into<PathBuf>, sprites_x: u32, sprites_y: u32) {
        self.app_state.sprite_request = Some(SpriteSheetRequest {
            path: path.into(),
            sprites_x,
            sprites_y,
        });
    }

    /// Runs the event loop until the window closes or a fatal error occurs.
    pub fn run(mut self) -> Result<()> {
        init_logging();

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: LanternError) {
        error!("{e}");
        self.error = Some(e);
        event_loop.exit();
    }

    fn load_sprite_sheet(&mut self, width: u32, height: u32) -> Result<()> {
        let (Some(request), Some(render_engine)) = (self.sprite_request.take(), self.render_engine.as_mut()) else {
            return Ok(());
        };

        // Tiles sit edge to edge in the sheet, so neither filtering nor
        // wrapping may pull in texels from a neighbouring tile.
        let options = SamplingOptions::default()
            .with_filter(wgpu::FilterMode::Nearest)
            .with_address_mode(wgpu::AddressMode::ClampToEdge);
        let textures = render_engine.textures_mut();
        let sheet = textures.load_texture_2d_with_options(&request.path, options)?;
        let image = textures.get(sheet)?;

        self.sprites = Some(SpriteBatch::new(
            sheet,
            image.width,
            image.height,
            request.sprites_x,
            request.sprites_y,
            width,
            height,
        ));
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, pressed: bool) {
        if self.callbacks.on_keyboard(key, pressed) || !pressed {
            return;
        }

        match key {
            KeyCode::Escape | KeyCode::KeyQ => event_loop.exit(),
            _ => {
                self.controller.process_key(key, self.scene.camera_mut());
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.scene.resize(width, height);
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(width, height);
        }
        if let Some(sprites) = self.sprites.as_mut() {
            sprites.resize(width, height);
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let elapsed: Duration = now - self.last_frame;
        self.last_frame = now;

        self.callbacks
            .on_frame(&mut self.scene, elapsed.as_millis() as u64);

        if let Some(water) = self.water.as_mut() {
            water.update(elapsed.as_secs_f32());
        }

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        let result = render_engine.render_frame(
            &self.scene,
            &mut self.phong,
            self.water.as_ref(),
            self.sprites.as_ref(),
        );

        match result {
            Ok(()) => {}
            Err(LanternError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                render_engine.reconfigure();
            }
            Err(LanternError::Surface(wgpu::SurfaceError::Timeout)) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(e) => self.fail(event_loop, e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height): (u32, u32) = window.inner_size().into();
        let mut config = self.config.clone();
        config.width = width.max(1);
        config.height = height.max(1);

        match pollster::block_on(RenderEngine::new(window, &config)) {
            Ok(render_engine) => self.render_engine = Some(render_engine),
            Err(e) => return self.fail(event_loop, e),
        }

        self.scene.resize(width, height);
        if let Err(e) = self.load_sprite_sheet(config.width, config.height) {
            return self.fail(event_loop, e);
        }

        info!("{} ready", self.config.title);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code, state == ElementState::Pressed),
            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                self.mouse_captured = self.callbacks.on_mouse_move(x, y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.callbacks
                    .on_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => self.resize(width, height),
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: winit::event::DeviceId, event: DeviceEvent) {
        if self.mouse_captured && matches!(event, DeviceEvent::MouseMotion { .. }) {
            return;
        }
        self.controller.process_events(&event, self.scene.camera_mut());
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
