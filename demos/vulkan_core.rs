//! # Vulkan Core
//!
//! Walks through the Vulkan bring-up sequence for a window, allocates one
//! command buffer per swapchain image and exits.
//!
//! ## Usage:
//! ```bash
//! cargo run --example vulkan_core
//! cargo run --example vulkan_core -- --headless
//! ```
//!
//! `--headless` stops after the instance and debug messenger, which works
//! on machines without a display.

use lantern::{vulkan::VulkanCore, VulkanConfig};
use log::info;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

#[derive(Default)]
struct BringUp {
    result: Option<lantern::Result<()>>,
}

fn bring_up(window: &Window) -> lantern::Result<()> {
    let (width, height): (u32, u32) = window.inner_size().into();
    let config = VulkanConfig::default()
        .with_app_name("Lantern Vulkan Core")
        .with_window_extent(width, height);

    let core = VulkanCore::init(&config, Some(window))?;
    let device = core.physical_device()?;
    let format = core.surface_format()?;
    info!(
        "{}: {} swapchain images, format {:?}, queue family {}",
        device.name(),
        core.num_images()?,
        format.format,
        core.queue_family()?
    );

    let command_buffers = core.create_command_buffers(core.num_images()? as u32)?;
    core.free_command_buffers(&command_buffers)?;
    Ok(())
}

impl ApplicationHandler for BringUp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = WindowAttributes::default()
            .with_title("Lantern Vulkan Core")
            .with_inner_size(PhysicalSize::new(WIDTH, HEIGHT));

        self.result = Some(match event_loop.create_window(attributes) {
            Ok(window) => bring_up(&window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                Ok(())
            }
        });
        event_loop.exit();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }
}

fn main() -> anyhow::Result<()> {
    lantern::init_logging();

    if std::env::args().any(|arg| arg == "--headless") {
        let config = VulkanConfig::default().with_app_name("Lantern Vulkan Core");
        let _core = VulkanCore::init::<Window>(&config, None)?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut bring_up = BringUp::default();
    event_loop.run_app(&mut bring_up)?;

    if let Some(result) = bring_up.result {
        result?;
    }
    Ok(())
}
