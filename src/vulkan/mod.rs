//! # Vulkan bring-up
//!
//! A thin `ash` layer that walks through the classic Vulkan initialization
//! sequence once and keeps the resulting objects alive:
//!
//! 1. instance (with the debug messenger chained in)
//! 2. debug messenger
//! 3. window surface
//! 4. physical device selection
//! 5. logical device and queue
//! 6. swapchain and image views
//! 7. command pool
//!
//! ```no_run
//! use lantern::{config::VulkanConfig, vulkan::VulkanCore};
//! use winit::window::Window;
//!
//! # fn run(window: &Window) -> lantern::Result<()> {
//! let config = VulkanConfig::default().with_app_name("Tutorial").with_window_extent(1280, 720);
//! let core = VulkanCore::init(&config, Some(window))?;
//! let command_buffers = core.create_command_buffers(core.num_images()? as u32)?;
//! core.free_command_buffers(&command_buffers)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod debug;
pub mod physical_devices;
pub mod swapchain;

pub use self::core::VulkanCore;
pub use physical_devices::{score_device, PhysicalDevice, PhysicalDevices};
pub use swapchain::{choose_extent, choose_num_images, choose_present_mode, choose_surface_format, Swapchain};
