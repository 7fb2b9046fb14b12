//! One-time Vulkan bring-up: instance, debug messenger, surface, device,
//! swapchain and command pool.

use std::ffi::{c_char, CString};

use ash::{khr::surface, vk, Device, Entry, Instance};
use log::{info, warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use super::{
    debug::{self, DebugMessenger},
    physical_devices::{PhysicalDevice, PhysicalDevices},
    swapchain::Swapchain,
};
use crate::{
    config::VulkanConfig,
    error::{LanternError, Result},
};

const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";
const SHADER_DRAW_PARAMETERS: &std::ffi::CStr = c"VK_KHR_shader_draw_parameters";

/// Window-dependent objects, created only when `init` is given a window.
struct Presentation {
    surface_loader: surface::Instance,
    surface: vk::SurfaceKHR,
    physical_devices: PhysicalDevices,
    queue_family: u32,
    device: Option<Device>,
    queue: vk::Queue,
    swapchain: Option<Swapchain>,
    command_pool: vk::CommandPool,
}

/// Owns the Vulkan objects needed to start recording commands for a window.
///
/// Objects are created in dependency order and destroyed in reverse on drop.
pub struct VulkanCore {
    entry: Entry,
    instance: Instance,
    debug_messenger: Option<DebugMessenger>,
    presentation: Option<Presentation>,
}

impl VulkanCore {
    /// Runs the bring-up sequence.
    ///
    /// Without a window only the instance and debug messenger are created.
    pub fn init<W>(config: &VulkanConfig, window: Option<&W>) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let entry = unsafe { Entry::load()? };

        let display_handle = match window {
            Some(window) => Some(window.display_handle()?.as_raw()),
            None => None,
        };
        let instance = create_instance(&entry, config, display_handle)?;

        let mut core = Self {
            entry,
            instance,
            debug_messenger: None,
            presentation: None,
        };

        core.debug_messenger = Some(DebugMessenger::new(&core.entry, &core.instance)?);

        let Some(window) = window else {
            info!("No window given, stopping after the instance and debug messenger");
            return Ok(core);
        };

        core.create_presentation(window, config.window_extent)?;
        Ok(core)
    }

    fn create_presentation<W>(&mut self, window: &W, window_extent: (u32, u32)) -> Result<()>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let surface_loader = surface::Instance::new(&self.entry, &self.instance);
        let surface = unsafe {
            ash_window::create_surface(
                &self.entry,
                &self.instance,
                window.display_handle()?.as_raw(),
                window.window_handle()?.as_raw(),
                None,
            )?
        };
        info!("Window surface created");

        // Stored right away so a later failure still releases the surface.
        let presentation = self.presentation.insert(Presentation {
            surface_loader,
            surface,
            physical_devices: PhysicalDevices::default(),
            queue_family: 0,
            device: None,
            queue: vk::Queue::null(),
            swapchain: None,
            command_pool: vk::CommandPool::null(),
        });

        presentation.physical_devices = unsafe {
            PhysicalDevices::enumerate(&self.instance, &presentation.surface_loader, presentation.surface)?
        };
        presentation.queue_family = presentation
            .physical_devices
            .select_device(vk::QueueFlags::GRAPHICS, true)?;

        let selected = presentation.physical_devices.selected()?;
        let device = create_device(&self.instance, selected, presentation.queue_family)?;
        presentation.queue = unsafe { device.get_device_queue(presentation.queue_family, 0) };
        let device = presentation.device.insert(device);

        let selected = presentation.physical_devices.selected()?;
        presentation.swapchain = Some(Swapchain::new(
            &self.instance,
            device,
            presentation.surface,
            selected,
            presentation.queue_family,
            window_extent,
        )?);

        let pool_info = vk::CommandPoolCreateInfo::default().queue_family_index(presentation.queue_family);
        presentation.command_pool = unsafe { device.create_command_pool(&pool_info, None)? };
        info!("Command buffer pool created");

        Ok(())
    }

    fn presentation(&self) -> Result<&Presentation> {
        self.presentation
            .as_ref()
            .ok_or(LanternError::NotInitialized("surface"))
    }

    fn swapchain(&self) -> Result<&Swapchain> {
        self.presentation()?
            .swapchain
            .as_ref()
            .ok_or(LanternError::NotInitialized("swapchain"))
    }

    /// Allocates `count` primary command buffers from the core's pool.
    pub fn create_command_buffers(&self, count: u32) -> Result<Vec<vk::CommandBuffer>> {
        let presentation = self.presentation()?;
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(presentation.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        let buffers = unsafe { self.device()?.allocate_command_buffers(&allocate_info)? };
        info!("{count} command buffers created");
        Ok(buffers)
    }

    pub fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) -> Result<()> {
        let presentation = self.presentation()?;
        unsafe {
            self.device()?
                .free_command_buffers(presentation.command_pool, buffers)
        };
        Ok(())
    }

    pub fn num_images(&self) -> Result<usize> {
        Ok(self.swapchain()?.num_images())
    }

    pub fn image(&self, index: usize) -> Result<vk::Image> {
        self.swapchain()?
            .image(index)
            .ok_or(LanternError::NotInitialized("swapchain image"))
    }

    pub fn image_view(&self, index: usize) -> Result<vk::ImageView> {
        self.swapchain()?
            .image_view(index)
            .ok_or(LanternError::NotInitialized("swapchain image view"))
    }

    pub fn surface_format(&self) -> Result<vk::SurfaceFormatKHR> {
        Ok(self.swapchain()?.surface_format())
    }

    pub fn extent(&self) -> Result<vk::Extent2D> {
        Ok(self.swapchain()?.extent())
    }

    pub fn queue(&self) -> Result<vk::Queue> {
        Ok(self.presentation()?.queue)
    }

    pub fn queue_family(&self) -> Result<u32> {
        Ok(self.presentation()?.queue_family)
    }

    pub fn physical_device(&self) -> Result<&PhysicalDevice> {
        self.presentation()?.physical_devices.selected()
    }

    pub fn device(&self) -> Result<&Device> {
        self.presentation()?
            .device
            .as_ref()
            .ok_or(LanternError::NotInitialized("device"))
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for VulkanCore {
    fn drop(&mut self) {
        unsafe {
            if let Some(presentation) = self.presentation.take() {
                if let Some(device) = &presentation.device {
                    if let Err(e) = device.device_wait_idle() {
                        warn!("device_wait_idle failed during shutdown: {e}");
                    }
                    if presentation.command_pool != vk::CommandPool::null() {
                        device.destroy_command_pool(presentation.command_pool, None);
                    }
                    if let Some(swapchain) = &presentation.swapchain {
                        swapchain.destroy(device);
                    }
                    device.destroy_device(None);
                }
                presentation
                    .surface_loader
                    .destroy_surface(presentation.surface, None);
                info!("Window surface destroyed");
            }

            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }

            self.instance.destroy_instance(None);
            info!("Vulkan instance destroyed");
        }
    }
}

fn create_instance(
    entry: &Entry,
    config: &VulkanConfig,
    display_handle: Option<raw_window_handle::RawDisplayHandle>,
) -> Result<Instance> {
    let app_name = CString::new(config.app_name.as_str()).unwrap_or_default();
    let engine_name = CString::new(config.engine_name.as_str()).unwrap_or_default();

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 1, 0, 0))
        .api_version(vk::API_VERSION_1_0);

    let mut extensions: Vec<*const c_char> = match display_handle {
        Some(display_handle) => ash_window::enumerate_required_extensions(display_handle)?.to_vec(),
        None => Vec::new(),
    };
    extensions.push(ash::ext::debug_utils::NAME.as_ptr());

    let layers: Vec<*const c_char> = if config.enable_validation {
        vec![VALIDATION_LAYER.as_ptr()]
    } else {
        Vec::new()
    };

    // Chained so instance creation and destruction are covered by the callback.
    let mut messenger_info = debug::messenger_create_info();
    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&layers)
        .enabled_extension_names(&extensions)
        .push_next(&mut messenger_info);

    let instance = unsafe { entry.create_instance(&create_info, None)? };
    info!(
        "Vulkan instance created ({} extensions, validation {})",
        extensions.len(),
        if config.enable_validation { "on" } else { "off" }
    );
    Ok(instance)
}

fn create_device(instance: &Instance, physical_device: &PhysicalDevice, queue_family: u32) -> Result<Device> {
    let priorities = [1.0f32];
    let queue_infos = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(queue_family)
        .queue_priorities(&priorities)];

    let extensions = [ash::khr::swapchain::NAME.as_ptr(), SHADER_DRAW_PARAMETERS.as_ptr()];

    let supported = &physical_device.features;
    let features = vk::PhysicalDeviceFeatures::default()
        .geometry_shader(debug::report_missing_feature("geometry shader", supported.geometry_shader))
        .tessellation_shader(debug::report_missing_feature(
            "tessellation shader",
            supported.tessellation_shader,
        ));

    let create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_infos)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = unsafe { instance.create_device(physical_device.handle, &create_info, None)? };
    info!("Device created");
    Ok(device)
}
