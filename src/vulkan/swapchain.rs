//! Swapchain creation and the choices it depends on.

use ash::{khr::swapchain, vk, Device, Instance};
use log::info;

use super::physical_devices::PhysicalDevice;
use crate::error::{LanternError, Result};

/// MAILBOX when available, otherwise FIFO, which every driver supports.
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// One image more than the minimum, capped by the maximum when the surface has one.
pub fn choose_num_images(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let requested = caps.min_image_count + 1;
    if caps.max_image_count > 0 && requested > caps.max_image_count {
        caps.max_image_count
    } else {
        requested
    }
}

pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|format| {
            format.format == vk::Format::B8G8R8A8_SRGB
                && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
        .ok_or(LanternError::NoSurfaceFormats)
}

/// The surface's current extent, or the window size clamped to the
/// supported range when the surface reports the `u32::MAX` sentinel.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, width: u32, height: u32) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }

    vk::Extent2D {
        width: width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// Swapchain handle plus its images and their color views.
pub struct Swapchain {
    loader: swapchain::Device,
    handle: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

impl Swapchain {
    pub fn new(
        instance: &Instance,
        device: &Device,
        surface: vk::SurfaceKHR,
        physical_device: &PhysicalDevice,
        queue_family: u32,
        window_extent: (u32, u32),
    ) -> Result<Self> {
        let caps = &physical_device.surface_caps;
        let num_images = choose_num_images(caps);
        let present_mode = choose_present_mode(&physical_device.present_modes);
        let surface_format = choose_surface_format(&physical_device.surface_formats)?;
        let extent = choose_extent(caps, window_extent.0, window_extent.1);
        let queue_families = [queue_family];

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(num_images)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .queue_family_indices(&queue_families)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        let loader = swapchain::Device::new(instance, device);
        let handle = unsafe { loader.create_swapchain(&create_info, None)? };
        info!("Swap chain created ({}x{}, {:?})", extent.width, extent.height, present_mode);

        let images = match unsafe { loader.get_swapchain_images(handle) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { loader.destroy_swapchain(handle, None) };
                return Err(e.into());
            }
        };
        info!("Requested {} images, created {} images", num_images, images.len());

        let mut swapchain = Self {
            loader,
            handle,
            images: Vec::new(),
            image_views: Vec::with_capacity(images.len()),
            surface_format,
            extent,
        };

        for &image in &images {
            match create_image_view(device, image, surface_format.format) {
                Ok(view) => swapchain.image_views.push(view),
                Err(e) => {
                    unsafe { swapchain.destroy(device) };
                    return Err(e);
                }
            }
        }
        swapchain.images = images;

        Ok(swapchain)
    }

    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    pub fn image(&self, index: usize) -> Option<vk::Image> {
        self.images.get(index).copied()
    }

    pub fn image_view(&self, index: usize) -> Option<vk::ImageView> {
        self.image_views.get(index).copied()
    }

    pub fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.surface_format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn handle(&self) -> vk::SwapchainKHR {
        self.handle
    }

    /// Destroys the image views, then the swapchain.
    ///
    /// # Safety
    /// `device` must be the device the swapchain was created with, and none
    /// of its images may still be in use.
    pub unsafe fn destroy(&self, device: &Device) {
        unsafe {
            for &view in &self.image_views {
                device.destroy_image_view(view, None);
            }
            self.loader.destroy_swapchain(self.handle, None);
        }
    }
}

fn create_image_view(device: &Device, image: vk::Image, format: vk::Format) -> Result<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::default()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    Ok(unsafe { device.create_image_view(&create_info, None)? })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_choose_present_mode() {
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::IMMEDIATE]),
            vk::PresentModeKHR::FIFO
        );
        assert_eq!(choose_present_mode(&[]), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn test_choose_num_images() {
        assert_eq!(choose_num_images(&caps(2, 8)), 3);
        assert_eq!(choose_num_images(&caps(3, 3)), 3);
        // A max of zero means no limit.
        assert_eq!(choose_num_images(&caps(4, 0)), 5);
    }

    #[test]
    fn test_choose_surface_format() {
        let unorm = vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let srgb = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let srgb_other_space = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        };

        let chosen = choose_surface_format(&[unorm, srgb]).unwrap();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);

        let fallback = choose_surface_format(&[srgb_other_space, unorm]).unwrap();
        assert_eq!(fallback.color_space, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);
        assert!(matches!(choose_surface_format(&[]), Err(LanternError::NoSurfaceFormats)));
    }

    #[test]
    fn test_choose_extent() {
        let mut surface_caps = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D { width: 1024, height: 768 },
            min_image_extent: vk::Extent2D { width: 16, height: 16 },
            max_image_extent: vk::Extent2D { width: 4096, height: 2048 },
            ..Default::default()
        };
        assert_eq!(
            choose_extent(&surface_caps, 800, 600),
            vk::Extent2D { width: 1024, height: 768 }
        );

        surface_caps.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        assert_eq!(
            choose_extent(&surface_caps, 800, 600),
            vk::Extent2D { width: 800, height: 600 }
        );
        assert_eq!(
            choose_extent(&surface_caps, 8000, 4),
            vk::Extent2D { width: 4096, height: 16 }
        );
    }
}
