//! Physical device enumeration and selection.

use std::ffi::CStr;

use ash::{khr::surface, vk, Instance};
use log::{debug, info};

use crate::error::{LanternError, Result};

const SCORE_DISCRETE_GPU: u64 = 10_000;
const SCORE_INTEGRATED_GPU: u64 = 1_000;
const SCORE_VIRTUAL_GPU: u64 = 500;
const SCORE_CPU: u64 = 100;
const SCORE_OTHER: u64 = 10;

const GIB: u64 = 1024 * 1024 * 1024;

/// Everything queried about one GPU and its support for the window surface.
#[derive(Debug, Clone)]
pub struct PhysicalDevice {
    pub handle: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    /// Present support per queue family, same indexing as `queue_families`.
    pub supports_present: Vec<bool>,
    pub surface_caps: vk::SurfaceCapabilitiesKHR,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl PhysicalDevice {
    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    /// First queue family whose flags include `flags` and whose present
    /// support equals `supports_present`.
    pub fn find_queue_family(&self, flags: vk::QueueFlags, supports_present: bool) -> Option<u32> {
        self.queue_families
            .iter()
            .zip(&self.supports_present)
            .position(|(family, &present)| family.queue_flags.contains(flags) && present == supports_present)
            .map(|index| index as u32)
    }

    pub fn score(&self) -> u64 {
        score_device(&self.properties, &self.memory_properties)
    }

    fn log_info(&self) {
        let api = self.properties.api_version;
        info!(
            "Device name: {} ({:?}), API {}.{}.{}",
            self.name(),
            self.properties.device_type,
            vk::api_version_major(api),
            vk::api_version_minor(api),
            vk::api_version_patch(api)
        );
        for (index, family) in self.queue_families.iter().enumerate() {
            debug!(
                "  Family {index} num queues: {} flags: {:?} present: {}",
                family.queue_count, family.queue_flags, self.supports_present[index]
            );
        }
        debug!(
            "  {} surface formats, {} present modes, {} memory types",
            self.surface_formats.len(),
            self.present_modes.len(),
            self.memory_properties.memory_type_count
        );
    }
}

/// Ranks a device: discrete > integrated > virtual > CPU > other, plus one
/// point per GiB of device-local memory.
pub fn score_device(
    properties: &vk::PhysicalDeviceProperties,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
) -> u64 {
    let type_score = match properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => SCORE_DISCRETE_GPU,
        vk::PhysicalDeviceType::INTEGRATED_GPU => SCORE_INTEGRATED_GPU,
        vk::PhysicalDeviceType::VIRTUAL_GPU => SCORE_VIRTUAL_GPU,
        vk::PhysicalDeviceType::CPU => SCORE_CPU,
        _ => SCORE_OTHER,
    };

    let heap_count = (memory_properties.memory_heap_count as usize).min(vk::MAX_MEMORY_HEAPS);
    let device_local: u64 = memory_properties.memory_heaps[..heap_count]
        .iter()
        .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
        .map(|heap| heap.size)
        .sum();

    type_score + device_local / GIB
}

/// All physical devices of an instance and the one selected for rendering.
#[derive(Debug, Default)]
pub struct PhysicalDevices {
    devices: Vec<PhysicalDevice>,
    selected: Option<usize>,
}

impl PhysicalDevices {
    /// Queries every physical device's properties and its support for `surface`.
    ///
    /// # Safety
    /// `surface` must be a live surface created from `instance`.
    pub unsafe fn enumerate(
        instance: &Instance,
        surface_loader: &surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<Self> {
        let handles = unsafe { instance.enumerate_physical_devices()? };
        info!("Num physical devices {}", handles.len());

        let mut devices = Vec::with_capacity(handles.len());
        for handle in handles {
            let queue_families = unsafe { instance.get_physical_device_queue_family_properties(handle) };
            let supports_present = (0..queue_families.len() as u32)
                .map(|index| unsafe {
                    surface_loader.get_physical_device_surface_support(handle, index, surface)
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let device = unsafe {
                PhysicalDevice {
                    handle,
                    properties: instance.get_physical_device_properties(handle),
                    features: instance.get_physical_device_features(handle),
                    memory_properties: instance.get_physical_device_memory_properties(handle),
                    queue_families,
                    supports_present,
                    surface_caps: surface_loader.get_physical_device_surface_capabilities(handle, surface)?,
                    surface_formats: surface_loader.get_physical_device_surface_formats(handle, surface)?,
                    present_modes: surface_loader.get_physical_device_surface_present_modes(handle, surface)?,
                }
            };
            device.log_info();
            devices.push(device);
        }

        Ok(Self::from_devices(devices))
    }

    pub fn from_devices(devices: Vec<PhysicalDevice>) -> Self {
        Self {
            devices,
            selected: None,
        }
    }

    pub fn devices(&self) -> &[PhysicalDevice] {
        &self.devices
    }

    /// Selects the best-scored device with a matching queue family and
    /// returns that family's index.
    pub fn select_device(&mut self, flags: vk::QueueFlags, supports_present: bool) -> Result<u32> {
        let (index, family) = self
            .devices
            .iter()
            .enumerate()
            .filter_map(|(index, device)| {
                device
                    .find_queue_family(flags, supports_present)
                    .map(|family| (index, family))
            })
            .max_by_key(|(index, _)| self.devices[*index].score())
            .ok_or_else(|| LanternError::NoSuitableDevice(format!("{flags:?}")))?;

        self.selected = Some(index);
        info!(
            "Using GFX device {} ({}) and queue family {family}",
            index,
            self.devices[index].name()
        );
        Ok(family)
    }

    pub fn selected(&self) -> Result<&PhysicalDevice> {
        self.selected
            .and_then(|index| self.devices.get(index))
            .ok_or(LanternError::NotInitialized("physical device"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn device(
        raw: u64,
        device_type: vk::PhysicalDeviceType,
        local_gib: u64,
        families: &[(vk::QueueFlags, bool)],
    ) -> PhysicalDevice {
        let mut memory_properties = vk::PhysicalDeviceMemoryProperties::default();
        memory_properties.memory_heap_count = 2;
        memory_properties.memory_heaps[0] = vk::MemoryHeap {
            size: local_gib * GIB,
            flags: vk::MemoryHeapFlags::DEVICE_LOCAL,
        };
        memory_properties.memory_heaps[1] = vk::MemoryHeap {
            size: 64 * GIB,
            flags: vk::MemoryHeapFlags::empty(),
        };

        PhysicalDevice {
            handle: vk::PhysicalDevice::from_raw(raw),
            properties: vk::PhysicalDeviceProperties {
                device_type,
                ..Default::default()
            },
            features: vk::PhysicalDeviceFeatures::default(),
            memory_properties,
            queue_families: families
                .iter()
                .map(|(flags, _)| vk::QueueFamilyProperties {
                    queue_flags: *flags,
                    queue_count: 1,
                    ..Default::default()
                })
                .collect(),
            supports_present: families.iter().map(|(_, present)| *present).collect(),
            surface_caps: vk::SurfaceCapabilitiesKHR::default(),
            surface_formats: Vec::new(),
            present_modes: Vec::new(),
        }
    }

    #[test]
    fn test_score_orders_device_types() {
        let graphics = [(vk::QueueFlags::GRAPHICS, true)];
        let discrete = device(1, vk::PhysicalDeviceType::DISCRETE_GPU, 0, &graphics);
        let integrated = device(2, vk::PhysicalDeviceType::INTEGRATED_GPU, 8, &graphics);
        let virtual_gpu = device(3, vk::PhysicalDeviceType::VIRTUAL_GPU, 0, &graphics);
        let cpu = device(4, vk::PhysicalDeviceType::CPU, 0, &graphics);
        let other = device(5, vk::PhysicalDeviceType::OTHER, 0, &graphics);

        assert!(discrete.score() > integrated.score());
        assert!(integrated.score() > virtual_gpu.score());
        assert!(virtual_gpu.score() > cpu.score());
        assert!(cpu.score() > other.score());
    }

    #[test]
    fn test_score_counts_device_local_gib_only() {
        let graphics = [(vk::QueueFlags::GRAPHICS, true)];
        let small = device(1, vk::PhysicalDeviceType::DISCRETE_GPU, 4, &graphics);
        let large = device(2, vk::PhysicalDeviceType::DISCRETE_GPU, 12, &graphics);

        assert_eq!(small.score(), SCORE_DISCRETE_GPU + 4);
        assert_eq!(large.score(), SCORE_DISCRETE_GPU + 12);
    }

    #[test]
    fn test_find_queue_family_matches_present_support() {
        let gpu = device(
            1,
            vk::PhysicalDeviceType::DISCRETE_GPU,
            8,
            &[
                (vk::QueueFlags::TRANSFER, true),
                (vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, false),
                (vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, true),
            ],
        );

        assert_eq!(gpu.find_queue_family(vk::QueueFlags::GRAPHICS, true), Some(2));
        assert_eq!(gpu.find_queue_family(vk::QueueFlags::GRAPHICS, false), Some(1));
        assert_eq!(gpu.find_queue_family(vk::QueueFlags::COMPUTE, true), None);
    }

    #[test]
    fn test_select_device_prefers_best_score() {
        let mut devices = PhysicalDevices::from_devices(vec![
            device(1, vk::PhysicalDeviceType::INTEGRATED_GPU, 2, &[(vk::QueueFlags::GRAPHICS, true)]),
            device(
                2,
                vk::PhysicalDeviceType::DISCRETE_GPU,
                8,
                &[(vk::QueueFlags::COMPUTE, true), (vk::QueueFlags::GRAPHICS, true)],
            ),
            // Best score but cannot present.
            device(3, vk::PhysicalDeviceType::DISCRETE_GPU, 24, &[(vk::QueueFlags::GRAPHICS, false)]),
        ]);

        assert!(devices.selected().is_err());
        let family = devices.select_device(vk::QueueFlags::GRAPHICS, true).unwrap();

        assert_eq!(family, 1);
        assert_eq!(devices.selected().unwrap().handle.as_raw(), 2);
    }

    #[test]
    fn test_select_device_without_match() {
        let mut devices = PhysicalDevices::from_devices(vec![device(
            1,
            vk::PhysicalDeviceType::DISCRETE_GPU,
            8,
            &[(vk::QueueFlags::TRANSFER, true)],
        )]);

        let result = devices.select_device(vk::QueueFlags::GRAPHICS, true);
        assert!(matches!(result, Err(LanternError::NoSuitableDevice(_))));
        assert!(devices.selected().is_err());
    }
}
