//! GPU context management.

use crate::capabilities::DeviceInfo;
use crate::error::{GpuError, Result};
use crate::instance::{create_instance, select_physical_device};
use ash::vk;
use std::ffi::CStr;

/// Main GPU context holding Vulkan resources.
///
/// Owns the instance, device, and the single graphics queue; every call
/// that needs a handle takes the context explicitly instead of reaching
/// for process-wide state.
pub struct GpuContext {
    // Entry must be kept alive for the lifetime of the context
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: ash::Device,
    pub(crate) device_info: DeviceInfo,
    pub(crate) memory_properties: vk::PhysicalDeviceMemoryProperties,

    pub(crate) graphics_queue_family: u32,
    pub(crate) graphics_queue: vk::Queue,
}

impl GpuContext {
    /// Get the Vulkan device handle.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// Get the physical device handle.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Get the Vulkan instance handle.
    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    /// Get information about the selected device.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Get the physical device's memory properties.
    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    /// Get the graphics queue.
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Get the graphics queue family index.
    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }

    /// Wait for the device to be idle.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle()?;
        }
        Ok(())
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

/// Builder for creating a GPU context.
pub struct GpuContextBuilder {
    app_name: String,
    enable_validation: bool,
}

impl Default for GpuContextBuilder {
    fn default() -> Self {
        Self {
            app_name: "Prism".to_string(),
            enable_validation: cfg!(debug_assertions),
        }
    }
}

impl GpuContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Enable or disable validation layers.
    pub fn validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
        self
    }

    /// Build the GPU context.
    pub fn build(self) -> Result<GpuContext> {
        let entry = unsafe { ash::Entry::load() }
            .map_err(|e| GpuError::Other(format!("Failed to load Vulkan: {e}")))?;

        let instance = unsafe { create_instance(&entry, &self.app_name, self.enable_validation) }?;

        let physical_device = unsafe { select_physical_device(&instance) }?;

        let device_info = unsafe { DeviceInfo::query(&instance, physical_device) };
        tracing::info!("Selected GPU: {}", device_info.summary());

        let memory_properties =
            unsafe { instance.get_physical_device_memory_properties(physical_device) };

        let graphics_queue_family =
            unsafe { find_graphics_queue_family(&instance, physical_device) }?;

        let (device, graphics_queue) =
            unsafe { create_device(&instance, physical_device, graphics_queue_family)? };

        Ok(GpuContext {
            entry,
            instance,
            physical_device,
            device,
            device_info,
            memory_properties,
            graphics_queue_family,
            graphics_queue,
        })
    }
}

/// Find the first queue family with graphics support.
///
/// # Safety
/// The instance and physical device must be valid.
unsafe fn find_graphics_queue_family(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<u32> {
    let queue_families = instance.get_physical_device_queue_family_properties(physical_device);

    queue_families
        .iter()
        .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|i| i as u32)
        .ok_or(GpuError::NoSuitableDevice)
}

/// Required device extensions.
fn required_device_extensions() -> Vec<&'static CStr> {
    vec![ash::khr::swapchain::NAME]
}

/// Create the logical device and retrieve the graphics queue.
///
/// # Safety
/// The instance and physical device must be valid.
unsafe fn create_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    graphics_queue_family: u32,
) -> Result<(ash::Device, vk::Queue)> {
    let queue_priority = 1.0_f32;
    let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(graphics_queue_family)
        .queue_priorities(std::slice::from_ref(&queue_priority))];

    let extensions = required_device_extensions();
    let extension_names: Vec<*const i8> = extensions.iter().map(|ext| ext.as_ptr()).collect();

    let features = vk::PhysicalDeviceFeatures::default();

    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&extension_names)
        .enabled_features(&features);

    let device = instance
        .create_device(physical_device, &device_create_info, None)
        .map_err(GpuError::from)?;

    let graphics_queue = device.get_device_queue(graphics_queue_family, 0);

    Ok((device, graphics_queue))
}
