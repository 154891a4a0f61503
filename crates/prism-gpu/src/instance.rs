//! Vulkan instance creation and physical device selection.

use crate::error::{GpuError, Result};
use ash::vk;
use std::ffi::{CStr, CString};

/// Required instance extensions for windowed presentation.
pub fn required_instance_extensions() -> Vec<&'static CStr> {
    let extensions = vec![
        ash::khr::surface::NAME,
        #[cfg(target_os = "windows")]
        ash::khr::win32_surface::NAME,
        #[cfg(target_os = "linux")]
        ash::khr::xlib_surface::NAME,
        #[cfg(target_os = "linux")]
        ash::khr::wayland_surface::NAME,
        #[cfg(target_os = "macos")]
        ash::ext::metal_surface::NAME,
        #[cfg(target_os = "macos")]
        ash::khr::portability_enumeration::NAME,
    ];

    extensions
}

/// Validation layers to enable in debug builds.
pub fn validation_layers() -> Vec<&'static CStr> {
    vec![c"VK_LAYER_KHRONOS_validation"]
}

/// Create a Vulkan instance.
///
/// # Safety
/// The entry must be a valid Vulkan entry point.
pub unsafe fn create_instance(
    entry: &ash::Entry,
    app_name: &str,
    enable_validation: bool,
) -> Result<ash::Instance> {
    let app_name = CString::new(app_name)
        .map_err(|e| GpuError::Other(format!("Invalid application name: {e}")))?;
    let engine_name = CString::new("Prism")
        .map_err(|e| GpuError::Other(format!("Invalid engine name: {e}")))?;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 0, 1, 0))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_1);

    let extension_names: Vec<*const i8> = required_instance_extensions()
        .iter()
        .map(|ext| ext.as_ptr())
        .collect();

    let layers = if enable_validation {
        validation_layers()
    } else {
        vec![]
    };

    // Warn rather than fail when a requested layer is missing; the loader
    // would otherwise reject instance creation outright.
    let available_layers = entry.enumerate_instance_layer_properties()?;
    let layers: Vec<&CStr> = layers
        .into_iter()
        .filter(|layer| {
            let found = available_layers
                .iter()
                .any(|props| CStr::from_ptr(props.layer_name.as_ptr()) == *layer);
            if !found {
                tracing::warn!("Validation layer {:?} not available", layer);
            }
            found
        })
        .collect();

    let layer_names: Vec<*const i8> = layers.iter().map(|l| l.as_ptr()).collect();

    // Required for MoltenVK on macOS
    #[cfg(target_os = "macos")]
    let create_flags = vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
    #[cfg(not(target_os = "macos"))]
    let create_flags = vk::InstanceCreateFlags::empty();

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extension_names)
        .enabled_layer_names(&layer_names)
        .flags(create_flags);

    let instance = entry.create_instance(&create_info, None)?;

    Ok(instance)
}

/// Select the best physical device for presentation.
///
/// # Safety
/// The instance must be valid.
pub unsafe fn select_physical_device(instance: &ash::Instance) -> Result<vk::PhysicalDevice> {
    let devices = instance.enumerate_physical_devices()?;

    if devices.is_empty() {
        return Err(GpuError::NoSuitableDevice);
    }

    let mut best_device = None;
    let mut best_score = 0i64;

    for device in devices {
        let score = score_physical_device(instance, device);
        if score > best_score {
            best_score = score;
            best_device = Some(device);
        }
    }

    best_device.ok_or(GpuError::NoSuitableDevice)
}

/// Score a physical device for selection.
///
/// Devices without the swapchain extension are disqualified outright.
unsafe fn score_physical_device(instance: &ash::Instance, device: vk::PhysicalDevice) -> i64 {
    if !supports_swapchain_extension(instance, device) {
        return -1;
    }

    let properties = instance.get_physical_device_properties(device);

    let mut score = 1;

    // Prefer discrete GPUs
    match properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => score += 1000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => score += 100,
        vk::PhysicalDeviceType::VIRTUAL_GPU => score += 50,
        _ => {}
    }

    // Prefer more VRAM, +1 per GiB
    let memory = instance.get_physical_device_memory_properties(device);
    let vram_mb: u64 = memory
        .memory_heaps
        .iter()
        .take(memory.memory_heap_count as usize)
        .filter(|h| h.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
        .map(|h| h.size / (1024 * 1024))
        .sum();
    score += (vram_mb / 1024) as i64;

    score
}

/// Check whether a physical device offers `VK_KHR_swapchain`.
unsafe fn supports_swapchain_extension(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
) -> bool {
    instance
        .enumerate_device_extension_properties(device)
        .unwrap_or_default()
        .iter()
        .any(|ext| CStr::from_ptr(ext.extension_name.as_ptr()) == ash::khr::swapchain::NAME)
}
