//! Surface management for windowed presentation.
//!
//! Wraps Vulkan surface creation and the per-surface support queries that
//! feed the capability selectors.

use crate::config::{SwapchainConfig, SwapchainPreferences};
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::swapchain::Swapchain;
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Surface context for windowed presentation.
pub struct SurfaceContext {
    /// The Vulkan surface handle.
    pub surface: vk::SurfaceKHR,
    /// Surface extension loader.
    pub surface_loader: ash::khr::surface::Instance,
    /// Swapchain extension loader.
    pub swapchain_loader: ash::khr::swapchain::Device,
}

impl SurfaceContext {
    /// Create a new surface context from a window.
    ///
    /// Fails with [`GpuError::SurfaceNotSupported`] when the context's
    /// graphics queue family cannot present to the new surface.
    ///
    /// # Safety
    /// The GPU context must be valid and the window must have valid handles.
    pub unsafe fn from_window<W>(gpu: &GpuContext, window: &W) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let display = window
            .display_handle()
            .map_err(|e| GpuError::SurfaceCreation(format!("Failed to get display handle: {e}")))?;
        let window_handle = window
            .window_handle()
            .map_err(|e| GpuError::SurfaceCreation(format!("Failed to get window handle: {e}")))?;

        let surface = ash_window::create_surface(
            &gpu.entry,
            gpu.instance(),
            display.as_raw(),
            window_handle.as_raw(),
            None,
        )
        .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let surface_loader = ash::khr::surface::Instance::new(&gpu.entry, gpu.instance());
        let swapchain_loader = ash::khr::swapchain::Device::new(gpu.instance(), gpu.device());

        let family = gpu.graphics_queue_family();
        let presentable = surface_loader.get_physical_device_surface_support(
            gpu.physical_device(),
            family,
            surface,
        )?;
        if !presentable {
            surface_loader.destroy_surface(surface, None);
            return Err(GpuError::SurfaceNotSupported(family));
        }

        Ok(Self {
            surface,
            surface_loader,
            swapchain_loader,
        })
    }

    /// Query what this surface currently supports.
    ///
    /// Surface capabilities change with the window, so this is queried
    /// fresh on every swapchain (re)creation and never cached.
    pub fn support(&self, gpu: &GpuContext) -> Result<SurfaceSupport> {
        unsafe {
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(gpu.physical_device(), self.surface)?;

            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(gpu.physical_device(), self.surface)?;

            let present_modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(gpu.physical_device(), self.surface)?;

            Ok(SurfaceSupport {
                capabilities,
                formats,
                present_modes,
            })
        }
    }

    /// Create a swapchain for this surface.
    ///
    /// Queries fresh support, resolves the configuration from `prefs`, and
    /// builds the swapchain.
    ///
    /// # Safety
    /// The GPU context must be valid.
    pub unsafe fn create_swapchain(
        &self,
        gpu: &GpuContext,
        prefs: &SwapchainPreferences,
        old_swapchain: Option<vk::SwapchainKHR>,
    ) -> Result<Swapchain> {
        let support = self.support(gpu)?;
        let config = SwapchainConfig::resolve(&support, prefs);

        Swapchain::new(
            gpu.device(),
            &self.swapchain_loader,
            self.surface,
            &config,
            old_swapchain,
            gpu.graphics_queue_family(),
        )
    }

    /// Recreate the swapchain, e.g. after a resize.
    ///
    /// # Safety
    /// The old swapchain must not be in use.
    pub unsafe fn recreate_swapchain(
        &self,
        gpu: &GpuContext,
        old_swapchain: &mut Swapchain,
        prefs: &SwapchainPreferences,
    ) -> Result<Swapchain> {
        old_swapchain.destroy(gpu.device(), &self.swapchain_loader);

        self.create_swapchain(gpu, prefs, None)
    }

    /// Destroy the surface.
    ///
    /// # Safety
    /// The surface must not be in use.
    pub unsafe fn destroy(&self) {
        self.surface_loader.destroy_surface(self.surface, None);
    }
}

/// Result of a surface support query.
pub struct SurfaceSupport {
    /// Raw surface capabilities.
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported surface formats.
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes.
    pub present_modes: Vec<vk::PresentModeKHR>,
}
