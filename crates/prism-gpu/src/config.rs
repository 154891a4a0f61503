//! Swapchain configuration resolution.
//!
//! Runs every surface-level selector against a freshly queried
//! [`SurfaceSupport`] and bundles the chosen values into the parameters a
//! swapchain is created from.

use crate::select::{
    select_image_count, select_image_extent, select_image_usage, select_present_mode,
    select_surface_format, select_surface_transform,
};
use crate::surface::SurfaceSupport;
use ash::vk;

/// Caller preferences for swapchain creation.
///
/// Every field is a request, not a guarantee; the resolved
/// [`SwapchainConfig`] holds what the surface actually grants.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainPreferences {
    /// Desired surface format and color space.
    pub format: vk::SurfaceFormatKHR,
    /// Desired presentation mode.
    pub present_mode: vk::PresentModeKHR,
    /// Desired image extent, used only when the surface lets the
    /// application choose.
    pub extent: vk::Extent2D,
    /// Desired image usage flags.
    pub usage: vk::ImageUsageFlags,
    /// Desired pre-transform.
    pub transform: vk::SurfaceTransformFlagsKHR,
}

impl Default for SwapchainPreferences {
    fn default() -> Self {
        Self {
            format: vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            present_mode: vk::PresentModeKHR::MAILBOX,
            extent: vk::Extent2D {
                width: 1280,
                height: 720,
            },
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        }
    }
}

impl SwapchainPreferences {
    /// Set the desired image extent.
    #[must_use]
    pub const fn with_extent(mut self, width: u32, height: u32) -> Self {
        self.extent = vk::Extent2D { width, height };
        self
    }

    /// Set the desired presentation mode.
    #[must_use]
    pub const fn with_present_mode(mut self, mode: vk::PresentModeKHR) -> Self {
        self.present_mode = mode;
        self
    }
}

/// Fully resolved swapchain configuration.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainConfig {
    /// Number of swapchain images.
    pub image_count: u32,
    /// Chosen surface format and color space.
    pub format: vk::SurfaceFormatKHR,
    /// Chosen image extent.
    pub extent: vk::Extent2D,
    /// Granted image usage flags.
    pub usage: vk::ImageUsageFlags,
    /// Chosen pre-transform.
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    /// Chosen presentation mode.
    pub present_mode: vk::PresentModeKHR,
}

impl SwapchainConfig {
    /// Resolve a configuration from surface support and caller preferences.
    ///
    /// Pure apart from logging; the support record must be freshly queried,
    /// surface capabilities go stale whenever the window is resized.
    #[must_use]
    pub fn resolve(support: &SurfaceSupport, prefs: &SwapchainPreferences) -> Self {
        let caps = &support.capabilities;

        let config = Self {
            image_count: select_image_count(caps),
            format: select_surface_format(&support.formats, prefs.format),
            extent: select_image_extent(caps, prefs.extent),
            usage: select_image_usage(caps, prefs.usage),
            pre_transform: select_surface_transform(caps, prefs.transform),
            present_mode: select_present_mode(&support.present_modes, prefs.present_mode),
        };

        tracing::debug!(
            image_count = config.image_count,
            format = ?config.format.format,
            color_space = ?config.format.color_space,
            width = config.extent.width,
            height = config.extent.height,
            usage = ?config.usage,
            pre_transform = ?config.pre_transform,
            present_mode = ?config.present_mode,
            "Resolved swapchain configuration"
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn support() -> SurfaceSupport {
        SurfaceSupport {
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: vk::Extent2D {
                    width: 640,
                    height: 480,
                },
                min_image_extent: vk::Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                supported_usage_flags: vk::ImageUsageFlags::COLOR_ATTACHMENT,
                supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                ..Default::default()
            },
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
        }
    }

    #[test]
    fn default_preferences_match_historic_caller() {
        let prefs = SwapchainPreferences::default();
        assert_eq!(prefs.format.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(prefs.format.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        assert_eq!(prefs.present_mode, vk::PresentModeKHR::MAILBOX);
        assert_eq!(prefs.usage, vk::ImageUsageFlags::COLOR_ATTACHMENT);
        assert_eq!(prefs.transform, vk::SurfaceTransformFlagsKHR::IDENTITY);
    }

    #[test]
    fn resolve_composes_all_selections() {
        let config = SwapchainConfig::resolve(&support(), &SwapchainPreferences::default());

        assert_eq!(config.image_count, 3);
        assert_eq!(config.format.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(config.extent.width, 640);
        assert_eq!(config.extent.height, 480);
        assert_eq!(config.usage, vk::ImageUsageFlags::COLOR_ATTACHMENT);
        assert_eq!(config.pre_transform, vk::SurfaceTransformFlagsKHR::IDENTITY);
        assert_eq!(config.present_mode, vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn resolve_applies_fallbacks() {
        let mut support = support();
        support.present_modes = vec![vk::PresentModeKHR::FIFO];
        let prefs = SwapchainPreferences::default()
            .with_present_mode(vk::PresentModeKHR::MAILBOX);

        let config = SwapchainConfig::resolve(&support, &prefs);
        assert_eq!(config.present_mode, vk::PresentModeKHR::FIFO);
    }
}
