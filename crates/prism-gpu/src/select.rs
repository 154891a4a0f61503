//! Capability selection.
//!
//! Pure functions that pick concrete swapchain/memory configuration values
//! from what a physical device and surface report as supported, given the
//! caller's preferred value. None of these touch the Vulkan API; they
//! operate on value types the caller has already queried.

use ash::vk;

/// Sentinel extent width meaning the surface lets the application pick
/// the swapchain image size.
const EXTENT_CHOSEN_BY_APP: u32 = u32::MAX;

/// Select a presentation mode.
///
/// Returns `MAILBOX` when `desired` is among the supported modes and `FIFO`
/// otherwise. Note the collapse: any hit yields `MAILBOX`, not `desired`
/// itself. Callers in this crate only ever ask for `MAILBOX`, and the
/// behavior is kept for compatibility with existing call sites; pass
/// `MAILBOX` as `desired` unless you rely on the FIFO fallback. `FIFO` is
/// always safe, every conformant surface must support it.
#[must_use]
pub fn select_present_mode(
    available: &[vk::PresentModeKHR],
    desired: vk::PresentModeKHR,
) -> vk::PresentModeKHR {
    if available.contains(&desired) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Select the number of swapchain images.
///
/// One more than the surface minimum, to reduce stalling on present,
/// clamped to the maximum when the surface reports one. A
/// `max_image_count` of zero means unbounded.
#[must_use]
pub fn select_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = caps.min_image_count + 1;
    if caps.max_image_count > 0 && count > caps.max_image_count {
        count = caps.max_image_count;
    }
    count
}

/// Select the swapchain image extent.
///
/// Most surfaces dictate their own extent, in which case `desired` is
/// ignored. When the surface leaves the choice to the application, each
/// dimension of `desired` is clamped independently into the supported
/// range.
#[must_use]
pub fn select_image_extent(
    caps: &vk::SurfaceCapabilitiesKHR,
    desired: vk::Extent2D,
) -> vk::Extent2D {
    if caps.current_extent.width == EXTENT_CHOSEN_BY_APP {
        vk::Extent2D {
            width: desired
                .width
                .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: desired
                .height
                .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    } else {
        caps.current_extent
    }
}

/// Select the swapchain image usage flags.
///
/// All-or-nothing: if every desired bit is supported, `desired` is granted
/// unchanged; if any bit is not, the result is exactly `COLOR_ATTACHMENT`
/// rather than the supported subset.
#[must_use]
pub fn select_image_usage(
    caps: &vk::SurfaceCapabilitiesKHR,
    desired: vk::ImageUsageFlags,
) -> vk::ImageUsageFlags {
    let granted = desired & caps.supported_usage_flags;
    if granted == desired {
        desired
    } else {
        vk::ImageUsageFlags::COLOR_ATTACHMENT
    }
}

/// Select the surface pre-transform.
///
/// `desired` when the surface supports it, otherwise whatever transform
/// the surface currently applies.
#[must_use]
pub fn select_surface_transform(
    caps: &vk::SurfaceCapabilitiesKHR,
    desired: vk::SurfaceTransformFlagsKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if caps.supported_transforms.contains(desired) {
        desired
    } else {
        caps.current_transform
    }
}

/// Select a surface format.
///
/// Tiered fallback, first hit wins:
/// 1. a single `UNDEFINED` entry means the surface imposes no constraint,
///    so `desired` is returned verbatim;
/// 2. an exact (format, color space) match returns `desired`;
/// 3. a format-only match returns the desired format paired with the
///    matched entry's color space, so the returned pair is one the surface
///    actually advertises;
/// 4. failing all of that, the first reported format.
///
/// `available` must be non-empty; surfaces always report at least one
/// format.
#[must_use]
pub fn select_surface_format(
    available: &[vk::SurfaceFormatKHR],
    desired: vk::SurfaceFormatKHR,
) -> vk::SurfaceFormatKHR {
    if available.len() == 1 && available[0].format == vk::Format::UNDEFINED {
        return desired;
    }

    for candidate in available {
        if candidate.format == desired.format && candidate.color_space == desired.color_space {
            return desired;
        }
    }

    for candidate in available {
        if candidate.format == desired.format {
            return vk::SurfaceFormatKHR {
                format: desired.format,
                color_space: candidate.color_space,
            };
        }
    }

    available[0]
}

/// Select a memory type index for an allocation.
///
/// Scans indices from zero and returns the first type that is allowed by
/// the allocation's `memory_type_bits` mask and carries all of `flags`.
/// `None` when no type qualifies.
#[must_use]
pub fn select_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    requirements: &vk::MemoryRequirements,
    flags: vk::MemoryPropertyFlags,
) -> Option<u32> {
    (0..memory_properties.memory_type_count).find(|&index| {
        requirements.memory_type_bits & (1 << index) != 0
            && memory_properties.memory_types[index as usize]
                .property_flags
                .contains(flags)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: vk::Extent2D {
                width: 1280,
                height: 720,
            },
            min_image_extent: vk::Extent2D {
                width: 64,
                height: 64,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            supported_usage_flags: vk::ImageUsageFlags::COLOR_ATTACHMENT
                | vk::ImageUsageFlags::TRANSFER_DST,
            supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY
                | vk::SurfaceTransformFlagsKHR::ROTATE_90,
            current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_90,
            ..Default::default()
        }
    }

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn present_mode_collapses_to_mailbox_on_match() {
        let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(
            select_present_mode(&available, vk::PresentModeKHR::IMMEDIATE),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(
            select_present_mode(&available, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::FIFO
        );
        assert_eq!(
            select_present_mode(&[], vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn image_count_is_min_plus_one() {
        assert_eq!(select_image_count(&caps()), 3);
    }

    #[test]
    fn image_count_unbounded_when_max_is_zero() {
        let caps = vk::SurfaceCapabilitiesKHR {
            min_image_count: 5,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(select_image_count(&caps), 6);
    }

    #[test]
    fn image_count_clamped_to_max() {
        let caps = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 2,
            ..Default::default()
        };
        assert_eq!(select_image_count(&caps), 2);
    }

    #[test]
    fn extent_dictated_by_surface() {
        let chosen = select_image_extent(
            &caps(),
            vk::Extent2D {
                width: 10,
                height: 10,
            },
        );
        assert_eq!(chosen.width, 1280);
        assert_eq!(chosen.height, 720);
    }

    #[test]
    fn extent_clamped_when_app_chooses() {
        let mut caps = caps();
        caps.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };

        let too_small = select_image_extent(
            &caps,
            vk::Extent2D {
                width: 1,
                height: 9999,
            },
        );
        assert_eq!(too_small.width, 64);
        assert_eq!(too_small.height, 4096);

        let in_range = select_image_extent(
            &caps,
            vk::Extent2D {
                width: 800,
                height: 600,
            },
        );
        assert_eq!(in_range.width, 800);
        assert_eq!(in_range.height, 600);
    }

    #[test]
    fn usage_granted_when_fully_supported() {
        let desired = vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST;
        assert_eq!(select_image_usage(&caps(), desired), desired);
    }

    #[test]
    fn usage_falls_back_to_color_attachment() {
        let desired = vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::STORAGE;
        assert_eq!(
            select_image_usage(&caps(), desired),
            vk::ImageUsageFlags::COLOR_ATTACHMENT
        );
    }

    #[test]
    fn transform_kept_when_supported() {
        assert_eq!(
            select_surface_transform(&caps(), vk::SurfaceTransformFlagsKHR::IDENTITY),
            vk::SurfaceTransformFlagsKHR::IDENTITY
        );
    }

    #[test]
    fn transform_falls_back_to_current() {
        assert_eq!(
            select_surface_transform(&caps(), vk::SurfaceTransformFlagsKHR::ROTATE_180),
            vk::SurfaceTransformFlagsKHR::ROTATE_90
        );
    }

    #[test]
    fn format_unconstrained_surface_returns_desired() {
        let available = [format(vk::Format::UNDEFINED, vk::ColorSpaceKHR::SRGB_NONLINEAR)];
        let desired = format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);
        let chosen = select_surface_format(&available, desired);
        assert_eq!(chosen.format, desired.format);
        assert_eq!(chosen.color_space, desired.color_space);
    }

    #[test]
    fn format_exact_match() {
        let available = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let desired = format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        let chosen = select_surface_format(&available, desired);
        assert_eq!(chosen.format, desired.format);
        assert_eq!(chosen.color_space, desired.color_space);
    }

    #[test]
    fn format_only_match_takes_advertised_color_space() {
        let available = [
            format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
        ];
        let desired = format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        let chosen = select_surface_format(&available, desired);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);
    }

    #[test]
    fn format_no_match_returns_first_available() {
        let available = [
            format(vk::Format::R5G6B5_UNORM_PACK16, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let desired = format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        let chosen = select_surface_format(&available, desired);
        assert_eq!(chosen.format, available[0].format);
        assert_eq!(chosen.color_space, available[0].color_space);
    }

    fn memory_table(flags: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties::default();
        props.memory_type_count = flags.len() as u32;
        for (i, &f) in flags.iter().enumerate() {
            props.memory_types[i].property_flags = f;
        }
        props
    }

    #[test]
    fn memory_type_first_qualifying_index() {
        let props = memory_table(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);
        let requirements = vk::MemoryRequirements {
            memory_type_bits: 0b111,
            ..Default::default()
        };

        assert_eq!(
            select_memory_type(&props, &requirements, vk::MemoryPropertyFlags::HOST_VISIBLE),
            Some(1)
        );
    }

    #[test]
    fn memory_type_respects_requirement_mask() {
        let props = memory_table(&[
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        ]);
        let requirements = vk::MemoryRequirements {
            memory_type_bits: 0b10,
            ..Default::default()
        };

        assert_eq!(
            select_memory_type(&props, &requirements, vk::MemoryPropertyFlags::HOST_VISIBLE),
            Some(1)
        );
    }

    #[test]
    fn memory_type_none_when_mask_empty() {
        let props = memory_table(&[vk::MemoryPropertyFlags::HOST_VISIBLE]);
        let requirements = vk::MemoryRequirements {
            memory_type_bits: 0,
            ..Default::default()
        };

        assert_eq!(
            select_memory_type(&props, &requirements, vk::MemoryPropertyFlags::HOST_VISIBLE),
            None
        );
    }

    #[test]
    fn memory_type_none_when_properties_missing() {
        let props = memory_table(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);
        let requirements = vk::MemoryRequirements {
            memory_type_bits: 0b1,
            ..Default::default()
        };

        assert_eq!(
            select_memory_type(&props, &requirements, vk::MemoryPropertyFlags::HOST_VISIBLE),
            None
        );
    }
}
