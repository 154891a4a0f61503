//! Vulkan surface capability selection and swapchain setup.
//!
//! This crate provides:
//! - Pure capability selectors mapping driver-reported support and caller
//!   preference to concrete swapchain/memory configuration values
//! - Vulkan instance and device management
//! - Surface support queries and swapchain creation
//! - Raw device memory buffer allocation

pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod instance;
pub mod memory;
pub mod select;
pub mod surface;
pub mod swapchain;

pub use capabilities::{DeviceInfo, GpuVendor};
pub use config::{SwapchainConfig, SwapchainPreferences};
pub use context::{GpuContext, GpuContextBuilder};
pub use error::{GpuError, Result};
pub use memory::Buffer;
pub use select::{
    select_image_count, select_image_extent, select_image_usage, select_memory_type,
    select_present_mode, select_surface_format, select_surface_transform,
};
pub use surface::{SurfaceContext, SurfaceSupport};
pub use swapchain::Swapchain;
