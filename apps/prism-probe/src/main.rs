//! Surface capability probe.
//!
//! Opens a window, builds the GPU context and surface, reports what the
//! surface supports, resolves a swapchain configuration from the default
//! preferences, creates the swapchain once, and exits.
//!
//! ```bash
//! cargo run -p prism-probe
//! ```
//!
//! Set `RUST_LOG=debug` to see the individual selection results.

use anyhow::Context;
use ash::vk;
use prism_gpu::{Buffer, GpuContextBuilder, SurfaceContext, SwapchainPreferences};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut probe = Probe { done: false };
    event_loop.run_app(&mut probe)?;

    Ok(())
}

struct Probe {
    done: bool,
}

impl ApplicationHandler for Probe {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.done {
            return;
        }
        self.done = true;

        if let Err(e) = run_probe(event_loop) {
            error!("Probe failed: {e:#}");
        }
        event_loop.exit();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
        }
    }
}

fn run_probe(event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
    let window_attrs = Window::default_attributes()
        .with_title("Prism Probe")
        .with_inner_size(PhysicalSize::new(WIDTH, HEIGHT));
    let window = event_loop
        .create_window(window_attrs)
        .context("Failed to create window")?;

    let gpu = GpuContextBuilder::new()
        .app_name("Prism Probe")
        .build()
        .context("Failed to create GPU context")?;

    let surface = unsafe { SurfaceContext::from_window(&gpu, &window) }
        .context("Failed to create surface")?;

    let support = surface.support(&gpu).context("Failed to query support")?;
    info!(
        "Surface: {}..{} images, current extent {}x{}",
        support.capabilities.min_image_count,
        support.capabilities.max_image_count,
        support.capabilities.current_extent.width,
        support.capabilities.current_extent.height,
    );
    info!("Formats: {:?}", support.formats);
    info!("Present modes: {:?}", support.present_modes);

    let size = window.inner_size();
    let prefs = SwapchainPreferences::default().with_extent(size.width, size.height);

    let swapchain = unsafe { surface.create_swapchain(&gpu, &prefs, None) }
        .context("Failed to create swapchain")?;
    info!(
        "Swapchain: {} images, {:?}, {}x{}",
        swapchain.images.len(),
        swapchain.format,
        swapchain.extent.width,
        swapchain.extent.height,
    );

    // Exercise the memory path with a small staging upload.
    let payload = [0u8; 256];
    unsafe {
        let staging = Buffer::host_visible(
            gpu.device(),
            gpu.memory_properties(),
            payload.len() as vk::DeviceSize,
            vk::BufferUsageFlags::TRANSFER_SRC,
        )
        .context("Failed to allocate staging buffer")?;
        staging
            .write(gpu.device(), &payload)
            .context("Failed to write staging buffer")?;
        staging.destroy(gpu.device());
    }
    info!("Staging buffer round trip OK");

    unsafe {
        gpu.wait_idle().context("Failed to wait idle")?;
        swapchain.destroy(gpu.device(), &surface.swapchain_loader);
        surface.destroy();
    }

    Ok(())
}
