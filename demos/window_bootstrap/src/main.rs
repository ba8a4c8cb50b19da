//! Opens a window and bootstraps a Vulkan context for it: instance with the surface extensions the platform needs,
//! the first physical device with a graphics queue family, and a logical device with one graphics queue.
//!
//! Set `VKBOOT_VALIDATION=1` (or `0`) to force validation layers on (or off). Otherwise they are enabled in debug
//! builds.
//!
//! If bootstrapping fails the process exits with a failure code without entering the event loop.

use std::process::ExitCode;

use anyhow::{Context, Result};
use vkboot::context::Ctx;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
};

fn validation_requested() -> bool {
    match std::env::var("VKBOOT_VALIDATION") {
        Ok(v) => v != "0" && !v.eq_ignore_ascii_case("false"),
        Err(_) => cfg!(debug_assertions),
    }
}

fn run() -> Result<()> {
    let ev = winit::event_loop::EventLoop::new().context("Could not create event loop")?;
    let window_attributes = winit::window::Window::default_attributes()
        .with_title("vkboot")
        .with_inner_size(LogicalSize::new(800.0, 600.0));
    #[allow(deprecated)]
    let window = ev
        .create_window(window_attributes)
        .context("Could not create window")?;

    let ctx = Ctx::default_with_surface(&window, validation_requested())
        .context("Vulkan bootstrap failed")?;

    let physical_device = &ctx.device.physical_device;
    log::info!(
        "Running on {} ({:?}), graphics queue family {:?}",
        physical_device.name(),
        physical_device.properties.device_type,
        ctx.graphics_queue().map(|q| q.family_index)
    );

    #[allow(deprecated)]
    ev.run(move |ev, ev_loop| {
        //keeps the context alive for as long as the window is open
        let _ctx = &ctx;
        if let Event::WindowEvent {
            window_id: _,
            event: WindowEvent::CloseRequested,
        } = ev
        {
            ev_loop.exit();
        }
    })?;

    drop(window);
    Ok(())
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
