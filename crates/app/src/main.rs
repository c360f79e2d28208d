//! WinTransform - live, rotatable view of a window or monitor

mod config;

use crate::config::{AppConfig, CliArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(selector) = args.target() {
        config.target = Some(selector);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(true)
        .init();

    tracing::info!("WinTransform v{}", env!("CARGO_PKG_VERSION"));

    run(&args, &config)
}

#[cfg(not(windows))]
fn run(_args: &CliArgs, _config: &AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("WinTransform needs Windows Graphics Capture and Direct3D 11, so it only runs on Windows")
}

#[cfg(windows)]
fn run(args: &CliArgs, config: &AppConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use capture_wgc::{enumerate_targets, target_size, CancelToken};
    use geometry::{Rect, Size};
    use overlay::RenderWindow;
    use render::{D3D11SessionBackend, FramePipeline, SharedViewport};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tracing::info;
    use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_SINGLETHREADED};
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
        RoInitialize(RO_INIT_SINGLETHREADED).context("Failed to initialize WinRT")?;
    }

    let targets = enumerate_targets();
    if args.list {
        for (index, info) in targets.iter().enumerate() {
            println!("{index:>3}  {info}");
        }
        return Ok(());
    }

    let chosen = config.resolve_target(&targets)?;
    let source = target_size(&chosen.target)
        .with_context(|| format!("Failed to open capture target \"{}\"", chosen.name))?;
    info!(name = %chosen.name, %source, "Capture target selected");

    let client = Size::new(config.window_width, config.window_height);
    let viewport = SharedViewport::new(Rect::new(0, 0, client.width, client.height), source);

    let window = RenderWindow::create(
        &format!("WinTransform - {}", chosen.name),
        client,
        viewport.clone(),
    )
    .context("Failed to create host window")?;

    let cancel = CancelToken::new();
    let backend = D3D11SessionBackend::new(chosen.target, window.surface_handle());
    let render = FramePipeline::new(backend, viewport, cancel.clone(), config.pipeline_config())
        .spawn()
        .context("Failed to start render thread")?;

    // The render thread must stop presenting before the surface is destroyed
    let render = Rc::new(RefCell::new(Some(render)));
    window.set_close_hook({
        let cancel = cancel.clone();
        let render = render.clone();
        move || stop_render(&cancel, &render)
    });

    let result = window.run();
    stop_render(&cancel, &render);

    result.context("Host window failed")
}

#[cfg(windows)]
fn stop_render(
    cancel: &capture_wgc::CancelToken,
    render: &std::cell::RefCell<Option<std::thread::JoinHandle<()>>>,
) {
    cancel.cancel();
    if let Some(handle) = render.borrow_mut().take() {
        if handle.join().is_err() {
            tracing::error!("Render thread panicked");
        }
    }
}
