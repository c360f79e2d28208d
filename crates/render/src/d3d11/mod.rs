//! D3D11 backend: WGC capture into a swap chain on the host window

mod renderer;
mod shaders;

pub use renderer::{D3D11Renderer, D3D11Surface, D3D11Texture};

use crate::device::SessionBackend;
use crate::RenderResult;
use capture_wgc::{CaptureSession, CaptureTarget, D3D11Device};
use tracing::{info, warn};
use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED};

/// Opens a fresh device, capture session and swap chain per render session
pub struct D3D11SessionBackend {
    target: CaptureTarget,
    hwnd: isize,
    winrt_initialized: bool,
}

impl D3D11SessionBackend {
    /// Capture `target` and present into the window `hwnd`
    pub fn new(target: CaptureTarget, hwnd: isize) -> Self {
        Self {
            target,
            hwnd,
            winrt_initialized: false,
        }
    }
}

impl SessionBackend for D3D11SessionBackend {
    type Source = CaptureSession;
    type Device = D3D11Renderer;

    fn open(&mut self) -> RenderResult<(CaptureSession, D3D11Renderer)> {
        // Runs on the render thread, which needs WinRT before the first capture item
        if !self.winrt_initialized {
            if let Err(e) = unsafe { RoInitialize(RO_INIT_MULTITHREADED) } {
                warn!(error = %e, "WinRT already initialized with another apartment");
            }
            self.winrt_initialized = true;
        }

        let device = D3D11Device::new()?;
        let capture = CaptureSession::start(&device, &self.target)?;
        let renderer = D3D11Renderer::new(device, self.hwnd)?;
        info!(capture = ?self.target, "D3D11 session opened");

        Ok((capture, renderer))
    }
}
