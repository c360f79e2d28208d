//! D3D11 device management

use crate::{CaptureError, CaptureResult};
use windows::{
    core::Interface,
    Graphics::DirectX::Direct3D11::IDirect3DDevice,
    Win32::Graphics::{
        Direct3D::{D3D_DRIVER_TYPE_HARDWARE, D3D_FEATURE_LEVEL_11_0},
        Direct3D11::{
            D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext,
            D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_SDK_VERSION,
        },
        Dxgi::{IDXGIDevice, IDXGIDevice1},
    },
    Win32::System::WinRT::Direct3D11::{
        CreateDirect3D11DeviceFromDXGIDevice, IDirect3DDxgiInterfaceAccess,
    },
};

/// D3D11 device shared by the capture frame pool and the renderer
#[derive(Clone)]
pub struct D3D11Device {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    d3d_device: IDirect3DDevice,
}

impl D3D11Device {
    /// Create a new hardware D3D11 device with BGRA support
    pub fn new() -> CaptureResult<Self> {
        unsafe {
            let mut device: Option<ID3D11Device> = None;
            let mut context: Option<ID3D11DeviceContext> = None;

            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_HARDWARE,
                None,
                D3D11_CREATE_DEVICE_BGRA_SUPPORT,
                Some(&[D3D_FEATURE_LEVEL_11_0]),
                D3D11_SDK_VERSION,
                Some(&mut device),
                None,
                Some(&mut context),
            )?;

            let device = device.ok_or(CaptureError::NotSupported)?;
            let context = context.ok_or(CaptureError::NotSupported)?;

            // WGC wants the WinRT flavour of the device
            let dxgi_device: IDXGIDevice = device.cast()?;
            let inspectable = CreateDirect3D11DeviceFromDXGIDevice(&dxgi_device)?;
            let d3d_device: IDirect3DDevice = inspectable.cast()?;

            Ok(Self {
                device,
                context,
                d3d_device,
            })
        }
    }

    /// Get the D3D11 device
    pub fn device(&self) -> &ID3D11Device {
        &self.device
    }

    /// Get the immediate context
    pub fn context(&self) -> &ID3D11DeviceContext {
        &self.context
    }

    /// Get the WinRT Direct3D device
    pub fn d3d_device(&self) -> &IDirect3DDevice {
        &self.d3d_device
    }

    /// Limit queued frames so presentation never lags behind capture
    pub fn set_maximum_frame_latency(&self, frames: u32) -> CaptureResult<()> {
        unsafe {
            let dxgi_device: IDXGIDevice1 = self.device.cast()?;
            dxgi_device.SetMaximumFrameLatency(frames)?;
        }
        Ok(())
    }

    /// Get the underlying D3D11 interface from a WinRT wrapper
    pub fn get_d3d11_interface<T: Interface>(wrapper: &impl Interface) -> CaptureResult<T> {
        unsafe {
            let access: IDirect3DDxgiInterfaceAccess = wrapper.cast()?;
            Ok(access.GetInterface()?)
        }
    }
}
