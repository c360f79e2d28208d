//! D3D11 implementation of the render device

use super::shaders::Shaders;
use crate::device::RenderDevice;
use crate::vertex::Vertex;
use crate::{RenderError, RenderResult};
use capture_wgc::{D3D11Device, FrameSize, WgcFrame};
use geometry::Size;
use tracing::debug;
use windows::{
    Win32::Foundation::HWND,
    Win32::Graphics::{
        Direct3D11::{
            ID3D11Buffer, ID3D11RenderTargetView, ID3D11ShaderResourceView, ID3D11Texture2D,
            D3D11_BIND_SHADER_RESOURCE, D3D11_BIND_VERTEX_BUFFER, D3D11_BUFFER_DESC,
            D3D11_SUBRESOURCE_DATA, D3D11_TEXTURE2D_DESC, D3D11_USAGE_DEFAULT, D3D11_VIEWPORT,
        },
        Dxgi::{
            Common::{DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_SAMPLE_DESC},
            CreateDXGIFactory2, IDXGIFactory2, IDXGISwapChain1, DXGI_CREATE_FACTORY_FLAGS,
            DXGI_PRESENT, DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1, DXGI_SWAP_CHAIN_FLAG,
            DXGI_SWAP_EFFECT_FLIP_DISCARD, DXGI_USAGE_RENDER_TARGET_OUTPUT,
        },
    },
};

const SWAP_BUFFER_COUNT: u32 = 2;
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub struct D3D11Texture {
    texture: ID3D11Texture2D,
    view: ID3D11ShaderResourceView,
}

pub struct D3D11Surface {
    swap_chain: IDXGISwapChain1,
    target: Option<ID3D11RenderTargetView>,
    size: Size,
}

/// Draws captured frames into a swap chain bound to the host window
pub struct D3D11Renderer {
    device: D3D11Device,
    hwnd: HWND,
    _shaders: Shaders,
}

impl D3D11Renderer {
    pub fn new(device: D3D11Device, hwnd: isize) -> RenderResult<Self> {
        // One queued frame keeps presentation close to capture
        device.set_maximum_frame_latency(1)?;

        let shaders = Shaders::load(device.device())?;
        shaders.bind(device.context());

        Ok(Self {
            device,
            hwnd: HWND(hwnd as _),
            _shaders: shaders,
        })
    }

    fn target_view(&self, swap_chain: &IDXGISwapChain1) -> RenderResult<ID3D11RenderTargetView> {
        unsafe {
            let back_buffer: ID3D11Texture2D = swap_chain.GetBuffer(0)?;
            let mut view = None;
            self.device
                .device()
                .CreateRenderTargetView(&back_buffer, None, Some(&mut view))?;
            view.ok_or_else(|| RenderError::Device("render target view was not created".into()))
        }
    }
}

fn extent(size: Size) -> (u32, u32) {
    (size.width.max(1) as u32, size.height.max(1) as u32)
}

impl RenderDevice for D3D11Renderer {
    type Frame = WgcFrame;
    type Texture = D3D11Texture;
    type VertexBuffer = ID3D11Buffer;
    type Surface = D3D11Surface;

    fn create_input_texture(&mut self, size: FrameSize) -> RenderResult<D3D11Texture> {
        let desc = D3D11_TEXTURE2D_DESC {
            Width: size.width.max(1),
            Height: size.height.max(1),
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_B8G8R8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };

        unsafe {
            let mut texture = None;
            self.device
                .device()
                .CreateTexture2D(&desc, None, Some(&mut texture))?;
            let texture = texture
                .ok_or_else(|| RenderError::Device("input texture was not created".into()))?;

            let mut view = None;
            self.device
                .device()
                .CreateShaderResourceView(&texture, None, Some(&mut view))?;
            let view = view
                .ok_or_else(|| RenderError::Device("shader resource view was not created".into()))?;

            Ok(D3D11Texture { texture, view })
        }
    }

    fn copy_frame(&mut self, frame: &WgcFrame, texture: &D3D11Texture) -> RenderResult<()> {
        let source = frame.texture()?;
        unsafe {
            self.device.context().CopyResource(&texture.texture, &source);
        }
        Ok(())
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<ID3D11Buffer> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let desc = D3D11_BUFFER_DESC {
            ByteWidth: bytes.len() as u32,
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
            StructureByteStride: 0,
        };
        let data = D3D11_SUBRESOURCE_DATA {
            pSysMem: bytes.as_ptr() as _,
            SysMemPitch: 0,
            SysMemSlicePitch: 0,
        };

        unsafe {
            let mut buffer = None;
            self.device
                .device()
                .CreateBuffer(&desc, Some(&data), Some(&mut buffer))?;
            buffer.ok_or_else(|| RenderError::Device("vertex buffer was not created".into()))
        }
    }

    fn create_surface(&mut self, size: Size) -> RenderResult<D3D11Surface> {
        let (width, height) = extent(size);
        let desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: width,
            Height: height,
            Format: DXGI_FORMAT_B8G8R8A8_UNORM,
            Stereo: false.into(),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: SWAP_BUFFER_COUNT,
            Scaling: DXGI_SCALING_STRETCH,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            ..Default::default()
        };

        let swap_chain = unsafe {
            let factory: IDXGIFactory2 = CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0))?;
            factory.CreateSwapChainForHwnd(self.device.device(), self.hwnd, &desc, None, None)?
        };
        let target = self.target_view(&swap_chain)?;
        debug!(width, height, "Swap chain created");

        Ok(D3D11Surface {
            swap_chain,
            target: Some(target),
            size,
        })
    }

    fn resize_surface(&mut self, surface: &mut D3D11Surface, size: Size) -> RenderResult<()> {
        let (width, height) = extent(size);

        // Every view of the back buffer must be gone before ResizeBuffers
        surface.target = None;
        unsafe {
            self.device.context().OMSetRenderTargets(None, None);
            surface.swap_chain.ResizeBuffers(
                SWAP_BUFFER_COUNT,
                width,
                height,
                DXGI_FORMAT_B8G8R8A8_UNORM,
                DXGI_SWAP_CHAIN_FLAG(0),
            )?;
        }
        surface.target = Some(self.target_view(&surface.swap_chain)?);
        surface.size = size;
        Ok(())
    }

    fn draw(
        &mut self,
        surface: &D3D11Surface,
        texture: &D3D11Texture,
        vertices: &ID3D11Buffer,
        vertex_count: u32,
    ) -> RenderResult<()> {
        let (width, height) = extent(surface.size);
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: width as f32,
            Height: height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        let stride = std::mem::size_of::<Vertex>() as u32;
        let offset = 0u32;

        unsafe {
            let context = self.device.context();
            context.OMSetRenderTargets(Some(&[surface.target.clone()]), None);
            context.RSSetViewports(Some(&[viewport]));
            if let Some(target) = &surface.target {
                context.ClearRenderTargetView(target, &CLEAR_COLOR);
            }
            context.PSSetShaderResources(0, Some(&[Some(texture.view.clone())]));
            context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(vertices.clone())),
                Some(&stride),
                Some(&offset),
            );
            context.Draw(vertex_count, 0);
        }
        Ok(())
    }

    fn present(&mut self, surface: &D3D11Surface) -> RenderResult<()> {
        unsafe { surface.swap_chain.Present(0, DXGI_PRESENT(0)).ok()? };
        Ok(())
    }
}
