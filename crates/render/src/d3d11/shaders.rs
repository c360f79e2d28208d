//! Textured-quad shader pair and the fixed pipeline state around it

use crate::{RenderError, RenderResult};
use windows::{
    core::{s, PCSTR},
    Win32::Graphics::{
        Direct3D::{Fxc::D3DCompile, ID3DBlob, D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST},
        Direct3D11::{
            ID3D11Device, ID3D11DeviceContext, ID3D11InputLayout, ID3D11PixelShader,
            ID3D11SamplerState, ID3D11VertexShader, D3D11_COMPARISON_NEVER,
            D3D11_FILTER_MIN_MAG_MIP_LINEAR, D3D11_INPUT_ELEMENT_DESC,
            D3D11_INPUT_PER_VERTEX_DATA, D3D11_SAMPLER_DESC, D3D11_TEXTURE_ADDRESS_CLAMP,
        },
        Dxgi::Common::{DXGI_FORMAT_R32G32B32_FLOAT, DXGI_FORMAT_R32G32_FLOAT},
    },
};

const SHADER_SOURCE: &str = include_str!("shader.hlsl");

pub(crate) struct Shaders {
    vertex: ID3D11VertexShader,
    pixel: ID3D11PixelShader,
    layout: ID3D11InputLayout,
    sampler: ID3D11SamplerState,
}

impl Shaders {
    pub(crate) fn load(device: &ID3D11Device) -> RenderResult<Self> {
        let vertex_code = compile(s!("VSMain"), s!("vs_4_0"))?;
        let pixel_code = compile(s!("PSMain"), s!("ps_4_0"))?;

        unsafe {
            let mut vertex = None;
            device.CreateVertexShader(blob_bytes(&vertex_code), None, Some(&mut vertex))?;

            let mut pixel = None;
            device.CreatePixelShader(blob_bytes(&pixel_code), None, Some(&mut pixel))?;

            let elements = [
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("POSITION"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32B32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 0,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
                D3D11_INPUT_ELEMENT_DESC {
                    SemanticName: s!("TEXCOORD"),
                    SemanticIndex: 0,
                    Format: DXGI_FORMAT_R32G32_FLOAT,
                    InputSlot: 0,
                    AlignedByteOffset: 12,
                    InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                    InstanceDataStepRate: 0,
                },
            ];
            let mut layout = None;
            device.CreateInputLayout(&elements, blob_bytes(&vertex_code), Some(&mut layout))?;

            let sampler_desc = D3D11_SAMPLER_DESC {
                Filter: D3D11_FILTER_MIN_MAG_MIP_LINEAR,
                AddressU: D3D11_TEXTURE_ADDRESS_CLAMP,
                AddressV: D3D11_TEXTURE_ADDRESS_CLAMP,
                AddressW: D3D11_TEXTURE_ADDRESS_CLAMP,
                ComparisonFunc: D3D11_COMPARISON_NEVER,
                MaxLOD: f32::MAX,
                ..Default::default()
            };
            let mut sampler = None;
            device.CreateSamplerState(&sampler_desc, Some(&mut sampler))?;

            Ok(Self {
                vertex: vertex.ok_or_else(|| missing("vertex shader"))?,
                pixel: pixel.ok_or_else(|| missing("pixel shader"))?,
                layout: layout.ok_or_else(|| missing("input layout"))?,
                sampler: sampler.ok_or_else(|| missing("sampler"))?,
            })
        }
    }

    /// Bind the state that stays fixed for the whole session
    pub(crate) fn bind(&self, context: &ID3D11DeviceContext) {
        unsafe {
            context.VSSetShader(&self.vertex, None);
            context.PSSetShader(&self.pixel, None);
            context.PSSetSamplers(0, Some(&[Some(self.sampler.clone())]));
            context.IASetInputLayout(&self.layout);
            context.IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
        }
    }
}

fn compile(entry_point: PCSTR, target: PCSTR) -> RenderResult<ID3DBlob> {
    let mut code = None;
    let mut errors = None;

    let result = unsafe {
        D3DCompile(
            SHADER_SOURCE.as_ptr() as _,
            SHADER_SOURCE.len(),
            s!("shader.hlsl"),
            None,
            None,
            entry_point,
            target,
            0,
            0,
            &mut code,
            Some(&mut errors),
        )
    };

    if let Err(e) = result {
        let message = errors
            .map(|blob| String::from_utf8_lossy(unsafe { blob_bytes(&blob) }).into_owned())
            .unwrap_or_else(|| e.to_string());
        return Err(RenderError::Shader(message));
    }

    code.ok_or_else(|| RenderError::Shader("compiler returned no bytecode".into()))
}

unsafe fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
}

fn missing(what: &str) -> RenderError {
    RenderError::Device(format!("{what} was not created"))
}
