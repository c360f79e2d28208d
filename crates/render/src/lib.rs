//! Render module for WinTransform
//!
//! Owns the viewport model shared with the interaction layer, the cached GPU
//! resources of a render session and the frame pipeline that drives capture
//! into presentation. The D3D11 backend is only compiled on Windows.

pub mod device;
pub mod fps;
pub mod pipeline;
pub mod resources;
pub mod vertex;
pub mod viewport;

#[cfg(windows)]
pub mod d3d11;

pub use device::{RenderDevice, SessionBackend};
pub use fps::FpsCounter;
pub use pipeline::{FramePipeline, PipelineConfig, PipelineState};
pub use resources::{InputTexture, ResourceSet, SwapSurface, VertexCache};
pub use vertex::{fitted_quad, Vertex};
pub use viewport::{SharedViewport, ViewportSnapshot, MIN_SIDE_LENGTH};

#[cfg(windows)]
pub use d3d11::D3D11SessionBackend;

use capture_wgc::{CaptureError, FrameSize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Capture size changed from {expected} to {actual}")]
    CaptureSizeChanged {
        expected: FrameSize,
        actual: FrameSize,
    },

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Device error: {0}")]
    Device(String),
}

impl RenderError {
    /// Cooperative shutdown rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RenderError::Cancelled | RenderError::Capture(CaptureError::Cancelled)
        )
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
