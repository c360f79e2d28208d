//! Captured frames

/// Pixel dimensions of a captured frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1.0 for an empty size
    pub fn aspect(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A GPU-resident captured image
pub trait CapturedFrame: Send {
    /// Size of the frame content
    fn size(&self) -> FrameSize;
}

#[cfg(windows)]
pub use wgc::WgcFrame;

#[cfg(windows)]
mod wgc {
    use super::{CapturedFrame, FrameSize};
    use crate::{CaptureResult, D3D11Device};
    use windows::Graphics::Capture::Direct3D11CaptureFrame;
    use windows::Win32::Graphics::Direct3D11::ID3D11Texture2D;

    /// Frame taken from the WGC frame pool.
    ///
    /// The pool buffer is returned as soon as the frame is dropped.
    pub struct WgcFrame {
        frame: Direct3D11CaptureFrame,
        size: FrameSize,
    }

    impl WgcFrame {
        pub(crate) fn new(frame: Direct3D11CaptureFrame) -> CaptureResult<Self> {
            let content = frame.ContentSize()?;
            Ok(Self {
                frame,
                size: FrameSize::new(content.Width.max(0) as u32, content.Height.max(0) as u32),
            })
        }

        /// Get the D3D11 texture backing this frame
        pub fn texture(&self) -> CaptureResult<ID3D11Texture2D> {
            let surface = self.frame.Surface()?;
            D3D11Device::get_d3d11_interface(&surface)
        }
    }

    impl CapturedFrame for WgcFrame {
        fn size(&self) -> FrameSize {
            self.size
        }
    }

    impl Drop for WgcFrame {
        fn drop(&mut self) {
            let _ = self.frame.Close();
        }
    }
}
