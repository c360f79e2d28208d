//! Windows Graphics Capture module for WinTransform
//!
//! Provides the capture session that feeds the render pipeline: a
//! single-slot "latest frame" mailbox filled by the capture source and the
//! cancellation primitives the render loop waits on. The WGC binding itself
//! is only compiled on Windows.

pub mod frame;
pub mod mailbox;
pub mod source;
pub mod sync;

#[cfg(windows)]
pub mod capture;
#[cfg(windows)]
pub mod d3d11;
#[cfg(windows)]
pub mod targets;

pub use frame::{CapturedFrame, FrameSize};
pub use mailbox::FrameMailbox;
pub use source::FrameSource;
pub use sync::{CancelToken, Signal};

#[cfg(windows)]
pub use capture::CaptureSession;
#[cfg(windows)]
pub use d3d11::D3D11Device;
#[cfg(windows)]
pub use frame::WgcFrame;
#[cfg(windows)]
pub use targets::{enumerate_targets, target_size};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Capture not supported")]
    NotSupported,

    #[error("Invalid capture target")]
    InvalidTarget,

    #[error("Capture target closed")]
    TargetClosed,

    #[error("Operation cancelled")]
    Cancelled,
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Capture target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    Window(isize),
    Monitor(isize),
}

/// Capturable target as listed to the user
#[derive(Debug, Clone)]
pub struct TargetInfo {
    pub name: String,
    pub target: CaptureTarget,
}

impl TargetInfo {
    pub fn is_monitor(&self) -> bool {
        matches!(self.target, CaptureTarget::Monitor(_))
    }
}

impl std::fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target {
            CaptureTarget::Window(_) => write!(f, "[window] {}", self.name),
            CaptureTarget::Monitor(_) => write!(f, "[monitor] {}", self.name),
        }
    }
}
