//! Interactive host for the transformed view
//!
//! Pointer gestures move, resize and rotate a [`render::SharedViewport`];
//! on Windows the [`RenderWindow`] hosts the render surface and feeds it
//! mouse input.

pub mod cursor;
pub mod interaction;
pub mod outline;
pub mod pointer;
#[cfg(windows)]
pub mod window;

pub use cursor::CursorShape;
pub use interaction::{InteractionMachine, InteractionOutcome, ResizeHandle};
pub use pointer::{PointerButtons, PointerKind, PointerState};
#[cfg(windows)]
pub use window::RenderWindow;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Window error: {0}")]
    Window(String),
}

pub type OverlayResult<T> = Result<T, OverlayError>;
