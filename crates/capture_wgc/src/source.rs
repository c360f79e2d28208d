//! Capture source seen by the render loop

use crate::frame::{CapturedFrame, FrameSize};
use crate::mailbox::FrameMailbox;
use crate::sync::CancelToken;
use crate::CaptureResult;
use crossbeam_channel::Receiver;

/// A live capture bound at a fixed pixel size.
///
/// Implementors hand frames over through a [`FrameMailbox`]; the remaining
/// operations follow from it.
pub trait FrameSource {
    type Frame: CapturedFrame;

    /// Size of the target when the session was started
    fn frame_size(&self) -> FrameSize;

    fn mailbox(&self) -> &FrameMailbox<Self::Frame>;

    /// Ready when a new frame may be available
    fn frame_ready(&self) -> &Receiver<()> {
        self.mailbox().ready()
    }

    fn wait_for_frame(&self, cancel: &CancelToken) -> CaptureResult<()> {
        self.mailbox().wait_for_frame(cancel)
    }

    fn take_latest_frame(&self) -> CaptureResult<Option<Self::Frame>> {
        self.mailbox().take_latest()
    }
}
