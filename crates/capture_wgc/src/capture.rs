//! WGC capture session

use crate::targets::create_capture_item;
use crate::{
    CaptureResult, CaptureTarget, D3D11Device, FrameMailbox, FrameSize, FrameSource, WgcFrame,
};
use std::sync::Arc;
use tracing::{info, warn};
use windows::{
    Foundation::{TimeSpan, TypedEventHandler},
    Graphics::Capture::{Direct3D11CaptureFramePool, GraphicsCaptureItem, GraphicsCaptureSession},
    Graphics::DirectX::DirectXPixelFormat,
};

/// 2 ms in 100 ns units
const MIN_UPDATE_INTERVAL: i64 = 20_000;

/// Live WGC capture bound to one target at its size when started
pub struct CaptureSession {
    item: GraphicsCaptureItem,
    session: Option<GraphicsCaptureSession>,
    frame_pool: Option<Direct3D11CaptureFramePool>,
    mailbox: Arc<FrameMailbox<WgcFrame>>,
    size: FrameSize,
    frame_arrived: i64,
    closed: i64,
}

impl CaptureSession {
    /// Start capturing `target` into frames owned by `device`
    pub fn start(device: &D3D11Device, target: &CaptureTarget) -> CaptureResult<Self> {
        let item = create_capture_item(target)?;
        let item_size = item.Size()?;
        let size = FrameSize::new(item_size.Width.max(0) as u32, item_size.Height.max(0) as u32);

        // One buffer: only the newest frame matters
        let frame_pool = Direct3D11CaptureFramePool::CreateFreeThreaded(
            device.d3d_device(),
            DirectXPixelFormat::B8G8R8A8UIntNormalized,
            1,
            item_size,
        )?;

        let mailbox = Arc::new(FrameMailbox::new());

        let frame_arrived = {
            let mailbox = mailbox.clone();
            frame_pool.FrameArrived(&TypedEventHandler::new(
                move |pool: &Option<Direct3D11CaptureFramePool>, _| {
                    if let Some(pool) = pool {
                        publish_latest(pool, &mailbox);
                    }
                    Ok(())
                },
            ))?
        };

        let closed = {
            let mailbox = mailbox.clone();
            item.Closed(&TypedEventHandler::new(move |_, _| {
                info!("Capture target closed");
                mailbox.close();
                Ok(())
            }))?
        };

        let session = frame_pool.CreateCaptureSession(&item)?;
        if_supported("IsBorderRequired", || session.SetIsBorderRequired(false));
        if_supported("MinUpdateInterval", || {
            session.SetMinUpdateInterval(TimeSpan {
                Duration: MIN_UPDATE_INTERVAL,
            })
        });
        session.StartCapture()?;

        info!(%size, capture = ?target, "Capture started");

        Ok(Self {
            item,
            session: Some(session),
            frame_pool: Some(frame_pool),
            mailbox,
            size,
            frame_arrived,
            closed,
        })
    }

    /// Stop capture
    pub fn stop(&mut self) {
        let _ = self.item.RemoveClosed(self.closed);

        if let Some(session) = self.session.take() {
            let _ = session.Close();
        }

        if let Some(pool) = self.frame_pool.take() {
            let _ = pool.RemoveFrameArrived(self.frame_arrived);
            let _ = pool.Close();
        }

        self.mailbox.close();
    }
}

impl FrameSource for CaptureSession {
    type Frame = WgcFrame;

    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn mailbox(&self) -> &FrameMailbox<WgcFrame> {
        &self.mailbox
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain the pool and hand only the newest frame to the mailbox
fn publish_latest(pool: &Direct3D11CaptureFramePool, mailbox: &FrameMailbox<WgcFrame>) {
    let mut latest = None;
    while let Ok(frame) = pool.TryGetNextFrame() {
        match WgcFrame::new(frame) {
            // Replacing closes the older frame
            Ok(frame) => latest = Some(frame),
            Err(e) => warn!(error = %e, "Dropping unreadable frame"),
        }
    }

    if let Some(frame) = latest {
        mailbox.publish(frame);
    }
}

/// Apply an optional session capability, skipping it where the OS lacks it
fn if_supported(label: &str, apply: impl FnOnce() -> windows::core::Result<()>) {
    if let Err(e) = apply() {
        warn!(capability = label, error = %e, "Capture capability not supported");
    }
}
