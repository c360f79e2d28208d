//! Capture-to-present render loop
//!
//! Each session opens a capture source and a device, then loops: wait for a
//! new frame or a viewport change, copy the newest frame in, refresh the
//! cached resources, draw and present. A failed session is logged, followed
//! by a backoff and a fresh session, for as long as the token is not
//! cancelled.

use crate::device::SessionBackend;
use crate::fps::FpsCounter;
use crate::resources::ResourceSet;
use crate::viewport::SharedViewport;
use crate::{RenderError, RenderResult};
use capture_wgc::{CancelToken, CapturedFrame, FrameSource};
use crossbeam_channel::{select, Receiver};
use std::convert::Infallible;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pause before restarting a failed session
    pub backoff: Duration,
    pub fps_sample_period: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(1),
            fps_sample_period: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    Running,
    TearingDown,
}

pub struct FramePipeline<B: SessionBackend> {
    backend: B,
    viewport: SharedViewport,
    cancel: CancelToken,
    config: PipelineConfig,
    state: PipelineState,
}

impl<B: SessionBackend> FramePipeline<B> {
    pub fn new(
        backend: B,
        viewport: SharedViewport,
        cancel: CancelToken,
        config: PipelineConfig,
    ) -> Self {
        Self {
            backend,
            viewport,
            cancel,
            config,
            state: PipelineState::Initializing,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run on a dedicated render thread until the token is cancelled
    pub fn spawn(mut self) -> std::io::Result<JoinHandle<()>>
    where
        B: 'static,
    {
        thread::Builder::new()
            .name("render".into())
            .spawn(move || self.run())
    }

    /// Run sessions until cancelled; never gives up on its own
    pub fn run(&mut self) {
        loop {
            self.state = PipelineState::Initializing;
            let result = self.run_session();
            self.state = PipelineState::TearingDown;

            match result {
                Ok(never) => match never {},
                Err(e) if e.is_cancelled() => {
                    debug!("Render loop cancelled");
                    break;
                }
                Err(RenderError::CaptureSizeChanged { expected, actual }) => {
                    info!(%expected, %actual, "Capture size changed, rebuilding session");
                    self.viewport.set_source_size(actual);
                }
                Err(e) => {
                    error!(error = %e, "Render session failed");
                    if self.cancel.sleep(self.config.backoff).is_err() {
                        debug!("Render loop cancelled during backoff");
                        break;
                    }
                }
            }
        }
    }

    fn run_session(&mut self) -> RenderResult<Infallible> {
        self.cancel.check()?;

        let (source, mut device) = self.backend.open()?;
        let session_size = source.frame_size();
        self.viewport.set_source_size(session_size);

        let mut resources = ResourceSet::new(&mut device, self.viewport.bounds().size())?;
        let mut fps = FpsCounter::new(self.config.fps_sample_period);
        let resized = self.viewport.resized().clone();

        self.state = PipelineState::Running;
        info!(size = %session_size, "Render session started");

        loop {
            fps.measure("wait", || wait_for_work(&source, &resized, &self.cancel))?;

            // Release the frame as soon as it is copied
            if let Some(frame) = source.take_latest_frame()? {
                let actual = frame.size();
                if actual != session_size {
                    return Err(RenderError::CaptureSizeChanged {
                        expected: session_size,
                        actual,
                    });
                }
                fps.measure("input", || resources.input.update(&mut device, &frame))?;
            }

            let view = self.viewport.snapshot();
            fps.measure("draw", || -> RenderResult<()> {
                resources.surface.update(&mut device, view.size())?;
                resources
                    .vertices
                    .update(&mut device, view.image_size, view.angle)?;
                resources.draw(&mut device)
            })?;
            fps.measure("present", || resources.present(&mut device))?;
            fps.track();
        }
    }
}

/// Block until a frame arrives or the viewport changes, whichever is first
fn wait_for_work<S: FrameSource>(
    source: &S,
    resized: &Receiver<()>,
    cancel: &CancelToken,
) -> RenderResult<()> {
    cancel.check()?;
    select! {
        recv(source.frame_ready()) -> _ => {}
        recv(resized) -> _ => {}
        recv(cancel.receiver()) -> _ => return Err(RenderError::Cancelled),
    }
    Ok(cancel.check()?)
}
