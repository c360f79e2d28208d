//! Single-slot "latest frame" handoff
//!
//! The capture source publishes from its own thread, the render loop takes
//! from another. A newer frame replaces (and drops) an untaken older one, so
//! the consumer only ever sees the most recent frame and never a backlog.

use crate::sync::{CancelToken, Signal};
use crate::{CaptureError, CaptureResult};
use crossbeam_channel::{select, Receiver};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct FrameMailbox<F> {
    slot: Mutex<Option<F>>,
    ready: Signal,
    closed: AtomicBool,
    dropped: AtomicU64,
}

impl<F> FrameMailbox<F> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Signal::new(),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    /// Store `frame` as the latest one and wake the consumer.
    pub fn publish(&self, frame: F) {
        let stale = self.slot.lock().replace(frame);
        if stale.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        // Release the stale frame outside the lock.
        drop(stale);
        self.ready.notify();
    }

    /// Take the newest frame, or `None` if nothing arrived since the last take.
    pub fn take_latest(&self) -> CaptureResult<Option<F>> {
        self.ensure_open()?;
        Ok(self.slot.lock().take())
    }

    /// Block until a frame notification arrives or `cancel` fires.
    pub fn wait_for_frame(&self, cancel: &CancelToken) -> CaptureResult<()> {
        self.ensure_open()?;
        cancel.check()?;
        select! {
            recv(self.ready.receiver()) -> _ => {}
            recv(cancel.receiver()) -> _ => return Err(CaptureError::Cancelled),
        }
        self.ensure_open()
    }

    /// Mark the source as gone; pending and future waits fail with `TargetClosed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.slot.lock().take();
        self.ready.notify();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Ready whenever a frame was published (or the mailbox closed).
    pub fn ready(&self) -> &Receiver<()> {
        self.ready.receiver()
    }

    /// Frames replaced before the consumer took them
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> CaptureResult<()> {
        if self.is_closed() {
            Err(CaptureError::TargetClosed)
        } else {
            Ok(())
        }
    }
}

impl<F> Default for FrameMailbox<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn take_twice_without_arrival_returns_none() {
        let mailbox = FrameMailbox::new();
        mailbox.publish(1u32);

        assert_eq!(mailbox.take_latest().unwrap(), Some(1));
        assert_eq!(mailbox.take_latest().unwrap(), None);
    }

    #[test]
    fn newer_frame_replaces_untaken_one() {
        let mailbox = FrameMailbox::new();
        mailbox.publish(1u32);
        mailbox.publish(2);
        mailbox.publish(3);

        assert_eq!(mailbox.take_latest().unwrap(), Some(3));
        assert_eq!(mailbox.dropped_frames(), 2);
    }

    #[test]
    fn wait_returns_after_publish_from_other_thread() {
        let mailbox = Arc::new(FrameMailbox::new());
        let producer = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            producer.publish(7u32);
        });

        let cancel = CancelToken::new();
        mailbox.wait_for_frame(&cancel).unwrap();
        handle.join().unwrap();

        assert_eq!(mailbox.take_latest().unwrap(), Some(7));
    }

    #[test]
    fn wait_fails_when_cancelled() {
        let mailbox: FrameMailbox<u32> = FrameMailbox::new();
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remote.cancel();
        });

        let result = mailbox.wait_for_frame(&cancel);
        handle.join().unwrap();

        assert!(matches!(result, Err(CaptureError::Cancelled)));
    }

    #[test]
    fn closed_mailbox_reports_target_closed() {
        let mailbox = FrameMailbox::new();
        mailbox.publish(1u32);
        mailbox.close();

        let cancel = CancelToken::new();
        assert!(matches!(mailbox.take_latest(), Err(CaptureError::TargetClosed)));
        assert!(matches!(
            mailbox.wait_for_frame(&cancel),
            Err(CaptureError::TargetClosed)
        ));
    }
}
