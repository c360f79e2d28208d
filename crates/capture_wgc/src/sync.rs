//! Wake-up signal and cooperative cancellation

use crate::{CaptureError, CaptureResult};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Coalescing wake-up signal.
///
/// Any number of `notify` calls between two receives collapse into a single
/// pending wake-up. The receiver side is meant to be used in `select!`.
#[derive(Clone)]
pub struct Signal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Signal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Raise the signal; a no-op if a wake-up is already pending.
    pub fn notify(&self) {
        let _ = self.tx.try_send(());
    }

    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

struct CancelInner {
    cancelled: AtomicBool,
    // Dropping the sender disconnects every cloned receiver at once.
    tx: Mutex<Option<Sender<()>>>,
}

/// Cancellation token shared between a session owner and its worker.
///
/// Waits that include `receiver()` in a `select!` wake up as soon as
/// `cancel()` is called.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                tx: Mutex::new(Some(tx)),
            }),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.tx.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with `Cancelled` once the token has been cancelled.
    pub fn check(&self) -> CaptureResult<()> {
        if self.is_cancelled() {
            Err(CaptureError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Becomes ready (disconnected) on cancellation.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }

    /// Sleep for `duration` unless cancelled first.
    pub fn sleep(&self, duration: Duration) -> CaptureResult<()> {
        self.check()?;
        select! {
            recv(self.rx) -> _ => Err(CaptureError::Cancelled),
            default(duration) => Ok(()),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn signal_coalesces_notifications() {
        let signal = Signal::new();
        signal.notify();
        signal.notify();
        signal.notify();
        assert!(signal.receiver().try_recv().is_ok());
        assert!(signal.receiver().try_recv().is_err());
    }

    #[test]
    fn sleep_completes_without_cancel() {
        let token = CancelToken::new();
        assert!(token.sleep(Duration::from_millis(5)).is_ok());
    }

    #[test]
    fn cancel_interrupts_sleep() {
        let token = CancelToken::new();
        let remote = token.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let result = token.sleep(Duration::from_secs(30));
        handle.join().unwrap();

        assert!(matches!(result, Err(CaptureError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancelled_token_fails_immediately() {
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(token.check(), Err(CaptureError::Cancelled)));
        assert!(matches!(
            token.sleep(Duration::from_secs(30)),
            Err(CaptureError::Cancelled)
        ));
    }
}
