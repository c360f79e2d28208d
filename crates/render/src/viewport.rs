//! Viewport shared between the interaction layer and the render loop
//!
//! The interaction handlers write bounds and angle from the UI thread while
//! the render loop reads a snapshot once per iteration. Every size change is
//! re-fitted so the rotated image exactly fills the bounds, and raises the
//! `resized` signal the render loop waits on.

use capture_wgc::{FrameSize, Signal};
use crossbeam_channel::Receiver;
use geometry::{bounding_size_from_image, image_size_from_bounding, is_multiple_of_90, Rect, Size};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tracing::trace;

/// Smallest width or height the viewport is allowed to shrink to
pub const MIN_SIDE_LENGTH: i32 = 150;

type LayoutHook = Arc<dyn Fn(Rect) + Send + Sync>;

/// What the render loop needs from the viewport for one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSnapshot {
    pub bounds: Rect,
    pub angle: f64,
    /// Un-rotated image size that fills `bounds` at `angle`
    pub image_size: (f64, f64),
}

impl ViewportSnapshot {
    pub fn size(&self) -> Size {
        self.bounds.size()
    }
}

struct ViewportState {
    bounds: Rect,
    angle: f64,
    source: FrameSize,
    // Kept across pure rotations so repeated inverse fits do not drift
    image_size: Option<(f64, f64)>,
}

impl ViewportState {
    fn image_size(&mut self) -> (f64, f64) {
        let (bounds, angle, aspect) = (self.bounds, self.angle, self.source.aspect());
        *self.image_size.get_or_insert_with(|| {
            image_size_from_bounding(bounds.width as f64, bounds.height as f64, angle, aspect)
        })
    }
}

#[derive(Default)]
struct RecalcOwner {
    thread: Option<ThreadId>,
    /// Another thread changed the viewport while the owner was refitting
    pending: bool,
}

struct Inner {
    state: Mutex<ViewportState>,
    recalc: Mutex<RecalcOwner>,
    resized: Signal,
    layout: Mutex<Option<LayoutHook>>,
}

/// Held by the one thread refitting the viewport.
///
/// Re-entry from the owning thread (a layout hook feeding bounds back) is
/// dropped. Other threads leave a pending mark instead, and the owner runs
/// another pass for them before letting go.
struct RecalcGuard<'a> {
    slot: &'a Mutex<RecalcOwner>,
    released: bool,
}

impl<'a> RecalcGuard<'a> {
    fn enter(slot: &'a Mutex<RecalcOwner>) -> Option<Self> {
        let current = thread::current().id();
        let mut owner = slot.lock();
        match owner.thread {
            None => {
                owner.thread = Some(current);
                Some(Self {
                    slot,
                    released: false,
                })
            }
            Some(id) if id == current => None,
            Some(_) => {
                owner.pending = true;
                None
            }
        }
    }

    /// Release ownership, unless another thread asked for a pass meanwhile
    fn rerun_requested(&mut self) -> bool {
        let mut owner = self.slot.lock();
        if std::mem::take(&mut owner.pending) {
            return true;
        }
        owner.thread = None;
        self.released = true;
        false
    }
}

impl Drop for RecalcGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            *self.slot.lock() = RecalcOwner::default();
        }
    }
}

/// Bounds and rotation of the on-screen image
#[derive(Clone)]
pub struct SharedViewport {
    inner: Arc<Inner>,
}

impl SharedViewport {
    /// Create a viewport at `bounds`, fitted to a source of `source` pixels
    pub fn new(bounds: Rect, source: FrameSize) -> Self {
        let viewport = Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ViewportState {
                    bounds,
                    angle: 0.0,
                    source,
                    image_size: None,
                }),
                recalc: Mutex::new(RecalcOwner::default()),
                resized: Signal::new(),
                layout: Mutex::new(None),
            }),
        };
        viewport.recalculate();
        viewport
    }

    pub fn bounds(&self) -> Rect {
        self.inner.state.lock().bounds
    }

    pub fn angle(&self) -> f64 {
        self.inner.state.lock().angle
    }

    pub fn source_size(&self) -> FrameSize {
        self.inner.state.lock().source
    }

    /// Move or resize the viewport. A size change re-fits the image.
    pub fn set_bounds(&self, bounds: Rect) {
        let size_changed = {
            let mut state = self.inner.state.lock();
            let changed = state.bounds.size() != bounds.size();
            state.bounds = bounds;
            if changed {
                state.image_size = None;
            }
            changed
        };

        if size_changed {
            self.recalculate();
        } else if let Some(mut guard) = RecalcGuard::enter(&self.inner.recalc) {
            self.publish_layout(bounds);
            if guard.rerun_requested() {
                self.refit_until_settled(guard);
            }
        }
    }

    /// Rotate the viewport, keeping the image size and growing or shrinking
    /// the bounds around it.
    pub fn set_angle(&self, angle: f64) {
        self.inner.state.lock().angle = angle;
        self.recalculate();
    }

    /// Re-fit the viewport to a capture source of a different size
    pub fn set_source_size(&self, source: FrameSize) {
        {
            let mut state = self.inner.state.lock();
            if state.source == source {
                return;
            }
            state.source = source;
            state.image_size = None;
        }
        self.recalculate();
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        let mut state = self.inner.state.lock();
        let image_size = state.image_size();
        ViewportSnapshot {
            bounds: state.bounds,
            angle: state.angle,
            image_size,
        }
    }

    /// Ready after any change that alters the rendered output
    pub fn resized(&self) -> &Receiver<()> {
        self.inner.resized.receiver()
    }

    /// Called with the final bounds after every change, so the host can
    /// move its render surface.
    pub fn set_layout_hook(&self, hook: impl Fn(Rect) + Send + Sync + 'static) {
        *self.inner.layout.lock() = Some(Arc::new(hook));
    }

    /// A tilted image leaves the bounds partly uncovered, so the host frames
    /// them with an outline.
    pub fn needs_outline(&self) -> bool {
        !is_multiple_of_90(self.angle())
    }

    fn recalculate(&self) {
        // Layout hooks may feed the new bounds straight back in
        if let Some(guard) = RecalcGuard::enter(&self.inner.recalc) {
            self.refit_until_settled(guard);
        }
    }

    fn refit_until_settled(&self, mut guard: RecalcGuard<'_>) {
        loop {
            let bounds = self.refit();
            self.publish_layout(bounds);
            self.inner.resized.notify();
            if !guard.rerun_requested() {
                break;
            }
        }
    }

    /// Snap the bounds to the rotated image. A missing image size is derived
    /// from the current bounds and source aspect.
    fn refit(&self) -> Rect {
        let mut state = self.inner.state.lock();
        state.bounds.width = state.bounds.width.max(MIN_SIDE_LENGTH);
        state.bounds.height = state.bounds.height.max(MIN_SIDE_LENGTH);

        let cached = state.image_size;
        let (image_w, image_h) = state.image_size();
        if cached.is_none() {
            trace!(width = image_w, height = image_h, "Image size changed");
        }

        let (grid_w, grid_h) = bounding_size_from_image(image_w, image_h, state.angle);
        state.bounds.width = grid_w.round() as i32;
        state.bounds.height = grid_h.round() as i32;
        state.bounds
    }

    fn publish_layout(&self, bounds: Rect) {
        let hook = self.inner.layout.lock().clone();
        if let Some(hook) = hook {
            hook(bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn viewport_4_3() -> SharedViewport {
        SharedViewport::new(Rect::new(10, 20, 400, 300), FrameSize::new(800, 600))
    }

    #[test]
    fn matching_aspect_keeps_bounds() {
        let viewport = viewport_4_3();
        assert_eq!(viewport.bounds(), Rect::new(10, 20, 400, 300));

        let (w, h) = viewport.snapshot().image_size;
        assert!((w - 400.0).abs() < 1e-9);
        assert!((h - 300.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_aspect_is_refitted() {
        let viewport = SharedViewport::new(Rect::new(0, 0, 400, 400), FrameSize::new(800, 600));
        // Height 300 from the width, 400 from the height, averaged to 350
        assert_eq!(viewport.bounds().size(), Size::new(467, 350));
    }

    #[test]
    fn sides_never_drop_below_minimum() {
        let viewport = SharedViewport::new(Rect::new(0, 0, 40, 40), FrameSize::new(100, 100));
        assert_eq!(viewport.bounds().size(), Size::new(150, 150));
    }

    #[test]
    fn quarter_turn_swaps_sides() {
        let viewport = viewport_4_3();
        viewport.set_angle(90.0);
        assert_eq!(viewport.bounds().size(), Size::new(300, 400));
        assert_eq!(viewport.bounds().location(), geometry::Point::new(10, 20));
    }

    #[test]
    fn rotating_back_does_not_drift() {
        let viewport = viewport_4_3();
        for angle in [13.0, 45.0, 77.5, 120.0, 200.0, 0.0] {
            viewport.set_angle(angle);
        }
        assert_eq!(viewport.bounds().size(), Size::new(400, 300));
    }

    #[test]
    fn moving_keeps_size_and_skips_render_signal() {
        let viewport = viewport_4_3();
        while viewport.resized().try_recv().is_ok() {}

        viewport.set_bounds(Rect::new(50, 60, 400, 300));
        assert_eq!(viewport.bounds(), Rect::new(50, 60, 400, 300));
        assert!(viewport.resized().try_recv().is_err());
    }

    #[test]
    fn resize_raises_render_signal() {
        let viewport = viewport_4_3();
        while viewport.resized().try_recv().is_ok() {}

        viewport.set_bounds(Rect::new(10, 20, 800, 600));
        assert!(viewport.resized().try_recv().is_ok());
        assert_eq!(viewport.bounds().size(), Size::new(800, 600));
    }

    #[test]
    fn source_change_refits_aspect() {
        let viewport = viewport_4_3();
        viewport.set_source_size(FrameSize::new(300, 300));
        // Heights 400 and 300 average to 350
        assert_eq!(viewport.bounds().size(), Size::new(350, 350));
    }

    #[test]
    fn layout_hook_cannot_recurse() {
        let viewport = viewport_4_3();
        let calls = Arc::new(AtomicUsize::new(0));

        let hook_viewport = viewport.clone();
        let hook_calls = calls.clone();
        viewport.set_layout_hook(move |bounds| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            // Host reports back a size it could not honour exactly
            hook_viewport.set_bounds(Rect::new(bounds.x, bounds.y, bounds.width + 1, bounds.height));
        });

        viewport.set_angle(90.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn source_change_from_another_thread_is_not_lost() {
        let viewport = viewport_4_3();
        let spawned = Arc::new(AtomicBool::new(false));

        let hook_viewport = viewport.clone();
        let hook_spawned = spawned.clone();
        viewport.set_layout_hook(move |_| {
            if hook_spawned.swap(true, Ordering::SeqCst) {
                return;
            }
            // Render thread resyncs the source while the UI thread is mid-refit
            let render_viewport = hook_viewport.clone();
            thread::spawn(move || render_viewport.set_source_size(FrameSize::new(300, 300)))
                .join()
                .unwrap();
        });

        viewport.set_angle(0.0);

        assert!(spawned.load(Ordering::SeqCst));
        assert_eq!(viewport.source_size(), FrameSize::new(300, 300));
        let (w, h) = viewport.snapshot().image_size;
        assert!((w / h - 1.0).abs() < 1e-9, "image aspect {}", w / h);
        assert_eq!(viewport.bounds().size(), Size::new(350, 350));
    }

    #[test]
    fn size_change_drops_cached_image_size() {
        let viewport = viewport_4_3();
        viewport.set_angle(30.0);

        // Same-thread re-entry is ignored, but the cache must not outlive it
        let hook_viewport = viewport.clone();
        viewport.set_layout_hook(move |bounds| {
            hook_viewport.set_bounds(Rect::new(bounds.x, bounds.y, 600, 450));
        });
        viewport.set_angle(0.0);

        let (w, h) = viewport.snapshot().image_size;
        assert!((w - 600.0).abs() < 1e-9 && (h - 450.0).abs() < 1e-9, "{w}x{h}");
    }

    #[test]
    fn outline_needed_only_off_right_angles() {
        let viewport = viewport_4_3();
        assert!(!viewport.needs_outline());
        viewport.set_angle(30.0);
        assert!(viewport.needs_outline());
        viewport.set_angle(270.0);
        assert!(!viewport.needs_outline());
    }
}
