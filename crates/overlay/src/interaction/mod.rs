//! Pointer gesture handlers and the arbitration between them
//!
//! Handlers are kept in a fixed priority order (rotate, resize, drag). The
//! active handler stays active for as long as it still wants to; otherwise the
//! first handler that wants the pointer takes over. Only the active handler
//! sees pointer events.

mod drag;
mod machine;
mod resize;
mod rotate;

pub use drag::DragHandler;
pub use machine::{InteractionMachine, InteractionOutcome};
pub use resize::{ResizeHandle, ResizeHandler};
pub use rotate::RotateHandler;

use crate::cursor::CursorShape;
use crate::pointer::PointerState;
use geometry::{Point, Rect, Size};

/// Everything a handler may look at for one pointer event
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext {
    pub pointer: PointerState,
    /// Viewport bounds in host client coordinates
    pub bounds: Rect,
    pub angle: f64,
    /// Host client area size
    pub client: Size,
}

impl HandlerContext {
    /// Pointer relative to the viewport's top-left corner
    pub fn local_pointer(&self) -> Point {
        self.pointer.location - self.bounds.location()
    }
}

/// Snapshot taken when a gesture starts; its presence means "dragging"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStartInfo<T> {
    pub original_bounds: Rect,
    /// Pointer location at press, in host client coordinates
    pub pointer_down: Point,
    pub aux: T,
}

impl<T> DragStartInfo<T> {
    fn new(ctx: &HandlerContext, aux: T) -> Self {
        Self {
            original_bounds: ctx.bounds,
            pointer_down: ctx.pointer.location,
            aux,
        }
    }
}

/// Mutation a handler asks for in response to a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportChange {
    Bounds(Rect),
    Angle(f64),
}

pub trait InteractionHandler {
    fn name(&self) -> &'static str;

    /// Whether this handler wants to own the pointer: mid-gesture, or the
    /// pointer is inside its activation zone.
    fn can_be_active(&self, ctx: &HandlerContext) -> bool;

    fn start_drag(&mut self, ctx: &HandlerContext);

    fn on_drag(&mut self, ctx: &HandlerContext) -> Option<ViewportChange>;

    fn stop_drag(&mut self);

    fn is_dragging(&self) -> bool;

    fn cursor(&self, _ctx: &HandlerContext) -> CursorShape {
        CursorShape::Arrow
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::HandlerContext;
    use crate::pointer::{PointerButtons, PointerKind, PointerState};
    use geometry::{Point, Rect, Size};

    pub(crate) const BOUNDS: Rect = Rect {
        x: 100,
        y: 100,
        width: 400,
        height: 300,
    };

    pub(crate) const CLIENT: Size = Size {
        width: 800,
        height: 600,
    };

    /// Left-button context for a pointer given relative to `BOUNDS`
    pub(crate) fn at_local(kind: PointerKind, x: i32, y: i32) -> HandlerContext {
        let location = Point::new(BOUNDS.x + x, BOUNDS.y + y);
        HandlerContext {
            pointer: PointerState::new(kind, PointerButtons::LEFT, location),
            bounds: BOUNDS,
            angle: 0.0,
            client: CLIENT,
        }
    }
}
