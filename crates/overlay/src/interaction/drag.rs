//! Moving the viewport by dragging its interior

use super::{DragStartInfo, HandlerContext, InteractionHandler, ViewportChange};
use geometry::{snap_rect, Rect};
use tracing::debug;

/// Edges closer than this to the host edge stick to it
pub const SNAP_DISTANCE: i32 = 15;

/// Moves the viewport while the pointer is held inside it
#[derive(Debug, Default)]
pub struct DragHandler {
    drag: Option<DragStartInfo<()>>,
}

impl DragHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionHandler for DragHandler {
    fn name(&self) -> &'static str {
        "drag"
    }

    fn can_be_active(&self, ctx: &HandlerContext) -> bool {
        let local = ctx.local_pointer();
        let size = ctx.bounds.size();
        self.is_dragging() || Rect::new(0, 0, size.width, size.height).contains(local.x, local.y)
    }

    fn start_drag(&mut self, ctx: &HandlerContext) {
        self.drag = Some(DragStartInfo::new(ctx, ()));
    }

    fn on_drag(&mut self, ctx: &HandlerContext) -> Option<ViewportChange> {
        let start = self.drag.as_ref()?;
        let delta = ctx.pointer.location - start.pointer_down;

        let moved = start.original_bounds.offset(delta.x, delta.y);
        let bounds = snap_rect(moved, ctx.client, SNAP_DISTANCE);
        debug!(dx = delta.x, dy = delta.y, x = bounds.x, y = bounds.y, "Drag");

        Some(ViewportChange::Bounds(bounds))
    }

    fn stop_drag(&mut self) {
        self.drag = None;
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::test_support::at_local;
    use crate::pointer::PointerKind;

    #[test]
    fn active_only_inside_bounds() {
        let handler = DragHandler::new();
        assert!(handler.can_be_active(&at_local(PointerKind::Move, 200, 150)));
        assert!(!handler.can_be_active(&at_local(PointerKind::Move, 400, 150)));
        assert!(!handler.can_be_active(&at_local(PointerKind::Move, -1, 150)));
    }

    #[test]
    fn drag_translates_by_pointer_delta() {
        let mut handler = DragHandler::new();
        handler.start_drag(&at_local(PointerKind::Down, 200, 150));

        let change = handler.on_drag(&at_local(PointerKind::Move, 250, 170));
        assert_eq!(change, Some(ViewportChange::Bounds(Rect::new(150, 120, 400, 300))));
    }

    #[test]
    fn drag_snaps_near_host_edges() {
        let mut handler = DragHandler::new();
        handler.start_drag(&at_local(PointerKind::Down, 200, 150));

        // Left edge lands at x = 10
        let change = handler.on_drag(&at_local(PointerKind::Move, 110, 150));
        assert_eq!(change, Some(ViewportChange::Bounds(Rect::new(0, 100, 400, 300))));

        // Bottom edge lands 5px past the host bottom
        let change = handler.on_drag(&at_local(PointerKind::Move, 200, 355));
        assert_eq!(change, Some(ViewportChange::Bounds(Rect::new(100, 300, 400, 300))));
    }

    #[test]
    fn stop_clears_gesture() {
        let mut handler = DragHandler::new();
        handler.start_drag(&at_local(PointerKind::Down, 10, 10));
        assert!(handler.is_dragging());
        assert!(handler.can_be_active(&at_local(PointerKind::Move, 900, 900)));

        handler.stop_drag();
        assert!(!handler.is_dragging());
        assert_eq!(handler.on_drag(&at_local(PointerKind::Move, 20, 20)), None);
    }
}
