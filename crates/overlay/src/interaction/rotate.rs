//! Rotation from just outside a single edge, snapping to 30 degree steps

use super::{DragStartInfo, HandlerContext, InteractionHandler, ViewportChange};
use crate::cursor::CursorShape;
use geometry::{near_edges, snap_angle, Point};
use tracing::debug;

/// Rotation grips start at the viewport edge and reach this far outside it
const ZONE_OUT: i32 = 25;
const SNAP_STEP: f64 = 30.0;
const SNAP_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RotateStart {
    initial_angle: f64,
    /// Viewport center in host client coordinates
    pivot: Point,
    pointer_angle: f64,
}

fn angle_around(pivot: Point, pointer: Point) -> f64 {
    let delta = pointer - pivot;
    (delta.y as f64).atan2(delta.x as f64).to_degrees()
}

/// Spins the viewport when dragged from just outside one of its edges
#[derive(Debug, Default)]
pub struct RotateHandler {
    drag: Option<DragStartInfo<RotateStart>>,
}

impl RotateHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InteractionHandler for RotateHandler {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn can_be_active(&self, ctx: &HandlerContext) -> bool {
        // Corners belong to resizing
        self.is_dragging()
            || near_edges(ctx.local_pointer(), ctx.bounds.size(), 0, ZONE_OUT).count() == 1
    }

    fn start_drag(&mut self, ctx: &HandlerContext) {
        let pivot = ctx.bounds.center();
        let start = RotateStart {
            initial_angle: ctx.angle,
            pivot,
            pointer_angle: angle_around(pivot, ctx.pointer.location),
        };
        self.drag = Some(DragStartInfo::new(ctx, start));
    }

    fn on_drag(&mut self, ctx: &HandlerContext) -> Option<ViewportChange> {
        let start = self.drag.as_ref()?.aux;

        let current = angle_around(start.pivot, ctx.pointer.location);
        let raw = start.initial_angle + (current - start.pointer_angle);
        let angle = snap_angle(raw, SNAP_STEP, SNAP_THRESHOLD);
        debug!(raw, angle, "Rotate");

        Some(ViewportChange::Angle(angle))
    }

    fn stop_drag(&mut self) {
        self.drag = None;
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn cursor(&self, _ctx: &HandlerContext) -> CursorShape {
        CursorShape::Hand
    }
}
