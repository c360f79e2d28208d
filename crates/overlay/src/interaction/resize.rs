//! Aspect-locked resizing from the viewport's edges and corners

use super::{DragStartInfo, HandlerContext, InteractionHandler, ViewportChange};
use crate::cursor::CursorShape;
use geometry::{near_edges, EdgeProximity, Point, Rect, Size};
use tracing::trace;

const ZONE_IN: i32 = 10;
const ZONE_OUT: i32 = 10;
/// Pointer closer than this to a host edge is pinned onto it
const SNAP_DISTANCE: i32 = 15;
/// Floor for the side a handle drives
pub const MIN_SIZE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// Corners win over edges
    pub fn from_edges(edges: EdgeProximity) -> Option<Self> {
        let handle = match (edges.left, edges.right, edges.top, edges.bottom) {
            (true, _, true, _) => ResizeHandle::TopLeft,
            (_, true, true, _) => ResizeHandle::TopRight,
            (true, _, _, true) => ResizeHandle::BottomLeft,
            (_, true, _, true) => ResizeHandle::BottomRight,
            (true, _, _, _) => ResizeHandle::Left,
            (_, true, _, _) => ResizeHandle::Right,
            (_, _, true, _) => ResizeHandle::Top,
            (_, _, _, true) => ResizeHandle::Bottom,
            _ => return None,
        };
        Some(handle)
    }

    pub fn cursor(self) -> CursorShape {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => CursorShape::SizeNwse,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => CursorShape::SizeNesw,
            ResizeHandle::Left | ResizeHandle::Right => CursorShape::SizeWe,
            ResizeHandle::Top | ResizeHandle::Bottom => CursorShape::SizeNs,
        }
    }

    fn moves_left_edge(self) -> bool {
        matches!(
            self,
            ResizeHandle::Left | ResizeHandle::TopLeft | ResizeHandle::BottomLeft
        )
    }

    fn moves_top_edge(self) -> bool {
        matches!(
            self,
            ResizeHandle::Top | ResizeHandle::TopLeft | ResizeHandle::TopRight
        )
    }

    /// Top and bottom handles drive the height, everything else the width
    fn drives_height(self) -> bool {
        matches!(self, ResizeHandle::Top | ResizeHandle::Bottom)
    }
}

/// Pin a pointer near the host edges onto them, reporting which handle the
/// pinned pointer should act as.
fn snap_pointer(location: Point, client: Size) -> Option<(ResizeHandle, Point)> {
    let edges = near_edges(location, client, SNAP_DISTANCE, SNAP_DISTANCE);
    let handle = ResizeHandle::from_edges(edges)?;

    let x = if edges.left {
        0
    } else if edges.right {
        client.width
    } else {
        location.x
    };
    let y = if edges.top {
        0
    } else if edges.bottom {
        client.height
    } else {
        location.y
    };

    // An edge handle only pins its own axis
    let pinned = match handle {
        ResizeHandle::Left | ResizeHandle::Right => Point::new(x, location.y),
        ResizeHandle::Top | ResizeHandle::Bottom => Point::new(location.x, y),
        _ => Point::new(x, y),
    };
    Some((handle, pinned))
}

/// Resize `original` by the pointer delta, keeping its aspect ratio and the
/// corner or edge opposite `handle` in place.
pub fn resize_bounds(original: Rect, handle: ResizeHandle, dx: i32, dy: i32) -> Rect {
    let aspect = original.aspect();

    let (width, height) = if handle.drives_height() {
        let height = if handle.moves_top_edge() {
            original.height - dy
        } else {
            original.height + dy
        }
        .max(MIN_SIZE);
        ((height as f64 * aspect).round() as i32, height)
    } else {
        let width = if handle.moves_left_edge() {
            original.width - dx
        } else {
            original.width + dx
        }
        .max(MIN_SIZE);
        (width, (width as f64 / aspect).round() as i32)
    };

    let x = if handle.moves_left_edge() {
        original.right() - width
    } else {
        original.x
    };
    let y = if handle.moves_top_edge() {
        original.bottom() - height
    } else {
        original.y
    };

    Rect::new(x, y, width, height)
}

#[derive(Debug, Default)]
pub struct ResizeHandler {
    drag: Option<DragStartInfo<ResizeHandle>>,
}

impl ResizeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle_at(ctx: &HandlerContext) -> Option<ResizeHandle> {
        let edges = near_edges(ctx.local_pointer(), ctx.bounds.size(), ZONE_IN, ZONE_OUT);
        ResizeHandle::from_edges(edges)
    }
}

impl InteractionHandler for ResizeHandler {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn can_be_active(&self, ctx: &HandlerContext) -> bool {
        self.is_dragging() || Self::handle_at(ctx).is_some()
    }

    fn start_drag(&mut self, ctx: &HandlerContext) {
        // Activation guarantees a handle; fall back to the corner that grows
        // away from the origin.
        let handle = Self::handle_at(ctx).unwrap_or(ResizeHandle::BottomRight);
        self.drag = Some(DragStartInfo::new(ctx, handle));
    }

    fn on_drag(&mut self, ctx: &HandlerContext) -> Option<ViewportChange> {
        let start = self.drag.as_ref()?;

        let (handle, pointer) =
            snap_pointer(ctx.pointer.location, ctx.client).unwrap_or((start.aux, ctx.pointer.location));
        let dx = pointer.x - start.pointer_down.x;
        let dy = pointer.y - start.pointer_down.y;

        let original = start.original_bounds;
        let bounds = resize_bounds(original, handle, dx, dy);
        if bounds != original {
            trace!(
                handle = ?start.aux,
                acting_as = ?handle,
                old = ?original.size(),
                new = ?bounds.size(),
                x = bounds.x,
                y = bounds.y,
                "Resize"
            );
        }

        Some(ViewportChange::Bounds(bounds))
    }

    fn stop_drag(&mut self) {
        self.drag = None;
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn cursor(&self, ctx: &HandlerContext) -> CursorShape {
        self.drag
            .as_ref()
            .map(|start| start.aux)
            .or_else(|| Self::handle_at(ctx))
            .map_or(CursorShape::Arrow, ResizeHandle::cursor)
    }
}
