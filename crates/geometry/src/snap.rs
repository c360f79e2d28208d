//! Edge proximity and snapping

use crate::{Point, Rect, Size};

/// Which edges of a box a point lies near
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeProximity {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl EdgeProximity {
    /// Number of edges the point is near
    pub fn count(&self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .filter(|near| **near)
            .count()
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

/// Classify `point` (relative to the box origin) against the edges of a box
/// of `size`.
///
/// An edge counts as near when the point is at most `zone_in` pixels inside
/// it or `zone_out` pixels outside it. Points farther than `zone_out` from the
/// box on either axis are near nothing.
pub fn near_edges(point: Point, size: Size, zone_in: i32, zone_out: i32) -> EdgeProximity {
    let band = Rect::new(
        -zone_out,
        -zone_out,
        size.width + 2 * zone_out + 1,
        size.height + 2 * zone_out + 1,
    );
    if !band.contains(point.x, point.y) {
        return EdgeProximity::default();
    }

    EdgeProximity {
        left: point.x <= zone_in && point.x >= -zone_out,
        right: point.x >= size.width - zone_in && point.x <= size.width + zone_out,
        top: point.y <= zone_in && point.y >= -zone_out,
        bottom: point.y >= size.height - zone_in && point.y <= size.height + zone_out,
    }
}

/// Clamp each side of `rect` onto the matching side of a `parent` surface
/// when it lies within `distance` pixels of it. Only moves the rectangle.
pub fn snap_rect(rect: Rect, parent: Size, distance: i32) -> Rect {
    let mut snapped = rect;

    if snapped.x.abs() <= distance {
        snapped.x = 0;
    }

    if (parent.width - snapped.right()).abs() <= distance {
        snapped.x = parent.width - snapped.width;
    }

    if snapped.y.abs() <= distance {
        snapped.y = 0;
    }

    if (parent.height - snapped.bottom()).abs() <= distance {
        snapped.y = parent.height - snapped.height;
    }

    snapped
}

/// Snap `angle` to the nearest multiple of `step` when it is within
/// `threshold` degrees of it.
pub fn snap_angle(angle: f64, step: f64, threshold: f64) -> f64 {
    let nearest = step * (angle / step).round();
    if (angle - nearest).abs() <= threshold {
        nearest
    } else {
        angle
    }
}
