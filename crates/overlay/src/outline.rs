//! 1px frame around a tilted viewport

use geometry::Rect;

pub const OUTLINE_THICKNESS: i32 = 1;

/// Rectangle the outline is stroked along: the viewport bounds grown by the
/// pen width so the frame sits just outside the rendered surface.
pub fn outline_rect(bounds: Rect) -> Rect {
    Rect::new(
        bounds.x - OUTLINE_THICKNESS,
        bounds.y - OUTLINE_THICKNESS,
        bounds.width + 2 * OUTLINE_THICKNESS,
        bounds.height + 2 * OUTLINE_THICKNESS,
    )
}

#[cfg(windows)]
pub(crate) use paint::paint_outline;

#[cfg(windows)]
mod paint {
    use super::{outline_rect, OUTLINE_THICKNESS};
    use geometry::Rect;
    use windows::Win32::Foundation::COLORREF;
    use windows::Win32::Graphics::Gdi::{
        CreatePen, DeleteObject, GetStockObject, Rectangle, SelectObject, HDC, HOLLOW_BRUSH,
        PS_SOLID,
    };

    /// Light grey, visible against both black letterboxing and most content
    const OUTLINE_COLOR: COLORREF = COLORREF(0x00C0_C0C0);

    /// Stroke the outline for `bounds` onto a device context from `BeginPaint`
    pub(crate) unsafe fn paint_outline(hdc: HDC, bounds: Rect) {
        let rect = outline_rect(bounds);

        let pen = CreatePen(PS_SOLID, OUTLINE_THICKNESS, OUTLINE_COLOR);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, GetStockObject(HOLLOW_BRUSH));

        let _ = Rectangle(hdc, rect.x, rect.y, rect.right(), rect.bottom());

        let _ = SelectObject(hdc, old_pen);
        let _ = SelectObject(hdc, old_brush);
        let _ = DeleteObject(pen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_hugs_bounds() {
        let rect = outline_rect(Rect::new(100, 50, 300, 200));
        assert_eq!(rect, Rect::new(99, 49, 302, 202));
    }
}
