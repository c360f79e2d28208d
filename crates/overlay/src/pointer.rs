//! Raw pointer events as delivered by the host window

use geometry::Point;

/// Mouse buttons, as a bit set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerButtons(u8);

impl PointerButtons {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const RIGHT: Self = Self(1 << 1);
    pub const MIDDLE: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for PointerButtons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Move,
    /// Wheel rotation; buttons are the ones currently held
    Wheel,
}

/// One pointer change in host client coordinates.
///
/// For `Down`/`Up` the buttons are the ones that changed; for `Move` they
/// are the ones currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub buttons: PointerButtons,
    pub clicks: u32,
    pub location: Point,
    pub wheel_delta: i32,
    pub kind: PointerKind,
}

impl PointerState {
    pub fn new(kind: PointerKind, buttons: PointerButtons, location: Point) -> Self {
        Self {
            buttons,
            clicks: if kind == PointerKind::Down { 1 } else { 0 },
            location,
            wheel_delta: 0,
            kind,
        }
    }

    /// A press that completes a multi-click, e.g. 2 for a double click
    pub fn with_clicks(mut self, clicks: u32) -> Self {
        if self.kind == PointerKind::Down {
            self.clicks = clicks;
        }
        self
    }

    /// Wheel rotation in multiples of `WHEEL_DELTA` (120 per notch)
    pub fn wheel(buttons: PointerButtons, location: Point, delta: i32) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::new(PointerKind::Wheel, buttons, location)
        }
    }

    pub fn left_held(&self) -> bool {
        self.buttons.contains(PointerButtons::LEFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_set_membership() {
        let held = PointerButtons::LEFT | PointerButtons::MIDDLE;
        assert!(held.contains(PointerButtons::LEFT));
        assert!(!held.contains(PointerButtons::RIGHT));
        assert!(!held.contains(PointerButtons::NONE));
        assert!(PointerButtons::NONE.is_empty());
    }

    #[test]
    fn double_click_is_a_press() {
        let at = Point::new(10, 20);
        let press = PointerState::new(PointerKind::Down, PointerButtons::LEFT, at).with_clicks(2);
        assert_eq!(press.clicks, 2);
        assert!(press.left_held());

        let moved = PointerState::new(PointerKind::Move, PointerButtons::LEFT, at).with_clicks(2);
        assert_eq!(moved.clicks, 0);
    }

    #[test]
    fn wheel_carries_delta_only() {
        let wheel = PointerState::wheel(PointerButtons::NONE, Point::new(5, 5), -240);
        assert_eq!(wheel.kind, PointerKind::Wheel);
        assert_eq!(wheel.wheel_delta, -240);
        assert_eq!(wheel.clicks, 0);
    }
}
