//! Arbitration of pointer events between the gesture handlers

use super::{
    DragHandler, HandlerContext, InteractionHandler, ResizeHandler, RotateHandler, ViewportChange,
};
use crate::cursor::CursorShape;
use crate::pointer::{PointerKind, PointerState};
use geometry::Size;
use render::SharedViewport;
use tracing::{info, trace, warn};

/// What the host should do after a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionOutcome {
    /// The viewport bounds or angle were changed
    pub changed: bool,
    pub cursor: CursorShape,
    /// The outline around the viewport needs repainting
    pub repaint_outline: bool,
    /// A gesture is in progress, so the host should hold pointer capture
    pub dragging: bool,
}

/// Routes pointer events to one handler at a time
pub struct InteractionMachine {
    handlers: Vec<Box<dyn InteractionHandler + Send>>,
    active: Option<usize>,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            handlers: vec![
                Box::new(RotateHandler::new()),
                Box::new(ResizeHandler::new()),
                Box::new(DragHandler::new()),
            ],
            active: None,
        }
    }

    /// Name of the handler currently owning the pointer
    pub fn active(&self) -> Option<&'static str> {
        self.active.map(|index| self.handlers[index].name())
    }

    pub fn is_dragging(&self) -> bool {
        self.active
            .is_some_and(|index| self.handlers[index].is_dragging())
    }

    pub fn handle_pointer(
        &mut self,
        pointer: PointerState,
        client: Size,
        viewport: &SharedViewport,
    ) -> InteractionOutcome {
        let ctx = HandlerContext {
            pointer,
            bounds: viewport.bounds(),
            angle: viewport.angle(),
            client,
        };
        let outlined_before = viewport.needs_outline();

        self.determine_active(&ctx);

        let mut changed = false;
        if let Some(index) = self.active {
            let handler = &mut self.handlers[index];
            match pointer.kind {
                PointerKind::Down => {
                    if pointer.left_held() && !handler.is_dragging() {
                        handler.start_drag(&ctx);
                        info!(handler = handler.name(), clicks = pointer.clicks, "Start dragging");
                    }
                }
                PointerKind::Up => {
                    if handler.is_dragging() {
                        handler.stop_drag();
                        info!(handler = handler.name(), "Stop dragging");
                    }
                }
                PointerKind::Move => {
                    // The button can be released outside the window without an Up
                    if handler.is_dragging() && !pointer.left_held() {
                        warn!(
                            handler = handler.name(),
                            "Was dragging but not holding left button"
                        );
                        handler.stop_drag();
                    }

                    if handler.is_dragging() {
                        match handler.on_drag(&ctx) {
                            Some(ViewportChange::Bounds(bounds)) => {
                                viewport.set_bounds(bounds);
                                changed = true;
                            }
                            Some(ViewportChange::Angle(angle)) => {
                                viewport.set_angle(angle);
                                changed = true;
                            }
                            None => {}
                        }
                    }
                }
                PointerKind::Wheel => {
                    trace!(handler = handler.name(), delta = pointer.wheel_delta, "Wheel ignored");
                }
            }
        }

        let cursor = self
            .active
            .map_or(CursorShape::Arrow, |index| self.handlers[index].cursor(&ctx));

        InteractionOutcome {
            changed,
            cursor,
            repaint_outline: changed && (outlined_before || viewport.needs_outline()),
            dragging: self.is_dragging(),
        }
    }

    fn determine_active(&mut self, ctx: &HandlerContext) {
        if let Some(index) = self.active {
            if self.handlers[index].can_be_active(ctx) {
                return;
            }
        }

        let next = self
            .handlers
            .iter()
            .position(|handler| handler.can_be_active(ctx));
        if next != self.active {
            trace!(
                from = self.active.map(|index| self.handlers[index].name()),
                to = next.map(|index| self.handlers[index].name()),
                "Active handler changed"
            );
            self.active = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::test_support::{at_local, BOUNDS, CLIENT};
    use crate::pointer::PointerButtons;
    use capture_wgc::FrameSize;
    use geometry::Rect;

    fn viewport() -> SharedViewport {
        SharedViewport::new(BOUNDS, FrameSize::new(400, 300))
    }

    fn send(
        machine: &mut InteractionMachine,
        viewport: &SharedViewport,
        kind: PointerKind,
        x: i32,
        y: i32,
    ) -> InteractionOutcome {
        machine.handle_pointer(at_local(kind, x, y).pointer, CLIENT, viewport)
    }

    #[test]
    fn rotate_wins_outside_an_edge() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        let outcome = send(&mut machine, &viewport, PointerKind::Move, 405, 150);
        assert_eq!(machine.active(), Some("rotate"));
        assert_eq!(outcome.cursor, CursorShape::Hand);
        assert!(!outcome.changed);

        send(&mut machine, &viewport, PointerKind::Move, 395, 150);
        assert_eq!(machine.active(), Some("resize"));

        send(&mut machine, &viewport, PointerKind::Move, 200, 150);
        assert_eq!(machine.active(), Some("drag"));

        let outcome = send(&mut machine, &viewport, PointerKind::Move, 700, 150);
        assert_eq!(machine.active(), None);
        assert_eq!(outcome.cursor, CursorShape::Arrow);
    }

    #[test]
    fn active_handler_keeps_pointer_while_dragging() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        let outcome = send(&mut machine, &viewport, PointerKind::Down, 395, 150);
        assert_eq!(machine.active(), Some("resize"));
        assert!(outcome.dragging);

        // Inside drag territory, then inside rotate territory
        send(&mut machine, &viewport, PointerKind::Move, 200, 150);
        assert_eq!(machine.active(), Some("resize"));
        let outcome = send(&mut machine, &viewport, PointerKind::Move, 405, 150);
        assert_eq!(machine.active(), Some("resize"));
        assert_eq!(outcome.cursor, CursorShape::SizeWe);
        assert!(outcome.changed);

        let outcome = send(&mut machine, &viewport, PointerKind::Up, 405, 150);
        assert!(!outcome.dragging);
    }

    #[test]
    fn missed_release_stops_gesture() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        send(&mut machine, &viewport, PointerKind::Down, 200, 150);
        assert!(machine.is_dragging());

        let released = PointerState::new(
            PointerKind::Move,
            PointerButtons::NONE,
            at_local(PointerKind::Move, 260, 150).pointer.location,
        );
        let outcome = machine.handle_pointer(released, CLIENT, &viewport);
        assert!(!outcome.dragging);
        assert!(!outcome.changed);
        assert_eq!(viewport.bounds(), BOUNDS);
    }

    #[test]
    fn drag_moves_viewport() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        send(&mut machine, &viewport, PointerKind::Down, 200, 150);
        let outcome = send(&mut machine, &viewport, PointerKind::Move, 250, 170);
        assert!(outcome.changed);
        assert!(!outcome.repaint_outline);
        assert_eq!(viewport.bounds(), Rect::new(150, 120, 400, 300));
    }

    #[test]
    fn double_click_press_starts_gesture() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        let at = at_local(PointerKind::Down, 200, 150).pointer;
        let outcome = machine.handle_pointer(at.with_clicks(2), CLIENT, &viewport);
        assert_eq!(machine.active(), Some("drag"));
        assert!(outcome.dragging);
    }

    #[test]
    fn wheel_leaves_viewport_alone() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        send(&mut machine, &viewport, PointerKind::Down, 200, 150);
        let location = at_local(PointerKind::Move, 250, 150).pointer.location;
        let outcome =
            machine.handle_pointer(PointerState::wheel(PointerButtons::LEFT, location, 120), CLIENT, &viewport);
        assert!(!outcome.changed);
        assert!(outcome.dragging);
        assert_eq!(viewport.bounds(), BOUNDS);
    }

    #[test]
    fn tilting_requests_outline() {
        let viewport = viewport();
        let mut machine = InteractionMachine::new();

        send(&mut machine, &viewport, PointerKind::Down, 405, 150);
        let outcome = send(&mut machine, &viewport, PointerKind::Move, 405, 250);
        assert!(outcome.changed);
        assert!(outcome.repaint_outline);
        assert!(viewport.angle() > 0.0);
    }
}
