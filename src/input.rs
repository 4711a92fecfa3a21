use egui::{Key, Modifiers, Pos2, Rect};

/// Keyboard shortcuts the board understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Ctrl/Cmd+Z is undo, Ctrl/Cmd+Shift+Z is redo
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        let command = modifiers.ctrl || modifiers.mac_cmd || modifiers.command;
        if key != Key::Z || !command {
            return None;
        }
        Some(if modifiers.shift { Shortcut::Redo } else { Shortcut::Undo })
    }
}

/// Pointer events in backing-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
    Cancel,
}

/// Map a screen position inside `canvas_rect` to backing pixels
pub fn canvas_position(pos: Pos2, canvas_rect: Rect, device_pixel_ratio: f32) -> Pos2 {
    ((pos - canvas_rect.min) * device_pixel_ratio).to_pos2()
}

/// Tracks the pointer over the canvas between frames and turns egui's input
/// state into [`PointerEvent`]s
#[derive(Debug, Default)]
pub struct PointerTracker {
    last_pos: Option<Pos2>,
    pressed: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, ctx: &egui::Context, canvas_rect: Rect, device_pixel_ratio: f32) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let hover = input.pointer.hover_pos().filter(|pos| canvas_rect.contains(*pos));
            let to_canvas = |pos: Pos2| canvas_position(pos, canvas_rect, device_pixel_ratio);

            if input.pointer.primary_pressed() {
                if let Some(pos) = hover {
                    events.push(PointerEvent::Down(to_canvas(pos)));
                    self.pressed = true;
                    // The dot is already drawn at `pos`
                    self.last_pos = Some(pos);
                }
            }

            if self.pressed {
                match hover {
                    Some(pos) if Some(pos) != self.last_pos => events.push(PointerEvent::Move(to_canvas(pos))),
                    Some(_) => {}
                    None => {
                        events.push(PointerEvent::Leave);
                        self.pressed = false;
                    }
                }
            }

            if self.pressed && input.pointer.primary_released() {
                events.push(PointerEvent::Up);
                self.pressed = false;
            }

            let focus_lost = input.raw.events.iter().any(|event| matches!(event, egui::Event::WindowFocused(false)));
            if self.pressed && focus_lost {
                events.push(PointerEvent::Cancel);
                self.pressed = false;
            }

            self.last_pos = hover;
        });

        events
    }
}

/// Shortcuts pressed this frame
pub fn shortcuts(ctx: &egui::Context) -> Vec<Shortcut> {
    ctx.input(|input| {
        input
            .raw
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => Shortcut::from_key(*key, *modifiers),
                _ => None,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_shortcuts() {
        assert_eq!(Shortcut::from_key(Key::Z, Modifiers::CTRL), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_key(Key::Z, Modifiers::MAC_CMD), Some(Shortcut::Undo));
        assert_eq!(
            Shortcut::from_key(Key::Z, Modifiers::CTRL | Modifiers::SHIFT),
            Some(Shortcut::Redo)
        );
        assert_eq!(Shortcut::from_key(Key::Z, Modifiers::NONE), None);
        assert_eq!(Shortcut::from_key(Key::Y, Modifiers::CTRL), None);
    }

    #[test]
    fn test_canvas_position() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(100.0, 100.0));
        assert_eq!(canvas_position(Pos2::new(15.0, 30.0), rect, 2.0), Pos2::new(10.0, 20.0));
    }

    fn canvas_rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 10.0), egui::vec2(100.0, 50.0))
    }

    fn button(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// Run one egui pass with `events` and collect what the tracker reports
    fn run_frame(ctx: &egui::Context, tracker: &mut PointerTracker, events: Vec<egui::Event>) -> Vec<PointerEvent> {
        let mut reported = Vec::new();
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            reported = tracker.process(ctx, canvas_rect(), 1.0);
        });
        reported
    }

    #[test]
    fn test_press_drag_out_leaves() {
        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        let start = Pos2::new(20.0, 20.0);

        let pressed = run_frame(
            &ctx,
            &mut tracker,
            vec![egui::Event::PointerMoved(start), button(start, true)],
        );
        assert_eq!(pressed, vec![PointerEvent::Down(Pos2::new(10.0, 10.0))]);

        let dragged = run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(Pos2::new(40.0, 30.0))]);
        assert_eq!(dragged, vec![PointerEvent::Move(Pos2::new(30.0, 20.0))]);

        let outside = run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(Pos2::new(200.0, 30.0))]);
        assert_eq!(outside, vec![PointerEvent::Leave]);

        // Nothing more until the next press inside
        let back = run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(Pos2::new(40.0, 30.0))]);
        assert!(back.is_empty());
    }

    #[test]
    fn test_press_after_move_reports_only_down() {
        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(Pos2::new(90.0, 50.0))]);

        let pos = Pos2::new(20.0, 20.0);
        let pressed = run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(pos), button(pos, true)]);
        assert_eq!(pressed, vec![PointerEvent::Down(Pos2::new(10.0, 10.0))]);
    }

    #[test]
    fn test_release_ends_with_up() {
        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        let pos = Pos2::new(30.0, 30.0);

        run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(pos), button(pos, true)]);
        let released = run_frame(&ctx, &mut tracker, vec![button(pos, false)]);
        assert_eq!(released, vec![PointerEvent::Up]);
    }

    #[test]
    fn test_focus_loss_cancels() {
        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        let pos = Pos2::new(30.0, 30.0);

        run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(pos), button(pos, true)]);
        let lost = run_frame(&ctx, &mut tracker, vec![egui::Event::WindowFocused(false)]);
        assert_eq!(lost, vec![PointerEvent::Cancel]);
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        let pos = Pos2::new(300.0, 300.0);

        let pressed = run_frame(&ctx, &mut tracker, vec![egui::Event::PointerMoved(pos), button(pos, true)]);
        assert!(pressed.is_empty());
    }

    #[test]
    fn test_tracked_events_drive_the_board() {
        use crate::board::{Board, Bridges, StrokeState};
        use crate::config::BoardConfig;
        use crate::identifier::WidgetId;
        use web_time::Instant;

        let mut board = Board::new(WidgetId::sanitize("input"), BoardConfig::default(), Bridges::default());
        board.layout(100.0, 50.0, 1.0);

        let ctx = egui::Context::default();
        let mut tracker = PointerTracker::new();
        let start = Pos2::new(20.0, 20.0);
        let frames = [
            vec![egui::Event::PointerMoved(start), button(start, true)],
            vec![egui::Event::PointerMoved(Pos2::new(60.0, 20.0))],
            vec![egui::Event::PointerMoved(Pos2::new(60.0, 200.0))],
        ];

        let mut states = Vec::new();
        for events in frames {
            for event in run_frame(&ctx, &mut tracker, events) {
                board.handle_pointer(event, Instant::now());
            }
            states.push(board.stroke_state());
        }

        assert_eq!(states[0], StrokeState::Active { last: Pos2::new(10.0, 10.0) });
        assert_eq!(states[1], StrokeState::Active { last: Pos2::new(50.0, 10.0) });
        assert_eq!(states[2], StrokeState::Idle);
        assert!(board.persist_pending());
        assert_eq!(board.history().undo_len(), 1);
        assert_ne!(board.surface().pixel(30, 10), Some([255, 255, 255, 255]));
    }
}
