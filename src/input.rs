use egui::{Pos2, Rect};

/// Raw pointer and touch events, in screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed
    PointerDown { position: Pos2 },
    /// Pointer moved, with or without the button held
    PointerMove { position: Pos2 },
    /// Primary button released
    PointerUp,
    /// Pointer left the surface
    PointerLeave,
    /// The platform aborted the pointer interaction
    PointerCancel,
    /// Touches began; every active touch point is listed
    TouchStart { touches: Vec<Pos2> },
    TouchMove { touches: Vec<Pos2> },
    TouchEnd,
    TouchCancel,
}

/// What the surface should do in response to an input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeCommand {
    Begin(Pos2),
    Extend(Pos2),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    Drawing,
}

/// Turns press-move-release sequences into stroke commands.
///
/// Positions are translated into surface-local coordinates by subtracting the
/// on-screen origin of the surface. Only the first touch point is followed.
#[derive(Debug, Default)]
pub struct InputStateMachine {
    state: InputState,
    origin: Pos2,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == InputState::Drawing
    }

    /// Where the surface's top-left corner currently sits on screen
    pub fn set_origin(&mut self, origin: Pos2) {
        self.origin = origin;
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Map a screen position to surface-local coordinates
    pub fn to_local(&self, position: Pos2) -> Pos2 {
        (position - self.origin).to_pos2()
    }

    /// Drop back to idle without emitting anything
    pub fn reset(&mut self) {
        self.state = InputState::Idle;
    }

    /// Advance the state machine, returning the stroke command to run, if any
    pub fn handle(&mut self, event: &InputEvent) -> Option<StrokeCommand> {
        match (self.state, event) {
            (InputState::Idle, InputEvent::PointerDown { position }) => self.begin(*position),
            (InputState::Idle, InputEvent::TouchStart { touches }) => {
                touches.first().and_then(|&position| self.begin(position))
            }

            (InputState::Drawing, InputEvent::PointerMove { position }) => {
                Some(StrokeCommand::Extend(self.to_local(*position)))
            }
            (InputState::Drawing, InputEvent::TouchMove { touches }) => touches
                .first()
                .map(|&position| StrokeCommand::Extend(self.to_local(position))),

            (
                InputState::Drawing,
                InputEvent::PointerUp
                | InputEvent::PointerLeave
                | InputEvent::PointerCancel
                | InputEvent::TouchEnd
                | InputEvent::TouchCancel,
            ) => {
                self.state = InputState::Idle;
                log::debug!("Input: Drawing -> Idle");
                Some(StrokeCommand::End)
            }

            // Moves while idle, releases while idle, presses while drawing
            _ => None,
        }
    }

    fn begin(&mut self, position: Pos2) -> Option<StrokeCommand> {
        self.state = InputState::Drawing;
        log::debug!("Input: Idle -> Drawing");
        Some(StrokeCommand::Begin(self.to_local(position)))
    }
}

/// Converts egui's raw pointer events into [`InputEvent`]s for one surface rect.
///
/// egui already folds the first touch into pointer events, so only pointer
/// events are read here.
#[derive(Debug, Default)]
pub struct InputHandler {
    pointer_inside: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect this frame's events that concern `surface_rect`.
    ///
    /// A press only starts a stroke when the topmost layer under it is `layer`,
    /// so windows and popups drawn over the surface keep their clicks.
    pub fn process_input(
        &mut self,
        ctx: &egui::Context,
        surface_rect: Rect,
        layer: egui::LayerId,
    ) -> Vec<InputEvent> {
        let raw = ctx.input(|input| input.events.clone());
        self.translate(&raw, surface_rect, |pos| {
            ctx.layer_id_at(pos).is_none_or(|top| top == layer)
        })
    }

    fn translate(
        &mut self,
        raw: &[egui::Event],
        surface_rect: Rect,
        owns_pointer: impl Fn(Pos2) -> bool,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for event in raw {
            match event {
                egui::Event::PointerMoved(position) => {
                    let inside = surface_rect.contains(*position);
                    if inside {
                        events.push(InputEvent::PointerMove { position: *position });
                    } else if self.pointer_inside {
                        events.push(InputEvent::PointerLeave);
                    }
                    self.pointer_inside = inside;
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if surface_rect.contains(*pos) && owns_pointer(*pos) {
                            events.push(InputEvent::PointerDown { position: *pos });
                            self.pointer_inside = true;
                        }
                    } else {
                        events.push(InputEvent::PointerUp);
                    }
                }
                egui::Event::PointerGone => {
                    if self.pointer_inside {
                        events.push(InputEvent::PointerLeave);
                    }
                    self.pointer_inside = false;
                }
                egui::Event::WindowFocused(false) => {
                    events.push(InputEvent::PointerCancel);
                }
                _ => {}
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_press_move_release() {
        let mut machine = InputStateMachine::new();
        machine.set_origin(pos2(100.0, 50.0));

        assert_eq!(
            machine.handle(&InputEvent::PointerDown { position: pos2(110.0, 60.0) }),
            Some(StrokeCommand::Begin(pos2(10.0, 10.0)))
        );
        assert!(machine.is_drawing());
        assert_eq!(
            machine.handle(&InputEvent::PointerMove { position: pos2(120.0, 75.0) }),
            Some(StrokeCommand::Extend(pos2(20.0, 25.0)))
        );
        assert_eq!(machine.handle(&InputEvent::PointerUp), Some(StrokeCommand::End));
        assert_eq!(machine.state(), InputState::Idle);
    }

    #[test]
    fn test_idle_ignores_moves_and_releases() {
        let mut machine = InputStateMachine::new();
        assert_eq!(machine.handle(&InputEvent::PointerMove { position: pos2(1.0, 1.0) }), None);
        assert_eq!(machine.handle(&InputEvent::PointerUp), None);
        assert_eq!(machine.handle(&InputEvent::PointerLeave), None);
        assert_eq!(machine.handle(&InputEvent::TouchCancel), None);
        assert_eq!(machine.state(), InputState::Idle);
    }

    #[test]
    fn test_leave_and_cancel_end_the_stroke() {
        for end in [
            InputEvent::PointerLeave,
            InputEvent::PointerCancel,
            InputEvent::TouchEnd,
            InputEvent::TouchCancel,
        ] {
            let mut machine = InputStateMachine::new();
            machine.handle(&InputEvent::PointerDown { position: pos2(0.0, 0.0) });
            assert_eq!(machine.handle(&end), Some(StrokeCommand::End));
            assert!(!machine.is_drawing());
        }
    }

    #[test]
    fn test_second_press_while_drawing_is_ignored() {
        let mut machine = InputStateMachine::new();
        machine.handle(&InputEvent::PointerDown { position: pos2(0.0, 0.0) });
        assert_eq!(machine.handle(&InputEvent::PointerDown { position: pos2(5.0, 5.0) }), None);
        assert!(machine.is_drawing());
    }

    #[test]
    fn test_touch_uses_first_point_only() {
        let mut machine = InputStateMachine::new();
        machine.set_origin(pos2(10.0, 10.0));
        let start = InputEvent::TouchStart {
            touches: vec![pos2(15.0, 20.0), pos2(200.0, 200.0)],
        };
        assert_eq!(machine.handle(&start), Some(StrokeCommand::Begin(pos2(5.0, 10.0))));

        let moved = InputEvent::TouchMove {
            touches: vec![pos2(30.0, 30.0), pos2(300.0, 300.0)],
        };
        assert_eq!(machine.handle(&moved), Some(StrokeCommand::Extend(pos2(20.0, 20.0))));
        assert_eq!(machine.handle(&InputEvent::TouchMove { touches: vec![] }), None);
        assert_eq!(machine.handle(&InputEvent::TouchEnd), Some(StrokeCommand::End));
    }

    #[test]
    fn test_empty_touch_start_stays_idle() {
        let mut machine = InputStateMachine::new();
        assert_eq!(machine.handle(&InputEvent::TouchStart { touches: vec![] }), None);
        assert!(!machine.is_drawing());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut machine = InputStateMachine::new();
        machine.handle(&InputEvent::PointerDown { position: pos2(0.0, 0.0) });
        machine.reset();
        assert_eq!(machine.handle(&InputEvent::PointerUp), None);
    }

    #[test]
    fn test_handler_translates_pointer_events() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let mut handler = InputHandler::new();
        let raw = vec![
            egui::Event::PointerMoved(pos2(10.0, 10.0)),
            egui::Event::PointerButton {
                pos: pos2(10.0, 10.0),
                button: egui::PointerButton::Primary,
                pressed: true,
                modifiers: egui::Modifiers::default(),
            },
            egui::Event::PointerMoved(pos2(150.0, 10.0)),
            egui::Event::PointerButton {
                pos: pos2(150.0, 10.0),
                button: egui::PointerButton::Primary,
                pressed: false,
                modifiers: egui::Modifiers::default(),
            },
        ];
        assert_eq!(
            handler.translate(&raw, rect, |_| true),
            vec![
                InputEvent::PointerMove { position: pos2(10.0, 10.0) },
                InputEvent::PointerDown { position: pos2(10.0, 10.0) },
                InputEvent::PointerLeave,
                InputEvent::PointerUp,
            ]
        );
    }

    #[test]
    fn test_handler_ignores_press_outside_surface() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let mut handler = InputHandler::new();
        let raw = vec![egui::Event::PointerButton {
            pos: pos2(150.0, 10.0),
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::default(),
        }];
        assert!(handler.translate(&raw, rect, |_| true).is_empty());
    }

    #[test]
    fn test_handler_ignores_press_under_another_layer() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let covered = Rect::from_min_max(pos2(40.0, 40.0), pos2(60.0, 60.0));
        let mut handler = InputHandler::new();
        let press = |pos| egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed: true,
            modifiers: egui::Modifiers::default(),
        };
        let raw = vec![press(pos2(50.0, 50.0)), press(pos2(10.0, 10.0))];
        assert_eq!(
            handler.translate(&raw, rect, |pos| !covered.contains(pos)),
            vec![InputEvent::PointerDown { position: pos2(10.0, 10.0) }]
        );
    }

    #[test]
    fn test_press_without_prior_move_still_reports_leave() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let mut handler = InputHandler::new();
        let raw = vec![
            egui::Event::PointerButton {
                pos: pos2(20.0, 20.0),
                button: egui::PointerButton::Primary,
                pressed: true,
                modifiers: egui::Modifiers::default(),
            },
            egui::Event::PointerMoved(pos2(150.0, 20.0)),
        ];
        assert_eq!(
            handler.translate(&raw, rect, |_| true),
            vec![
                InputEvent::PointerDown { position: pos2(20.0, 20.0) },
                InputEvent::PointerLeave,
            ]
        );
    }
}
