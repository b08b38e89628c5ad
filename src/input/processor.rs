//! Converts raw platform events into orbit-control commands.
//!
//! The `InputProcessor` owns the transient input state (cursor position,
//! which button is dragging, modifier keys). It is the only thing that sits
//! between raw window/page events and the viewer's camera controls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};

/// Vertical drag distance, in pixels, that dollies as far as one wheel line.
const DOLLY_PIXELS_PER_LINE: f32 = 100.0;

/// Discrete, key-bindable viewer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Re-frame the camera on the loaded model.
    ResetView,
    /// Close the viewer.
    Close,
}

/// What a drag or scroll should do to the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Orbit by a drag of `delta` pixels.
    Rotate {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },
    /// Pan by a drag of `delta` pixels.
    Pan {
        /// Horizontal and vertical drag delta.
        delta: Vec2,
    },
    /// Zoom (positive = in).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },
}

/// Which gesture the held button performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
    Dolly,
}

/// Converts raw input events into [`ControlCommand`]s.
///
/// Left drag orbits, right drag or shift + left drag pans, middle drag
/// dollies (dragging up moves in), scroll zooms.
#[derive(Debug, Default)]
pub struct InputProcessor {
    cursor: Option<Vec2>,
    drag: Option<Drag>,
    shift_pressed: bool,
}

impl InputProcessor {
    /// Create a processor with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<ControlCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed);
                None
            }
            InputEvent::Scroll { delta } => Some(ControlCommand::Zoom { delta }),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
            InputEvent::CursorLeft => {
                self.cursor = None;
                self.drag = None;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<ControlCommand> {
        let pos = Vec2::new(x, y);
        let last = self.cursor.replace(pos)?;
        let delta = pos - last;
        match self.drag? {
            Drag::Rotate => Some(ControlCommand::Rotate { delta }),
            Drag::Pan => Some(ControlCommand::Pan { delta }),
            Drag::Dolly => Some(ControlCommand::Zoom {
                delta: -delta.y / DOLLY_PIXELS_PER_LINE,
            }),
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if !pressed {
            self.drag = None;
            return;
        }
        self.drag = Some(match button {
            MouseButton::Left if !self.shift_pressed => Drag::Rotate,
            MouseButton::Middle => Drag::Dolly,
            _ => Drag::Pan,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(p: &mut InputProcessor, button: MouseButton) {
        let _ = p.handle_event(InputEvent::MouseButton {
            button,
            pressed: true,
        });
    }

    #[test]
    fn hover_without_button_produces_nothing() {
        let mut p = InputProcessor::new();
        assert_eq!(p.handle_event(InputEvent::CursorMoved { x: 1.0, y: 1.0 }), None);
        assert_eq!(p.handle_event(InputEvent::CursorMoved { x: 5.0, y: 1.0 }), None);
    }

    #[test]
    fn left_drag_rotates_by_delta() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        press(&mut p, MouseButton::Left);
        let cmd = p.handle_event(InputEvent::CursorMoved { x: 14.0, y: 7.0 });
        assert_eq!(
            cmd,
            Some(ControlCommand::Rotate {
                delta: Vec2::new(4.0, -3.0)
            })
        );
    }

    #[test]
    fn shift_or_right_drag_pans() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        press(&mut p, MouseButton::Right);
        assert!(matches!(
            p.handle_event(InputEvent::CursorMoved { x: 1.0, y: 0.0 }),
            Some(ControlCommand::Pan { .. })
        ));
        let _ = p.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: false,
        });

        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: true });
        press(&mut p, MouseButton::Left);
        assert!(matches!(
            p.handle_event(InputEvent::CursorMoved { x: 2.0, y: 0.0 }),
            Some(ControlCommand::Pan { .. })
        ));
    }

    #[test]
    fn middle_drag_dollies() {
        let mut p = InputProcessor::new();
        let _ = p.handle_event(InputEvent::CursorMoved { x: 0.0, y: 300.0 });
        press(&mut p, MouseButton::Middle);
        assert_eq!(
            p.handle_event(InputEvent::CursorMoved { x: 40.0, y: 250.0 }),
            Some(ControlCommand::Zoom { delta: 0.5 })
        );
        assert_eq!(
            p.handle_event(InputEvent::CursorMoved { x: 40.0, y: 350.0 }),
            Some(ControlCommand::Zoom { delta: -1.0 })
        );
    }

    #[test]
    fn leaving_the_region_ends_the_drag() {
        let mut p = InputProcessor::new();
        press(&mut p, MouseButton::Left);
        let _ = p.handle_event(InputEvent::CursorLeft);
        assert!(!p.is_dragging());
        let _ = p.handle_event(InputEvent::CursorMoved { x: 0.0, y: 0.0 });
        assert_eq!(p.handle_event(InputEvent::CursorMoved { x: 9.0, y: 9.0 }), None);
    }

    #[test]
    fn scroll_zooms() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(ControlCommand::Zoom { delta: 1.5 })
        );
    }
}
