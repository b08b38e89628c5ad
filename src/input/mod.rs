//! Input handling: event types and the processor that converts raw window
//! or page events into orbit-control commands.

/// Platform-agnostic input events.
pub mod event;
/// Converts raw events into control commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::{ControlCommand, InputProcessor, KeyAction};
