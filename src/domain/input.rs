/// Discrete input events surfaced by the poller once per frame.
///
/// Keyboard, mouse and gamepad all collapse into this one vocabulary, so
/// the controller and the puzzles never depend on a device backend.

use super::geom::Point;

/// Movement direction (one cell per press).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// (row, col) delta.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Move(Dir),
    Confirm,
    Back,
    Pause,
    ToggleFps,
    /// Left click, already translated into board coordinates.
    Click(Point),
}
