/// Keyboard + mouse poller.
///
/// Drains every pending crossterm event once per frame and converts the
/// ones we care about into `InputEvent`s, preserving arrival order:
///   - Arrows / WASD      → Move
///   - Enter / Space      → Confirm
///   - Esc                → Back
///   - F1                 → Pause
///   - F3                 → ToggleFps
///   - Left mouse button  → Click (screen cell; see `Renderer::to_board`)
///
/// Key auto-repeat counts as further presses, so holding an arrow walks
/// the maze. Release events are dropped: only terminals with keyboard
/// enhancement report them, and nothing here is level-triggered.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use log::trace;

use crate::domain::geom::Point;
use crate::domain::input::{Dir, InputEvent};

pub struct InputState {
    /// Events collected by the most recent `drain_events()`. Clicks are
    /// still in screen coordinates here.
    events: Vec<InputEvent>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_keys: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            events: Vec::with_capacity(8),
            raw_keys: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the update.
    pub fn drain_events(&mut self) {
        self.events.clear();
        self.raw_keys.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    self.raw_keys.push(key);
                    if let Some(ev) = map_key(key) {
                        self.events.push(ev);
                    }
                }
                Ok(Event::Mouse(m)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        trace!("click at screen ({}, {})", m.column, m.row);
                        self.events
                            .push(InputEvent::Click(Point::new(m.column as i32, m.row as i32)));
                    }
                }
                _ => {}
            }
        }
    }

    /// This frame's events in arrival order.
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_keys.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Translate one key press. Ctrl-chords are left to `ctrl_c_pressed`.
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let ev = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => InputEvent::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => InputEvent::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => InputEvent::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => InputEvent::Move(Dir::Right),
        KeyCode::Enter | KeyCode::Char(' ') => InputEvent::Confirm,
        KeyCode::Esc => InputEvent::Back,
        KeyCode::F(1) => InputEvent::Pause,
        KeyCode::F(3) => InputEvent::ToggleFps,
        _ => return None,
    };
    Some(ev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(map_key(key(KeyCode::Up)), Some(InputEvent::Move(Dir::Up)));
        assert_eq!(map_key(key(KeyCode::Char('a'))), Some(InputEvent::Move(Dir::Left)));
        assert_eq!(map_key(key(KeyCode::Char('S'))), Some(InputEvent::Move(Dir::Down)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(InputEvent::Move(Dir::Right)));
    }

    #[test]
    fn control_keys() {
        assert_eq!(map_key(key(KeyCode::Enter)), Some(InputEvent::Confirm));
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(InputEvent::Confirm));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(InputEvent::Back));
        assert_eq!(map_key(key(KeyCode::F(1))), Some(InputEvent::Pause));
        assert_eq!(map_key(key(KeyCode::F(3))), Some(InputEvent::ToggleFps));
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_chords_are_not_moves() {
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_s), None);
    }
}
