/// Gamepad input using gilrs.
///
/// Produces the same `InputEvent`s as the keyboard, edge-triggered: one
/// event per press, nothing while held. Button mapping comes from
/// `[gamepad]` in config.toml. Default mapping:
///   D-pad / Left Stick    →  Move
///   A / Start             →  Confirm
///   B / Select            →  Back
///   Y                     →  Pause
///
/// Without the `gamepad` feature, or without a usable gilrs backend, the
/// poller stays silent.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use log::{info, warn};

use crate::config::GamepadConfig;
use crate::domain::input::{Dir, InputEvent};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

fn parse_list(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A, Btn::Start],
            cancel:  vec![Btn::B, Btn::Select],
            pause:   vec![Btn::Y],
        }
    }
}

const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

fn dir_index(d: Dir) -> usize {
    match d {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                if has_pad {
                    info!("gamepad detected");
                }
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unparseable lists keep
    /// the default for that action.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        let pa = parse_list(&cfg.pause);
        if !pa.is_empty() { map.pause = pa; }
    }

    /// Poll the backend. Call once per frame before `events()`.
    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(Dir::Up),
            Button::DPadDown  => Some(Dir::Down),
            Button::DPadLeft  => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dpad {
            self.dpad[dir_index(d)].set(held);
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    /// Derive digital stick directions from the analog axes.
    fn update_stick(&mut self) {
        self.stick[dir_index(Dir::Up)].set(self.stick_y > STICK_DEADZONE);
        self.stick[dir_index(Dir::Down)].set(self.stick_y < -STICK_DEADZONE);
        self.stick[dir_index(Dir::Left)].set(self.stick_x < -STICK_DEADZONE);
        self.stick[dir_index(Dir::Right)].set(self.stick_x > STICK_DEADZONE);
    }

    // ── Event output ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    /// This frame's presses as input events: directions first, then
    /// confirm, back and pause.
    pub fn events(&self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        for d in DIRS {
            let i = dir_index(d);
            if self.dpad[i].just_pressed || self.stick[i].just_pressed {
                out.push(InputEvent::Move(d));
            }
        }
        if self.any_just_pressed(&self.action_map.confirm) {
            out.push(InputEvent::Confirm);
        }
        if self.any_just_pressed(&self.action_map.cancel) {
            out.push(InputEvent::Back);
        }
        if self.any_just_pressed(&self.action_map.pause) {
            out.push(InputEvent::Pause);
        }
        out
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_parse() {
        assert_eq!(parse_list(&names(&["a", "South", "lb", "back", "bogus"])),
                   vec![Btn::A, Btn::A, Btn::L1, Btn::Select]);
    }

    #[test]
    fn config_overrides_only_valid_lists() {
        let mut gp = GamepadState::new();
        gp.load_button_config(&GamepadConfig {
            confirm: names(&["X"]),
            cancel: names(&["nope"]),
            pause: vec![],
        });
        assert_eq!(gp.action_map.confirm, vec![Btn::X]);
        assert_eq!(gp.action_map.cancel, ActionMap::default().cancel);
        assert_eq!(gp.action_map.pause, ActionMap::default().pause);
    }

    #[test]
    fn presses_are_edge_triggered() {
        let mut gp = GamepadState::new();
        gp.buttons[Btn::A as usize].set(true);
        gp.dpad[dir_index(Dir::Left)].set(true);
        assert_eq!(gp.events(), vec![InputEvent::Move(Dir::Left), InputEvent::Confirm]);

        gp.clear_just_pressed();
        gp.buttons[Btn::A as usize].set(true);
        assert!(gp.events().is_empty());
    }

    #[test]
    fn stick_crosses_deadzone_once() {
        let mut gp = GamepadState::new();
        gp.stick_x = 0.9;
        gp.update_stick();
        assert_eq!(gp.events(), vec![InputEvent::Move(Dir::Right)]);
        gp.clear_just_pressed();
        gp.update_stick();
        assert!(gp.events().is_empty());
    }
}
