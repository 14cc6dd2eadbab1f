/// Game controller: the phase state machine around the four levels.
///
/// ```text
///   Intro ──► Menu ──Start──► Playing(n) ──Completed──► LevelClear ──► Playing(n+1)
///               ▲                │                          │
///               │              Failed                    n == 4
///               │                ▼                          ▼
///               └──── Esc ───── Lost ──Confirm──► Playing(n)   Won
/// ```
///
/// The controller exclusively owns the active level and the seeded RNG
/// every level is built from, so a fixed seed replays the same run.
/// Returning to the menu always resets the run (score and level index).

use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::domain::input::{Dir, InputEvent};
use super::event::GameEvent;
use super::level::{Level, LevelId, Status};

/// Points per whole second left on the clock when a level is solved.
pub const SCORE_PER_SECOND: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Intro,
    Menu,
    Playing,
    LevelClear,
    Won,
    Lost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Start,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Start, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Start => "Start Game",
            MenuItem::Quit => "Quit",
        }
    }
}

pub struct Game {
    config: GameConfig,
    rng: Pcg32,
    phase: Phase,
    level: Option<Level>,
    level_index: usize,
    score: u32,
    last_bonus: u32,
    menu_cursor: usize,
    /// Seconds spent in the current Intro / LevelClear phase.
    phase_time: f32,
    paused: bool,
    show_fps: bool,
    quit: bool,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Game {
        info!("new game, seed {seed}");
        Game {
            config,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Intro,
            level: None,
            level_index: 0,
            score: 0,
            last_bonus: 0,
            menu_cursor: 0,
            phase_time: 0.0,
            paused: false,
            show_fps: false,
            quit: false,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Frame update
    // ══════════════════════════════════════════════════════════════

    /// Advance one frame. `input` is this frame's events in arrival order.
    pub fn update(&mut self, input: &[InputEvent], dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for ev in input {
            if *ev == InputEvent::ToggleFps {
                self.show_fps = !self.show_fps;
            }
        }

        match self.phase {
            Phase::Intro => self.update_intro(input, dt),
            Phase::Menu => self.update_menu(input, &mut events),
            Phase::Playing => self.update_playing(input, dt, &mut events),
            Phase::LevelClear => self.update_level_clear(input, dt, &mut events),
            Phase::Won => {
                if input.iter().any(|e| matches!(e, InputEvent::Confirm | InputEvent::Back)) {
                    self.enter_menu();
                }
            }
            Phase::Lost => {
                for ev in input {
                    match ev {
                        InputEvent::Confirm => {
                            info!("retrying level {}", self.level_index + 1);
                            self.start_level(self.level_index, &mut events);
                            break;
                        }
                        InputEvent::Back => {
                            self.enter_menu();
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }

        events
    }

    fn update_intro(&mut self, input: &[InputEvent], dt: f32) {
        self.phase_time += dt;
        let skip = input.iter().any(|e| *e == InputEvent::Confirm);
        if skip || self.phase_time >= self.config.timing.intro_secs {
            self.enter_menu();
        }
    }

    fn update_menu(&mut self, input: &[InputEvent], events: &mut Vec<GameEvent>) {
        let n = MenuItem::ALL.len();
        for ev in input {
            match ev {
                InputEvent::Move(Dir::Up) => {
                    self.menu_cursor = (self.menu_cursor + n - 1) % n;
                    events.push(GameEvent::MenuMoved);
                }
                InputEvent::Move(Dir::Down) => {
                    self.menu_cursor = (self.menu_cursor + 1) % n;
                    events.push(GameEvent::MenuMoved);
                }
                InputEvent::Confirm => {
                    events.push(GameEvent::MenuSelected);
                    match MenuItem::ALL[self.menu_cursor] {
                        MenuItem::Start => {
                            info!("run started");
                            self.score = 0;
                            self.start_level(0, events);
                        }
                        MenuItem::Quit => {
                            info!("quit selected");
                            self.quit = true;
                        }
                    }
                    return;
                }
                _ => {}
            }
        }
    }

    fn update_playing(&mut self, input: &[InputEvent], dt: f32, events: &mut Vec<GameEvent>) {
        if input.iter().any(|e| *e == InputEvent::Back) {
            info!("level {} abandoned", self.level_index + 1);
            self.enter_menu();
            return;
        }
        for ev in input {
            if *ev == InputEvent::Pause {
                self.paused = !self.paused;
                debug!("paused = {}", self.paused);
            }
        }
        if self.paused {
            return;
        }

        let Some(level) = self.level.as_mut() else {
            self.enter_menu();
            return;
        };

        let puzzle_input: Vec<InputEvent> = input
            .iter()
            .copied()
            .filter(|e| matches!(e, InputEvent::Move(_) | InputEvent::Click(_)))
            .collect();

        match level.update(&puzzle_input, dt, events) {
            Status::InProgress => {}
            Status::Completed => {
                let bonus = level.clock().whole_seconds() * SCORE_PER_SECOND;
                self.last_bonus = bonus;
                self.score += bonus;
                info!(
                    "level {} completed, {}s left, score {}",
                    self.level_index + 1,
                    level.clock().whole_seconds(),
                    self.score
                );
                events.push(GameEvent::LevelCompleted { level: self.level_index });
                self.phase = Phase::LevelClear;
                self.phase_time = 0.0;
            }
            Status::Failed => {
                info!("level {} failed: time expired", self.level_index + 1);
                events.push(GameEvent::LevelFailed { level: self.level_index });
                self.phase = Phase::Lost;
            }
        }
    }

    fn update_level_clear(&mut self, input: &[InputEvent], dt: f32, events: &mut Vec<GameEvent>) {
        self.phase_time += dt;
        let skip = input.iter().any(|e| *e == InputEvent::Confirm);
        if !skip && self.phase_time < self.config.timing.clear_secs {
            return;
        }

        let next = self.level_index + 1;
        if next >= LevelId::ALL.len() {
            info!("all levels cleared, final score {}", self.score);
            self.level = None;
            self.phase = Phase::Won;
            events.push(GameEvent::GameWon);
        } else {
            self.start_level(next, events);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Transitions
    // ══════════════════════════════════════════════════════════════

    fn start_level(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        let Some(id) = LevelId::from_index(index) else { return };
        self.level = Some(Level::new(id, &self.config, &mut self.rng));
        self.level_index = index;
        self.phase = Phase::Playing;
        self.paused = false;
        self.phase_time = 0.0;
        info!("level {} ({}) started", index + 1, id.title());
        events.push(GameEvent::LevelStarted { level: index });
    }

    fn enter_menu(&mut self) {
        self.phase = Phase::Menu;
        self.level = None;
        self.level_index = 0;
        self.score = 0;
        self.last_bonus = 0;
        self.menu_cursor = 0;
        self.phase_time = 0.0;
        self.paused = false;
    }

    // ══════════════════════════════════════════════════════════════
    // Queries
    // ══════════════════════════════════════════════════════════════

    pub fn phase(&self) -> Phase { self.phase }
    pub fn level(&self) -> Option<&Level> { self.level.as_ref() }
    pub fn level_index(&self) -> usize { self.level_index }
    pub fn score(&self) -> u32 { self.score }
    pub fn last_bonus(&self) -> u32 { self.last_bonus }
    pub fn menu_cursor(&self) -> usize { self.menu_cursor }
    pub fn paused(&self) -> bool { self.paused }
    pub fn show_fps(&self) -> bool { self.show_fps }
    pub fn should_quit(&self) -> bool { self.quit }
    pub fn config(&self) -> &GameConfig { &self.config }

    /// Seconds since the intro started (drives the typewriter reveal).
    pub fn intro_elapsed(&self) -> f32 {
        if self.phase == Phase::Intro { self.phase_time } else { 0.0 }
    }

    /// Seconds left on the level-clear screen.
    pub fn clear_remaining(&self) -> f32 {
        (self.config.timing.clear_secs - self.phase_time).max(0.0)
    }
}
