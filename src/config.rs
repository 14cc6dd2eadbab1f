/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Out-of-range values are clamped so every level stays playable on an
/// ordinary terminal.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::timer::LEVEL_SECONDS;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub maze: MazeConfig,
    pub memory: MemoryConfig,
    pub core: CoreConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub level_secs: f32,
    pub intro_secs: f32,
    pub clear_secs: f32,
}

#[derive(Clone, Debug)]
pub struct MazeConfig {
    pub size: usize,
    pub wall_density: f32,
    pub traps: usize,
    pub hint_secs: f32,
}

#[derive(Clone, Debug)]
pub struct MemoryConfig {
    pub pairs: usize,
    pub columns: usize,
    pub preview_secs: f32,
    pub reveal_secs: f32,
}

#[derive(Clone, Debug)]
pub struct CoreConfig {
    pub nodes: usize,
    pub sequence_len: usize,
    pub speed_deg: f32,
    pub tolerance_deg: f32,
    pub miss_penalty_secs: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    maze: TomlMaze,
    #[serde(default)]
    memory: TomlMemory,
    #[serde(default)]
    core: TomlCore,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_level_secs")]
    level_secs: f32,
    #[serde(default = "default_intro_secs")]
    intro_secs: f32,
    #[serde(default = "default_clear_secs")]
    clear_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlMaze {
    #[serde(default = "default_maze_size")]
    size: usize,
    #[serde(default = "default_wall_density")]
    wall_density: f32,
    #[serde(default = "default_traps")]
    traps: usize,
    #[serde(default = "default_hint_secs")]
    hint_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlMemory {
    #[serde(default = "default_pairs")]
    pairs: usize,
    #[serde(default = "default_columns")]
    columns: usize,
    #[serde(default = "default_preview_secs")]
    preview_secs: f32,
    #[serde(default = "default_reveal_secs")]
    reveal_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCore {
    #[serde(default = "default_nodes")]
    nodes: usize,
    #[serde(default = "default_sequence_len")]
    sequence_len: usize,
    #[serde(default = "default_speed_deg")]
    speed_deg: f32,
    #[serde(default = "default_tolerance_deg")]
    tolerance_deg: f32,
    #[serde(default = "default_miss_penalty")]
    miss_penalty_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }      // ~60 FPS cap
fn default_level_secs() -> f32 { LEVEL_SECONDS }
fn default_intro_secs() -> f32 { 10.0 }
fn default_clear_secs() -> f32 { 2.0 }

fn default_maze_size() -> usize { 15 }
fn default_wall_density() -> f32 { 0.4 }
fn default_traps() -> usize { 7 }
fn default_hint_secs() -> f32 { 5.0 }

fn default_pairs() -> usize { 8 }
fn default_columns() -> usize { 4 }
fn default_preview_secs() -> f32 { 3.0 }
fn default_reveal_secs() -> f32 { 1.0 }

fn default_nodes() -> usize { 6 }
fn default_sequence_len() -> usize { 5 }
fn default_speed_deg() -> f32 { 90.0 }
fn default_tolerance_deg() -> f32 { 25.0 }
fn default_miss_penalty() -> f32 { 5.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_pause() -> Vec<String> { vec!["Y".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame_ms(),
            level_secs: default_level_secs(),
            intro_secs: default_intro_secs(),
            clear_secs: default_clear_secs(),
        }
    }
}

impl Default for TomlMaze {
    fn default() -> Self {
        TomlMaze {
            size: default_maze_size(),
            wall_density: default_wall_density(),
            traps: default_traps(),
            hint_secs: default_hint_secs(),
        }
    }
}

impl Default for TomlMemory {
    fn default() -> Self {
        TomlMemory {
            pairs: default_pairs(),
            columns: default_columns(),
            preview_secs: default_preview_secs(),
            reveal_secs: default_reveal_secs(),
        }
    }
}

impl Default for TomlCore {
    fn default() -> Self {
        TomlCore {
            nodes: default_nodes(),
            sequence_len: default_sequence_len(),
            speed_deg: default_speed_deg(),
            tolerance_deg: default_tolerance_deg(),
            miss_penalty_secs: default_miss_penalty(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

// ── Conversion (clamping happens here) ──

/// Largest maze that fits the board (2 columns per cell).
const MAZE_MAX: usize = 18;
const MAZE_MIN: usize = 5;
/// Memory board holds at most 4 rows of tiles.
const MEMORY_MAX_ROWS: usize = 4;
const MEMORY_MAX_COLS: usize = 6;
/// Needle speed cap in degrees per second.
const MAX_SPEED_DEG: f32 = 720.0;

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        let columns = t.memory.columns.clamp(2, MEMORY_MAX_COLS);
        let max_pairs = columns * MEMORY_MAX_ROWS / 2;

        GameConfig {
            timing: TimingConfig {
                frame_ms: t.timing.frame_ms.clamp(1, 250),
                level_secs: positive_or(t.timing.level_secs, LEVEL_SECONDS),
                intro_secs: finite_or(t.timing.intro_secs, default_intro_secs()).max(0.0),
                clear_secs: finite_or(t.timing.clear_secs, default_clear_secs()).max(0.0),
            },
            maze: MazeConfig {
                size: t.maze.size.clamp(MAZE_MIN, MAZE_MAX),
                wall_density: finite_or(t.maze.wall_density, default_wall_density()).clamp(0.0, 0.9),
                traps: t.maze.traps,
                hint_secs: finite_or(t.maze.hint_secs, default_hint_secs()).max(0.0),
            },
            memory: MemoryConfig {
                pairs: t.memory.pairs.clamp(1, max_pairs),
                columns,
                preview_secs: finite_or(t.memory.preview_secs, default_preview_secs()).max(0.0),
                reveal_secs: finite_or(t.memory.reveal_secs, default_reveal_secs()).max(0.0),
            },
            core: CoreConfig {
                nodes: t.core.nodes.clamp(2, 10),
                sequence_len: t.core.sequence_len.max(1),
                speed_deg: positive_or(t.core.speed_deg, default_speed_deg()).min(MAX_SPEED_DEG),
                tolerance_deg: finite_or(t.core.tolerance_deg, default_tolerance_deg()).clamp(1.0, 180.0),
                miss_penalty_secs: finite_or(t.core.miss_penalty_secs, default_miss_penalty()).max(0.0),
            },
            gamepad: GamepadConfig {
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                pause: t.gamepad.pause,
            },
            seed: t.general.seed,
        }
    }
}

fn positive_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

/// TOML accepts `nan` and `inf`; neither is a usable setting.
fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    return cfg;
                }
                Err(e @ ConfigError::Parse(_)) => {
                    log::warn!("{e}; using default settings");
                    return GameConfig::default();
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        GameConfig::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(text)?;
        Ok(parsed.into())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing.level_secs, 120.0);
        assert_eq!(cfg.maze.size, 15);
        assert_eq!(cfg.memory.pairs, 8);
        assert_eq!(cfg.core.sequence_len, 5);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[core]\ntolerance_deg = 40.0\n\n[general]\nseed = 7\n",
        )
        .unwrap();
        assert_eq!(cfg.core.tolerance_deg, 40.0);
        assert_eq!(cfg.core.nodes, 6);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[maze]\nsize = 99\n[memory]\npairs = 50\ncolumns = 4\n[timing]\nlevel_secs = -1.0\n",
        )
        .unwrap();
        assert_eq!(cfg.maze.size, MAZE_MAX);
        assert_eq!(cfg.memory.pairs, 8);
        assert_eq!(cfg.timing.level_secs, LEVEL_SECONDS);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[maze]\nwall_density = nan\nhint_secs = inf\n\
             [core]\ntolerance_deg = nan\nspeed_deg = nan\nmiss_penalty_secs = -inf\n\
             [memory]\nreveal_secs = nan\n",
        )
        .unwrap();
        let def = GameConfig::default();
        assert_eq!(cfg.maze.wall_density, def.maze.wall_density);
        assert_eq!(cfg.maze.hint_secs, def.maze.hint_secs);
        assert_eq!(cfg.core.tolerance_deg, def.core.tolerance_deg);
        assert_eq!(cfg.core.speed_deg, def.core.speed_deg);
        assert_eq!(cfg.core.miss_penalty_secs, def.core.miss_penalty_secs);
        assert_eq!(cfg.memory.reveal_secs, def.memory.reveal_secs);
    }

    #[test]
    fn needle_speed_must_be_positive() {
        for bad in ["0.0", "-45.0"] {
            let cfg = GameConfig::from_toml_str(&format!("[core]\nspeed_deg = {bad}\n")).unwrap();
            assert_eq!(cfg.core.speed_deg, 90.0, "speed_deg = {bad}");
        }
        let cfg = GameConfig::from_toml_str("[core]\nspeed_deg = 1e9\n").unwrap();
        assert_eq!(cfg.core.speed_deg, MAX_SPEED_DEG);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = GameConfig::from_toml_str(include_str!("../config.toml")).unwrap();
        let def = GameConfig::default();
        assert_eq!(format!("{cfg:?}"), format!("{def:?}"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[maze\nsize = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
