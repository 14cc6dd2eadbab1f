/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use config::GameConfig;
use domain::input::InputEvent;
use sim::event::GameEvent;
use sim::game::{Game, Phase};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::perf::FpsCounter;
use ui::renderer::{self, Renderer};
use ui::sound::{self as sfx, SoundEngine};

/// Largest time step fed to the simulation (e.g. after a stall or resize).
const MAX_DT: f32 = 0.25;
const LOG_FILE: &str = "cyphercore.log";

fn main() {
    init_logging();
    let config = GameConfig::load();
    let seed = config.seed.unwrap_or_else(clock_seed);
    let mut game = Game::new(config, seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init().context("terminal init failed") {
        error!("{e:#}");
        if let Err(c) = renderer.cleanup() {
            warn!("terminal cleanup after failed init: {c}");
        }
        eprintln!("{e:#}");
        return;
    }

    let sound = SoundEngine::new();
    let result = game_loop(&mut game, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e:#}");
    }

    info!("exit, score {}", game.score());
    println!("Thanks for playing CypherCore!");
}

/// Log to a file in the temp dir: the terminal is in raw mode while we run.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE);
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    info!("CypherCore starting, log at {}", path.display());
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

fn game_loop(game: &mut Game, renderer: &mut Renderer, sound: Option<&SoundEngine>) -> Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&game.config().gamepad);
    let mut fps = FpsCounter::new();

    let frame = Duration::from_millis(game.config().timing.frame_ms);
    let mut last = Instant::now();
    let mut intro_lines = 0;

    loop {
        let frame_start = Instant::now();

        kb.drain_events();
        gp.update();
        if kb.ctrl_c_pressed() {
            info!("ctrl-c");
            break;
        }

        let mut input: Vec<InputEvent> = kb
            .events()
            .iter()
            .map(|&ev| match ev {
                InputEvent::Click(p) => InputEvent::Click(renderer.to_board(p)),
                other => other,
            })
            .collect();
        input.extend(gp.events());

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;

        let events = game.update(&input, dt);
        play_sounds(sound, &events);

        if game.phase() == Phase::Intro {
            let lines = renderer::intro_lines_started(game.intro_elapsed());
            if lines > intro_lines {
                if let Some(s) = sound {
                    s.play_intro_blip(lines, renderer::BANNER_LINES);
                }
            }
            intro_lines = lines;
        }

        if game.should_quit() {
            break;
        }

        fps.tick();
        renderer.render(game, fps.fps()).context("render failed")?;

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

fn play_sounds(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::TrapTriggered { row, col } => debug!("trap at ({row}, {col})"),
            GameEvent::NodeMissed { node } => info!("core node {} missed", node + 1),
            _ => {}
        }
        if let (Some(s), Some(cue)) = (sound, sfx::cue_for(event)) {
            s.play(cue);
        }
    }
}
