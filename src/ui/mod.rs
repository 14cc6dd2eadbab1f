pub mod gamepad;
pub mod input;
pub mod perf;
pub mod renderer;
pub mod sound;
