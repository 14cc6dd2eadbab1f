pub mod circuit;
pub mod core_breach;
pub mod event;
pub mod game;
pub mod level;
pub mod maze;
pub mod memory;
