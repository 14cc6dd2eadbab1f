pub mod cell;
pub mod gate;
pub mod geom;
pub mod input;
pub mod timer;
