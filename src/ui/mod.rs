pub mod grid;
pub mod input;
pub mod renderer;
pub mod sound;
