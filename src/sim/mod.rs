pub mod event;
pub mod game;
pub mod session;
pub mod timer;
