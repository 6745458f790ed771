pub mod board;
pub mod random;
pub mod rules;
