pub mod grid;
pub mod instruction;
pub mod interpreter;
pub mod player;
pub mod render;
pub mod session;
