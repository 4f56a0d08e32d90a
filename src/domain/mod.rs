pub mod board;
pub mod color;
pub mod motion;
pub mod piece;
