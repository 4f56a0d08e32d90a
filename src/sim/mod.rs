pub mod event;
pub mod level;
pub mod session;
