pub mod board;
pub mod config;
pub mod coords;
pub mod error;
pub mod executor;
pub mod movegen;
pub mod projection;
pub mod render;
pub mod selection;
pub mod shell;
