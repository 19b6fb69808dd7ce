pub mod config;
pub mod entity;
pub mod notes;

pub use config::*;
pub use entity::*;
pub use notes::*;
