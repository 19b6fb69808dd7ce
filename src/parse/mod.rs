pub mod markdown;

pub use markdown::parse_note;
