pub mod camb;
pub mod config;
pub mod pending;
pub mod telegram;
pub mod tempfile;
