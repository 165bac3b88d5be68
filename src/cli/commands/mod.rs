pub mod analyze;
pub mod config;
pub mod describe;
pub mod models;
pub mod prompt;
