pub mod config;
pub mod macros;
