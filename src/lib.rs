pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod source;

