//! Application layer - CLI surface over the detection pipeline

pub mod commands;

pub use commands::{Cli, CommandExecutor, Commands, GlobalArgs};
