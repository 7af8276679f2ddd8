//! Subcommand implementations.

pub mod effects;
pub mod preset;
pub mod process;
