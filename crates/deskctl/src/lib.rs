//! deskctl library - exposes modules for integration tests

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;

pub use cli::{Cli, Commands};
pub use commands::{run, CommandOutput};
