pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{error_message, execute, explore, is_recoverable, run, write_selection};
