//! CLI commands - one module per subcommand.
//!
//! Each command struct holds its parsed arguments and implements
//! [`CommandExecutor`]. Commands return the process exit code so outcomes
//! map onto the documented contract: 0 success, 1 usage error, 2 integrity
//! failure, 3 insufficient shards.

mod bind;
mod split;

pub use bind::BindCommand;
pub use split::SplitCommand;

use anyhow::Result;
use std::process::ExitCode;

/// Trait for command execution.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments. An `Err` is reported
    /// and exits with code 1; everything else picks its own code.
    fn execute(&self) -> Result<ExitCode>;
}
