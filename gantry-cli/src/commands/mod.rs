//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod pipeline;
mod watch;

pub use build::BuildCommands;
pub use pipeline::PipelineCommands;
pub use watch::WatchCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline build lifecycle
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
    /// Pipeline definitions
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Live watching of workflow node runs
    Watch {
        #[command(subcommand)]
        command: WatchCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Build { command } => build::handle_build_command(command, config).await,
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Watch { command } => watch::handle_watch_command(command, config).await,
    }
}
