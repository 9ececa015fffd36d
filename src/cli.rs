//! CLI interface for release-kit.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod generate;
pub mod is_empty;

pub use generate::GenerateCommand;
pub use is_empty::IsEmptyCommand;

/// release-kit: structured release records from changelogs and bot commits.
#[derive(Parser)]
#[command(name = "release-kit")]
#[command(
    about = "Builds a structured release record from a changelog and dependency bot commits",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Path of the YAML release record to read and update.
    #[arg(long, global = true, default_value = "changelog.yaml")]
    pub changelog: PathBuf,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Merges the Unreleased changelog section and dependency bumps into the release record.
    Generate(GenerateCommand),
    /// Reports whether the release record has anything to release.
    #[command(name = "is-empty")]
    IsEmpty(IsEmptyCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate(generate_cmd) => generate_cmd.execute(&self.changelog),
            Commands::IsEmpty(is_empty_cmd) => is_empty_cmd.execute(&self.changelog),
        }
    }
}
