//! Is-empty command: reports whether there is anything to release.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;

use crate::data::{DocumentStore, YamlFileStore};

/// Is-empty command options.
#[derive(Parser)]
pub struct IsEmptyCommand {
    /// Exits with an error when the release record is empty.
    #[arg(long)]
    pub fail: bool,
}

impl IsEmptyCommand {
    /// Executes the is-empty command.
    pub fn execute(self, changelog: &Path) -> Result<()> {
        let document = YamlFileStore::new(changelog).load()?;
        let empty = document.is_empty();
        println!("{empty}");

        if empty && self.fail {
            bail!("Release record {} is empty", changelog.display());
        }
        Ok(())
    }
}
