//! Generate command: updates the release record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};

use crate::classify::{dependabot, renovate, ClassifierConfig, Classifiers, ConventionConfig};
use crate::data::{to_yaml, YamlFileStore};
use crate::git::GitRepository;
use crate::utils::get_env_var;

/// Environment variable overriding the Dependabot author identity.
pub const DEPENDABOT_AUTHOR_ENV: &str = "RELEASE_KIT_DEPENDABOT_AUTHOR";

/// Environment variable overriding the Renovate author identity.
pub const RENOVATE_AUTHOR_ENV: &str = "RELEASE_KIT_RENOVATE_AUTHOR";

/// Generate command options.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Repository to read commits from.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Markdown changelog to read the Unreleased section from, relative to --dir.
    #[arg(long, short = 'm', default_value = "CHANGELOG.md")]
    pub markdown: PathBuf,

    /// Detect Dependabot dependency bumps.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub dependabot: bool,

    /// Detect Renovate dependency bumps.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub renovate: bool,

    /// Author fragment identifying Dependabot commits.
    #[arg(long)]
    pub dependabot_author: Option<String>,

    /// Author fragment identifying Renovate commits.
    #[arg(long)]
    pub renovate_author: Option<String>,

    /// Only scan commits after this revision (defaults to the latest version tag).
    #[arg(long)]
    pub since: Option<String>,

    /// Prefix of version tags used to find the latest release.
    #[arg(long, default_value = "v")]
    pub tag_prefix: String,

    /// Prints the resulting record instead of saving it.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Executes the generate command.
    pub fn execute(self, changelog: &Path) -> Result<()> {
        let config = self.classifier_config();
        debug!(?config, "Resolved classifier configuration");
        let classifiers = Classifiers::from_config(&config);
        debug!(enabled = ?classifiers.names(), "Enabled dependency classifiers");

        let markdown = self.read_markdown()?;

        let repo = GitRepository::open_at(&self.dir)?;
        let since = match &self.since {
            Some(since) => Some(since.clone()),
            None => repo.latest_version_tag(&self.tag_prefix)?,
        };
        info!(since = ?since, "Scanning commits");

        let store = YamlFileStore::new(changelog);
        let document = crate::generate::run(
            &store,
            &repo,
            since.as_deref(),
            &markdown,
            &classifiers,
            self.dry_run,
        )?;

        if self.dry_run {
            print!("{}", to_yaml(&document));
        } else {
            println!(
                "✅ Updated {} ({} changes, {} dependencies)",
                changelog.display(),
                document.changes.len(),
                document.dependencies.len()
            );
        }

        Ok(())
    }

    /// Builds the classifier configuration from flags, environment and settings.
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            dependabot: ConventionConfig {
                enabled: self.dependabot,
                author: resolve_author(
                    self.dependabot_author.as_deref(),
                    DEPENDABOT_AUTHOR_ENV,
                    dependabot::DEFAULT_AUTHOR,
                ),
            },
            renovate: ConventionConfig {
                enabled: self.renovate,
                author: resolve_author(
                    self.renovate_author.as_deref(),
                    RENOVATE_AUTHOR_ENV,
                    renovate::DEFAULT_AUTHOR,
                ),
            },
        }
    }

    fn markdown_path(&self) -> PathBuf {
        self.dir.join(&self.markdown)
    }

    /// Reads the Markdown changelog. A missing file reads as empty.
    fn read_markdown(&self) -> Result<String> {
        let path = self.markdown_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Markdown changelog not found, only scanning commits");
                Ok(String::new())
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read markdown changelog: {}", path.display())),
        }
    }
}

fn resolve_author(flag: Option<&str>, env_key: &str, default: &str) -> String {
    flag.map(String::from)
        .or_else(|| get_env_var(env_key).ok())
        .unwrap_or_else(|| default.to_string())
}
