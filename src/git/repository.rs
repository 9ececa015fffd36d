//! Git repository operations

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use git2::{ErrorCode, Oid, Repository, Revwalk, Sort};
use regex::Regex;
use tracing::debug;

use crate::git::{Commit, CommitSource};

/// Tag suffix that marks a released version, once the prefix is stripped.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static VERSION_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+").unwrap());

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref()).with_context(|| {
            format!(
                "Failed to open git repository at {}",
                path.as_ref().display()
            )
        })?;

        Ok(Self { repo })
    }

    /// Finds the closest ancestor of HEAD tagged as a released version.
    ///
    /// Tags are considered when they start with `prefix` followed by
    /// `X.Y.Z`. Returns the tag name, or `None` if no ancestor is tagged.
    pub fn latest_version_tag(&self, prefix: &str) -> Result<Option<String>> {
        let mut tagged: HashMap<Oid, String> = HashMap::new();
        let names = self.repo.tag_names(None).context("Failed to list tags")?;

        for name in names.iter().flatten() {
            let Some(version) = name.strip_prefix(prefix) else {
                continue;
            };
            if !VERSION_TAG_PATTERN.is_match(version) {
                continue;
            }

            let commit = self
                .repo
                .revparse_single(&format!("refs/tags/{name}"))
                .and_then(|obj| obj.peel_to_commit())
                .with_context(|| format!("Failed to resolve tag {name}"))?;
            tagged.insert(commit.id(), name.to_string());
        }

        if tagged.is_empty() {
            return Ok(None);
        }

        let Some(walker) = self.walk_from_head()? else {
            return Ok(None);
        };
        for oid in walker {
            let oid = oid.context("Failed to get commit OID from walker")?;
            if let Some(name) = tagged.remove(&oid) {
                debug!(tag = %name, commit = %oid, "Found latest version tag");
                return Ok(Some(name));
            }
        }

        Ok(None)
    }

    /// Starts a newest-first walk from HEAD, or `None` for an empty repository.
    fn walk_from_head(&self) -> Result<Option<Revwalk<'_>>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                debug!("Repository has no commits yet");
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to get HEAD reference"),
        };
        let head_commit = head
            .peel_to_commit()
            .context("Failed to peel HEAD to commit")?;

        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .context("Failed to configure revwalk")?;
        walker
            .push(head_commit.id())
            .context("Failed to push HEAD commit")?;

        Ok(Some(walker))
    }
}

impl CommitSource for GitRepository {
    fn commits(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let Some(mut walker) = self.walk_from_head()? else {
            return Ok(Vec::new());
        };

        if let Some(since) = since {
            let start_commit = self
                .repo
                .revparse_single(since)
                .and_then(|obj| obj.peel_to_commit())
                .with_context(|| format!("Failed to parse start commit: {since}"))?;
            walker
                .hide(start_commit.id())
                .context("Failed to hide start commit")?;
        }

        let mut commits = Vec::new();
        for oid in walker {
            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;

            // Skip merge commits
            if commit.parent_count() > 1 {
                continue;
            }

            commits.push(Commit::from_git_commit(&commit));
        }

        // Reverse to get chronological order (oldest first)
        commits.reverse();

        debug!(since = ?since, count = commits.len(), "Collected commits");
        Ok(commits)
    }
}
