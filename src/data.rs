//! Release record data model and merge rules.

use std::fmt;

use serde::Deserialize;

pub mod store;
pub mod yaml;

pub use store::{DocumentStore, StoreError, YamlFileStore};
pub use yaml::{from_yaml, to_yaml};

/// Category of a human-authored change, derived from a changelog heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Incompatible change.
    Breaking,
    /// Security fix or hardening.
    Security,
    /// New feature or improvement.
    Enhancement,
    /// Bug fix.
    Bugfix,
    /// Anything else worth mentioning.
    Other,
}

impl ChangeType {
    /// Returns the tag used in the serialized document.
    pub const fn as_str(self) -> &'static str {
        match self {
            ChangeType::Breaking => "breaking",
            ChangeType::Security => "security",
            ChangeType::Enhancement => "enhancement",
            ChangeType::Bugfix => "bugfix",
            ChangeType::Other => "other",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single changelog bullet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Change {
    /// Category the bullet was listed under.
    #[serde(rename = "type")]
    pub kind: ChangeType,
    /// Bullet text.
    pub message: String,
}

impl Change {
    /// Creates a new change.
    pub fn new(kind: ChangeType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Provenance of a detected dependency bump.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyMeta {
    /// Pull request number, when the commit subject carries `(#123)`.
    #[serde(default)]
    pub pr: Option<String>,
    /// Full hash of the commit the bump was detected in.
    pub commit: String,
}

/// A dependency bump detected from an automated commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    /// Dependency identifier as written by the bot.
    pub name: String,
    /// Previous version, when the bot states it.
    #[serde(default)]
    pub from: Option<String>,
    /// New version.
    pub to: String,
    /// Where the bump came from.
    pub meta: DependencyMeta,
}

/// The persisted release record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Document {
    /// Free-form release notes.
    #[serde(default)]
    pub notes: String,
    /// Human-authored changes, in document order.
    #[serde(default)]
    pub changes: Vec<Change>,
    /// Detected dependency bumps, in commit order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Document {
    /// Returns true when the document carries nothing to release.
    pub fn is_empty(&self) -> bool {
        self.notes.trim().is_empty() && self.changes.is_empty() && self.dependencies.is_empty()
    }

    /// Replaces the notes, unless `notes` is blank.
    ///
    /// A blank Unreleased note section must not wipe notes that were added by
    /// hand to the persisted document.
    pub fn merge_notes(&mut self, notes: &str) {
        if !notes.trim().is_empty() {
            self.notes = notes.to_string();
        }
    }

    /// Appends `change` unless an identical (type, message) entry exists.
    ///
    /// Returns whether the change was added.
    pub fn merge_change(&mut self, change: Change) -> bool {
        if self.changes.contains(&change) {
            return false;
        }
        self.changes.push(change);
        true
    }

    /// Merges a dependency bump keyed by name.
    ///
    /// An unknown name is appended. A known name is replaced in place when the
    /// target version differs, so the newest bump wins.
    pub fn merge_dependency(&mut self, dependency: Dependency) -> bool {
        match self
            .dependencies
            .iter_mut()
            .find(|existing| existing.name == dependency.name)
        {
            Some(existing) if existing.to == dependency.to => false,
            Some(existing) => {
                *existing = dependency;
                true
            }
            None => {
                self.dependencies.push(dependency);
                true
            }
        }
    }
}
