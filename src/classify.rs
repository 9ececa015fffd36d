//! Detection of dependency bumps in commits written by update bots.
//!
//! Each bot convention is a [`PatternClassifier`]: an author identity plus an
//! ordered table of [`MessageShape`]s. A commit is first gated on its author,
//! then its subject is matched against the shapes in order and the first shape
//! that matches extracts the [`Dependency`].

use regex::{Captures, Regex};

use crate::data::{Dependency, DependencyMeta};
use crate::git::Commit;

pub mod dependabot;
pub mod renovate;

/// Trailing pull request reference appended by forges when squash-merging.
pub(crate) const PR_SUFFIX: &str = r"(?: \(#(?P<pr>\d+)\))?$";

/// Decides whether a commit is a dependency bump.
pub trait DependencyClassifier {
    /// Short identifier of the convention, e.g. `dependabot`.
    fn name(&self) -> &'static str;

    /// Returns the bump described by `commit`, or `None` when the commit does
    /// not follow this convention.
    fn classify(&self, commit: &Commit) -> Option<Dependency>;
}

/// One recognized subject layout of a convention.
///
/// The pattern must capture `name` and `to`, and may capture `from` and `pr`.
#[derive(Debug)]
pub struct MessageShape {
    pattern: Regex,
}

impl MessageShape {
    /// Builds a shape from a subject pattern.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    #[allow(clippy::unwrap_used)] // Shape tables use compile-time constant patterns
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// Extracts a dependency from `subject`, attributing it to `hash`.
    pub fn extract(&self, subject: &str, hash: &str) -> Option<Dependency> {
        let caps = self.pattern.captures(subject)?;
        let name = non_empty(&caps, "name")?;
        let to = non_empty(&caps, "to")?;

        Some(Dependency {
            name,
            from: non_empty(&caps, "from"),
            to,
            meta: DependencyMeta {
                pr: non_empty(&caps, "pr"),
                commit: hash.to_string(),
            },
        })
    }
}

fn non_empty(caps: &Captures<'_>, group: &str) -> Option<String> {
    caps.name(group)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// A bot convention backed by a table of message shapes.
#[derive(Debug)]
pub struct PatternClassifier {
    name: &'static str,
    author: String,
    shapes: &'static [MessageShape],
}

impl PatternClassifier {
    /// Creates a classifier accepting commits whose author contains `author`.
    ///
    /// An empty `author` accepts every commit.
    pub fn new(
        name: &'static str,
        author: impl Into<String>,
        shapes: &'static [MessageShape],
    ) -> Self {
        Self {
            name,
            author: author.into(),
            shapes,
        }
    }
}

impl DependencyClassifier for PatternClassifier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn classify(&self, commit: &Commit) -> Option<Dependency> {
        if !commit.author.contains(self.author.as_str()) {
            return None;
        }

        let subject = commit.subject();
        self.shapes
            .iter()
            .find_map(|shape| shape.extract(subject, &commit.hash))
    }
}

/// Settings of one bot convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionConfig {
    /// Whether the convention is scanned at all.
    pub enabled: bool,
    /// Author fragment a commit must contain to be considered.
    pub author: String,
}

/// Which conventions a generation run applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Dependabot-style `bump <name> from <a> to <b>` commits.
    pub dependabot: ConventionConfig,
    /// Renovate-style `update <name> docker tag to <b>` commits.
    pub renovate: ConventionConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            dependabot: ConventionConfig {
                enabled: true,
                author: dependabot::DEFAULT_AUTHOR.to_string(),
            },
            renovate: ConventionConfig {
                enabled: true,
                author: renovate::DEFAULT_AUTHOR.to_string(),
            },
        }
    }
}

impl ClassifierConfig {
    /// A configuration with every convention turned off.
    pub fn disabled() -> Self {
        let mut config = Self::default();
        config.dependabot.enabled = false;
        config.renovate.enabled = false;
        config
    }
}

/// The enabled classifiers, in priority order.
pub struct Classifiers {
    enabled: Vec<Box<dyn DependencyClassifier>>,
}

impl Classifiers {
    /// Builds the enabled classifiers. Dependabot takes priority over Renovate.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let mut enabled: Vec<Box<dyn DependencyClassifier>> = Vec::new();
        if config.dependabot.enabled {
            enabled.push(Box::new(dependabot::classifier(&config.dependabot.author)));
        }
        if config.renovate.enabled {
            enabled.push(Box::new(renovate::classifier(&config.renovate.author)));
        }
        Self { enabled }
    }

    /// Builds a set from arbitrary classifiers, keeping the given order.
    pub fn with(enabled: Vec<Box<dyn DependencyClassifier>>) -> Self {
        Self { enabled }
    }

    /// Names of the enabled classifiers, in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.enabled.iter().map(|c| c.name()).collect()
    }

    /// Returns the bump found by the first classifier that matches `commit`.
    pub fn classify(&self, commit: &Commit) -> Option<Dependency> {
        self.enabled.iter().find_map(|c| c.classify(commit))
    }
}
