//! Commit records consumed by the classifiers.

/// A commit as seen by the classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Commit author name and email address, as `Name <email>`.
    pub author: String,
    /// The full commit message.
    pub message: String,
}

impl Commit {
    /// Creates a commit record.
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            author: author.into(),
            message: message.into(),
        }
    }

    /// Creates a commit record from a `git2::Commit`.
    pub fn from_git_commit(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        Self {
            hash: commit.id().to_string(),
            author: format!(
                "{} <{}>",
                author.name().unwrap_or("Unknown"),
                author.email().unwrap_or("unknown@example.com")
            ),
            message: commit.message().unwrap_or("").to_string(),
        }
    }

    /// First line of the message, without trailing whitespace.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim_end()
    }
}
