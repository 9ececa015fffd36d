//! Commit history access.

use anyhow::Result;

pub mod commit;
pub mod repository;

pub use commit::Commit;
pub use repository::GitRepository;

/// Length of a full SHA-1 commit hash in hex characters.
pub const FULL_HASH_LEN: usize = 40;

/// Supplies the commits a release is built from.
pub trait CommitSource {
    /// Returns commits after `since` (or the whole history when `None`),
    /// oldest first.
    fn commits(&self, since: Option<&str>) -> Result<Vec<Commit>>;
}

/// An in-memory history, already ordered oldest first.
///
/// `since` is matched against commit hashes; an unknown `since` yields the
/// whole slice.
impl CommitSource for [Commit] {
    fn commits(&self, since: Option<&str>) -> Result<Vec<Commit>> {
        let start = since
            .and_then(|since| self.iter().position(|c| c.hash == since))
            .map_or(0, |idx| idx + 1);
        Ok(self[start..].to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_honors_since() {
        let history = vec![
            Commit::new("a", "x", "one"),
            Commit::new("b", "x", "two"),
            Commit::new("c", "x", "three"),
        ];

        let all = history.as_slice().commits(None).unwrap();
        assert_eq!(all.len(), 3);

        let after_a = history.as_slice().commits(Some("a")).unwrap();
        let hashes: Vec<_> = after_a.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, ["b", "c"]);

        assert!(history.as_slice().commits(Some("c")).unwrap().is_empty());
        assert_eq!(history.as_slice().commits(Some("zzz")).unwrap().len(), 3);
    }
}
