//! Renovate commit convention.
//!
//! Renovate does not state the previous version, so these bumps carry no
//! `from`:
//!
//! - `chore(deps): update <name> docker tag to <to> (#<pr>)`
//! - `chore(deps): update helm release <name> to <to> (#<pr>)`

use std::sync::LazyLock;

use crate::classify::{MessageShape, PatternClassifier, PR_SUFFIX};

/// Author fragment Renovate commits carry by default.
pub const DEFAULT_AUTHOR: &str = "renovate";

static SHAPES: LazyLock<Vec<MessageShape>> = LazyLock::new(|| {
    vec![
        // helm release
        MessageShape::new(&format!(
            r"^chore\(deps\): update helm release (?P<name>\S+) to (?P<to>\S+){PR_SUFFIX}"
        )),
        // docker tag
        MessageShape::new(&format!(
            r"^chore\(deps\): update (?P<name>\S+) docker tag to (?P<to>\S+){PR_SUFFIX}"
        )),
    ]
});

/// Builds the Renovate classifier gated on `author`.
pub fn classifier(author: &str) -> PatternClassifier {
    PatternClassifier::new("renovate", author, SHAPES.as_slice())
}
