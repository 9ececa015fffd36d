//! Dependabot commit convention.
//!
//! `chore(deps): bump <name> from <from> to <to> (#<pr>)`

use std::sync::LazyLock;

use crate::classify::{MessageShape, PatternClassifier, PR_SUFFIX};

/// Author fragment Dependabot commits carry by default.
pub const DEFAULT_AUTHOR: &str = "dependabot";

static SHAPES: LazyLock<Vec<MessageShape>> = LazyLock::new(|| {
    vec![MessageShape::new(&format!(
        r"^chore\(deps\): bump (?P<name>\S+) from (?P<from>\S+) to (?P<to>\S+){PR_SUFFIX}"
    ))]
});

/// Builds the Dependabot classifier gated on `author`.
pub fn classifier(author: &str) -> PatternClassifier {
    PatternClassifier::new("dependabot", author, SHAPES.as_slice())
}
