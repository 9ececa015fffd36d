//! YAML processing for the release record.
//!
//! The emitted layout is fixed so that regenerated files diff cleanly against
//! files written by other tooling: four-space block indentation, sequence items
//! nested under their key, a literal block for multi-line notes, and a stable
//! key order inside every record.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::data::{Change, Dependency, Document};

const INDENT: &str = "    ";

/// Plain scalars that a YAML 1.1 reader would turn into a number.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:\.[0-9]+|[0-9][0-9_]*(?:\.[0-9_]*)?)(?:[eE][-+]?[0-9]+)?|0x[0-9a-fA-F_]+|0o[0-7_]+|0b[01_]+|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .unwrap()
});

/// Plain scalars that a YAML 1.1 reader would turn into a bool or null.
const RESERVED_WORDS: &[&str] = &[
    "", "~", "null", "true", "false", "yes", "no", "on", "off", "y", "n",
];

/// Serializes a document in the canonical release record layout.
pub fn to_yaml(document: &Document) -> String {
    let mut out = String::new();

    if !document.notes.is_empty() {
        push_notes(&mut out, &document.notes);
    }

    if document.changes.is_empty() {
        out.push_str("changes: []\n");
    } else {
        out.push_str("changes:\n");
        for change in &document.changes {
            push_change(&mut out, change);
        }
    }

    if document.dependencies.is_empty() {
        out.push_str("dependencies: []\n");
    } else {
        out.push_str("dependencies:\n");
        for dependency in &document.dependencies {
            push_dependency(&mut out, dependency);
        }
    }

    out
}

/// Deserializes a document, treating blank input as an empty document.
pub fn from_yaml(yaml: &str) -> Result<Document, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Document::default());
    }
    serde_yaml::from_str(yaml)
}

fn push_notes(out: &mut String, notes: &str) {
    if !notes.contains('\n') {
        out.push_str(&format!("notes: {}\n", scalar(notes)));
        return;
    }

    let body = notes.trim_end_matches('\n');
    let chomping = match notes.len() - body.len() {
        0 => "-",
        1 => "",
        _ => "+",
    };
    // Readers infer indentation from the first non-empty line.
    let indentation = if body.trim_start_matches('\n').starts_with(' ') {
        "4"
    } else {
        ""
    };
    out.push_str(&format!("notes: |{indentation}{chomping}\n"));

    for line in body.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
    // Keep chomping lines beyond the first trailing newline.
    for _ in 1..(notes.len() - body.len()) {
        out.push('\n');
    }
}

fn push_change(out: &mut String, change: &Change) {
    out.push_str(&format!("{INDENT}- type: {}\n", change.kind));
    out.push_str(&format!("{INDENT}  message: {}\n", scalar(&change.message)));
}

fn push_dependency(out: &mut String, dependency: &Dependency) {
    out.push_str(&format!("{INDENT}- name: {}\n", scalar(&dependency.name)));
    if let Some(from) = &dependency.from {
        out.push_str(&format!("{INDENT}  from: {}\n", scalar(from)));
    }
    out.push_str(&format!("{INDENT}  to: {}\n", scalar(&dependency.to)));
    out.push_str(&format!("{INDENT}  meta:\n"));
    if let Some(pr) = &dependency.meta.pr {
        out.push_str(&format!("{INDENT}    pr: {}\n", double_quoted(pr)));
    }
    out.push_str(&format!(
        "{INDENT}    commit: {}\n",
        scalar(&dependency.meta.commit)
    ));
}

/// Renders a string as a plain scalar when that reads back unchanged, and as a
/// double-quoted scalar otherwise.
fn scalar(value: &str) -> Cow<'_, str> {
    if is_plain_safe(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(double_quoted(value))
    }
}

fn is_plain_safe(value: &str) -> bool {
    if RESERVED_WORDS
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
        || NUMERIC_PATTERN.is_match(value)
    {
        return false;
    }

    if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
        return false;
    }

    if value.chars().any(|c| c.is_control()) {
        return false;
    }

    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }

    let mut chars = value.chars();
    match chars.next() {
        Some('-' | '?' | ':') => !matches!(chars.next(), None | Some(' ')),
        Some(
            ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
            | '@' | '`',
        ) => false,
        _ => true,
    }
}

fn double_quoted(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c.is_control() => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::{ChangeType, DependencyMeta};

    fn sample() -> Document {
        Document {
            notes: "### Important announcement (note)\nThis is a release note".to_string(),
            changes: vec![
                Change::new(ChangeType::Breaking, "Support has been removed"),
                Change::new(
                    ChangeType::Security,
                    "Fixed a security issue that leaked all data",
                ),
            ],
            dependencies: vec![
                Dependency {
                    name: "thisdep".to_string(),
                    from: Some("1.7.0".to_string()),
                    to: "1.10.1".to_string(),
                    meta: DependencyMeta {
                        pr: None,
                        commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
                    },
                },
                Dependency {
                    name: "common-library".to_string(),
                    from: None,
                    to: "v1.0.4".to_string(),
                    meta: DependencyMeta {
                        pr: Some("401".to_string()),
                        commit: "89abcdef0123456789abcdef0123456789abcdef".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn emits_canonical_layout() {
        insta::assert_snapshot!(to_yaml(&sample()), @r#"
notes: |-
    ### Important announcement (note)
    This is a release note
changes:
    - type: breaking
      message: Support has been removed
    - type: security
      message: Fixed a security issue that leaked all data
dependencies:
    - name: thisdep
      from: 1.7.0
      to: 1.10.1
      meta:
        commit: 0123456789abcdef0123456789abcdef01234567
    - name: common-library
      to: v1.0.4
      meta:
        pr: "401"
        commit: 89abcdef0123456789abcdef0123456789abcdef
"#);
    }

    #[test]
    fn empty_document_lists_explicit_empty_sequences() {
        assert_eq!(
            to_yaml(&Document::default()),
            "changes: []\ndependencies: []\n"
        );
    }

    #[test]
    fn notes_chomping_follows_trailing_newlines() {
        let mut doc = Document {
            notes: "a\n\nb\n".to_string(),
            ..Default::default()
        };
        assert!(to_yaml(&doc).starts_with("notes: |\n    a\n\n    b\nchanges"));

        doc.notes = "single line".to_string();
        assert!(to_yaml(&doc).starts_with("notes: single line\n"));
    }

    #[test]
    fn scalars_that_would_change_type_are_quoted() {
        assert_eq!(scalar("1.10"), "\"1.10\"");
        assert_eq!(scalar("42"), "\"42\"");
        assert_eq!(scalar("yes"), "\"yes\"");
        assert_eq!(scalar(""), "\"\"");
        assert_eq!(scalar("1.10.1"), "1.10.1");
        assert_eq!(scalar("v2.7.2"), "v2.7.2");
        assert_eq!(scalar("newrelic/infrastructure-bundle"), "newrelic/infrastructure-bundle");
    }

    #[test]
    fn scalars_with_indicators_are_quoted() {
        assert_eq!(scalar("key: value"), "\"key: value\"");
        assert_eq!(scalar("- item"), "\"- item\"");
        assert_eq!(scalar("-flag"), "-flag");
        assert_eq!(scalar("*alias"), "\"*alias\"");
        assert_eq!(scalar("say \"hi\""), "say \"hi\"");
        assert_eq!(scalar("\"hi\""), "\"\\\"hi\\\"\"");
        assert_eq!(scalar("trailing "), "\"trailing \"");
    }

    #[test]
    fn emitted_output_reads_back() {
        let mut doc = sample();
        doc.changes.push(Change::new(ChangeType::Other, "Fix: a \"quoted\" #1 thing"));
        doc.notes = "  indented first line\nsecond\n\n".to_string();

        let parsed = from_yaml(&to_yaml(&doc)).unwrap();
        assert_eq!(parsed, doc);

        doc.notes = "\n  indented after blank\nx".to_string();
        let emitted = to_yaml(&doc);
        assert!(emitted.starts_with("notes: |4-\n"));
        assert_eq!(from_yaml(&emitted).unwrap(), doc);
    }

    #[test]
    fn blank_input_is_empty_document() {
        assert_eq!(from_yaml("").unwrap(), Document::default());
        assert_eq!(from_yaml("  \n").unwrap(), Document::default());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let doc = from_yaml("notes: hello\n").unwrap();
        assert_eq!(doc.notes, "hello");
        assert!(doc.changes.is_empty());
        assert!(doc.dependencies.is_empty());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(from_yaml("changes: [").is_err());
        assert!(from_yaml("changes:\n    - type: nonsense\n      message: x\n").is_err());
    }
}
