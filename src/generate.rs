//! Building the release record from a changelog and commit history.

use anyhow::{Context, Result};

use crate::changelog;
use crate::classify::{ClassifierConfig, Classifiers};
use crate::data::{Document, DocumentStore};
use crate::git::{Commit, CommitSource};

/// Merges the changelog's Unreleased section and the dependency bumps found in
/// `commits` into `prior`.
///
/// `commits` are applied in the given order, so later bumps of the same
/// dependency replace earlier ones.
pub fn generate(
    prior: Document,
    changelog_text: &str,
    commits: &[Commit],
    config: &ClassifierConfig,
) -> Document {
    generate_with(
        prior,
        changelog_text,
        commits,
        &Classifiers::from_config(config),
    )
}

/// Same as [`generate`], with an explicit classifier set.
pub fn generate_with(
    prior: Document,
    changelog_text: &str,
    commits: &[Commit],
    classifiers: &Classifiers,
) -> Document {
    let mut document = prior;
    let unreleased = changelog::parse(changelog_text);

    document.merge_notes(&unreleased.notes);
    for change in unreleased.changes {
        document.merge_change(change);
    }

    for dependency in commits.iter().filter_map(|c| classifiers.classify(c)) {
        document.merge_dependency(dependency);
    }

    document
}

/// Loads the stored record, merges in fresh results and saves it back.
///
/// Nothing is written unless every collaborator succeeded. With `dry_run` the
/// merged record is returned without being saved.
pub fn run<S, C>(
    store: &S,
    source: &C,
    since: Option<&str>,
    changelog_text: &str,
    classifiers: &Classifiers,
    dry_run: bool,
) -> Result<Document>
where
    S: DocumentStore + ?Sized,
    C: CommitSource + ?Sized,
{
    let prior = store.load()?;
    let commits = source
        .commits(since)
        .context("Failed to read commit history")?;

    let document = generate_with(prior, changelog_text, &commits, classifiers);

    if !dry_run {
        store.save(&document)?;
    }
    Ok(document)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::data::{Change, ChangeType, StoreError};

    const CHANGELOG: &str = "# Changelog

## Unreleased

### Important announcement (note)
This is a release note

### Breaking
- Support has been removed

### Security
- Fixed a security issue that leaked all data

## v1.2.3 - 20YY-DD-MM

### Enhancements
- This is in the past and should not be included
";

    const DEPENDABOT: &str = "dependabot <dependabot@github.com>";
    const RENOVATE: &str = "renovate[bot] <renovatebot@imadethisup.com>";

    fn history() -> Vec<Commit> {
        vec![
            Commit::new("h1", "Dev <dev@example.com>", "feat: something"),
            Commit::new(
                "h2",
                DEPENDABOT,
                "chore(deps): bump thisdep from 1.7.0 to 1.10.1",
            ),
            Commit::new(
                "h3",
                DEPENDABOT,
                "chore(deps): bump anotherdep from 0.0.1 to 0.0.2 (#69)",
            ),
            Commit::new(
                "h4",
                RENOVATE,
                "chore(deps): update newrelic/infrastructure-bundle docker tag to v2.7.2",
            ),
            Commit::new(
                "h5",
                RENOVATE,
                "chore(deps): update helm release common-library to v1.0.4 (#401)",
            ),
        ]
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn markdown_only() {
        let doc = generate(
            Document::default(),
            CHANGELOG,
            &history(),
            &ClassifierConfig::disabled(),
        );

        assert_eq!(
            doc.notes,
            "### Important announcement (note)\nThis is a release note"
        );
        assert_eq!(
            doc.changes,
            vec![
                Change::new(ChangeType::Breaking, "Support has been removed"),
                Change::new(
                    ChangeType::Security,
                    "Fixed a security issue that leaked all data"
                ),
            ]
        );
        assert!(doc.dependencies.is_empty());
    }

    #[test]
    fn disabling_renovate_drops_its_bumps() {
        let mut config = ClassifierConfig::default();
        config.renovate.enabled = false;

        let doc = generate(Document::default(), CHANGELOG, &history(), &config);
        assert_eq!(names(&doc), ["thisdep", "anotherdep"]);
        assert_eq!(doc.dependencies[0].meta.commit, "h2");
        assert_eq!(doc.dependencies[1].meta.pr.as_deref(), Some("69"));
    }

    #[test]
    fn disabling_dependabot_drops_its_bumps() {
        let mut config = ClassifierConfig::default();
        config.dependabot.enabled = false;

        let doc = generate(Document::default(), CHANGELOG, &history(), &config);
        assert_eq!(names(&doc), ["newrelic/infrastructure-bundle", "common-library"]);
        assert_eq!(doc.dependencies[1].meta.pr.as_deref(), Some("401"));
        assert_eq!(doc.dependencies[1].meta.commit, "h5");
    }

    #[test]
    fn generate_is_idempotent() {
        let config = ClassifierConfig::default();
        let once = generate(Document::default(), CHANGELOG, &history(), &config);
        let twice = generate(once.clone(), CHANGELOG, &history(), &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn repeated_bumps_keep_one_entry_per_dependency() {
        let commits = vec![
            Commit::new("a", DEPENDABOT, "chore(deps): bump x from 1.0.0 to 1.1.0"),
            Commit::new("b", DEPENDABOT, "chore(deps): bump x from 1.0.0 to 1.1.0"),
            Commit::new("c", DEPENDABOT, "chore(deps): bump x from 1.1.0 to 1.2.0 (#3)"),
        ];
        let doc = generate(
            Document::default(),
            "",
            &commits,
            &ClassifierConfig::default(),
        );

        assert_eq!(doc.dependencies.len(), 1);
        assert_eq!(doc.dependencies[0].from.as_deref(), Some("1.1.0"));
        assert_eq!(doc.dependencies[0].to, "1.2.0");
        assert_eq!(doc.dependencies[0].meta.commit, "c");
    }

    #[test]
    fn prior_content_is_kept() {
        let mut prior = Document {
            notes: "Kept by hand".to_string(),
            ..Default::default()
        };
        prior.merge_change(Change::new(ChangeType::Bugfix, "Earlier fix"));

        let doc = generate(
            prior,
            "## Unreleased\n### Breaking\n- New break\n",
            &[],
            &ClassifierConfig::default(),
        );
        assert_eq!(doc.notes, "Kept by hand");
        assert_eq!(doc.changes.len(), 2);
        assert_eq!(doc.changes[1].message, "New break");
    }

    #[test]
    fn nothing_to_do_is_not_an_error() {
        let doc = generate(
            Document::default(),
            "# Changelog\n",
            &history(),
            &ClassifierConfig::disabled(),
        );
        assert!(doc.is_empty());
    }

    #[derive(Default)]
    struct MemoryStore {
        document: RefCell<Document>,
        saves: RefCell<usize>,
    }

    impl DocumentStore for MemoryStore {
        fn load(&self) -> Result<Document, StoreError> {
            Ok(self.document.borrow().clone())
        }

        fn save(&self, document: &Document) -> Result<(), StoreError> {
            *self.document.borrow_mut() = document.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    struct BrokenSource;

    impl CommitSource for BrokenSource {
        fn commits(&self, _since: Option<&str>) -> Result<Vec<Commit>> {
            anyhow::bail!("repository unreachable")
        }
    }

    #[test]
    fn run_persists_merged_document() {
        let store = MemoryStore::default();
        let history = history();

        let doc = run(
            &store,
            history.as_slice(),
            Some("h3"),
            CHANGELOG,
            &Classifiers::from_config(&ClassifierConfig::default()),
            false,
        )
        .unwrap();

        assert_eq!(names(&doc), ["newrelic/infrastructure-bundle", "common-library"]);
        assert_eq!(*store.document.borrow(), doc);
        assert_eq!(*store.saves.borrow(), 1);
    }

    #[test]
    fn dry_run_does_not_save() {
        let store = MemoryStore::default();
        let doc = run(
            &store,
            history().as_slice(),
            None,
            CHANGELOG,
            &Classifiers::from_config(&ClassifierConfig::default()),
            true,
        )
        .unwrap();

        assert_eq!(doc.dependencies.len(), 4);
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn source_failure_is_fatal_and_saves_nothing() {
        let store = MemoryStore::default();
        let err = run(
            &store,
            &BrokenSource,
            None,
            CHANGELOG,
            &Classifiers::from_config(&ClassifierConfig::default()),
            false,
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("repository unreachable"));
        assert_eq!(*store.saves.borrow(), 0);
    }
}
