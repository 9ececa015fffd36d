//! Extraction of pending changes from a Markdown changelog.
//!
//! Only the `Unreleased` section is read. Each heading one level below it opens
//! a subsection: known headings turn their top-level bullets into [`Change`]s,
//! headings ending in `(note)` are copied verbatim into the notes, and anything
//! else is dropped. Released sections are never looked at.

use crate::data::{Change, ChangeType};

/// Marker that turns a subsection into release notes.
const NOTE_MARKER: &str = "(note)";

const BULLET_PREFIXES: [&str; 2] = ["- ", "* "];

/// Pending changes found in a changelog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreleasedSection {
    /// Note subsections, heading included, joined by a blank line.
    pub notes: String,
    /// Bulleted changes in document order.
    pub changes: Vec<Change>,
}

impl UnreleasedSection {
    /// Returns true when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.changes.is_empty()
    }
}

/// Parses the `Unreleased` section of a Markdown changelog.
///
/// A changelog without such a section yields an empty result.
pub fn parse(document: &str) -> UnreleasedSection {
    let mut parser = Parser::default();
    for line in document.lines() {
        parser.feed(line);
    }
    parser.finish()
}

/// Maps a subsection heading to the change type it collects.
pub fn change_type_for(heading: &str) -> Option<ChangeType> {
    match heading.trim().to_lowercase().as_str() {
        "breaking" | "breaking changes" => Some(ChangeType::Breaking),
        "security" => Some(ChangeType::Security),
        "enhancements" | "enhancement" | "features" => Some(ChangeType::Enhancement),
        "bug fixes" | "bug fix" | "bugfixes" | "fixes" => Some(ChangeType::Bugfix),
        "other" | "other changes" => Some(ChangeType::Other),
        _ => None,
    }
}

/// Returns true for headings such as `Important announcement (note)`.
pub fn is_note_heading(heading: &str) -> bool {
    heading.trim().to_lowercase().ends_with(NOTE_MARKER)
}

/// Where the parser is relative to the `Unreleased` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Section {
    /// Before the `Unreleased` heading.
    #[default]
    Before,
    /// Inside the `Unreleased` section, opened by a heading of this level.
    Unreleased { level: usize },
    /// Past the end of the `Unreleased` section.
    After,
}

/// What the current subsection collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Subsection {
    /// No subsection heading seen yet.
    #[default]
    None,
    /// Bullets become changes of this type.
    Changes(ChangeType),
    /// Body is copied into the notes.
    Note,
    /// Unrecognized heading, body dropped.
    Skipped,
}

/// Opening line of a fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    /// A closing fence uses the same marker, at least as many times, and
    /// carries no info string.
    fn is_closed_by(&self, line: &str) -> bool {
        Fence::open(line).is_some_and(|other| {
            other.marker == self.marker
                && other.len >= self.len
                && line.trim_start()[other.len..].trim().is_empty()
        })
    }
}

#[derive(Debug, Default)]
struct Parser {
    section: Section,
    subsection: Subsection,
    fence: Option<Fence>,
    note: Vec<String>,
    notes: Vec<String>,
    bullet: Option<String>,
    in_nested: bool,
    changes: Vec<Change>,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        if let Some(open) = self.fence {
            if open.is_closed_by(line) {
                self.fence = None;
            }
            self.body(line);
            return;
        }
        if let Some(open) = Fence::open(line) {
            self.fence = Some(open);
            self.body(line);
            return;
        }

        match heading(line) {
            Some((level, text)) => self.heading(level, text, line),
            None => self.body(line),
        }
    }

    fn heading(&mut self, level: usize, text: &str, raw: &str) {
        match self.section {
            Section::Before => {
                if is_unreleased_heading(text) {
                    self.section = Section::Unreleased { level };
                }
            }
            Section::Unreleased { level: section_level } => {
                if level <= section_level {
                    self.close_subsection();
                    self.section = Section::After;
                } else if level == section_level + 1 {
                    self.close_subsection();
                    self.subsection = if is_note_heading(text) {
                        self.note.push(raw.to_string());
                        Subsection::Note
                    } else {
                        change_type_for(text).map_or(Subsection::Skipped, Subsection::Changes)
                    };
                } else {
                    self.body(raw);
                }
            }
            Section::After => {}
        }
    }

    fn body(&mut self, line: &str) {
        if !matches!(self.section, Section::Unreleased { .. }) {
            return;
        }

        match self.subsection {
            Subsection::Note => self.note.push(line.to_string()),
            Subsection::Changes(kind) => self.bullet_line(kind, line),
            Subsection::None | Subsection::Skipped => {}
        }
    }

    fn bullet_line(&mut self, kind: ChangeType, line: &str) {
        if line.trim().is_empty() {
            self.close_bullet(kind);
            return;
        }

        if let Some(text) = bullet_text(line) {
            self.close_bullet(kind);
            self.bullet = Some(text.trim().to_string());
            return;
        }

        if line.starts_with(char::is_whitespace) {
            let trimmed = line.trim();
            if bullet_text(trimmed).is_some() || trimmed == "-" {
                self.in_nested = true;
            } else if !self.in_nested {
                if let Some(message) = self.bullet.as_mut() {
                    message.push(' ');
                    message.push_str(trimmed);
                }
            }
            return;
        }

        // Unindented prose ends the list item.
        self.close_bullet(kind);
    }

    fn close_bullet(&mut self, kind: ChangeType) {
        self.in_nested = false;
        if let Some(message) = self.bullet.take() {
            let message = message.trim();
            if !message.is_empty() {
                self.changes.push(Change::new(kind, message));
            }
        }
    }

    fn close_subsection(&mut self) {
        match self.subsection {
            Subsection::Changes(kind) => self.close_bullet(kind),
            Subsection::Note => {
                let block = self.note.join("\n");
                let block = block.trim_end();
                if !block.is_empty() {
                    self.notes.push(block.to_string());
                }
                self.note.clear();
            }
            Subsection::None | Subsection::Skipped => {}
        }
        self.subsection = Subsection::None;
    }

    fn finish(mut self) -> UnreleasedSection {
        self.close_subsection();
        UnreleasedSection {
            notes: self.notes.join("\n\n"),
            changes: self.changes,
        }
    }
}

/// Splits an ATX heading into its level and text.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = &line[level..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }

    let text = rest.trim();
    // Optional closing sequence, as in `## Title ##`.
    let unclosed = text.trim_end_matches('#');
    if unclosed.is_empty() || unclosed.ends_with([' ', '\t']) {
        return Some((level, unclosed.trim()));
    }
    Some((level, text))
}

fn is_unreleased_heading(text: &str) -> bool {
    text.trim_matches(|c| c == '[' || c == ']')
        .trim()
        .eq_ignore_ascii_case("unreleased")
}

fn bullet_text(line: &str) -> Option<&str> {
    if line == "-" || line == "*" {
        return Some("");
    }
    BULLET_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
}
