//! Filter, join and escape commit subjects into a release-note document.

use std::collections::BTreeMap;

use serde::Serialize;

use super::prefix::{CommitPrefix, match_prefix};

/// Literal two-character sequence that stands in for a newline in step outputs.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// A single matched subject line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub prefix: CommitPrefix,
    pub line: String,
}

/// Ordered release-note lines, in the same relative order as the source history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseNotes {
    pub entries: Vec<NoteEntry>,
}

impl ReleaseNotes {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the matched subject lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.line.as_str())
    }

    /// The newline-joined document. Empty when nothing matched.
    pub fn document(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    /// The document with newlines escaped, suitable for a single-line step output.
    pub fn escaped(&self) -> String {
        escape_newlines(&self.document())
    }

    /// Number of entries per prefix, for run summaries.
    pub fn counts_by_prefix(&self) -> BTreeMap<CommitPrefix, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.prefix).or_insert(0) += 1;
        }
        counts
    }
}

/// Keep the subjects that start with a recognised prefix, preserving order.
///
/// Each input is reduced to its first line (what `git log --pretty=format:%s`
/// prints). Non-matching subjects are dropped silently; no matches at all is a
/// valid, empty result.
pub fn extract_notes<I, S>(subjects: I) -> ReleaseNotes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let entries = subjects
        .into_iter()
        .filter_map(|subject| {
            let line = subject_line(subject.as_ref());
            match_prefix(line).map(|prefix| NoteEntry {
                prefix,
                line: line.to_string(),
            })
        })
        .collect();

    ReleaseNotes { entries }
}

fn subject_line(message: &str) -> &str {
    let first = message.split('\n').next().unwrap_or("");
    first.strip_suffix('\r').unwrap_or(first)
}

/// Replace every newline with the literal sequence `\n`.
pub fn escape_newlines(text: &str) -> String {
    text.replace('\n', ESCAPED_NEWLINE)
}

/// Inverse of [`escape_newlines`].
pub fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, "\n")
}

/// Split an escaped document back into its lines. An empty document has no lines.
pub fn split_escaped(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(ESCAPED_NEWLINE).map(str::to_string).collect()
}
