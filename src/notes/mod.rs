//! Release-note extraction from conventional commit subjects.

pub mod extract;
pub mod prefix;

pub use extract::{ReleaseNotes, escape_newlines, extract_notes, split_escaped, unescape_newlines};
pub use prefix::{CommitPrefix, match_prefix};
