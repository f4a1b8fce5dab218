//! relnote - extract conventional-commit release notes and open a release PR.
//!
//! # Overview
//!
//! relnote reads the commit history of a repository, keeps the subjects that
//! start with `feat:`, `fix:`, `docs:`, `style:`, `refactor:`, `perf:`,
//! `test:` or `chore:`, and publishes them as a single-line CI step output
//! and as the body of an automatically opened "Release PR".

pub mod error;
pub mod git;
pub mod github;
pub mod logging;
pub mod notes;
pub mod output;
pub mod trigger;

// Re-export commonly used types
pub use error::{GitError, GitHubError, OutputError, TriggerError};
pub use git::Commit;
pub use notes::{CommitPrefix, ReleaseNotes, extract_notes};
pub use output::StepOutput;
pub use trigger::Trigger;
