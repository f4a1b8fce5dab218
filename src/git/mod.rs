//! Git operations using git2-rs.

pub mod branches;
pub mod history;

pub use branches::{current_branch, delete_branches, merged_branches};
pub use history::{
    Commit, head_sha, open_repository, read_history, read_history_between, read_history_range,
    resolve_reference,
};
