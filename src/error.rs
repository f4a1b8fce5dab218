//! Error types for relnote modules using thiserror.

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to list branches: {0}")]
    BranchList(#[source] git2::Error),

    #[error("Failed to delete branch '{0}': {1}")]
    BranchDelete(String, #[source] git2::Error),

    #[error("Refusing to delete branch '{0}': it is the base or the checked-out branch")]
    ProtectedBranch(String),
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("GitHub API request failed while trying to {action}: {source}")]
    Api {
        action: &'static str,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Rate limited by GitHub API. Resets at: {reset_time}")]
    RateLimited { reset_time: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Not found in {owner}/{repo}: {resource}")]
    ResourceNotFound {
        owner: String,
        repo: String,
        resource: String,
    },

    #[error("Failed to parse repository URL")]
    InvalidRepositoryUrl,

    #[error("Invalid repository slug '{0}': expected OWNER/REPO")]
    InvalidRepositorySlug(String),
}

/// Errors from writing CI step outputs.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Invalid step output name '{0}': must be non-empty and contain no '=' or newline")]
    InvalidName(String),

    #[error("Step output '{0}' contains a raw newline; escape it before writing")]
    MultilineValue(String),

    #[error("Failed to write step output: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors from trigger ref matching.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Ref '{0}' is neither the dev branch nor a vMAJOR.MINOR.PATCH tag")]
    NotTriggering(String),
}
