//! GitHub API operations using octocrab.

pub mod auth;
pub mod release_pr;
pub mod remote;

pub use auth::{GitHubToken, TokenSource, get_github_token};
pub use release_pr::{
    PrAction, ReleasePr, ReleasePrRequest, ReleasePrSettings, build_client,
    default_branch_with_client, open_release_pr_with_client,
};
pub use remote::{RepoSlug, parse_github_remote, resolve_repository};
