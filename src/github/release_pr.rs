//! Release PR creation via the GitHub REST API.
//!
//! The flow mirrors what a create-pull-request action does for a workflow
//! that has nothing to change on disk: put a marker commit on top of the
//! triggering commit, point the release branch at it, then open a PR (or
//! refresh the one that is already open).

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::GitHubError;

use super::remote::RepoSlug;

/// Branch the release PR is opened from.
pub const DEFAULT_RELEASE_BRANCH: &str = "release-branch";

/// Title of the release PR.
pub const DEFAULT_PR_TITLE: &str = "Release PR";

/// Message of the commit placed on the release branch.
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: create release notes";

/// Fixed parts of the release PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePrSettings {
    pub branch: String,
    pub title: String,
    pub commit_message: String,
}

impl Default for ReleasePrSettings {
    fn default() -> Self {
        Self {
            branch: DEFAULT_RELEASE_BRANCH.to_string(),
            title: DEFAULT_PR_TITLE.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Everything needed to open one release PR.
#[derive(Debug, Clone)]
pub struct ReleasePrRequest<'a> {
    pub slug: &'a RepoSlug,
    pub base: &'a str,
    pub head_sha: &'a str,
    pub body: &'a str,
    pub settings: &'a ReleasePrSettings,
}

/// Whether the PR was opened or an existing one refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrAction {
    Created,
    Updated,
}

/// The resulting pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePr {
    pub number: u64,
    pub html_url: String,
    pub action: PrAction,
    pub commit_sha: String,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitCommitObject {
    sha: String,
    tree: ShaRef,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct PullSummary {
    number: u64,
    html_url: String,
}

#[derive(Debug, Serialize)]
struct OpenPullQuery<'a> {
    state: &'a str,
    head: String,
    base: &'a str,
}

/// Build an octocrab client authenticated with `token`.
pub fn build_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| GitHubError::Api {
            action: "build the GitHub client",
            source: Box::new(e),
        })
}

/// Look up the repository's default branch.
///
/// Used as the PR base when the trigger does not name a branch (tag pushes).
/// A 404 here means the repository itself is missing or not visible.
pub async fn default_branch_with_client(
    octocrab: &Octocrab,
    slug: &RepoSlug,
) -> Result<String, GitHubError> {
    let repository: RepositoryInfo = octocrab
        .get(format!("/repos/{}/{}", slug.owner, slug.repo), None::<&()>)
        .await
        .map_err(|e| match api_error("read the repository", slug, "repository", e) {
            GitHubError::ResourceNotFound { owner, repo, .. } => {
                GitHubError::RepositoryNotFound { owner, repo }
            }
            other => other,
        })?;

    debug!(branch = %repository.default_branch, "Resolved default branch");
    Ok(repository.default_branch)
}

/// Open or refresh the release PR using a pre-configured octocrab client.
///
/// Taking the client allows dependency injection for testing with mock servers.
pub async fn open_release_pr_with_client(
    octocrab: &Octocrab,
    request: &ReleasePrRequest<'_>,
) -> Result<ReleasePr, GitHubError> {
    let slug = request.slug;
    let settings = request.settings;
    let repo_route = format!("/repos/{}/{}", slug.owner, slug.repo);

    // 1. Marker commit on top of the triggering commit, reusing its tree
    let head: GitCommitObject = octocrab
        .get(format!("{}/git/commits/{}", repo_route, request.head_sha), None::<&()>)
        .await
        .map_err(|e| {
            api_error(
                "read the head commit",
                slug,
                format!("commit {}", request.head_sha),
                e,
            )
        })?;

    let commit: GitCommitObject = octocrab
        .post(
            format!("{}/git/commits", repo_route),
            Some(&json!({
                "message": settings.commit_message,
                "tree": head.tree.sha,
                "parents": [request.head_sha],
            })),
        )
        .await
        .map_err(|e| {
            api_error(
                "create the release commit",
                slug,
                format!("tree {}", head.tree.sha),
                e,
            )
        })?;
    debug!(sha = %commit.sha, "Created release commit");

    // 2. Point the release branch at it
    let full_ref = format!("refs/heads/{}", settings.branch);
    let matching: Vec<GitRef> = octocrab
        .get(
            format!("{}/git/matching-refs/heads/{}", repo_route, settings.branch),
            None::<&()>,
        )
        .await
        .map_err(|e| api_error("look up the release branch", slug, full_ref.clone(), e))?;

    if matching.iter().any(|r| r.name == full_ref) {
        let _: serde_json::Value = octocrab
            .patch(
                format!("{}/git/refs/heads/{}", repo_route, settings.branch),
                Some(&json!({ "sha": commit.sha, "force": true })),
            )
            .await
            .map_err(|e| api_error("update the release branch", slug, full_ref.clone(), e))?;
        debug!(branch = %settings.branch, "Moved release branch");
    } else {
        let _: serde_json::Value = octocrab
            .post(
                format!("{}/git/refs", repo_route),
                Some(&json!({ "ref": full_ref, "sha": commit.sha })),
            )
            .await
            .map_err(|e| api_error("create the release branch", slug, full_ref.clone(), e))?;
        debug!(branch = %settings.branch, "Created release branch");
    }

    // 3. Refresh an open PR or create a new one
    let query = OpenPullQuery {
        state: "open",
        head: format!("{}:{}", slug.owner, settings.branch),
        base: request.base,
    };
    let open: Vec<PullSummary> = octocrab
        .get(format!("{}/pulls", repo_route), Some(&query))
        .await
        .map_err(|e| api_error("list open pull requests", slug, "pull requests", e))?;

    let (pull, action) = match open.into_iter().next() {
        Some(existing) => {
            let pull: PullSummary = octocrab
                .patch(
                    format!("{}/pulls/{}", repo_route, existing.number),
                    Some(&json!({ "title": settings.title, "body": request.body })),
                )
                .await
                .map_err(|e| {
                    api_error(
                        "update the release pull request",
                        slug,
                        format!("pull request #{}", existing.number),
                        e,
                    )
                })?;
            (pull, PrAction::Updated)
        }
        None => {
            let pull: PullSummary = octocrab
                .post(
                    format!("{}/pulls", repo_route),
                    Some(&json!({
                        "title": settings.title,
                        "head": settings.branch,
                        "base": request.base,
                        "body": request.body,
                    })),
                )
                .await
                .map_err(|e| {
                    api_error(
                        "create the release pull request",
                        slug,
                        format!("base branch {}", request.base),
                        e,
                    )
                })?;
            (pull, PrAction::Created)
        }
    };

    info!(number = pull.number, url = %pull.html_url, ?action, "Release PR ready");

    Ok(ReleasePr {
        number: pull.number,
        html_url: pull.html_url,
        action,
        commit_sha: commit.sha,
    })
}

/// Classify an octocrab failure.
///
/// Both Display and Debug output are checked because octocrab's error
/// formats differ between variants. A 404 names the `resource` that was
/// missing rather than blaming the repository.
fn api_error(
    action: &'static str,
    slug: &RepoSlug,
    resource: impl Into<String>,
    e: octocrab::Error,
) -> GitHubError {
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);

    if err_display.to_lowercase().contains("rate limit")
        || err_debug.to_lowercase().contains("rate limit")
    {
        return GitHubError::RateLimited {
            reset_time: "unknown".to_string(),
        };
    }

    if err_display.contains("Not Found") || err_debug.contains("Not Found") {
        return GitHubError::ResourceNotFound {
            owner: slug.owner.clone(),
            repo: slug.repo.clone(),
            resource: resource.into(),
        };
    }

    GitHubError::Api {
        action,
        source: Box::new(e),
    }
}
