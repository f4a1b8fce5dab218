//! Repository identification: `OWNER/REPO` slugs and git remote URLs.

use git2::Repository;

use crate::error::GitHubError;

/// Environment variable the Actions runner sets to `OWNER/REPO`.
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// A GitHub repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for RepoSlug {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(GitHubError::InvalidRepositorySlug(s.to_string())),
        }
    }
}

/// Work out which repository to talk to.
///
/// An explicit slug wins, then `GITHUB_REPOSITORY`, then the `origin` remote.
pub fn resolve_repository(
    explicit: Option<&str>,
    repo: &Repository,
) -> Result<RepoSlug, GitHubError> {
    if let Some(slug) = explicit {
        return slug.parse();
    }

    if let Ok(slug) = std::env::var(GITHUB_REPOSITORY_ENV) {
        if !slug.is_empty() {
            return slug.parse();
        }
    }

    let remote = repo
        .find_remote("origin")
        .map_err(|_| GitHubError::InvalidRepositoryUrl)?;
    let url = remote.url().ok_or(GitHubError::InvalidRepositoryUrl)?;
    parse_github_remote(url)
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<RepoSlug, GitHubError> {
    // SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    // HTTPS or ssh:// format: https://github.com/owner/repo.git
    if let Some((_, path)) = url.split_once("github.com/") {
        return parse_owner_repo_path(path);
    }

    Err(GitHubError::InvalidRepositoryUrl)
}

fn parse_owner_repo_path(path: &str) -> Result<RepoSlug, GitHubError> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');

    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => Ok(RepoSlug {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => Err(GitHubError::InvalidRepositoryUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(owner: &str, repo: &str) -> RepoSlug {
        RepoSlug {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    #[test]
    fn test_parse_ssh_url() {
        assert_eq!(parse_github_remote("git@github.com:owner/repo.git").unwrap(), slug("owner", "repo"));
    }

    #[test]
    fn test_parse_https_url() {
        assert_eq!(parse_github_remote("https://github.com/owner/repo.git").unwrap(), slug("owner", "repo"));
        assert_eq!(parse_github_remote("https://github.com/owner/repo").unwrap(), slug("owner", "repo"));
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(parse_github_remote("https://gitlab.com/owner/repo").is_err());
        assert!(parse_github_remote("https://github.com/owner").is_err());
    }

    #[test]
    fn test_parse_slug() {
        assert_eq!("acme/widgets".parse::<RepoSlug>().unwrap(), slug("acme", "widgets"));
        assert!("acme".parse::<RepoSlug>().is_err());
        assert!("acme/widgets/extra".parse::<RepoSlug>().is_err());
        assert!("/widgets".parse::<RepoSlug>().is_err());
    }

    #[test]
    fn test_explicit_slug_wins_over_env() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let repo = Repository::init(dir.path()).expect("failed to init repo");
        temp_env::with_var(GITHUB_REPOSITORY_ENV, Some("env/repo"), || {
            assert_eq!(resolve_repository(Some("cli/repo"), &repo).unwrap(), slug("cli", "repo"));
            assert_eq!(resolve_repository(None, &repo).unwrap(), slug("env", "repo"));
        });
    }

    #[test]
    fn test_falls_back_to_origin_remote() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let repo = Repository::init(dir.path()).expect("failed to init repo");
        repo.remote("origin", "git@github.com:remote/repo.git")
            .expect("failed to add remote");
        temp_env::with_var_unset(GITHUB_REPOSITORY_ENV, || {
            assert_eq!(resolve_repository(None, &repo).unwrap(), slug("remote", "repo"));
        });
    }
}
