//! GitHub token discovery.
//!
//! Lookup order:
//! 1. `GITHUB_TOKEN` (what the Actions runner provides)
//! 2. `GH_TOKEN`
//! 3. `gh auth token` from an authenticated gh CLI

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    GithubTokenEnv,
    GhTokenEnv,
    GhCli,
}

/// A token together with its origin, for diagnostics.
#[derive(Clone)]
pub struct GitHubToken {
    pub token: String,
    pub source: TokenSource,
}

impl std::fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubToken")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Find a GitHub token, preferring the CI-provided environment variables.
pub fn get_github_token() -> Result<GitHubToken, GitHubError> {
    if let Some(token) = token_from_env() {
        return Ok(token);
    }

    if let Some(token) = token_from_gh_cli() {
        debug!("Using token from gh CLI");
        return Ok(GitHubToken {
            token,
            source: TokenSource::GhCli,
        });
    }

    Err(GitHubError::AuthenticationFailed)
}

/// Look only at `GITHUB_TOKEN` and `GH_TOKEN`, ignoring empty values.
pub fn token_from_env() -> Option<GitHubToken> {
    [
        ("GITHUB_TOKEN", TokenSource::GithubTokenEnv),
        ("GH_TOKEN", TokenSource::GhTokenEnv),
    ]
    .into_iter()
    .find_map(|(var, source)| {
        let token = env::var(var).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| GitHubToken {
            token: token.to_string(),
            source,
        })
    })
}

fn token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
