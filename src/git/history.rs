//! Commit history walking using git2-rs.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitError;

/// A commit as seen in `git log`: hash, subject line and commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    /// Create a Commit from a git2 commit.
    pub fn from_git2_commit(commit: &git2::Commit) -> Self {
        let hash = commit.id().to_string();
        let subject = commit
            .summary_bytes()
            .map(|bytes| decode_subject(bytes, commit.message_encoding()))
            .unwrap_or_default();
        let time = commit.time();
        let timestamp = Utc
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            hash,
            subject,
            timestamp,
        }
    }
}

/// Decode a raw subject line to UTF-8 the way `git log` re-encodes it.
///
/// Valid UTF-8 is used as-is. Latin-1 messages (declared through the commit's
/// `encoding` header) are mapped byte-for-byte; anything else is decoded lossily.
pub fn decode_subject(bytes: &[u8], encoding: Option<&str>) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    match encoding.map(str::to_ascii_lowercase).as_deref() {
        Some("iso-8859-1" | "iso8859-1" | "latin1" | "latin-1") => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Open the repository containing `path`, searching parent directories.
pub fn open_repository(path: &std::path::Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Read every commit reachable from HEAD, newest first.
///
/// A repository without any commits has an empty history.
pub fn read_history(repo: &Repository) -> Result<Vec<Commit>, GitError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
            debug!("HEAD is unborn, history is empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(GitError::ReferenceNotFound("HEAD".to_string(), e)),
    };
    let head_oid = head.peel_to_commit().map_err(GitError::ParseCommit)?.id();

    walk(repo, head_oid, None)
}

/// Read commits in `from..to`, newest first. `from` itself is excluded.
pub fn read_history_range(repo: &Repository, from: Oid, to: Oid) -> Result<Vec<Commit>, GitError> {
    walk(repo, to, Some(from))
}

fn walk(repo: &Repository, tip: Oid, hide: Option<Oid>) -> Result<Vec<Commit>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.set_sorting(Sort::TIME).map_err(GitError::RevwalkError)?;
    revwalk.push(tip).map_err(GitError::RevwalkError)?;
    if let Some(hidden) = hide {
        revwalk.hide(hidden).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        commits.push(Commit::from_git2_commit(&commit));
    }

    debug!(count = commits.len(), tip = %tip, "Walked commit history");
    Ok(commits)
}

/// Resolve a reference (tag, branch, commit hash) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    match repo.revparse_single(reference) {
        Ok(obj) => Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id()),
        Err(e) => Err(GitError::ReferenceNotFound(reference.to_string(), e)),
    }
}

/// Read history honouring optional `--from`/`--to` bounds.
///
/// Without `from`, the whole history reachable from `to` (default HEAD) is read.
pub fn read_history_between(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<Commit>, GitError> {
    match (from, to) {
        (None, None) => read_history(repo),
        (None, Some(to)) => {
            let to_oid = resolve_reference(repo, to)?;
            walk(repo, to_oid, None)
        }
        (Some(from), to) => {
            let from_oid = resolve_reference(repo, from)?;
            let to_oid = resolve_reference(repo, to.unwrap_or("HEAD"))?;
            read_history_range(repo, from_oid, to_oid)
        }
    }
}

/// The commit HEAD points at, as a hex string.
pub fn head_sha(repo: &Repository) -> Result<String, GitError> {
    let head = repo
        .head()
        .map_err(|e| GitError::ReferenceNotFound("HEAD".to_string(), e))?;
    Ok(head.peel_to_commit().map_err(GitError::ParseCommit)?.id().to_string())
}
