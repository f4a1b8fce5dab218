//! Cleanup of local branches that are already merged into a base branch.

use git2::{BranchType, Repository};
use tracing::{debug, info};

use crate::error::GitError;

/// Local branches whose tip is already contained in `base`.
///
/// The base branch and the checked-out branch are never returned.
pub fn merged_branches(repo: &Repository, base: &str) -> Result<Vec<String>, GitError> {
    let base_branch = repo
        .find_branch(base, BranchType::Local)
        .map_err(|e| GitError::ReferenceNotFound(base.to_string(), e))?;
    let base_oid = base_branch
        .get()
        .peel_to_commit()
        .map_err(GitError::ParseCommit)?
        .id();

    let current = current_branch(repo);
    let mut merged = Vec::new();

    for branch_result in repo
        .branches(Some(BranchType::Local))
        .map_err(GitError::BranchList)?
    {
        let (branch, _) = branch_result.map_err(GitError::BranchList)?;
        let Some(name) = branch.name().map_err(GitError::BranchList)?.map(str::to_string) else {
            debug!("Skipping branch with non UTF-8 name");
            continue;
        };

        if name == base || current.as_deref() == Some(name.as_str()) {
            continue;
        }

        let tip = branch.get().peel_to_commit().map_err(GitError::ParseCommit)?.id();
        let contained = tip == base_oid
            || repo
                .graph_descendant_of(base_oid, tip)
                .map_err(GitError::RevwalkError)?;

        if contained {
            merged.push(name);
        }
    }

    merged.sort();
    Ok(merged)
}

/// Delete the given local branches.
///
/// The checked-out branch is refused rather than left to git2's error.
pub fn delete_branches(repo: &Repository, names: &[String]) -> Result<(), GitError> {
    let current = current_branch(repo);

    for name in names {
        if current.as_deref() == Some(name.as_str()) {
            return Err(GitError::ProtectedBranch(name.clone()));
        }
        let mut branch = repo
            .find_branch(name, BranchType::Local)
            .map_err(|e| GitError::ReferenceNotFound(name.clone(), e))?;
        branch
            .delete()
            .map_err(|e| GitError::BranchDelete(name.clone(), e))?;
        info!(branch = %name, "Deleted merged branch");
    }

    Ok(())
}

/// Name of the checked-out branch, if HEAD points at one.
pub fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(str::to_string)
}
