//! Workflow trigger matching: pushes to `dev` and `vX.Y.Z` release tags.

use semver::Version;
use tracing::{debug, info, warn};

use crate::error::TriggerError;

/// Branch whose pushes trigger a release PR.
pub const DEV_BRANCH: &str = "dev";

/// Why the release workflow runs for a given ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A push to the `dev` branch.
    DevBranch,
    /// A push of a stable release tag such as `v1.2.3`.
    ReleaseTag { tag: String, version: Version },
}

impl Trigger {
    /// Match a ref such as `refs/heads/dev` or `refs/tags/v1.2.3`.
    ///
    /// Bare names (`dev`, `v1.2.3`) are accepted too, since `GITHUB_REF_NAME`
    /// carries them without the `refs/...` prefix.
    pub fn from_ref(git_ref: &str) -> Option<Self> {
        if let Some(branch) = git_ref.strip_prefix("refs/heads/") {
            return (branch == DEV_BRANCH).then_some(Self::DevBranch);
        }

        let name = git_ref.strip_prefix("refs/tags/").unwrap_or(git_ref);
        if name == DEV_BRANCH && !git_ref.starts_with("refs/tags/") {
            return Some(Self::DevBranch);
        }

        release_tag_version(name).map(|version| Self::ReleaseTag {
            tag: name.to_string(),
            version,
        })
    }

    /// Like [`Trigger::from_ref`] but reports non-matching refs as an error.
    pub fn parse(git_ref: &str) -> Result<Self, TriggerError> {
        Self::from_ref(git_ref).ok_or_else(|| TriggerError::NotTriggering(git_ref.to_string()))
    }

    /// The branch name, when the trigger is a branch push.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::DevBranch => Some(DEV_BRANCH),
            Self::ReleaseTag { .. } => None,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DevBranch => write!(f, "push to branch '{}'", DEV_BRANCH),
            Self::ReleaseTag { tag, .. } => write!(f, "push of tag '{}'", tag),
        }
    }
}

/// Whether a release run should go ahead for the ref that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Proceed. `trigger` is None when no ref was known or `--force` overrode a mismatch.
    Run { trigger: Option<Trigger> },
    /// The ref is neither `dev` nor a release tag; exit successfully without doing anything.
    Skip { git_ref: String },
}

/// Decide whether to run for `git_ref`.
///
/// A matching ref runs, an unknown ref runs unconditionally, a non-matching
/// ref is skipped unless `force` is set.
pub fn decide(git_ref: Option<&str>, force: bool) -> Decision {
    let Some(git_ref) = git_ref else {
        debug!("No triggering ref known, running unconditionally");
        return Decision::Run { trigger: None };
    };

    match Trigger::parse(git_ref) {
        Ok(trigger) => {
            info!(%trigger, "Release workflow triggered");
            Decision::Run {
                trigger: Some(trigger),
            }
        }
        Err(e) if force => {
            warn!(error = %e, "Continuing because of --force");
            Decision::Run { trigger: None }
        }
        Err(e) => {
            info!(error = %e, "Nothing to do");
            Decision::Skip {
                git_ref: git_ref.to_string(),
            }
        }
    }
}

/// Pick the PR base branch: an explicit choice wins, then the triggering branch.
///
/// None means the repository's default branch should be used (tag pushes).
pub fn base_branch(explicit: Option<&str>, trigger: Option<&Trigger>) -> Option<String> {
    explicit
        .or_else(|| trigger.and_then(Trigger::branch))
        .map(str::to_string)
}

/// Parse `vMAJOR.MINOR.PATCH` where every part is a non-empty run of ASCII digits.
fn release_tag_version(name: &str) -> Option<Version> {
    let raw = name.strip_prefix('v')?;
    let parts: Vec<&str> = raw.split('.').collect();
    let all_numeric = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if !all_numeric {
        return None;
    }

    // Built from the parts rather than Version::parse so `v01.2.3` still counts.
    let major = parts[0].parse().ok()?;
    let minor = parts[1].parse().ok()?;
    let patch = parts[2].parse().ok()?;
    Some(Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_branch_ref() {
        assert_eq!(Trigger::from_ref("refs/heads/dev"), Some(Trigger::DevBranch));
        assert_eq!(Trigger::from_ref("dev"), Some(Trigger::DevBranch));
    }

    #[test]
    fn test_other_branches_do_not_trigger() {
        assert_eq!(Trigger::from_ref("refs/heads/main"), None);
        assert_eq!(Trigger::from_ref("refs/heads/dev-tools"), None);
        assert_eq!(Trigger::from_ref("refs/heads/v1.2.3"), None);
    }

    #[test]
    fn test_release_tag_ref() {
        let trigger = Trigger::from_ref("refs/tags/v1.2.3").expect("tag should trigger");
        assert_eq!(
            trigger,
            Trigger::ReleaseTag {
                tag: "v1.2.3".to_string(),
                version: Version::new(1, 2, 3),
            }
        );
        assert_eq!(trigger.branch(), None);
    }

    #[test]
    fn test_tag_named_dev_does_not_trigger() {
        assert_eq!(Trigger::from_ref("refs/tags/dev"), None);
    }

    #[test]
    fn test_non_release_tags_do_not_trigger() {
        for tag in [
            "refs/tags/1.2.3",
            "refs/tags/v1.2",
            "refs/tags/v1.2.3.4",
            "refs/tags/v1.2.3-rc.1",
            "refs/tags/v1foo.0.0",
            "refs/tags/v.1.2",
            "refs/tags/nightly",
        ] {
            assert_eq!(Trigger::from_ref(tag), None, "tag: {}", tag);
        }
    }

    #[test]
    fn test_decide_matching_refs_run() {
        assert_eq!(
            decide(Some("refs/heads/dev"), false),
            Decision::Run {
                trigger: Some(Trigger::DevBranch)
            }
        );
        assert!(matches!(
            decide(Some("refs/tags/v2.0.1"), false),
            Decision::Run {
                trigger: Some(Trigger::ReleaseTag { .. })
            }
        ));
    }

    #[test]
    fn test_decide_skips_non_matching_ref() {
        assert_eq!(
            decide(Some("refs/heads/feature/x"), false),
            Decision::Skip {
                git_ref: "refs/heads/feature/x".to_string()
            }
        );
    }

    #[test]
    fn test_decide_force_overrides_mismatch() {
        assert_eq!(
            decide(Some("refs/heads/feature/x"), true),
            Decision::Run { trigger: None }
        );
    }

    #[test]
    fn test_decide_force_keeps_matching_trigger() {
        assert_eq!(
            decide(Some("refs/heads/dev"), true),
            Decision::Run {
                trigger: Some(Trigger::DevBranch)
            }
        );
    }

    #[test]
    fn test_decide_without_ref_runs() {
        assert_eq!(decide(None, false), Decision::Run { trigger: None });
    }

    #[test]
    fn test_base_branch_explicit_wins() {
        assert_eq!(
            base_branch(Some("release"), Some(&Trigger::DevBranch)),
            Some("release".to_string())
        );
    }

    #[test]
    fn test_base_branch_from_dev_trigger() {
        assert_eq!(base_branch(None, Some(&Trigger::DevBranch)), Some("dev".to_string()));
    }

    #[test]
    fn test_base_branch_unknown_for_tags_and_no_trigger() {
        let tag = Trigger::ReleaseTag {
            tag: "v1.0.0".to_string(),
            version: Version::new(1, 0, 0),
        };
        assert_eq!(base_branch(None, Some(&tag)), None);
        assert_eq!(base_branch(None, None), None);
    }

    #[test]
    fn test_parse_reports_ref() {
        let err = Trigger::parse("refs/heads/main").unwrap_err();
        assert_eq!(err, TriggerError::NotTriggering("refs/heads/main".to_string()));
    }
}
