//! The fixed set of conventional commit prefixes that make it into release notes.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Matches `type:` at the very start of a subject. Scoped (`type(scope):`) and
/// breaking (`type!:`) forms are intentionally not recognised.
static PREFIX_RE: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^(feat|fix|docs|style|refactor|perf|test|chore):")
        .expect("prefix pattern is a valid regex")
});

/// Conventional commit types recognised by the release-notes extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitPrefix {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Chore,
}

impl CommitPrefix {
    /// All recognised prefixes, in the order they are documented.
    pub const ALL: [CommitPrefix; 8] = [
        Self::Feat,
        Self::Fix,
        Self::Docs,
        Self::Style,
        Self::Refactor,
        Self::Perf,
        Self::Test,
        Self::Chore,
    ];

    /// The bare type name, e.g. `feat`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Perf => "perf",
            Self::Test => "test",
            Self::Chore => "chore",
        }
    }
}

impl std::fmt::Display for CommitPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.as_str())
    }
}

impl std::str::FromStr for CommitPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix(':').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| format!("Unknown commit prefix: {}", s))
    }
}

/// Return the prefix a subject line starts with, if any.
///
/// Matching is literal and case-sensitive: `feat: x` matches, while
/// `feat(api): x`, `Feat: x` and ` feat: x` do not.
pub fn match_prefix(subject: &str) -> Option<CommitPrefix> {
    let caps = PREFIX_RE.captures(subject)?;
    caps.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_each_prefix() {
        for prefix in CommitPrefix::ALL {
            let subject = format!("{} something", prefix);
            assert_eq!(match_prefix(&subject), Some(prefix), "subject: {}", subject);
        }
    }

    #[test]
    fn test_scoped_prefix_does_not_match() {
        assert_eq!(match_prefix("chore(ci): noop"), None);
        assert_eq!(match_prefix("feat(api): endpoint"), None);
    }

    #[test]
    fn test_breaking_marker_does_not_match() {
        assert_eq!(match_prefix("feat!: drop old api"), None);
    }

    #[test]
    fn test_case_and_position_sensitive() {
        assert_eq!(match_prefix("Feat: capitalised"), None);
        assert_eq!(match_prefix(" fix: leading space"), None);
        assert_eq!(match_prefix("hotfix: not a prefix"), None);
    }

    #[test]
    fn test_prefix_without_space_still_matches() {
        assert_eq!(match_prefix("fix:tight"), Some(CommitPrefix::Fix));
    }

    #[test]
    fn test_unknown_types_are_ignored() {
        assert_eq!(match_prefix("build: bump deps"), None);
        assert_eq!(match_prefix("ci: pipeline"), None);
    }

    #[test]
    fn test_from_str_accepts_trailing_colon() {
        assert_eq!("perf:".parse::<CommitPrefix>(), Ok(CommitPrefix::Perf));
        assert_eq!("docs".parse::<CommitPrefix>(), Ok(CommitPrefix::Docs));
        assert!("ci".parse::<CommitPrefix>().is_err());
    }
}
