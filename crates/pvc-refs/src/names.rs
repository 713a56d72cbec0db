//! Branch name validation following git-style conventions.
//!
//! Valid branch names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` or `@{`
//! - Must not start or end with `.` or `/`
//! - Must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a branch name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use pvc_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    match violation(name) {
        Some(reason) => Err(RefError::InvalidBranchName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn violation(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("branch name must not be empty".into());
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control()) {
        return Some(format!("contains forbidden character: {ch:?}"));
    }
    for (pattern, reason) in [("..", "must not contain '..'"), ("@{", "must not contain '@{'")] {
        if name.contains(pattern) {
            return Some(reason.into());
        }
    }
    if name.starts_with(['.', '/']) || name.ends_with(['.', '/']) {
        return Some("must not start or end with '.' or '/'".into());
    }
    if name.ends_with(".lock") {
        return Some("must not end with '.lock'".into());
    }
    name.split('/').find_map(|component| {
        if component.is_empty() {
            Some("path components must not be empty".to_string())
        } else if component.starts_with('.') {
            Some(format!("component must not start with '.': {component:?}"))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["main", "develop", "my-branch", "v1.0", "feature/auth", "user/alice/fix-123"] {
            assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn reject_empty_name() {
        let err = validate_branch_name("").unwrap_err();
        assert!(matches!(err, RefError::InvalidBranchName { .. }));
    }

    #[test]
    fn reject_forbidden_chars_and_whitespace() {
        for name in ["has space", "has\ttab", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b", "bell\u{7}"] {
            assert!(validate_branch_name(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn reject_sequences() {
        assert!(validate_branch_name("bad..name").is_err());
        assert!(validate_branch_name("ref@{0}").is_err());
    }

    #[test]
    fn reject_boundaries() {
        for name in [".hidden", "trailing.", "/leading", "trailing/", "main.lock"] {
            assert!(validate_branch_name(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn reject_bad_components() {
        assert!(validate_branch_name("a//b").is_err());
        assert!(validate_branch_name("feature/.hidden").is_err());
    }

    #[test]
    fn reason_names_the_rule() {
        match validate_branch_name("main.lock").unwrap_err() {
            RefError::InvalidBranchName { reason, .. } => assert!(reason.contains(".lock")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
