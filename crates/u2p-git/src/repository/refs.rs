//! Object references inside the mirror.

use std::fmt;

/// An object addressed as `<branch>:<path>`.
///
/// Branches are resolved against the remote-tracking refs of the mirror, so
/// `ObjectRef::new("main", "a/b.unity3d")` with remote `origin` names
/// `remotes/origin/main:a/b.unity3d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    branch: String,
    path: String,
}

impl ObjectRef {
    /// Creates an object reference.
    pub fn new(branch: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            path: path.into(),
        }
    }

    /// Returns the branch name.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the path inside the tree.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the final component of the path.
    pub fn file_name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    /// Returns the revision argument understood by `git cat-file`.
    pub fn revision(&self, remote: &str) -> String {
        format!("remotes/{}/{}:{}", remote, self.branch, self.path)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch, self.path)
    }
}

/// Validates that a branch name is a well-formed ref name.
///
/// Mirrors the rules of `git check-ref-format` that matter for building a
/// `<ref>:<path>` revision: the name must not contain `:` or any character
/// git rejects in ref names.
pub fn validate_branch(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("branch name cannot be empty");
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err("branch name cannot start or end with '/'");
    }

    if name.starts_with('-') {
        return Err("branch name cannot start with '-'");
    }

    if name.contains("..") {
        return Err("branch name cannot contain '..'");
    }

    if name.contains("//") {
        return Err("branch name cannot contain '//'");
    }

    if name.ends_with(".lock") || name.contains("@{") {
        return Err("branch name is not a valid ref name");
    }

    for c in name.chars() {
        if c.is_control()
            || c.is_whitespace()
            || c == '~'
            || c == '^'
            || c == ':'
            || c == '?'
            || c == '*'
            || c == '['
            || c == '\\'
        {
            return Err("branch name contains invalid characters");
        }
    }

    Ok(())
}
