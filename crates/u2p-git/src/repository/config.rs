//! Mirror configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// Configuration for the Git mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    /// Path or name of the git executable.
    #[serde(default = "default_git")]
    git: String,

    /// The remote repository URL (HTTPS or SSH).
    repository: String,

    /// Local working copy location.
    workdir: PathBuf,

    /// Remote whose tracking branches objects are resolved against.
    #[serde(default = "default_remote")]
    remote: String,
}

fn default_git() -> String {
    "git".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

impl MirrorConfig {
    /// Creates a new builder for MirrorConfig.
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Returns the git executable.
    pub fn git(&self) -> &str {
        &self.git
    }

    /// Returns the remote repository URL.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the mirror location on disk.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Returns the remote name used for object resolution.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Returns the mirror's `.git` metadata directory.
    pub fn git_dir(&self) -> PathBuf {
        self.workdir.join(".git")
    }
}

/// Builder for MirrorConfig.
#[derive(Debug, Default)]
pub struct MirrorConfigBuilder {
    git: Option<String>,
    repository: Option<String>,
    workdir: Option<PathBuf>,
    remote: Option<String>,
}

impl MirrorConfigBuilder {
    /// Sets the git executable.
    pub fn git(mut self, git: impl Into<String>) -> Self {
        self.git = Some(git.into());
        self
    }

    /// Sets the remote repository URL.
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Sets the mirror location on disk.
    pub fn workdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    /// Sets the remote name.
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidConfig` if required fields are
    /// missing or empty.
    pub fn build(self) -> Result<MirrorConfig, RepositoryError> {
        let repository = self.repository.ok_or_else(|| invalid("repository is required"))?;
        let workdir = self.workdir.ok_or_else(|| invalid("workdir is required"))?;

        if repository.trim().is_empty() {
            return Err(invalid("repository cannot be empty"));
        }
        if workdir.as_os_str().is_empty() {
            return Err(invalid("workdir cannot be empty"));
        }

        let git = self.git.unwrap_or_else(default_git);
        if git.trim().is_empty() {
            return Err(invalid("git cannot be empty"));
        }

        Ok(MirrorConfig {
            git,
            repository,
            workdir,
            remote: self.remote.unwrap_or_else(default_remote),
        })
    }
}

fn invalid(reason: &str) -> RepositoryError {
    RepositoryError::InvalidConfig(reason.to_string())
}
