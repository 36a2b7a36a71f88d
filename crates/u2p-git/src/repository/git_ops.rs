//! Git mirror operations using the system `git` CLI.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{MirrorConfig, ObjectRef};
use crate::error::RepositoryError;
use crate::source::{MirrorHealth, MirrorRepository};
use crate::sync::SyncState;

/// State of the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    /// Mirror has not been cloned yet.
    NotCloned,
    /// Mirror is currently being cloned.
    Cloning,
    /// Mirror is ready for use.
    Ready,
    /// Mirror is fetching from its remote.
    Syncing,
    /// Mirror encountered an unrecoverable error.
    Error(String),
}

impl MirrorStatus {
    /// Returns the status name reported by health checks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotCloned => "not_cloned",
            Self::Cloning => "cloning",
            Self::Ready => "ready",
            Self::Syncing => "syncing",
            Self::Error(_) => "error",
        }
    }
}

/// A local mirror of a remote repository.
///
/// Every operation runs one `git` subprocess scoped to the mirror and captures
/// its output fully before returning. Syncs and clones hold the write side of
/// an async read/write lock; existence checks and reads hold the read side, so
/// reads run concurrently with each other but never against an in-flight fetch.
pub struct GitMirror {
    config: MirrorConfig,
    status: Arc<RwLock<MirrorStatus>>,
    sync_state: SyncState,
    access: tokio::sync::RwLock<()>,
}

impl GitMirror {
    /// Creates a new GitMirror instance.
    pub fn new(config: MirrorConfig) -> Self {
        let status = if config.git_dir().exists() {
            MirrorStatus::Ready
        } else {
            MirrorStatus::NotCloned
        };

        Self {
            config,
            status: Arc::new(RwLock::new(status)),
            sync_state: SyncState::new(),
            access: tokio::sync::RwLock::new(()),
        }
    }

    /// Returns the current mirror status.
    pub fn status(&self) -> MirrorStatus {
        self.status.read().clone()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Returns the mirror location on disk.
    pub fn workdir(&self) -> &Path {
        self.config.workdir()
    }

    /// Checks if the mirror exists locally.
    pub fn exists_locally(&self) -> bool {
        self.config.git_dir().exists()
    }

    /// Verifies the git tool can be executed.
    pub async fn check_tool(&self) -> Result<(), RepositoryError> {
        let git = self.config.git();
        let output = Command::new(git)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|_| RepositoryError::ToolNotFound(git.to_string()))?;

        if !output.status.success() {
            return Err(RepositoryError::ToolNotFound(git.to_string()));
        }

        debug!("Using {}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }

    /// Ensures the mirror is cloned and ready.
    pub async fn ensure_cloned(&self) -> Result<(), RepositoryError> {
        if self.exists_locally() {
            debug!("Mirror already present at {:?}", self.workdir());
            self.set_status(MirrorStatus::Ready);
            return Ok(());
        }

        self.clone_mirror().await
    }

    fn set_status(&self, status: MirrorStatus) {
        *self.status.write() = status;
    }

    /// Runs a git subcommand scoped to the mirror.
    async fn run<I, S>(&self, args: I) -> Result<Output, RepositoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let git_dir = self.config.git_dir();
        let mut command = Command::new(self.config.git());
        command
            .arg("--git-dir")
            .arg(&git_dir)
            .arg("--work-tree")
            .arg(self.config.workdir())
            .args(args);

        self.output(command).await
    }

    async fn output(&self, mut command: Command) -> Result<Output, RepositoryError> {
        debug!("{:?}", command.as_std());

        command
            .stdin(Stdio::null())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RepositoryError::Spawn {
                program: self.config.git().to_string(),
                source,
            })
    }
}

/// Logs non-empty captured output the way sync and clone report progress.
fn log_output(output: &Output) {
    if !output.stdout.is_empty() {
        info!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
    }
    if !output.stderr.is_empty() {
        info!("{}", String::from_utf8_lossy(&output.stderr).trim_end());
    }
}

#[async_trait]
impl MirrorRepository for GitMirror {
    async fn sync(&self) -> Result<(), RepositoryError> {
        let _guard = self.access.write().await;

        if !self.exists_locally() {
            return Err(RepositoryError::unavailable(format!(
                "no mirror at {:?}",
                self.workdir()
            )));
        }

        self.set_status(MirrorStatus::Syncing);
        info!("Fetching updates for mirror at {:?}", self.workdir());

        let result = self.run(["fetch"]).await.and_then(|output| {
            log_output(&output);
            if output.status.success() {
                Ok(())
            } else {
                Err(RepositoryError::sync(output.status, &output.stderr))
            }
        });

        self.set_status(MirrorStatus::Ready);

        match result {
            Ok(()) => {
                self.sync_state.record_success();
                info!("Mirror fetched successfully");
                Ok(())
            },
            Err(e) => {
                self.sync_state.record_failure(e.to_string());
                warn!("Fetch failed: {}", e);
                Err(e)
            },
        }
    }

    async fn exists(&self, object: &ObjectRef) -> Result<bool, RepositoryError> {
        let _guard = self.access.read().await;

        let revision = object.revision(self.config.remote());
        let output = self.run(["cat-file", "-e", revision.as_str()]).await?;

        if !output.stderr.is_empty() {
            debug!("{}", String::from_utf8_lossy(&output.stderr).trim_end());
        }

        Ok(output.status.success())
    }

    async fn read(&self, object: &ObjectRef) -> Result<Vec<u8>, RepositoryError> {
        let _guard = self.access.read().await;

        let revision = object.revision(self.config.remote());
        let output = self.run(["cat-file", "-p", revision.as_str()]).await?;

        if !output.stderr.is_empty() {
            info!("{}", String::from_utf8_lossy(&output.stderr).trim_end());
        }

        if !output.status.success() {
            return Err(RepositoryError::read(output.status, &output.stderr));
        }

        Ok(output.stdout)
    }

    async fn clone_mirror(&self) -> Result<(), RepositoryError> {
        let _guard = self.access.write().await;

        self.set_status(MirrorStatus::Cloning);

        let workdir = self.config.workdir();
        info!(
            "Cloning repository from {} to {:?}",
            self.config.repository(),
            workdir
        );

        if let Some(parent) = workdir.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(self.config.git());
        command
            .arg("clone")
            .arg(self.config.repository())
            .arg(workdir);

        let result = self.output(command).await.and_then(|output| {
            log_output(&output);
            if output.status.success() {
                Ok(())
            } else {
                Err(RepositoryError::clone_failed(output.status, &output.stderr))
            }
        });

        match result {
            Ok(()) => {
                self.set_status(MirrorStatus::Ready);
                info!("Repository cloned successfully");
                Ok(())
            },
            Err(e) => {
                self.set_status(MirrorStatus::Error(e.to_string()));
                Err(e)
            },
        }
    }

    fn health(&self) -> MirrorHealth {
        let status = self.status();
        let last_error = match &status {
            MirrorStatus::Error(msg) => Some(msg.clone()),
            _ => self.sync_state.last_error(),
        };

        MirrorHealth {
            status: status.as_str().to_string(),
            last_sync_secs: self.sync_state.time_since_sync().map(|d| d.as_secs()),
            last_error,
            failure_count: self.sync_state.failure_count(),
            sync_count: self.sync_state.sync_count(),
        }
    }

    fn name(&self) -> &str {
        "git"
    }
}

impl std::fmt::Debug for GitMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitMirror")
            .field("repository", &self.config.repository())
            .field("workdir", &self.config.workdir())
            .field("status", &self.status())
            .finish()
    }
}
