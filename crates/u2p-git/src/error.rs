//! Error types for mirror access.

/// Errors that can occur when working with the repository mirror.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// `git fetch` exited non-zero.
    #[error("sync failed ({status}): {stderr}")]
    Sync { status: String, stderr: String },

    /// `git clone` exited non-zero.
    #[error("clone failed ({status}): {stderr}")]
    Clone { status: String, stderr: String },

    /// `git cat-file -p` exited non-zero.
    #[error("read failed ({status}): {stderr}")]
    Read { status: String, stderr: String },

    /// The git tool could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The git tool is not available on the execution path.
    #[error("git not found: {0}")]
    ToolNotFound(String),

    /// The mirror is not usable in its current state.
    #[error("mirror unavailable: {reason}")]
    Unavailable { reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RepositoryError {
    /// Creates a new sync error from captured process output.
    pub fn sync(status: impl ToString, stderr: &[u8]) -> Self {
        Self::Sync {
            status: status.to_string(),
            stderr: captured(stderr),
        }
    }

    /// Creates a new clone error from captured process output.
    pub fn clone_failed(status: impl ToString, stderr: &[u8]) -> Self {
        Self::Clone {
            status: status.to_string(),
            stderr: captured(stderr),
        }
    }

    /// Creates a new read error from captured process output.
    pub fn read(status: impl ToString, stderr: &[u8]) -> Self {
        Self::Read {
            status: status.to_string(),
            stderr: captured(stderr),
        }
    }

    /// Creates a new mirror unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns the captured standard error output, if this error carries any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Sync { stderr, .. } | Self::Clone { stderr, .. } | Self::Read { stderr, .. } => {
                Some(stderr)
            },
            _ => None,
        }
    }
}

fn captured(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr).trim_end().to_string()
}
