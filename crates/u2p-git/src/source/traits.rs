//! Mirror repository trait definition.

use async_trait::async_trait;

use super::MirrorHealth;
use crate::error::RepositoryError;
use crate::repository::ObjectRef;

/// Access to a local mirror of a remote repository.
///
/// The request pipeline only talks to this trait, so the subprocess-backed
/// [`GitMirror`](crate::GitMirror) can be replaced by an in-memory double in
/// tests.
///
/// # Implementors
///
/// - `GitMirror` - shells out to the system `git` CLI
#[async_trait]
pub trait MirrorRepository: Send + Sync {
    /// Fetches all remote refs into the mirror.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Sync` if the fetch exits non-zero, carrying the
    ///   captured standard error
    async fn sync(&self) -> Result<(), RepositoryError>;

    /// Returns whether an object exists at `<branch>:<path>`.
    ///
    /// A non-zero exit of the existence check is reported as `Ok(false)`;
    /// absence and tool failure are not distinguished.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Spawn` if the tool could not be started at all
    async fn exists(&self, object: &ObjectRef) -> Result<bool, RepositoryError>;

    /// Reads the raw bytes of the object at `<branch>:<path>`.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Read` if the read exits non-zero
    async fn read(&self, object: &ObjectRef) -> Result<Vec<u8>, RepositoryError>;

    /// Materializes the mirror from its remote.
    ///
    /// Only called at startup when the mirror does not exist yet.
    async fn clone_mirror(&self) -> Result<(), RepositoryError>;

    /// Returns a snapshot of the mirror state.
    fn health(&self) -> MirrorHealth;

    /// Returns the name of this repository backend.
    ///
    /// This is used for logging and identification purposes.
    fn name(&self) -> &str;

    /// Verifies the mirror is usable.
    ///
    /// The default implementation accepts every mirror whose status is not
    /// `error` or `not_cloned`.
    async fn health_check(&self) -> Result<(), RepositoryError> {
        let health = self.health();
        match health.status.as_str() {
            "error" | "not_cloned" => Err(RepositoryError::unavailable(
                health
                    .last_error
                    .unwrap_or_else(|| format!("mirror is {}", health.status)),
            )),
            _ => Ok(()),
        }
    }
}
