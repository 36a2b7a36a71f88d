//! # u2p Git Mirror
//!
//! Repository access for the unity3d2png proxy.
//!
//! This crate maintains a local mirror of a remote Git repository and resolves
//! objects addressed as `<branch>:<path>` against its remote-tracking branches.
//!
//! ## Features
//!
//! - Git operations via the system `git` CLI, one subprocess per operation
//! - Async trait-based repository abstraction so callers can swap in test doubles
//! - Read/write exclusion between `fetch` and object reads on the shared mirror
//! - Sync state tracking for health reporting
//!
//! ## Example
//!
//! ```ignore
//! use u2p_git::{GitMirror, MirrorConfig, MirrorRepository, ObjectRef};
//!
//! let config = MirrorConfig::builder()
//!     .repository("https://github.com/org/assets.git")
//!     .workdir("/var/lib/u2p/assets")
//!     .build()?;
//!
//! let mirror = GitMirror::new(config);
//! mirror.ensure_cloned().await?;
//!
//! let object = ObjectRef::new("main", "assets/scene.unity3d");
//! if mirror.exists(&object).await? {
//!     let bytes = mirror.read(&object).await?;
//! }
//! ```

pub mod error;
pub mod repository;
pub mod source;
pub mod sync;

// Re-exports
pub use error::RepositoryError;
pub use repository::{GitMirror, MirrorConfig, MirrorStatus, ObjectRef, validate_branch};
pub use source::{MirrorHealth, MirrorRepository};
pub use sync::SyncState;
