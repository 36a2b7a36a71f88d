//! Git mirror management.
//!
//! This module provides the subprocess-backed mirror and its configuration.

mod config;
mod git_ops;
mod refs;

pub use config::MirrorConfig;
pub use git_ops::{GitMirror, MirrorStatus};
pub use refs::{ObjectRef, validate_branch};
