//! Mirror health snapshot.

use serde::Serialize;

/// Point-in-time view of a mirror, reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorHealth {
    /// Current mirror status (`ready`, `syncing`, ...).
    pub status: String,

    /// Seconds since the last successful sync, if any happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_secs: Option<u64>,

    /// Error text of the last failed sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Consecutive sync failures.
    pub failure_count: u32,

    /// Total successful syncs since startup.
    pub sync_count: u64,
}

impl MirrorHealth {
    /// Creates a snapshot with the given status and no sync history.
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            last_sync_secs: None,
            last_error: None,
            failure_count: 0,
            sync_count: 0,
        }
    }
}
