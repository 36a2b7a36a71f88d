//! In-memory mirror that records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use u2p_git::{MirrorHealth, MirrorRepository, ObjectRef, RepositoryError};

/// A call made against the fake mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Sync,
    Exists(String),
    Read(String),
}

/// Mirror double: objects live in a map, `sync` publishes pending objects.
#[derive(Default)]
pub struct FakeMirror {
    objects: Mutex<HashMap<ObjectRef, Vec<u8>>>,
    remote_only: Mutex<HashMap<ObjectRef, Vec<u8>>>,
    calls: Mutex<Vec<Call>>,
    sync_error: Option<String>,
    read_error: Option<String>,
    spawn_error: bool,
    status: Option<String>,
}

impl FakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object already present in the mirror.
    pub fn with_object(self, branch: &str, path: &str, content: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(ObjectRef::new(branch, path), content.to_vec());
        self
    }

    /// Adds an object that only shows up after a sync.
    pub fn with_remote_object(self, branch: &str, path: &str, content: &[u8]) -> Self {
        self.remote_only
            .lock()
            .unwrap()
            .insert(ObjectRef::new(branch, path), content.to_vec());
        self
    }

    /// Makes every sync fail with the given stderr.
    pub fn failing_sync(mut self, stderr: &str) -> Self {
        self.sync_error = Some(stderr.to_string());
        self
    }

    /// Makes every read fail with the given stderr.
    pub fn failing_read(mut self, stderr: &str) -> Self {
        self.read_error = Some(stderr.to_string());
        self
    }

    /// Makes the existence check fail to start the tool.
    pub fn failing_spawn(mut self) -> Self {
        self.spawn_error = true;
        self
    }

    /// Overrides the reported mirror status.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MirrorRepository for FakeMirror {
    async fn sync(&self) -> Result<(), RepositoryError> {
        self.record(Call::Sync);

        if let Some(stderr) = &self.sync_error {
            return Err(RepositoryError::sync("exit status: 128", stderr.as_bytes()));
        }

        let pending: Vec<_> = self.remote_only.lock().unwrap().drain().collect();
        self.objects.lock().unwrap().extend(pending);
        Ok(())
    }

    async fn exists(&self, object: &ObjectRef) -> Result<bool, RepositoryError> {
        self.record(Call::Exists(object.to_string()));

        if self.spawn_error {
            return Err(RepositoryError::Spawn {
                program: "git".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            });
        }

        Ok(self.objects.lock().unwrap().contains_key(object))
    }

    async fn read(&self, object: &ObjectRef) -> Result<Vec<u8>, RepositoryError> {
        self.record(Call::Read(object.to_string()));

        if let Some(stderr) = &self.read_error {
            return Err(RepositoryError::read("exit status: 128", stderr.as_bytes()));
        }

        self.objects
            .lock()
            .unwrap()
            .get(object)
            .cloned()
            .ok_or_else(|| RepositoryError::read("exit status: 128", b"fatal: not a valid object"))
    }

    async fn clone_mirror(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn health(&self) -> MirrorHealth {
        MirrorHealth::new(self.status.as_deref().unwrap_or("ready"))
    }

    fn name(&self) -> &str {
        "fake"
    }
}
