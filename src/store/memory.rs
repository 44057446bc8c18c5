//! In-process object store.
//!
//! Mirrors the observable behavior of the remote store closely enough to drive the
//! folder layer in tests and demos: insertion-ordered listings, one key space per
//! resource kind, a folder index that is only populated on writes when `auto_folders`
//! is on, folder deletes that refuse non-empty folders, and per-operation fault
//! injection.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{ObjectStore, PutRequest, ResourceKind};
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::{Result, VfsError};
use crate::fs::{FolderRecord, ObjectRecord};

/// Store operations, used for fault injection and call tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListByPrefix,
    ListSubfolders,
    Put,
    Destroy,
    DeleteByPrefix,
    CreateFolder,
    DeleteFolder,
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: Vec<ObjectRecord>,
    folders: Vec<String>,
    failing: HashMap<StoreOp, VfsError>,
    calls: Vec<StoreOp>,
    tick: i64,
}

impl MemoryState {
    fn enter(&mut self, op: StoreOp) -> Result<()> {
        self.calls.push(op);
        match self.failing.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn now(&mut self) -> DateTime<Utc> {
        // Logical clock starting at 2024-01-01T00:00:00Z, one second per write.
        self.tick += 1;
        DateTime::from_timestamp(1_704_067_200 + self.tick, 0).unwrap_or_default()
    }

    fn is_declared(&self, path: &str) -> bool {
        self.folders.iter().any(|f| f == path)
    }

    fn declare_with_ancestors(&mut self, path: &str) {
        let mut current = String::new();
        for segment in path.split('/') {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            if !self.is_declared(&current) {
                self.folders.push(current.clone());
            }
        }
    }
}

/// Object store kept entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    auto_folders: bool,
    max_upload_bytes: u64,
}

impl MemoryStore {
    /// Create an empty store that does not synthesize folder records on writes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            auto_folders: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Declare ancestor folders whenever an object is written under a new prefix.
    pub fn with_auto_folders(mut self, enabled: bool) -> Self {
        self.auto_folders = enabled;
        self
    }

    /// Override the upload size limit.
    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Insert a raw object directly, bypassing folder synthesis and size checks.
    ///
    /// Used to seed keys that predate folder tracking.
    pub async fn seed_object(&self, key: &str, size_bytes: u64) -> ObjectRecord {
        self.seed_object_of_kind(key, size_bytes, ResourceKind::Raw)
            .await
    }

    /// Like [`seed_object`](Self::seed_object), in the key space of `kind` only.
    ///
    /// Copies of `key` in other kinds are left alone, which reproduces stores that
    /// hold the same key once per kind.
    pub async fn seed_object_of_kind(
        &self,
        key: &str,
        size_bytes: u64,
        kind: ResourceKind,
    ) -> ObjectRecord {
        let mut state = self.state.lock().await;
        let created_at = state.now();
        let record = ObjectRecord {
            key: key.to_string(),
            size_bytes,
            url: format!("memory://{}/{}/{}", kind.as_str(), state.tick, key),
            created_at,
            resource_kind: kind,
        };
        state
            .objects
            .retain(|o| o.key != key || o.resource_kind != kind);
        state.objects.push(record.clone());
        record
    }

    /// Declare a folder record directly (ancestors included).
    pub async fn seed_folder(&self, path: &str) {
        self.state.lock().await.declare_with_ancestors(path);
    }

    /// Make every subsequent call of `op` fail with `StoreUnavailable`.
    pub async fn fail(&self, op: StoreOp) {
        let err = VfsError::StoreUnavailable(format!("{:?} failed (injected)", op));
        self.fail_with(op, err).await;
    }

    /// Make every subsequent call of `op` fail with `err`.
    pub async fn fail_with(&self, op: StoreOp, err: VfsError) {
        self.state.lock().await.failing.insert(op, err);
    }

    /// Undo [`fail`](Self::fail) or [`fail_with`](Self::fail_with).
    pub async fn heal(&self, op: StoreOp) {
        self.state.lock().await.failing.remove(&op);
    }

    /// Operations issued so far, in order.
    pub async fn calls(&self) -> Vec<StoreOp> {
        self.state.lock().await.calls.clone()
    }

    /// Snapshot of all stored objects.
    pub async fn objects(&self) -> Vec<ObjectRecord> {
        self.state.lock().await.objects.clone()
    }

    /// Snapshot of all declared folder paths.
    pub async fn folders(&self) -> Vec<String> {
        self.state.lock().await.folders.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_by_prefix(
        &self,
        prefix: Option<&str>,
        _max_results: usize,
    ) -> Result<Vec<ObjectRecord>> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListByPrefix)?;
        Ok(state
            .objects
            .iter()
            .filter(|o| prefix.map_or(true, |p| o.key.starts_with(p)))
            .cloned()
            .collect())
    }

    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderRecord>> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::ListSubfolders)?;

        let children: Vec<FolderRecord> = if path.is_empty() {
            state
                .folders
                .iter()
                .filter(|f| !f.contains('/'))
                .map(FolderRecord::from_path)
                .collect()
        } else {
            if !state.is_declared(path) {
                return Err(VfsError::NotFound(format!("folder {}", path)));
            }
            let prefix = format!("{}/", path);
            state
                .folders
                .iter()
                .filter(|f| f.strip_prefix(&prefix).is_some_and(|rest| !rest.contains('/')))
                .map(FolderRecord::from_path)
                .collect()
        };
        Ok(children)
    }

    async fn put(&self, request: PutRequest) -> Result<ObjectRecord> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Put)?;

        let size = request.data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(VfsError::PayloadTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }
        if !request.overwrite && state.objects.iter().any(|o| o.key == request.key) {
            return Err(VfsError::AlreadyExists(request.key));
        }

        let kind = request.resource_kind();
        let created_at = state.now();
        let record = ObjectRecord {
            url: format!("memory://{}/{}/{}", kind.as_str(), state.tick, request.key),
            size_bytes: size,
            created_at,
            resource_kind: kind,
            key: request.key,
        };
        let existing = state
            .objects
            .iter()
            .position(|o| o.key == record.key && o.resource_kind == kind);
        match existing {
            Some(idx) => state.objects[idx] = record.clone(),
            None => state.objects.push(record.clone()),
        }
        // The key now belongs to `kind`; drop copies left in other kinds.
        state
            .objects
            .retain(|o| o.key != record.key || o.resource_kind == kind);

        if self.auto_folders {
            if let Some((parent, _)) = record.key.rsplit_once('/') {
                state.declare_with_ancestors(parent);
            }
        }
        Ok(record)
    }

    async fn destroy(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Destroy)?;
        let before = state.objects.len();
        state.objects.retain(|o| o.key != key);
        Ok(state.objects.len() != before)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::DeleteByPrefix)?;
        let before = state.objects.len();
        state.objects.retain(|o| !o.key.starts_with(prefix));
        Ok((before - state.objects.len()) as u64)
    }

    async fn create_folder(&self, path: &str) -> Result<FolderRecord> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::CreateFolder)?;
        if state.is_declared(path) {
            return Err(VfsError::AlreadyExists(format!("folder {}", path)));
        }
        state.declare_with_ancestors(path);
        Ok(FolderRecord::from_path(path))
    }

    async fn delete_folder(&self, path: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::DeleteFolder)?;
        if !state.is_declared(path) {
            return Err(VfsError::NotFound(format!("folder {}", path)));
        }
        let prefix = format!("{}/", path);
        let has_children = state.folders.iter().any(|f| f.starts_with(&prefix))
            || state.objects.iter().any(|o| o.key.starts_with(&prefix));
        if has_children {
            return Err(VfsError::StoreUnavailable(format!("folder {} is not empty", path)));
        }
        state.folders.retain(|f| f != path);
        Ok(true)
    }
}
