//! Cloudinary-backed object store.

use std::collections::BTreeMap;
use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ObjectStore, PutRequest, ResourceKind};
use crate::api::ApiClient;
use crate::config::StoreConfig;
use crate::error::{Result, VfsError};
use crate::fs::{FolderRecord, ObjectRecord};

/// Largest page the Admin API accepts.
const MAX_PAGE_SIZE: usize = 500;

/// Upper bound on repeated partial prefix deletes per resource kind.
const MAX_DELETE_ROUNDS: usize = 100;

#[derive(Debug, Deserialize)]
struct ResourcePage {
    #[serde(default)]
    resources: Vec<Resource>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    public_id: String,
    #[serde(default)]
    bytes: u64,
    #[serde(default)]
    secure_url: String,
    created_at: DateTime<Utc>,
    resource_type: Option<ResourceKind>,
}

impl Resource {
    fn into_record(self, kind: ResourceKind) -> ObjectRecord {
        ObjectRecord {
            key: self.public_id,
            size_bytes: self.bytes,
            url: self.secure_url,
            created_at: self.created_at,
            resource_kind: self.resource_type.unwrap_or(kind),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FolderPage {
    #[serde(default)]
    folders: Vec<FolderRecord>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletePage {
    #[serde(default)]
    deleted: BTreeMap<String, String>,
    #[serde(default)]
    partial: bool,
    next_cursor: Option<String>,
}

impl DeletePage {
    fn deleted_count(&self) -> u64 {
        self.deleted.values().filter(|v| *v == "deleted").count() as u64
    }
}

#[derive(Debug, Deserialize)]
struct DestroyResult {
    result: String,
}

#[derive(Debug, Deserialize)]
struct DeletedFolders {
    #[serde(default)]
    deleted: Vec<String>,
}

/// Object store backed by the Cloudinary Admin and Upload APIs.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    api: ApiClient,
    kinds: Vec<ResourceKind>,
    max_upload_bytes: u64,
}

impl CloudinaryStore {
    /// Create a store from configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            api: ApiClient::new(config)?,
            kinds: config.resource_kinds.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    async fn list_kind(
        &self,
        kind: ResourceKind,
        prefix: Option<&str>,
        page_size: usize,
    ) -> Result<Vec<ObjectRecord>> {
        let url = self.api.endpoint(&["resources", kind.as_str(), "upload"], "")?;
        let context = format!("list {} resources", kind.as_str());
        let context = context.as_str();

        collect_pages(|cursor| {
            let url = url.clone();
            async move {
                let mut query = vec![("max_results", page_size.to_string())];
                if let Some(prefix) = prefix {
                    query.push(("prefix", prefix.to_string()));
                }
                if let Some(c) = cursor {
                    query.push(("next_cursor", c));
                }
                let value = self.api.admin(Method::GET, url, &query, context).await?;
                let page: ResourcePage = serde_json::from_value(value)?;
                let records: Vec<ObjectRecord> = page
                    .resources
                    .into_iter()
                    .map(|r| r.into_record(kind))
                    .collect();
                Ok::<_, VfsError>((records, page.next_cursor))
            }
        })
        .await
    }

    async fn delete_kind_by_prefix(&self, kind: ResourceKind, prefix: &str) -> Result<u64> {
        let url = self.api.endpoint(&["resources", kind.as_str(), "upload"], "")?;
        let context = format!("delete {} resources under {}", kind.as_str(), prefix);
        let context = context.as_str();

        let (total, complete) = delete_rounds(MAX_DELETE_ROUNDS, |cursor| {
            let url = url.clone();
            async move {
                let mut query = vec![("prefix", prefix.to_string())];
                if let Some(c) = cursor {
                    query.push(("next_cursor", c));
                }
                let page: Option<DeletePage> =
                    match self.api.admin(Method::DELETE, url, &query, context).await {
                        Ok(value) => Some(serde_json::from_value(value)?),
                        Err(e) if e.is_not_found() => None,
                        Err(e) => return Err(e),
                    };
                Ok::<_, VfsError>(page)
            }
        })
        .await?;

        if !complete {
            warn!(kind = kind.as_str(), prefix, total, "prefix delete still partial, giving up");
        }
        Ok(total)
    }

    /// Destroy `key` in one resource kind.
    async fn destroy_in_kind(&self, kind: ResourceKind, key: &str) -> Result<bool> {
        let url = self.api.endpoint(&[kind.as_str(), "destroy"], "")?;
        let context = format!("destroy {} {}", kind.as_str(), key);
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), key.to_string());
        params.insert("invalidate".to_string(), "true".to_string());

        let value = match self.api.signed_post(url, params, &context).await {
            Ok(value) => value,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        let outcome: DestroyResult = serde_json::from_value(value)?;
        destroy_outcome(&outcome.result, &context)
    }
}

/// Fetch pages until the store stops handing out a cursor.
///
/// `fetch` receives the cursor of the previous page (`None` for the first) and returns
/// one page of items plus the next cursor. An empty cursor ends the walk.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    loop {
        let (page, next) = fetch(cursor.take()).await?;
        items.extend(page);
        match next {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => return Ok(items),
        }
    }
}

/// Repeat a prefix delete while the store reports it as partial.
///
/// `fetch` returns `None` when the prefix is already gone. Returns the number of
/// objects deleted and whether the store reported completion within `max_rounds`.
async fn delete_rounds<F, Fut>(max_rounds: usize, mut fetch: F) -> Result<(u64, bool)>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Option<DeletePage>>>,
{
    let mut total = 0;
    let mut cursor = None;
    for _ in 0..max_rounds {
        let page = match fetch(cursor.take()).await? {
            Some(page) => page,
            None => return Ok((total, true)),
        };
        total += page.deleted_count();
        if !page.partial {
            return Ok((total, true));
        }
        debug!(total, "partial prefix delete, continuing");
        cursor = page.next_cursor;
    }
    Ok((total, false))
}

/// Interpret the existence check that precedes folder creation.
fn require_absent(probe: Result<Value>, context: &str) -> Result<()> {
    match probe {
        Ok(_) => Err(VfsError::AlreadyExists(context.to_string())),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Map a destroy `result` field to whether something was removed.
fn destroy_outcome(result: &str, context: &str) -> Result<bool> {
    match result {
        "ok" => Ok(true),
        "not found" => Ok(false),
        other => Err(VfsError::StoreUnavailable(format!(
            "{}: unexpected result {:?}",
            context, other
        ))),
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn list_by_prefix(
        &self,
        prefix: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<ObjectRecord>> {
        let page_size = max_results.clamp(1, MAX_PAGE_SIZE);
        let mut records = Vec::new();
        for kind in &self.kinds {
            records.extend(self.list_kind(*kind, prefix, page_size).await?);
        }
        Ok(records)
    }

    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderRecord>> {
        let url = self.api.endpoint(&["folders"], path)?;
        let context = format!("folder {}", path);
        let context = context.as_str();

        collect_pages(|cursor| {
            let url = url.clone();
            async move {
                let mut query = vec![("max_results", MAX_PAGE_SIZE.to_string())];
                if let Some(c) = cursor {
                    query.push(("next_cursor", c));
                }
                let value = self.api.admin(Method::GET, url, &query, context).await?;
                let page: FolderPage = serde_json::from_value(value)?;
                Ok::<_, VfsError>((page.folders, page.next_cursor))
            }
        })
        .await
    }

    async fn put(&self, request: PutRequest) -> Result<ObjectRecord> {
        let size = request.data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(VfsError::PayloadTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let kind = request.resource_kind();
        let url = self.api.endpoint(&[kind.as_str(), "upload"], "")?;
        let mut params = BTreeMap::new();
        params.insert("public_id".to_string(), request.key.clone());
        params.insert("overwrite".to_string(), request.overwrite.to_string());
        params.insert("invalidate".to_string(), "true".to_string());
        params.insert("unique_filename".to_string(), "false".to_string());

        let context = format!("upload {}", request.key);
        let value = self
            .api
            .signed_upload(
                url,
                params,
                request.data,
                &request.file_name,
                request.content_type.as_deref(),
                &context,
            )
            .await?;
        let resource: Resource = serde_json::from_value(value)?;
        let record = resource.into_record(kind);

        // Each kind has its own key space; an older copy under another kind would
        // otherwise survive the overwrite.
        for other in self.kinds.iter().filter(|k| **k != kind) {
            if self.destroy_in_kind(*other, &record.key).await? {
                debug!(key = %record.key, kind = other.as_str(), "removed copy in other kind");
            }
        }
        info!(key = %record.key, kind = kind.as_str(), size = record.size_bytes, "uploaded object");
        Ok(record)
    }

    async fn destroy(&self, key: &str) -> Result<bool> {
        let mut removed = false;
        for kind in &self.kinds {
            removed |= self.destroy_in_kind(*kind, key).await?;
        }
        Ok(removed)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64> {
        let mut total = 0;
        for kind in &self.kinds {
            total += self.delete_kind_by_prefix(*kind, prefix).await?;
        }
        Ok(total)
    }

    async fn create_folder(&self, path: &str) -> Result<FolderRecord> {
        let url = self.api.endpoint(&["folders"], path)?;
        let context = format!("folder {}", path);

        // Creation is idempotent on the server side, so probe first.
        let probe = self.api.admin(Method::GET, url.clone(), &[], &context).await;
        require_absent(probe, &context)?;

        let value = self.api.admin(Method::POST, url, &[], &context).await?;
        let record = match serde_json::from_value::<FolderRecord>(value) {
            Ok(record) => record,
            Err(_) => FolderRecord::from_path(path),
        };
        Ok(record)
    }

    async fn delete_folder(&self, path: &str) -> Result<bool> {
        let url = self.api.endpoint(&["folders"], path)?;
        let context = format!("folder {}", path);
        let value = self.api.admin(Method::DELETE, url, &[], &context).await?;
        if value == Value::Null {
            return Ok(true);
        }
        let deleted: DeletedFolders = serde_json::from_value(value)?;
        Ok(!deleted.deleted.is_empty())
    }
}
