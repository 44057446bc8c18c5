//! Object store boundary.
//!
//! [`ObjectStore`] is the only seam between the folder layer and the backend. Every
//! implementation reports failures in the crate's [`VfsError`](crate::VfsError)
//! taxonomy; raw transport errors never cross this trait.

pub mod cloudinary;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fs::{FolderRecord, ObjectRecord};

pub use cloudinary::CloudinaryStore;
pub use memory::{MemoryStore, StoreOp};

/// Storage routing class, chosen from the MIME type on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Images (and PDFs, which the store rasterizes)
    Image,
    /// Video and audio
    Video,
    /// Anything else, stored as-is
    Raw,
}

impl ResourceKind {
    /// Every kind, in scan order.
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Image, ResourceKind::Video, ResourceKind::Raw];

    /// Classify a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match essence.split_once('/') {
            Some(("image", _)) => ResourceKind::Image,
            Some(("video", _)) | Some(("audio", _)) => ResourceKind::Video,
            _ if essence == "application/pdf" => ResourceKind::Image,
            _ => ResourceKind::Raw,
        }
    }

    /// Classify by file extension when no content type is available.
    pub fn from_file_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return ResourceKind::Raw,
        };
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" | "tif" | "tiff" | "ico"
            | "heic" | "avif" | "pdf" => ResourceKind::Image,
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "mp3" | "wav" | "ogg" | "flac" | "m4a"
            | "aac" => ResourceKind::Video,
            _ => ResourceKind::Raw,
        }
    }

    /// Name used in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
            ResourceKind::Raw => "raw",
        }
    }
}

/// A write request. `overwrite` replaces any object already stored under `key`,
/// whatever its resource kind.
#[derive(Debug, Clone)]
pub struct PutRequest {
    /// Destination key
    pub key: String,
    /// Payload
    pub data: Vec<u8>,
    /// Original file name, used for content sniffing and multipart metadata
    pub file_name: String,
    /// Content type as reported by the client
    pub content_type: Option<String>,
    /// Replace an existing object at `key`
    pub overwrite: bool,
}

impl PutRequest {
    /// Routing class for this payload.
    pub fn resource_kind(&self) -> ResourceKind {
        match self.content_type.as_deref() {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
                ResourceKind::from_mime(mime)
            }
            _ => ResourceKind::from_file_name(&self.file_name),
        }
    }
}

/// Flat key-value blob store with a best-effort folder index.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object whose key starts with `prefix` (all objects when `None`).
    ///
    /// `max_results` is a page size; implementations follow cursors until exhausted.
    async fn list_by_prefix(
        &self,
        prefix: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<ObjectRecord>>;

    /// Declared immediate subfolders of `path` (`""` for the store root).
    ///
    /// Fails with `NotFound` when `path` is not a declared folder.
    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderRecord>>;

    /// Store a blob.
    ///
    /// Keys are unique across resource kinds: a successful put leaves exactly one
    /// object under `request.key`.
    async fn put(&self, request: PutRequest) -> Result<ObjectRecord>;

    /// Remove the object stored under `key` in every resource kind.
    /// `Ok(false)` means nothing was stored under it.
    async fn destroy(&self, key: &str) -> Result<bool>;

    /// Remove every object whose key starts with `prefix`; returns the number removed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64>;

    /// Declare a folder. Fails with `AlreadyExists` if it is already declared.
    async fn create_folder(&self, path: &str) -> Result<FolderRecord>;

    /// Remove a folder record. May fail with `NotFound`.
    async fn delete_folder(&self, path: &str) -> Result<bool>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn list_by_prefix(
        &self,
        prefix: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<ObjectRecord>> {
        (**self).list_by_prefix(prefix, max_results).await
    }

    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderRecord>> {
        (**self).list_subfolders(path).await
    }

    async fn put(&self, request: PutRequest) -> Result<ObjectRecord> {
        (**self).put(request).await
    }

    async fn destroy(&self, key: &str) -> Result<bool> {
        (**self).destroy(key).await
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64> {
        (**self).delete_by_prefix(prefix).await
    }

    async fn create_folder(&self, path: &str) -> Result<FolderRecord> {
        (**self).create_folder(path).await
    }

    async fn delete_folder(&self, path: &str) -> Result<bool> {
        (**self).delete_folder(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(ResourceKind::from_mime("image/png"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_mime("IMAGE/JPEG"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_mime("video/mp4"), ResourceKind::Video);
        assert_eq!(ResourceKind::from_mime("audio/mpeg"), ResourceKind::Video);
        assert_eq!(ResourceKind::from_mime("application/pdf"), ResourceKind::Image);
        assert_eq!(
            ResourceKind::from_mime("text/plain; charset=utf-8"),
            ResourceKind::Raw
        );
        assert_eq!(ResourceKind::from_mime("garbage"), ResourceKind::Raw);
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(ResourceKind::from_file_name("photo.JPG"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_file_name("clip.mov"), ResourceKind::Video);
        assert_eq!(ResourceKind::from_file_name("notes.txt"), ResourceKind::Raw);
        assert_eq!(ResourceKind::from_file_name("README"), ResourceKind::Raw);
    }

    #[test]
    fn test_put_request_kind_falls_back_to_name() {
        let mut request = PutRequest {
            key: "root/photo".to_string(),
            data: vec![],
            file_name: "photo.png".to_string(),
            content_type: Some("application/octet-stream".to_string()),
            overwrite: true,
        };
        assert_eq!(request.resource_kind(), ResourceKind::Image);
        request.content_type = Some("video/webm".to_string());
        assert_eq!(request.resource_kind(), ResourceKind::Video);
        request.content_type = None;
        assert_eq!(request.resource_kind(), ResourceKind::Image);
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&ResourceKind::Raw).unwrap(), "\"raw\"");
        let kind: ResourceKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, ResourceKind::Video);
        assert_eq!(ResourceKind::Image.as_str(), "image");
    }
}
