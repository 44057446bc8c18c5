//! Upload operations and key assignment.

use tracing::info;

use crate::drive::Drive;
use crate::error::{Result, VfsError};
use crate::fs::item::ObjectRecord;
use crate::fs::path::CanonicalPath;
use crate::store::{ObjectStore, PutRequest};

/// Base name used in object keys: the file name without its last extension.
///
/// Only the final `/` or `\` separated component of `original_name` is considered.
pub fn base_name(original_name: &str) -> Result<&str> {
    let file_name = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_name);
    let base = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };
    if base.is_empty() || base == "." || base == ".." {
        return Err(VfsError::InvalidPath(format!(
            "file name {:?} has no usable base name",
            original_name
        )));
    }
    Ok(base)
}

/// Destination key for a file uploaded into `folder`.
///
/// Deterministic: the same folder and base name always give the same key, so a
/// second upload overwrites the first.
pub fn assign_key(folder: &CanonicalPath, original_name: &str, root_folder: &str) -> Result<String> {
    let base = base_name(original_name)?;
    let store_path = folder.store_path(root_folder);
    if store_path.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{}/{}", store_path, base))
    }
}

impl<S: ObjectStore> Drive<S> {
    /// Upload a file into a folder, replacing any file with the same base name.
    ///
    /// # Arguments
    /// * `folder` - Destination folder path
    /// * `original_name` - Client-side file name; its extension is dropped from the key
    /// * `data` - File contents
    /// * `content_type` - MIME type reported by the client, if any
    pub async fn upload(
        &self,
        folder: &str,
        original_name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<ObjectRecord> {
        let folder = self.resolve(folder)?;
        let key = assign_key(&folder, original_name, self.root_folder())?;

        let record = self
            .store()
            .put(PutRequest {
                key,
                data,
                file_name: original_name.to_string(),
                content_type: content_type.map(str::to_string),
                overwrite: true,
            })
            .await?;

        info!(folder = %folder, key = %record.key, size = record.size_bytes, "upload complete");
        Ok(record)
    }
}
