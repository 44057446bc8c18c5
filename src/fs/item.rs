//! Stored records and the listing view built from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::path::{basename, CanonicalPath};
use crate::store::ResourceKind;

/// One stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Full flat key (public id)
    pub key: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Store-assigned locator
    pub url: String,
    /// Creation time (reset on overwrite)
    pub created_at: DateTime<Utc>,
    /// Storage routing class
    pub resource_kind: ResourceKind,
}

impl ObjectRecord {
    /// Last segment of the key.
    pub fn basename(&self) -> &str {
        basename(&self.key)
    }
}

/// A declared folder node in the store's folder index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Last path segment
    pub name: String,
    /// Full store path
    pub path: String,
}

impl FolderRecord {
    /// Build a record from a full store path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: basename(&path).to_string(),
            path,
        }
    }
}

/// One entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    /// Full store path (object key for files)
    pub name: String,
    /// Last path segment
    pub basename: String,
    /// Folder or file
    pub is_folder: bool,
    /// Size in bytes (0 for folders)
    pub size_bytes: u64,
    /// Object URL (empty for folders)
    pub url: String,
    /// Creation time (absent for folders)
    pub created_at: Option<DateTime<Utc>>,
    /// Date part of `created_at`
    pub upload_date: Option<NaiveDate>,
}

impl ListingItem {
    /// Folder entry for a full store path.
    pub fn folder(path: &str) -> Self {
        Self {
            name: path.to_string(),
            basename: basename(path).to_string(),
            is_folder: true,
            size_bytes: 0,
            url: String::new(),
            created_at: None,
            upload_date: None,
        }
    }

    /// File entry for a stored object.
    pub fn file(object: &ObjectRecord) -> Self {
        Self {
            name: object.key.clone(),
            basename: object.basename().to_string(),
            is_folder: false,
            size_bytes: object.size_bytes,
            url: object.url.clone(),
            created_at: Some(object.created_at),
            upload_date: Some(object.created_at.date_naive()),
        }
    }
}

/// Result of listing a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// The listed folder
    pub folder: CanonicalPath,
    /// Folders first, then files
    pub items: Vec<ListingItem>,
}

impl Listing {
    /// Folder entries.
    pub fn folders(&self) -> impl Iterator<Item = &ListingItem> {
        self.items.iter().filter(|i| i.is_folder)
    }

    /// File entries.
    pub fn files(&self) -> impl Iterator<Item = &ListingItem> {
        self.items.iter().filter(|i| !i.is_folder)
    }

    /// Find an entry by basename.
    pub fn get(&self, basename: &str) -> Option<&ListingItem> {
        self.items.iter().find(|i| i.basename == basename)
    }
}

/// Outcome of deleting a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRemoval {
    /// The object existed and was removed
    Deleted,
    /// Nothing was stored under the key
    NotFound,
}

/// Outcome of deleting a folder tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRemoval {
    /// Objects removed by the prefix delete
    pub objects_deleted: u64,
    /// Folder records removed (the folder itself and nested records)
    pub records_deleted: u64,
}

impl FolderRemoval {
    /// Whether this call removed anything at all.
    pub fn removed_anything(&self) -> bool {
        self.objects_deleted > 0 || self.records_deleted > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn object(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size_bytes: 42,
            url: format!("https://cdn.example/{}", key),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap(),
            resource_kind: ResourceKind::Raw,
        }
    }

    #[test]
    fn test_file_item() {
        let item = ListingItem::file(&object("root/docs/report"));
        assert_eq!(item.name, "root/docs/report");
        assert_eq!(item.basename, "report");
        assert!(!item.is_folder);
        assert_eq!(item.size_bytes, 42);
        assert_eq!(item.upload_date.unwrap().to_string(), "2024-03-09");
    }

    #[test]
    fn test_folder_item() {
        let item = ListingItem::folder("root/docs");
        assert_eq!(item.basename, "docs");
        assert!(item.is_folder);
        assert_eq!(item.size_bytes, 0);
        assert!(item.url.is_empty());
        assert!(item.created_at.is_none());
    }

    #[test]
    fn test_item_serialization() {
        let value = serde_json::to_value(ListingItem::file(&object("legacy"))).unwrap();
        assert_eq!(value["isFolder"], false);
        assert_eq!(value["sizeBytes"], 42);
        assert_eq!(value["uploadDate"], "2024-03-09");
        assert_eq!(value["basename"], "legacy");
    }

    #[test]
    fn test_folder_record_from_path() {
        let record = FolderRecord::from_path("root/a/b");
        assert_eq!(record.name, "b");
        assert_eq!(record.path, "root/a/b");
    }

    #[test]
    fn test_folder_removal() {
        assert!(!FolderRemoval::default().removed_anything());
        let removal = FolderRemoval {
            objects_deleted: 0,
            records_deleted: 1,
        };
        assert!(removal.removed_anything());
    }
}
