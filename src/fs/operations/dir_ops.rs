//! Folder and file mutation operations.

use tracing::{debug, info};

use crate::drive::Drive;
use crate::error::{Result, VfsError};
use crate::fs::item::{FileRemoval, FolderRecord, FolderRemoval};
use crate::fs::path::validate_key;
use crate::store::ObjectStore;

impl<S: ObjectStore> Drive<S> {
    /// Create a folder.
    ///
    /// Fails with `AlreadyExists` if the store already has a record for it.
    pub async fn create_folder(&self, path: &str) -> Result<FolderRecord> {
        let folder = self.resolve(path)?;
        if folder.is_root() {
            return Err(VfsError::InvalidPath("cannot create the root folder".to_string()));
        }
        let record = self.store().create_folder(&self.store_path(&folder)).await?;
        info!(folder = %folder, path = %record.path, "created folder");
        Ok(record)
    }

    /// Delete a folder and everything beneath it.
    ///
    /// Objects go first, in one prefix delete; folder records go second, deepest
    /// first. Missing objects or records count as already deleted, so calling this
    /// again on the same path succeeds with zero counts.
    pub async fn delete_folder(&self, path: &str) -> Result<FolderRemoval> {
        let folder = self.resolve(path)?;
        if folder.is_root() {
            return Err(VfsError::InvalidPath("cannot delete the root folder".to_string()));
        }
        let store_path = self.store_path(&folder);

        let objects_deleted = match self
            .store()
            .delete_by_prefix(&format!("{}/", store_path))
            .await
        {
            Ok(count) => count,
            Err(e) if e.is_not_found() => 0,
            Err(e) => return Err(e),
        };

        let records_deleted = self.erase_folder_records(&store_path).await?;

        let removal = FolderRemoval {
            objects_deleted,
            records_deleted,
        };
        info!(
            folder = %folder,
            objects = removal.objects_deleted,
            records = removal.records_deleted,
            "deleted folder"
        );
        Ok(removal)
    }

    /// Delete one file by its full key.
    pub async fn delete_file(&self, key: &str) -> Result<FileRemoval> {
        validate_key(key)?;
        if self.store().destroy(key).await? {
            info!(key, "deleted file");
            Ok(FileRemoval::Deleted)
        } else {
            debug!(key, "file already absent");
            Ok(FileRemoval::NotFound)
        }
    }

    /// Remove the folder record at `store_path` and every declared record below it.
    ///
    /// The store refuses to delete a record that still has child records, so
    /// children are removed before their parents.
    async fn erase_folder_records(&self, store_path: &str) -> Result<u64> {
        let mut discovered = Vec::new();
        let mut pending = vec![store_path.to_string()];

        while let Some(path) = pending.pop() {
            let children = match self.store().list_subfolders(&path).await {
                Ok(children) => children,
                Err(e) if e.is_not_found() => Vec::new(),
                Err(e) => return Err(e),
            };
            for child in children {
                if child.name.is_empty() || child.name.contains('/') {
                    continue;
                }
                pending.push(format!("{}/{}", path, child.name));
            }
            discovered.push(path);
        }

        let mut deleted = 0;
        for path in discovered.iter().rev() {
            match self.store().delete_folder(path).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(e) if e.is_not_found() => debug!(path = %path, "folder record already absent"),
                Err(e) => return Err(e),
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::drive::Drive;
    use crate::error::VfsError;
    use crate::fs::item::{FileRemoval, FolderRemoval};
    use crate::store::{MemoryStore, StoreOp};

    fn drive(store: &Arc<MemoryStore>) -> Drive<Arc<MemoryStore>> {
        Drive::with_root(Arc::clone(store), "root")
    }

    #[tokio::test]
    async fn test_create_folder() {
        let store = Arc::new(MemoryStore::new());
        let drive = drive(&store);

        let record = drive.create_folder("/docs/2024/").await.unwrap();
        assert_eq!(record.path, "root/docs/2024");
        assert_eq!(record.name, "2024");
        assert!(matches!(
            drive.create_folder("docs/2024").await,
            Err(VfsError::AlreadyExists(_))
        ));
        assert!(matches!(
            drive.create_folder("/").await,
            Err(VfsError::InvalidPath(_))
        ));

        let listing = drive.list("docs").await.unwrap();
        assert_eq!(listing.items.len(), 1);
        assert!(listing.items[0].is_folder);
        assert_eq!(listing.items[0].basename, "2024");
    }

    #[tokio::test]
    async fn test_delete_folder_removes_tree() {
        let store = Arc::new(MemoryStore::new().with_auto_folders(true));
        let drive = drive(&store);
        drive.upload("a", "one.txt", b"1".to_vec(), None).await.unwrap();
        drive.upload("a/b/c", "two.txt", b"2".to_vec(), None).await.unwrap();
        drive.create_folder("a/empty").await.unwrap();
        drive.upload("ab", "keep.txt", b"3".to_vec(), None).await.unwrap();

        let removal = drive.delete_folder("a").await.unwrap();
        assert_eq!(removal.objects_deleted, 2);
        // a, a/b, a/b/c, a/empty
        assert_eq!(removal.records_deleted, 4);

        let keys: Vec<_> = store.objects().await.into_iter().map(|o| o.key).collect();
        assert_eq!(keys, vec!["root/ab/keep"]);
        assert_eq!(store.folders().await, vec!["root", "root/ab"]);

        let listing = drive.list("").await.unwrap();
        assert!(listing.items.iter().all(|i| i.basename != "a"));
    }

    #[tokio::test]
    async fn test_delete_folder_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("root/gone/x", 1).await;
        store.seed_folder("root/gone").await;
        let drive = drive(&store);

        let first = drive.delete_folder("gone").await.unwrap();
        assert!(first.removed_anything());
        let second = drive.delete_folder("gone").await.unwrap();
        assert_eq!(second, FolderRemoval::default());

        // Never created at all.
        assert!(drive.delete_folder("phantom").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_folder_without_record() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("root/legacy/x", 1).await;
        let drive = drive(&store);

        let removal = drive.delete_folder("legacy").await.unwrap();
        assert_eq!(removal.objects_deleted, 1);
        assert_eq!(removal.records_deleted, 0);
        assert!(store.objects().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_folder_deletes_objects_before_records() {
        let store = Arc::new(MemoryStore::new());
        store.seed_folder("root/f").await;
        let drive = drive(&store);
        drive.delete_folder("f").await.unwrap();

        let calls = store.calls().await;
        let prefix_delete = calls
            .iter()
            .position(|c| *c == StoreOp::DeleteByPrefix)
            .unwrap();
        let record_delete = calls
            .iter()
            .position(|c| *c == StoreOp::DeleteFolder)
            .unwrap();
        assert!(prefix_delete < record_delete);
    }

    #[tokio::test]
    async fn test_delete_folder_stops_on_prefix_failure() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("root/f/x", 1).await;
        store.seed_folder("root/f").await;
        store.fail(StoreOp::DeleteByPrefix).await;
        let drive = drive(&store);

        assert!(matches!(
            drive.delete_folder("f").await,
            Err(VfsError::StoreUnavailable(_))
        ));
        // The record is kept so the objects are not stranded.
        assert!(store.folders().await.contains(&"root/f".to_string()));
        assert!(!store.calls().await.contains(&StoreOp::DeleteFolder));
    }

    #[tokio::test]
    async fn test_delete_folder_absorbs_missing_prefix() {
        let store = Arc::new(MemoryStore::new());
        store.seed_folder("root/f").await;
        store
            .fail_with(
                StoreOp::DeleteByPrefix,
                VfsError::NotFound("root/f/".to_string()),
            )
            .await;
        let drive = drive(&store);

        let removal = drive.delete_folder("f").await.unwrap();
        assert_eq!(removal.objects_deleted, 0);
        assert_eq!(removal.records_deleted, 1);
        assert_eq!(store.folders().await, vec!["root"]);
    }

    #[tokio::test]
    async fn test_delete_root_rejected() {
        let store = Arc::new(MemoryStore::new());
        store.seed_object("root/x", 1).await;
        let drive = drive(&store);
        for raw in ["", "/", "root"] {
            assert!(matches!(
                drive.delete_folder(raw).await,
                Err(VfsError::InvalidPath(_))
            ));
        }
        assert_eq!(store.objects().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_file() {
        let store = Arc::new(MemoryStore::new());
        let drive = drive(&store);
        let record = drive.upload("", "a.txt", b"a".to_vec(), None).await.unwrap();

        assert_eq!(drive.delete_file(&record.key).await.unwrap(), FileRemoval::Deleted);
        assert_eq!(drive.delete_file(&record.key).await.unwrap(), FileRemoval::NotFound);
        assert_eq!(
            drive.delete_file("root/never").await.unwrap(),
            FileRemoval::NotFound
        );
        assert!(matches!(
            drive.delete_file("root//x").await,
            Err(VfsError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_file_store_fault() {
        let store = Arc::new(MemoryStore::new());
        store.fail(StoreOp::Destroy).await;
        let drive = drive(&store);
        assert!(matches!(
            drive.delete_file("root/x").await,
            Err(VfsError::StoreUnavailable(_))
        ));
    }
}
