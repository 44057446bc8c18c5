//! Folder listing and lookup.

use tracing::debug;

use crate::drive::Drive;
use crate::error::Result;
use crate::fs::item::{Listing, ObjectRecord};
use crate::fs::path::{validate_key, CanonicalPath};
use crate::fs::reconcile::classify;
use crate::store::ObjectStore;

impl<S: ObjectStore> Drive<S> {
    /// List the direct children of a folder.
    ///
    /// # Arguments
    /// * `folder` - Folder path (e.g. "", "/", "docs", "/flutter_file_manager/docs")
    ///
    /// # Returns
    /// Folders first, then files. Fails only on invalid input or a store fault; a
    /// folder with no declared record lists as whatever its keys imply.
    pub async fn list(&self, folder: &str) -> Result<Listing> {
        let folder = self.resolve(folder)?;
        self.list_path(&folder).await
    }

    /// List a folder that is already canonical.
    pub async fn list_path(&self, folder: &CanonicalPath) -> Result<Listing> {
        let store_path = self.store_path(folder);

        // At the root, legacy keys without the root prefix must be observed too.
        let prefix = if folder.is_root() || store_path.is_empty() {
            None
        } else {
            Some(format!("{}/", store_path))
        };

        let objects = self.store().list_by_prefix(prefix.as_deref(), self.page_size());
        let subfolders = async {
            match self.store().list_subfolders(&store_path).await {
                Err(e) if e.is_not_found() => Ok(Vec::new()),
                other => other,
            }
        };
        let (objects, subfolders) = tokio::try_join!(objects, subfolders)?;

        let items = classify(&objects, &subfolders, folder, self.root_folder());
        debug!(
            folder = %folder,
            objects = objects.len(),
            declared = subfolders.len(),
            items = items.len(),
            "listed folder"
        );
        Ok(Listing {
            folder: folder.clone(),
            items,
        })
    }

    /// Look up a single object by its full key.
    ///
    /// # Returns
    /// The object if one is stored under exactly this key
    pub async fn stat(&self, key: &str) -> Result<Option<ObjectRecord>> {
        validate_key(key)?;
        let candidates = self
            .store()
            .list_by_prefix(Some(key), self.page_size())
            .await?;
        Ok(candidates.into_iter().find(|o| o.key == key))
    }
}
