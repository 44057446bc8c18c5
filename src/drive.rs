//! The folder-view facade over an object store.

use crate::config::{StoreConfig, DEFAULT_PAGE_SIZE};
use crate::error::Result;
use crate::fs::CanonicalPath;
use crate::store::{CloudinaryStore, ObjectStore};

/// Hierarchical file and folder operations over a flat-key [`ObjectStore`].
///
/// A `Drive` holds only immutable settings and the store handle; every operation is
/// independent, so one instance can serve concurrent requests (wrap the store in an
/// `Arc` to share it).
#[derive(Debug, Clone)]
pub struct Drive<S> {
    store: S,
    root_folder: String,
    page_size: usize,
}

impl Drive<CloudinaryStore> {
    /// Connect to Cloudinary with the given configuration.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let store = CloudinaryStore::new(config)?;
        Ok(Self::new(store, config))
    }
}

impl<S: ObjectStore> Drive<S> {
    /// Create a drive over `store` using the namespace settings from `config`.
    pub fn new(store: S, config: &StoreConfig) -> Self {
        Self {
            store,
            root_folder: config.root_folder.clone(),
            page_size: config.page_size,
        }
    }

    /// Create a drive with an explicit root folder and default paging.
    pub fn with_root(store: S, root_folder: impl Into<String>) -> Self {
        Self {
            store,
            root_folder: root_folder.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store-side folder acting as the namespace root.
    pub fn root_folder(&self) -> &str {
        &self.root_folder
    }

    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }

    /// Normalize a user-supplied folder path.
    pub fn resolve(&self, raw: &str) -> Result<CanonicalPath> {
        CanonicalPath::parse(raw, &self.root_folder)
    }

    /// Store-side path of a canonical folder.
    pub fn store_path(&self, folder: &CanonicalPath) -> String {
        folder.store_path(&self.root_folder)
    }
}
