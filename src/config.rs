//! Store configuration, built once at startup and passed explicitly.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, VfsError};
use crate::store::ResourceKind;

/// Default top-level folder that holds every managed object.
pub const DEFAULT_ROOT_FOLDER: &str = "flutter_file_manager";

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of resources requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Base URL for the Cloudinary REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Connection and namespace settings for the object store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Cloudinary cloud name
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret (used for basic auth and request signing)
    pub api_secret: String,
    /// Store-side folder that acts as the namespace root ("" for the bucket root)
    pub root_folder: String,
    /// API base URL, without the cloud name
    pub api_base_url: String,
    /// Resource kinds scanned when listing or deleting
    pub resource_kinds: Vec<ResourceKind>,
    /// Page size for prefix listings
    pub page_size: usize,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Optional HTTP proxy URL
    pub proxy: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            resource_kinds: ResourceKind::ALL.to_vec(),
            page_size: DEFAULT_PAGE_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 20,
            proxy: None,
        }
    }
}

impl StoreConfig {
    /// Create a config with credentials and defaults for everything else.
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Required: `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`.
    /// Optional: `CLOUDVFS_ROOT_FOLDER`, `CLOUDVFS_MAX_UPLOAD_BYTES`, `CLOUDVFS_PROXY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VfsError::Config(format!("{} is not set", name)))
        };

        let mut config = Self::new(
            required("CLOUDINARY_CLOUD_NAME")?,
            required("CLOUDINARY_API_KEY")?,
            required("CLOUDINARY_API_SECRET")?,
        );

        if let Some(root) = lookup("CLOUDVFS_ROOT_FOLDER") {
            config.root_folder = root.trim_matches('/').to_string();
        }
        if let Some(limit) = lookup("CLOUDVFS_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit.trim().parse().map_err(|_| {
                VfsError::Config(format!("CLOUDVFS_MAX_UPLOAD_BYTES is not a number: {}", limit))
            })?;
        }
        config.proxy = lookup("CLOUDVFS_PROXY").filter(|p| !p.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.root_folder.split('/').any(str::is_empty) && !self.root_folder.is_empty() {
            return Err(VfsError::Config(format!(
                "root folder has empty segments: {}",
                self.root_folder
            )));
        }
        if self.page_size == 0 {
            return Err(VfsError::Config("page size must be positive".to_string()));
        }
        if self.resource_kinds.is_empty() {
            return Err(VfsError::Config(
                "at least one resource kind is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// URL prefix for this cloud's API calls.
    pub(crate) fn cloud_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const CREDS: [(&str, &str); 3] = [
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "key"),
        ("CLOUDINARY_API_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&CREDS)).unwrap();
        assert_eq!(config.cloud_name, "demo");
        assert_eq!(config.root_folder, DEFAULT_ROOT_FOLDER);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(
            config.cloud_url(),
            "https://api.cloudinary.com/v1_1/demo"
        );
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let err = StoreConfig::from_lookup(lookup_from(&CREDS[..2])).unwrap_err();
        assert!(matches!(err, VfsError::Config(msg) if msg.contains("CLOUDINARY_API_SECRET")));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("CLOUDVFS_ROOT_FOLDER", "/files/"));
        pairs.push(("CLOUDVFS_MAX_UPLOAD_BYTES", "1024"));
        let config = StoreConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.root_folder, "files");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_limit() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("CLOUDVFS_MAX_UPLOAD_BYTES", "lots"));
        assert!(StoreConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_root_with_empty_segment_rejected() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("CLOUDVFS_ROOT_FOLDER", "a//b"));
        assert!(StoreConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"cloud_name":"c","root_folder":""}"#).unwrap();
        assert_eq!(config.root_folder, "");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.resource_kinds.len(), 3);
    }
}
