//! Canonical folder paths.
//!
//! A [`CanonicalPath`] is always relative to the namespace root: `""` is the root and
//! `docs/2024` is a nested folder. The store-side location is derived only through
//! [`CanonicalPath::store_path`], so the two ways of spelling the root (empty string or
//! the configured root folder name) never diverge between call sites.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, VfsError};

/// Normalized, root-relative folder path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// The namespace root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a user-supplied folder path.
    ///
    /// Accepts `""`, `"/"`, `"docs"`, `"/docs/"` and `"<root_folder>/docs"`; rejects
    /// empty segments (`a//b`), `.` and `..`.
    pub fn parse(raw: &str, root_folder: &str) -> Result<Self> {
        let mut path = raw.strip_prefix('/').unwrap_or(raw);
        if path.is_empty() {
            return Ok(Self::root());
        }
        if path.starts_with('/') {
            return Err(VfsError::InvalidPath(format!("empty segment in {:?}", raw)));
        }
        path = path.strip_suffix('/').unwrap_or(path);

        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" => {
                    return Err(VfsError::InvalidPath(format!("empty segment in {:?}", raw)));
                }
                "." | ".." => {
                    return Err(VfsError::InvalidPath(format!(
                        "relative segment {:?} in {:?}",
                        segment, raw
                    )));
                }
                _ => segments.push(segment),
            }
        }

        // Trim the root folder when the caller spelled it out.
        if !root_folder.is_empty() {
            let root_segments: Vec<&str> = root_folder.split('/').collect();
            if segments.starts_with(&root_segments) {
                segments.drain(..root_segments.len());
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// Check whether this is the namespace root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Root-relative path string (`""` for the root).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            Some(basename(&self.0))
        }
    }

    /// Parent folder, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Append a single child segment.
    pub fn join(&self, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(VfsError::InvalidPath(format!("invalid folder name {:?}", name)));
        }
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Store-side folder path for this location.
    ///
    /// The root maps to `root_folder` itself, which may be empty when the namespace
    /// spans the whole store.
    pub fn store_path(&self, root_folder: &str) -> String {
        match (root_folder.is_empty(), self.is_root()) {
            (_, true) => root_folder.to_string(),
            (true, false) => self.0.clone(),
            (false, false) => format!("{}/{}", root_folder, self.0),
        }
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// Last `/`-separated segment of a store path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Validate a full object key: non-empty, no leading slash, no empty segments.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.split('/').any(str::is_empty) {
        return Err(VfsError::InvalidPath(format!("invalid object key {:?}", key)));
    }
    Ok(())
}
