//! # cloudvfs
//!
//! Folder-and-file view over a cloud object store that only has flat keys.
//!
//! ## Features
//!
//! - **Listing**: direct child folders and files of any folder, merging the store's
//!   folder index with structure inferred from key prefixes. Objects uploaded before
//!   folders were tracked (keys without the root prefix) still show up at the root.
//! - **Uploads**: deterministic keys (`<folder>/<name without extension>`), always
//!   written with overwrite, so re-uploading a file replaces it.
//! - **Folders**: create, and delete recursively (prefix delete of all objects, then
//!   the folder records, deepest first). Deleting twice is not an error.
//! - **Files**: delete by key; a missing key is reported, not raised.
//! - **Backends**: [`CloudinaryStore`] for Cloudinary, [`MemoryStore`] for tests.
//!
//! All folder paths go through [`CanonicalPath`], so `""`, `"/"` and the configured
//! root folder name all mean the same folder.
//!
//! ## Example
//!
//! ```no_run
//! use cloudvfs::{Drive, StoreConfig};
//!
//! # async fn example() -> cloudvfs::Result<()> {
//! let config = StoreConfig::from_env()?;
//! let drive = Drive::connect(&config)?;
//!
//! drive.create_folder("reports").await?;
//! let record = drive
//!     .upload("reports", "q3.pdf", b"%PDF-1.7".to_vec(), Some("application/pdf"))
//!     .await?;
//! println!("stored as {}", record.key);
//!
//! let listing = drive.list("reports").await?;
//! for item in &listing.items {
//!     println!("{} {} ({} bytes)", if item.is_folder { "d" } else { "-" }, item.basename, item.size_bytes);
//! }
//!
//! drive.delete_folder("reports").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod drive;
pub mod error;
pub mod fs;
pub mod http;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use drive::Drive;
pub use error::{Result, VfsError};
pub use fs::{
    CanonicalPath, FileRemoval, FolderRecord, FolderRemoval, Listing, ListingItem, ObjectRecord,
};
pub use store::{CloudinaryStore, MemoryStore, ObjectStore, PutRequest, ResourceKind};
