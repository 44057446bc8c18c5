//! Folder view over the flat key space.

pub(crate) mod item;
mod operations;
pub mod path;
pub mod reconcile;

pub use item::{
    FileRemoval, FolderRecord, FolderRemoval, Listing, ListingItem, ObjectRecord,
};
pub use operations::{assign_key, base_name};
pub use path::CanonicalPath;
pub use reconcile::classify;
