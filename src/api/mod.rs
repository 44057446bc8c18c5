//! Cloudinary API client and failure classification.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::StatusClass;
