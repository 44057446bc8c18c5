//! Drive operations split into focused modules.

mod browse;
mod dir_ops;
mod upload;

pub use upload::{assign_key, base_name};
