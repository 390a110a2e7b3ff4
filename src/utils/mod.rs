//! Utility modules: build info and JSON persistence helpers.

pub mod build_info;
pub mod persistence;

pub use build_info::{version_string, BUILD_COMMIT, BUILD_DATE};
