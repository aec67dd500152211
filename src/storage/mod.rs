//! Storage layer - page files and page formats.
//!
//! This module handles persistent storage:
//! - [`File`] - The page file interface the buffer pool consumes
//! - [`PageFile`] - Disk-backed implementation
//! - [`page`] - Page types and layouts

mod file;
pub mod page;
mod page_file;

pub use file::{shared, File, FileHandle};
pub use page_file::PageFile;
