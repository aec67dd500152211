//! ClockDB - a disk-backed page store with a CLOCK buffer pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            ClockDB                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Pool (buffer/)                      │   │
//! │  │   BufferPoolManager                                     │   │
//! │  │     ├─ FrameDesc table  (pin count, dirty, refbit)      │   │
//! │  │     ├─ Vec<Page> pool   (one page per frame)            │   │
//! │  │     ├─ BufHashTable     ((file, page) → frame)          │   │
//! │  │     └─ ClockReplacer    (second-chance eviction)        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     File trait + PageFile + Page + PageHeader            │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, FileId, Error, config)
//! - [`buffer`] - Buffer pool management and eviction
//! - [`storage`] - Page files and page formats
//!
//! # Quick Start
//! ```no_run
//! use clockdb::storage::{shared, PageFile};
//! use clockdb::BufferPoolManager;
//!
//! # fn main() -> clockdb::Result<()> {
//! let file = shared(PageFile::open_or_create("my_table.db")?);
//! let mut bpm = BufferPoolManager::new(128);
//!
//! let (page_no, page) = bpm.new_page(&file)?;
//! page.data_mut()[..5].copy_from_slice(b"hello");
//! bpm.unpin_page(&file, page_no, true)?;
//!
//! bpm.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, FileId, FrameId, PageId, Result};

pub use buffer::{BufferPoolManager, BufferPoolStats, FrameDesc, PinnedPage};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{File, FileHandle, PageFile};
