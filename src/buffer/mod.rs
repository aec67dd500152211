//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between callers and page
//! files. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The main page cache
//! - [`FrameDesc`] - Per-frame metadata (pin count, dirty, reference bit)
//! - [`BufHashTable`] - `(file, page) -> frame` index
//! - [`PinnedPage`] - RAII guard that unpins on drop
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool_manager;
mod frame;
mod hash_table;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::FrameDesc;
pub use hash_table::BufHashTable;
pub use page_guard::PinnedPage;
pub use stats::BufferPoolStats;
