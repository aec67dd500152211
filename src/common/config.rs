//! Configuration constants for ClockDB.

/// Size of a page in bytes (4KB).
///
/// This value is chosen to match:
/// - OS page size on most systems (4096 bytes)
/// - The unit the buffer pool caches and the page file stores
///
/// # Memory Layout
/// With 4KB pages and 32-bit page numbers:
/// - Max pages per file: 2^32 - 1 (the all-ones number is the invalid sentinel)
/// - Max file size: just under 16TB
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages a single file can address.
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Maximum theoretical file size in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;

/// Initial capacity for the buffer hash table of a pool with `num_frames` frames.
///
/// Sized at roughly 1.2x the frame count, rounded to an odd number, so the
/// table never rehashes while the pool is full.
pub fn hash_table_capacity(num_frames: usize) -> usize {
    let scaled = (num_frames as f64 * 1.2) as usize;
    (scaled * 2) / 2 + 1
}
