//! Buffer hash table - maps cached pages to the frames holding them.

use std::collections::HashMap;

use crate::common::config::hash_table_capacity;
use crate::common::{Error, FileId, FrameId, PageId, Result};

/// Injective map `(file, page) -> frame` over the pages resident in the pool.
///
/// Keys compare files by identity ([`FileId`]), never by name, so two handles
/// opened on the same path are distinct files here.
pub struct BufHashTable {
    table: HashMap<(FileId, PageId), FrameId>,
}

impl BufHashTable {
    /// Create a table sized for a pool of `num_frames` frames.
    pub fn new(num_frames: usize) -> Self {
        Self {
            table: HashMap::with_capacity(hash_table_capacity(num_frames)),
        }
    }

    /// Map `(file, page_no)` to `frame`.
    ///
    /// # Errors
    /// `Error::HashAlreadyPresent` if the page is already mapped; the
    /// existing entry is left untouched.
    pub fn insert(&mut self, file: FileId, page_no: PageId, frame: FrameId) -> Result<()> {
        if let Some(&existing) = self.table.get(&(file, page_no)) {
            return Err(Error::HashAlreadyPresent {
                page_no: page_no.0,
                frame: existing.0,
            });
        }
        self.table.insert((file, page_no), frame);
        Ok(())
    }

    /// Frame holding `(file, page_no)`, or `None` if it is not cached.
    #[inline]
    pub fn lookup(&self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.table.get(&(file, page_no)).copied()
    }

    /// Remove the entry for `(file, page_no)`, returning the frame it named.
    #[inline]
    pub fn remove(&mut self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.table.remove(&(file, page_no))
    }

    /// Number of cached pages.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
