//! RAII guard for a pinned page.
//!
//! [`PinnedPage`] holds one pin on a cached page and releases it when
//! dropped. Mutable access through the guard marks the page dirty, so the
//! unpin carries the right dirty flag without the caller tracking it.

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::common::{FrameId, PageId};
use crate::storage::page::Page;
use crate::storage::FileHandle;

use super::buffer_pool_manager::BufferPoolManager;

/// A pinned page, unpinned on drop.
///
/// The guard borrows the manager mutably, so only one guard can be alive
/// at a time. Use [`BufferPoolManager::fetch_page`] and explicit
/// [`BufferPoolManager::unpin_page`] calls to hold several pins at once.
///
/// # Example
/// ```no_run
/// # use clockdb::storage::{shared, PageFile};
/// # use clockdb::BufferPoolManager;
/// # fn main() -> clockdb::Result<()> {
/// # let file = shared(PageFile::create("guard.db")?);
/// let mut bpm = BufferPoolManager::new(8);
/// let page_no = {
///     let mut guard = bpm.new_page_pinned(&file)?;
///     guard.data_mut()[0] = 1; // marks dirty
///     guard.page_no()
/// }; // unpinned here
/// # Ok(())
/// # }
/// ```
pub struct PinnedPage<'a> {
    bpm: &'a mut BufferPoolManager,
    file: FileHandle,
    page_no: PageId,
    frame_id: FrameId,
    dirty: bool,
}

impl<'a> PinnedPage<'a> {
    /// Called by `BufferPoolManager` after pinning `frame_id`.
    pub(crate) fn new(
        bpm: &'a mut BufferPoolManager,
        file: FileHandle,
        page_no: PageId,
        frame_id: FrameId,
    ) -> Self {
        Self {
            bpm,
            file,
            page_no,
            frame_id,
            dirty: false,
        }
    }

    /// Get the page number.
    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// Get the frame holding the page.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Whether the page will be unpinned as dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Deref for PinnedPage<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.bpm.frame_page(self.frame_id)
    }
}

impl DerefMut for PinnedPage<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.dirty = true;
        self.bpm.frame_page_mut(self.frame_id)
    }
}

impl Drop for PinnedPage<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.bpm.unpin_page(&self.file, self.page_no, self.dirty) {
            warn!(page = %self.page_no, error = %e, "failed to unpin guarded page");
        }
    }
}
