//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between files and memory
//! - Pin-based reference counting
//! - CLOCK (second-chance) eviction with dirty page write-back
//! - Per-file flush and page disposal

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::buffer::frame::FrameDesc;
use crate::buffer::hash_table::BufHashTable;
use crate::buffer::replacer::ClockReplacer;
use crate::buffer::{BufferPoolStats, PinnedPage};
use crate::common::{Error, FileId, FrameId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::FileHandle;

/// Manages a fixed pool of frames caching pages of any number of files.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌──────────────────┐  ┌─────────────────────────────────┐  │
/// │  │   hash_table     │  │   descs: Vec<FrameDesc>         │  │
/// │  │(File,Page) → Fid │─▶│   pool:  Vec<Page>              │  │
/// │  └──────────────────┘  │   [Frame0] [Frame1] [Frame2]... │  │
/// │  ┌──────────────────┐  └─────────────────────────────────┘  │
/// │  │ clock: hand over │                                       │
/// │  │ descs, wraps mod │                                       │
/// │  └──────────────────┘                                       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// `descs[i]` describes `pool[i]`. A page is cached iff the hash table maps
/// it to a frame whose descriptor is valid and names exactly that page.
///
/// # Pinning
/// [`fetch_page`](Self::fetch_page) and [`new_page`](Self::new_page) pin the
/// page; every pin must be released with [`unpin_page`](Self::unpin_page).
/// Pinned frames are never evicted. [`fetch_page_pinned`](Self::fetch_page_pinned)
/// returns a guard that unpins on drop.
///
/// # Concurrency
/// All operations take `&mut self`: one caller drives the pool at a time.
/// Wrap the manager in a lock to share it.
///
/// # Usage
/// ```no_run
/// use clockdb::storage::{shared, PageFile};
/// use clockdb::BufferPoolManager;
///
/// # fn main() -> clockdb::Result<()> {
/// let file = shared(PageFile::create("table.db")?);
/// let mut bpm = BufferPoolManager::new(64);
///
/// let (page_no, page) = bpm.new_page(&file)?;
/// page.data_mut()[0] = 0xAB;
/// bpm.unpin_page(&file, page_no, true)?;
///
/// let page = bpm.fetch_page(&file, page_no)?;
/// assert_eq!(page.data()[0], 0xAB);
/// bpm.unpin_page(&file, page_no, false)?;
///
/// bpm.flush_file(&file)?;
/// # Ok(())
/// # }
/// ```
pub struct BufferPoolManager {
    /// One descriptor per frame, indexed by frame number.
    descs: Vec<FrameDesc>,

    /// Page slots, 1:1 with `descs`.
    pool: Vec<Page>,

    /// Maps cached `(file, page)` pairs to frames.
    hash_table: BufHashTable,

    /// Eviction cursor.
    clock: ClockReplacer,

    stats: BufferPoolStats,
}

impl BufferPoolManager {
    /// Create a buffer pool with `num_frames` frames, all initially invalid.
    ///
    /// # Panics
    /// Panics if `num_frames` is 0.
    pub fn new(num_frames: usize) -> Self {
        assert!(num_frames > 0, "num_frames must be > 0");

        Self {
            descs: (0..num_frames)
                .map(|i| FrameDesc::new(FrameId::new(i)))
                .collect(),
            pool: (0..num_frames).map(|_| Page::new()).collect(),
            hash_table: BufHashTable::new(num_frames),
            clock: ClockReplacer::new(num_frames),
            stats: BufferPoolStats::default(),
        }
    }

    // ========================================================================
    // Public API: Fetch and allocate
    // ========================================================================

    /// Fetch page `page_no` of `file`, pinning it.
    ///
    /// On a hit the frame's reference bit is set and its pin count bumped;
    /// no I/O happens. On a miss a frame is taken from the clock sweep
    /// (writing back a dirty victim) and the page is read into it.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - Errors from the file when reading the page or writing back a victim
    pub fn fetch_page(&mut self, file: &FileHandle, page_no: PageId) -> Result<&mut Page> {
        let frame_id = self.fetch_frame(file, page_no)?;
        Ok(&mut self.pool[frame_id.0])
    }

    /// Allocate a new page in `file` and load it, pinned, into the pool.
    ///
    /// Returns the page number the file assigned and the frame's page.
    /// Equivalent to a fetch miss without the read.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned; the file is not
    ///   asked to allocate in that case
    /// - Errors from the file when allocating or writing back a victim
    pub fn new_page(&mut self, file: &FileHandle) -> Result<(PageId, &mut Page)> {
        let (page_no, frame_id) = self.new_frame(file)?;
        Ok((page_no, &mut self.pool[frame_id.0]))
    }

    /// [`fetch_page`](Self::fetch_page) returning a guard that unpins on drop.
    pub fn fetch_page_pinned(
        &mut self,
        file: &FileHandle,
        page_no: PageId,
    ) -> Result<PinnedPage<'_>> {
        let frame_id = self.fetch_frame(file, page_no)?;
        Ok(PinnedPage::new(self, Arc::clone(file), page_no, frame_id))
    }

    /// [`new_page`](Self::new_page) returning a guard that unpins on drop.
    pub fn new_page_pinned(&mut self, file: &FileHandle) -> Result<PinnedPage<'_>> {
        let (page_no, frame_id) = self.new_frame(file)?;
        Ok(PinnedPage::new(self, Arc::clone(file), page_no, frame_id))
    }

    // ========================================================================
    // Public API: Unpin
    // ========================================================================

    /// Release one pin on page `page_no` of `file`.
    ///
    /// If `dirty` is true the frame is marked dirty; the mark stays until the
    /// page is written back. Unpinning a page that is not cached is a no-op.
    ///
    /// # Errors
    /// - `Error::PageNotPinned` if the page is cached with a pin count of 0
    pub fn unpin_page(&mut self, file: &FileHandle, page_no: PageId, dirty: bool) -> Result<()> {
        let Some(frame_id) = self.hash_table.lookup(FileId::of(file), page_no) else {
            return Ok(());
        };

        let desc = &mut self.descs[frame_id.0];
        if !desc.is_pinned() {
            return Err(Error::PageNotPinned {
                file: file.lock().filename().to_string(),
                page_no: page_no.0,
                frame: frame_id.0,
            });
        }

        desc.unpin();
        if dirty {
            desc.mark_dirty();
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Flush and dispose
    // ========================================================================

    /// Write back and evict every cached page of `file`.
    ///
    /// All of the file's frames are checked before anything is written, so a
    /// pin or descriptor failure leaves the pool untouched. Dirty pages are
    /// all written back before any frame is evicted: if a write fails, pages
    /// written so far stay cached (now clean) and nothing is evicted. On
    /// success no frame refers to `file` any more.
    ///
    /// # Errors
    /// - `Error::PagePinned` if any page of the file is pinned
    /// - `Error::BadBuffer` if a frame names the file but is not valid
    /// - Errors from the file when writing back dirty pages
    pub fn flush_file(&mut self, file: &FileHandle) -> Result<()> {
        let file_id = FileId::of(file);

        for desc in self.descs.iter().filter(|d| d.belongs_to(file_id)) {
            if !desc.is_valid() {
                return Err(Error::BadBuffer {
                    frame: desc.frame_no().0,
                    dirty: desc.is_dirty(),
                    valid: desc.is_valid(),
                    refbit: desc.refbit(),
                });
            }
            if desc.is_pinned() {
                return Err(Error::PagePinned {
                    file: file.lock().filename().to_string(),
                    page_no: desc.page_no().0,
                    frame: desc.frame_no().0,
                });
            }
        }

        for i in 0..self.descs.len() {
            if self.descs[i].belongs_to(file_id) && self.descs[i].is_dirty() {
                self.write_frame(file, FrameId::new(i))?;
            }
        }

        let mut evicted = 0;
        for i in 0..self.descs.len() {
            if !self.descs[i].belongs_to(file_id) {
                continue;
            }
            self.hash_table.remove(file_id, self.descs[i].page_no());
            self.descs[i].clear();
            evicted += 1;
        }

        debug!(file = %file_id, evicted, "flushed file");
        Ok(())
    }

    /// Drop page `page_no` from the pool (if cached) and delete it from `file`.
    ///
    /// The page is deleted from the file whether or not it was cached. No pin
    /// check is made; disposing a pinned page discards the pins.
    ///
    /// # Errors
    /// - Errors from the file when deleting the page
    pub fn dispose_page(&mut self, file: &FileHandle, page_no: PageId) -> Result<()> {
        if let Some(frame_id) = self.hash_table.remove(FileId::of(file), page_no) {
            let desc = &mut self.descs[frame_id.0];
            if desc.is_pinned() {
                warn!(
                    page = %page_no,
                    frame = %frame_id,
                    pin_count = desc.pin_count(),
                    "disposing a pinned page"
                );
            }
            desc.clear();
        }

        file.lock().delete_page(page_no)?;
        debug!(page = %page_no, "disposed page");
        Ok(())
    }

    /// Write back every dirty page without evicting anything.
    ///
    /// Pinned pages are written too; only their current contents persist.
    ///
    /// # Errors
    /// - `Error::DetachedFile` if a dirty page's file has been dropped
    /// - Errors from the file when writing
    pub fn flush_all_pages(&mut self) -> Result<()> {
        for i in 0..self.descs.len() {
            let desc = &self.descs[i];
            if desc.is_valid() && desc.is_dirty() {
                self.write_back(FrameId::new(i))?;
            }
        }
        Ok(())
    }

    /// Flush every dirty page and release the pool.
    ///
    /// Every dirty frame is attempted; the first failure is returned and the
    /// rest are logged. Pages that could not be written are dropped, so the
    /// flush on drop does not retry them. Dropping the manager without
    /// calling this flushes as well, but can only log failures.
    pub fn shutdown(mut self) -> Result<()> {
        let mut first_err = None;
        for i in 0..self.descs.len() {
            let desc = &self.descs[i];
            if !(desc.is_valid() && desc.is_dirty()) {
                continue;
            }
            if let Err(e) = self.write_back(FrameId::new(i)) {
                warn!(frame = i, error = %e, "failed to write back dirty page on shutdown");
                self.descs[i].clear_dirty();
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Public API: Diagnostics
    // ========================================================================

    /// Log one line per frame and the number of valid frames.
    ///
    /// Returns the number of valid frames.
    pub fn print_self(&self) -> usize {
        for desc in &self.descs {
            info!("FrameNo:{} {}", desc.frame_no().0, desc);
        }

        let valid = self.valid_frame_count();
        info!("Total Number of Valid Frames:{}", valid);
        valid
    }

    /// The descriptor table, indexed by frame number.
    pub fn descriptors(&self) -> &[FrameDesc] {
        &self.descs
    }

    /// Descriptor of one frame.
    pub fn descriptor(&self, frame_id: FrameId) -> Option<&FrameDesc> {
        self.descs.get(frame_id.0)
    }

    /// Frame holding page `page_no` of `file`, if cached.
    pub fn frame_of(&self, file: &FileHandle, page_no: PageId) -> Option<FrameId> {
        self.hash_table.lookup(FileId::of(file), page_no)
    }

    /// Number of frames holding a page.
    pub fn valid_frame_count(&self) -> usize {
        self.descs.iter().filter(|d| d.is_valid()).count()
    }

    /// Number of entries in the hash table.
    pub fn cached_page_count(&self) -> usize {
        self.hash_table.len()
    }

    /// Get the pool size.
    pub fn num_frames(&self) -> usize {
        self.descs.len()
    }

    /// Current position of the clock hand.
    pub fn clock_hand(&self) -> FrameId {
        self.clock.hand()
    }

    /// Copy of the buffer pool statistics.
    pub fn stats(&self) -> BufferPoolStats {
        self.stats
    }

    // ========================================================================
    // Internal: Called by PinnedPage
    // ========================================================================

    pub(crate) fn frame_page(&self, frame_id: FrameId) -> &Page {
        &self.pool[frame_id.0]
    }

    pub(crate) fn frame_page_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pool[frame_id.0]
    }

    // ========================================================================
    // Internal: Core fetch logic
    // ========================================================================

    fn fetch_frame(&mut self, file: &FileHandle, page_no: PageId) -> Result<FrameId> {
        if let Some(frame_id) = self.hash_table.lookup(FileId::of(file), page_no) {
            self.descs[frame_id.0].touch();
            self.stats.cache_hits += 1;
            trace!(page = %page_no, frame = %frame_id, "buffer pool hit");
            return Ok(frame_id);
        }

        self.stats.cache_misses += 1;
        debug!(page = %page_no, "buffer pool miss, reading from file");

        let frame_id = self.alloc_buf()?;
        let page = file.lock().read_page(page_no)?;
        self.stats.pages_read += 1;

        self.install(file, page_no, frame_id, page)?;
        Ok(frame_id)
    }

    fn new_frame(&mut self, file: &FileHandle) -> Result<(PageId, FrameId)> {
        let frame_id = self.alloc_buf()?;
        let page = file.lock().allocate_page()?;
        let page_no = page.page_number();

        self.install(file, page_no, frame_id, page)?;
        debug!(page = %page_no, frame = %frame_id, "allocated new page");
        Ok((page_no, frame_id))
    }

    /// Map `(file, page_no)` to the free frame `frame_id` and load `page` there.
    fn install(
        &mut self,
        file: &FileHandle,
        page_no: PageId,
        frame_id: FrameId,
        page: Page,
    ) -> Result<()> {
        self.hash_table.insert(FileId::of(file), page_no, frame_id)?;
        self.pool[frame_id.0] = page;
        self.descs[frame_id.0].set(file, page_no);
        Ok(())
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    /// Produce an invalid frame, evicting a victim if necessary.
    ///
    /// The only place pages leave the pool involuntarily.
    fn alloc_buf(&mut self) -> Result<FrameId> {
        let frame_id = self
            .clock
            .find_victim(&mut self.descs)
            .ok_or(Error::BufferExceeded)?;

        let desc = &self.descs[frame_id.0];
        if !desc.is_valid() {
            return Ok(frame_id);
        }

        let page_no = desc.page_no();
        let file_id = desc.file_id();

        if desc.is_dirty() {
            if let Err(e) = self.write_back(frame_id) {
                if !matches!(e, Error::DetachedFile { .. }) {
                    return Err(e);
                }
                warn!(page = %page_no, frame = %frame_id, "discarding dirty page of a closed file");
            }
        }

        if let Some(file_id) = file_id {
            self.hash_table.remove(file_id, page_no);
        }
        self.descs[frame_id.0].clear();
        self.stats.evictions += 1;

        trace!(page = %page_no, frame = %frame_id, "evicted page");
        Ok(frame_id)
    }

    /// Write the page in `frame_id` back to its file and clear the dirty bit.
    fn write_back(&mut self, frame_id: FrameId) -> Result<()> {
        let desc = &self.descs[frame_id.0];
        let file = desc.file().ok_or(Error::DetachedFile {
            page_no: desc.page_no().0,
            frame: frame_id.0,
        })?;

        self.write_frame(&file, frame_id)
    }

    /// Write the page in `frame_id` to `file` as the page its descriptor
    /// names, then clear the dirty bit.
    fn write_frame(&mut self, file: &FileHandle, frame_id: FrameId) -> Result<()> {
        let page_no = self.descs[frame_id.0].page_no();
        let page = &mut self.pool[frame_id.0];
        page.stamp_page_number(page_no);
        file.lock().write_page(page)?;

        self.descs[frame_id.0].clear_dirty();
        self.stats.pages_written += 1;
        Ok(())
    }
}

impl Drop for BufferPoolManager {
    fn drop(&mut self) {
        for i in 0..self.descs.len() {
            let desc = &self.descs[i];
            if !(desc.is_valid() && desc.is_dirty()) {
                continue;
            }
            if let Err(e) = self.write_back(FrameId::new(i)) {
                warn!(frame = i, error = %e, "failed to write back dirty page on drop");
            }
        }
    }
}
