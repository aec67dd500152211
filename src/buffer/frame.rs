//! Frame descriptors - per-frame bookkeeping for the buffer pool.
//!
//! A [`FrameDesc`] records what the matching pool slot holds:
//! - Which file and page is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Reference bit for the clock sweep

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::common::{FileId, FrameId, PageId};
use crate::storage::{File, FileHandle};

/// Non-owning link from a frame back to the file its page came from.
struct FileLink {
    id: FileId,
    handle: Weak<Mutex<dyn File>>,
}

/// Descriptor for one frame of the buffer pool.
///
/// # Invariants
/// - `!valid` implies `pin_cnt == 0`, `!dirty`, and no file link.
/// - `pin_cnt > 0` implies `valid`.
pub struct FrameDesc {
    frame_no: FrameId,
    file: Option<FileLink>,
    page_no: PageId,
    pin_cnt: u32,
    dirty: bool,
    valid: bool,
    refbit: bool,
}

impl FrameDesc {
    /// Create an invalid descriptor for frame `frame_no`.
    pub fn new(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            file: None,
            page_no: PageId::INVALID,
            pin_cnt: 0,
            dirty: false,
            valid: false,
            refbit: false,
        }
    }

    /// Bind this frame to `(file, page_no)`: valid, pinned once, clean, referenced.
    pub fn set(&mut self, file: &FileHandle, page_no: PageId) {
        self.file = Some(FileLink {
            id: FileId::of(file),
            handle: Arc::downgrade(file),
        });
        self.page_no = page_no;
        self.pin_cnt = 1;
        self.dirty = false;
        self.valid = true;
        self.refbit = true;
    }

    /// Reset to invalid, unpinned, clean and unreferenced.
    pub fn clear(&mut self) {
        self.file = None;
        self.page_no = PageId::INVALID;
        self.pin_cnt = 0;
        self.dirty = false;
        self.valid = false;
        self.refbit = false;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// Identity of the file this frame's page belongs to.
    #[inline]
    pub fn file_id(&self) -> Option<FileId> {
        self.file.as_ref().map(|link| link.id)
    }

    /// The owning file, if it is still open.
    pub fn file(&self) -> Option<FileHandle> {
        self.file.as_ref().and_then(|link| link.handle.upgrade())
    }

    /// Whether this frame holds a page of the file identified by `file_id`.
    #[inline]
    pub fn belongs_to(&self, file_id: FileId) -> bool {
        self.file_id() == Some(file_id)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_cnt
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_cnt > 0
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn refbit(&self) -> bool {
        self.refbit
    }

    // ========================================================================
    // Mutations used by the manager
    // ========================================================================

    /// Record an access: set the reference bit and take one more pin.
    #[inline]
    pub(crate) fn touch(&mut self) {
        self.refbit = true;
        self.pin_cnt += 1;
    }

    /// Drop one pin. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub(crate) fn unpin(&mut self) -> u32 {
        assert!(self.pin_cnt > 0, "pin count underflow");
        self.pin_cnt -= 1;
        self.pin_cnt
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub(crate) fn clear_refbit(&mut self) {
        self.refbit = false;
    }

    /// Break the valid invariant while keeping the file link.
    #[cfg(test)]
    pub(crate) fn invalidate_for_test(&mut self) {
        self.valid = false;
    }
}

impl fmt::Display for FrameDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file() {
            Some(file) => write!(f, "file:{} ", file.lock().filename())?,
            None => write!(f, "file:NULL ")?,
        }
        write!(
            f,
            "pageNo:{} valid:{} pinCnt:{} dirty:{} refbit:{}",
            self.page_no, self.valid, self.pin_cnt, self.dirty, self.refbit
        )
    }
}

impl fmt::Debug for FrameDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDesc")
            .field("frame_no", &self.frame_no)
            .field("file", &self.file_id())
            .field("page_no", &self.page_no)
            .field("pin_cnt", &self.pin_cnt)
            .field("dirty", &self.dirty)
            .field("valid", &self.valid)
            .field("refbit", &self.refbit)
            .finish()
    }
}
