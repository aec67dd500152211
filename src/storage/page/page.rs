//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a 4KB byte array that serves as the unit of I/O between a
//! file and the buffer pool. The first [`PageHeader::SIZE`] bytes hold the
//! header; the remainder is payload owned by higher layers.

use std::fmt;

use crate::common::config::PAGE_SIZE;
use crate::common::PageId;

use super::page_header::{PageHeader, PageType};

/// A page of data (4KB, 4KB-aligned).
///
/// Pages are plain values: cloning copies all 4KB. Files hand out copies
/// from `read_page`/`allocate_page`, and the buffer pool copies them into
/// its frames.
///
/// # Example
/// ```
/// use clockdb::{Page, PageId};
///
/// let mut page = Page::with_number(PageId::new(7));
/// page.data_mut()[0] = 0xFF;
/// assert_eq!(page.page_number(), PageId::new(7));
/// assert_eq!(page.data()[0], 0xFF);
/// ```
#[derive(Clone)]
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Size of the payload area after the header.
    pub const DATA_SIZE: usize = PAGE_SIZE - PageHeader::SIZE;

    /// Create a new zeroed page with no number.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a zeroed data page that carries `page_number` in its header.
    pub fn with_number(page_number: PageId) -> Self {
        let mut page = Self::new();
        page.set_header(&PageHeader::new(PageType::Data, page_number));
        page
    }

    /// The number this page was assigned by its file.
    #[inline]
    pub fn page_number(&self) -> PageId {
        self.header().page_number
    }

    /// Get immutable slice of the whole page, header included.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of the whole page, header included.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Payload bytes after the header.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[PageHeader::SIZE..]
    }

    /// Mutable payload bytes after the header.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[PageHeader::SIZE..]
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Read the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::from_bytes(&self.data)
    }

    /// Write a page header.
    pub fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data);
    }

    /// Restore the page number (and a live page type) in the header.
    ///
    /// The buffer pool calls this before writing a frame back, so the write
    /// always lands on the page the frame was loaded from.
    pub(crate) fn stamp_page_number(&mut self, page_number: PageId) {
        let mut header = self.header();
        if header.page_type == PageType::Invalid {
            header.page_type = PageType::Data;
        }
        header.page_number = page_number;
        self.set_header(&header);
    }

    /// Compute and store checksum in the header.
    ///
    /// Call this after all modifications to the page are complete.
    pub fn update_checksum(&mut self) {
        let checksum = PageHeader::compute_checksum(&self.data);
        self.data[PageHeader::OFFSET_CHECKSUM..PageHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the page checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("Page")
            .field("page_type", &header.page_type)
            .field("page_number", &header.page_number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_page_with_number() {
        let page = Page::with_number(PageId::new(12));
        assert_eq!(page.page_number(), PageId::new(12));
        assert_eq!(page.header().page_type, PageType::Data);
        assert!(page.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_payload_does_not_touch_header() {
        let mut page = Page::with_number(PageId::new(3));
        page.data_mut().fill(0xAA);

        assert_eq!(page.page_number(), PageId::new(3));
        assert_eq!(page.data().len(), Page::DATA_SIZE);
        assert_eq!(page.as_slice()[PageHeader::SIZE], 0xAA);
    }

    #[test]
    fn test_page_reset() {
        let mut page = Page::with_number(PageId::new(1));
        page.data_mut()[100] = 0xAB;

        page.reset();

        assert_eq!(page.data()[100], 0);
        assert_eq!(page.header().page_type, PageType::Invalid);
    }

    #[test]
    fn test_stamp_page_number_after_reset() {
        let mut page = Page::with_number(PageId::new(4));
        page.reset();
        page.data_mut()[0] = 0xBB;

        page.stamp_page_number(PageId::new(4));

        assert_eq!(page.page_number(), PageId::new(4));
        assert_eq!(page.header().page_type, PageType::Data);
        assert_eq!(page.data()[0], 0xBB);
    }

    #[test]
    fn test_stamp_keeps_free_type() {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::Free, PageId::new(1)));

        page.stamp_page_number(PageId::new(2));

        assert_eq!(page.header().page_type, PageType::Free);
        assert_eq!(page.page_number(), PageId::new(2));
    }

    #[test]
    fn test_clone_is_a_copy() {
        let mut page = Page::with_number(PageId::new(5));
        page.data_mut()[0] = 0xAB;

        let mut cloned = page.clone();
        cloned.data_mut()[0] = 0xCD;

        assert_eq!(page.data()[0], 0xAB);
        assert_eq!(cloned.page_number(), PageId::new(5));
    }

    #[test]
    fn test_checksum_roundtrip() {
        let mut page = Page::with_number(PageId::new(9));
        page.data_mut()[10] = 0x42;
        page.update_checksum();
        assert!(page.verify_checksum());

        page.data_mut()[10] = 0x43;
        assert!(!page.verify_checksum());
    }
}
