//! PageFile - a disk-backed [`File`] of fixed-size pages.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::common::config::{MAX_FILE_SIZE_BYTES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::file::File;
use crate::storage::page::{Page, PageHeader, PageType};

/// Stores pages of one file sequentially on disk.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Deleted pages stay in place with a [`PageType::Free`] header and are
/// reused, lowest number first, by later allocations. The set of free pages
/// is rebuilt from those headers when the file is reopened.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct PageFile {
    file: fs::File,
    name: String,
    /// Number of page slots in the file, live or free.
    page_count: u32,
    free_pages: BTreeSet<PageId>,
}

impl PageFile {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        Ok(Self {
            file,
            name: path.as_ref().display().to_string(),
            page_count: 0,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing page file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;

        let page_count = Self::slots_for_len(file.metadata()?.len())?;

        let mut free_pages = BTreeSet::new();
        let mut header = [0u8; PageHeader::SIZE];
        for n in 0..page_count {
            file.seek(SeekFrom::Start(Self::offset(PageId::new(n))))?;
            file.read_exact(&mut header)?;
            if PageHeader::from_bytes(&header).page_type == PageType::Free {
                free_pages.insert(PageId::new(n));
            }
        }

        Ok(Self {
            file,
            name: path.as_ref().display().to_string(),
            page_count,
            free_pages,
        })
    }

    /// Number of whole page slots in a file of `len` bytes.
    fn slots_for_len(len: u64) -> Result<u32> {
        if len > MAX_FILE_SIZE_BYTES {
            return Err(std::io::Error::other(format!(
                "file of {len} bytes exceeds the {MAX_FILE_SIZE_BYTES} byte limit"
            ))
            .into());
        }
        Ok((len / PAGE_SIZE as u64) as u32)
    }

    /// Open an existing page file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of page slots in the file, including freed ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of allocated, not deleted, pages.
    #[inline]
    pub fn live_page_count(&self) -> u32 {
        self.page_count - self.free_pages.len() as u32
    }

    /// Get the total size of the file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    #[inline]
    fn offset(page_no: PageId) -> u64 {
        (page_no.0 as u64) * (PAGE_SIZE as u64)
    }

    fn check_live(&self, page_no: PageId) -> Result<()> {
        if page_no.0 >= self.page_count || self.free_pages.contains(&page_no) {
            return Err(Error::PageNotFound(page_no.0));
        }
        Ok(())
    }

    /// Stamp the checksum on a copy of `page` and write it at `page_no`.
    fn write_at(&mut self, page_no: PageId, page: &Page) -> Result<()> {
        let mut stamped = page.clone();
        stamped.update_checksum();

        self.file.seek(SeekFrom::Start(Self::offset(page_no)))?;
        self.file.write_all(stamped.as_slice())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl File for PageFile {
    fn allocate_page(&mut self) -> Result<Page> {
        let (page_no, reused) = match self.free_pages.pop_first() {
            Some(page_no) => (page_no, true),
            None => {
                if self.page_count == u32::MAX {
                    return Err(std::io::Error::other("page file is full").into());
                }
                self.page_count += 1;
                (PageId::new(self.page_count - 1), false)
            }
        };

        let page = Page::with_number(page_no);
        if let Err(e) = self.write_at(page_no, &page) {
            if reused {
                self.free_pages.insert(page_no);
            } else {
                self.page_count -= 1;
            }
            return Err(e);
        }

        debug!(file = %self.name, page = %page_no, "allocated page");
        Ok(page)
    }

    fn read_page(&mut self, page_no: PageId) -> Result<Page> {
        self.check_live(page_no)?;

        self.file.seek(SeekFrom::Start(Self::offset(page_no)))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        if !page.verify_checksum() || page.page_number() != page_no {
            return Err(Error::CorruptPage(page_no.0));
        }
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_no = page.page_number();
        self.check_live(page_no)?;
        self.write_at(page_no, page)
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<()> {
        self.check_live(page_no)?;

        let mut tombstone = Page::new();
        tombstone.set_header(&PageHeader::new(PageType::Free, page_no));
        self.write_at(page_no, &tombstone)?;
        self.free_pages.insert(page_no);

        debug!(file = %self.name, page = %page_no, "deleted page");
        Ok(())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}
