//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use clockdb::common::{Error, PageId, Result};
use clockdb::storage::{shared, File, FileHandle};
use clockdb::Page;
use parking_lot::Mutex;

/// Every call a [`MemFile`] received, in order, by page number.
#[derive(Debug, Default)]
pub struct IoLog {
    pub allocs: Vec<PageId>,
    pub reads: Vec<PageId>,
    pub writes: Vec<PageId>,
    pub failed_writes: Vec<PageId>,
    pub deletes: Vec<PageId>,
}

/// In-memory `File` that records its I/O.
pub struct MemFile {
    name: String,
    pages: BTreeMap<PageId, Page>,
    next_page: u32,
    log: Arc<Mutex<IoLog>>,
}

impl MemFile {
    pub fn new(name: &str) -> (Self, Arc<Mutex<IoLog>>) {
        let log = Arc::new(Mutex::new(IoLog::default()));
        let file = Self {
            name: name.to_string(),
            pages: BTreeMap::new(),
            next_page: 0,
            log: Arc::clone(&log),
        };
        (file, log)
    }
}

impl File for MemFile {
    fn allocate_page(&mut self) -> Result<Page> {
        let page_no = PageId::new(self.next_page);
        self.next_page += 1;

        let page = Page::with_number(page_no);
        self.pages.insert(page_no, page.clone());
        self.log.lock().allocs.push(page_no);
        Ok(page)
    }

    fn read_page(&mut self, page_no: PageId) -> Result<Page> {
        let page = self
            .pages
            .get(&page_no)
            .cloned()
            .ok_or(Error::PageNotFound(page_no.0))?;
        self.log.lock().reads.push(page_no);
        Ok(page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_no = page.page_number();
        let Some(slot) = self.pages.get_mut(&page_no) else {
            self.log.lock().failed_writes.push(page_no);
            return Err(Error::PageNotFound(page_no.0));
        };
        *slot = page.clone();
        self.log.lock().writes.push(page_no);
        Ok(())
    }

    fn delete_page(&mut self, page_no: PageId) -> Result<()> {
        self.pages
            .remove(&page_no)
            .ok_or(Error::PageNotFound(page_no.0))?;
        self.log.lock().deletes.push(page_no);
        Ok(())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}

/// A shared in-memory file and its I/O log.
pub fn mem_file(name: &str) -> (FileHandle, Arc<Mutex<IoLog>>) {
    let (file, log) = MemFile::new(name);
    (shared(file), log)
}

/// Allocate `n` pages directly in the file, bypassing the pool.
pub fn preallocate(file: &FileHandle, n: u32) -> Vec<PageId> {
    (0..n)
        .map(|_| file.lock().allocate_page().unwrap().page_number())
        .collect()
}
