//! The file abstraction the buffer pool reads pages through.
//!
//! The buffer pool never opens files itself. Callers open a [`File`]
//! implementation, wrap it in a [`FileHandle`] with [`shared`], and pass
//! the handle to every buffer pool call. The pool keys cached pages by the
//! handle's identity, so clones of one handle name the same file.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// A paged file: the persistence layer behind the buffer pool.
pub trait File: Send {
    /// Allocate a new, empty page and return a copy of it.
    ///
    /// The returned page carries its assigned number in its header.
    fn allocate_page(&mut self) -> Result<Page>;

    /// Read a full copy of page `page_no`.
    fn read_page(&mut self, page_no: PageId) -> Result<Page>;

    /// Persist `page` at the number stored in its header.
    fn write_page(&mut self, page: &Page) -> Result<()>;

    /// Delete page `page_no`; its number may be handed out again later.
    fn delete_page(&mut self, page_no: PageId) -> Result<()>;

    /// Display name used in diagnostics and error messages.
    fn filename(&self) -> &str;
}

/// Shared handle to an open file.
///
/// The buffer pool only keeps `Weak` references to handles it has seen; the
/// caller's clones keep the file open.
pub type FileHandle = Arc<Mutex<dyn File>>;

/// Wrap an open file in a [`FileHandle`].
pub fn shared<F: File + 'static>(file: F) -> FileHandle {
    Arc::new(Mutex::new(file))
}
