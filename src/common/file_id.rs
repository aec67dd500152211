//! File identity type.

use std::fmt;
use std::sync::Arc;

/// Identifies an open file by the address of its shared handle.
///
/// Two handles compare equal only if they are clones of the same `Arc`.
/// The address stays reserved while any `Arc` or `Weak` to the allocation
/// exists, so an id held next to a `Weak` is never reused by another file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

impl FileId {
    /// The identity of the allocation behind `handle`.
    #[inline]
    pub fn of<T: ?Sized>(handle: &Arc<T>) -> Self {
        FileId(Arc::as_ptr(handle) as *const () as usize)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File({:#x})", self.0)
    }
}
