//! Error types for ClockDB.

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in ClockDB.
///
/// Buffer pool failures are distinct variants so callers can branch on the
/// kind. A cache miss is never an error: lookups return `Option`.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a page file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every frame in the pool is pinned; nothing can be evicted.
    #[error("Buffer pool exceeded: all frames are pinned")]
    BufferExceeded,

    /// Unpin was called on a cached page whose pin count is already 0.
    #[error("Page {page_no} of file {file} in frame {frame} is not pinned")]
    PageNotPinned {
        file: String,
        page_no: u32,
        frame: usize,
    },

    /// A page of the file being flushed is still pinned.
    #[error("Page {page_no} of file {file} in frame {frame} is pinned")]
    PagePinned {
        file: String,
        page_no: u32,
        frame: usize,
    },

    /// A frame descriptor is in a state that should be impossible.
    #[error("Bad buffer: frame {frame} (dirty: {dirty}, valid: {valid}, refbit: {refbit})")]
    BadBuffer {
        frame: usize,
        dirty: bool,
        valid: bool,
        refbit: bool,
    },

    /// The buffer hash table already maps this page to a frame.
    #[error("Page {page_no} is already mapped to frame {frame}")]
    HashAlreadyPresent { page_no: u32, frame: usize },

    /// Requested page does not exist (never allocated, or deleted).
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Page read back from disk failed checksum verification.
    #[error("Page {0} is corrupt")]
    CorruptPage(u32),

    /// A dirty frame must be written back but its file has been closed.
    #[error("Page {page_no} in frame {frame} belongs to a file that is no longer open")]
    DetachedFile { page_no: u32, frame: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(42);
        assert_eq!(format!("{}", err), "Page 42 not found");

        let err = Error::BufferExceeded;
        assert_eq!(
            format!("{}", err),
            "Buffer pool exceeded: all frames are pinned"
        );

        let err = Error::PagePinned {
            file: "t.db".to_string(),
            page_no: 3,
            frame: 1,
        };
        assert_eq!(format!("{}", err), "Page 3 of file t.db in frame 1 is pinned");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
