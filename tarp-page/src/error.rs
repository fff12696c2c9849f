use std::io;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
/// An error that can occur while reading, writing or moving pages.
///
/// The error is cheap to clone so that objects which captured a failure
/// once can hand the same error back on every later call.
pub enum PageError {
    #[error("IO Error: {0}")]
    /// An IO error reported by an encoder, buffer or page sink.
    Io(Arc<io::Error>),
    #[error("Page unavailable for column {column:?}: {message}")]
    /// The page could not be produced at all, this is the error
    /// carried by an [ErrorPage](crate::ErrorPage).
    Unavailable {
        column: Option<usize>,
        message: String,
    },
    #[error("Base page ended early: expected {expected} present values, got {produced}")]
    /// The wrapped page produced fewer present values than the
    /// level array declares.
    MissingValues { expected: usize, produced: usize },
    #[error("page channel closed")]
    /// The other half of a page channel has been dropped.
    Closed,
}

impl From<io::Error> for PageError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed after copying {copied} values: {source}")]
/// The failure of a [copy_pages](crate::copy_pages) call.
///
/// The number of values already handed to the sink is kept with the error,
/// progress is never dropped silently.
pub struct CopyError {
    /// The number of values written before the failure.
    pub copied: u64,
    /// The error reported by the reader or the writer.
    pub source: PageError,
}
