//! Moving pages between producers and consumers.
//!
//! The copy loop only relies on the two single-method [PageReader] and
//! [PageWriter] contracts, anything able to hand out or accept pages one at
//! a time can take part in it.

mod channel;

use tracing::{debug, instrument, trace};

pub use self::channel::{page_channel, ChannelPageReader, ChannelPageWriter};
use crate::error::{CopyError, PageError};
use crate::page::PageHandle;

/// A source of pages.
pub trait PageReader {
    /// Reads the next page, `None` once the stream has ended.
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError>;
}

/// A sink of pages.
pub trait PageWriter {
    /// Writes the page returning the number of values written.
    fn write_page(&mut self, page: PageHandle) -> Result<u64, PageError>;
}

/// A page reader that can be rewound to the start of its stream.
pub trait ReusablePageReader: PageReader {
    fn reset(&mut self);
}

impl<R: PageReader + ?Sized> PageReader for Box<R> {
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError> {
        (**self).read_page()
    }
}

impl<W: PageWriter + ?Sized> PageWriter for Box<W> {
    fn write_page(&mut self, page: PageHandle) -> Result<u64, PageError> {
        (**self).write_page(page)
    }
}

#[instrument(skip_all)]
/// Copies every page of `src` into `dst`, returning the number of values
/// written.
///
/// The first error from either side aborts the copy. The values written up
/// to that point are reported in the returned [CopyError].
pub fn copy_pages<W, R>(dst: &mut W, src: &mut R) -> Result<u64, CopyError>
where
    W: PageWriter + ?Sized,
    R: PageReader + ?Sized,
{
    let mut copied = 0;
    let mut num_pages = 0;

    loop {
        let page = match src.read_page() {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(source) => return Err(CopyError { copied, source }),
        };

        let written = dst
            .write_page(page)
            .map_err(|source| CopyError { copied, source })?;
        copied += written;
        num_pages += 1;
        trace!(written, copied, "Copied page");
    }

    debug!(num_pages, copied, "Page copy complete");
    Ok(copied)
}

#[derive(Debug, Default, Copy, Clone)]
/// A page reader which never produces a page.
pub struct EmptyPageReader;

impl PageReader for EmptyPageReader {
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError> {
        Ok(None)
    }
}

impl ReusablePageReader for EmptyPageReader {
    fn reset(&mut self) {}
}

#[derive(Clone)]
/// A page reader producing a single page.
pub struct SinglePageReader {
    page: PageHandle,
    used: bool,
}

/// Creates a reader producing `page` once.
pub fn one_page(page: PageHandle) -> SinglePageReader {
    SinglePageReader { page, used: false }
}

impl PageReader for SinglePageReader {
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError> {
        if self.used {
            return Ok(None);
        }
        self.used = true;
        Ok(Some(self.page.clone()))
    }
}

impl ReusablePageReader for SinglePageReader {
    fn reset(&mut self) {
        self.used = false;
    }
}

/// A page reader draining a sequence of readers one after the other.
///
/// Resetting rewinds every reader of the sequence.
pub struct MultiPageReader {
    readers: Vec<Box<dyn ReusablePageReader + Send>>,
    index: usize,
}

impl MultiPageReader {
    pub fn new(readers: Vec<Box<dyn ReusablePageReader + Send>>) -> Self {
        Self { readers, index: 0 }
    }

    /// Appends a reader at the end of the sequence.
    pub fn push(&mut self, reader: impl ReusablePageReader + Send + 'static) {
        self.readers.push(Box::new(reader));
    }
}

impl PageReader for MultiPageReader {
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError> {
        while let Some(reader) = self.readers.get_mut(self.index) {
            if let Some(page) = reader.read_page()? {
                return Ok(Some(page));
            }
            self.index += 1;
        }
        Ok(None)
    }
}

impl ReusablePageReader for MultiPageReader {
    fn reset(&mut self) {
        for reader in self.readers.iter_mut() {
            reader.reset();
        }
        self.index = 0;
    }
}
