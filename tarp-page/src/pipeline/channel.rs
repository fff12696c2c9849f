use tracing::trace;

use super::{PageReader, PageWriter};
use crate::error::PageError;
use crate::page::PageHandle;

/// Creates a bounded channel streaming pages between threads.
///
/// The writer blocks once `capacity` pages are in flight. Dropping the
/// writer ends the stream seen by the reader, dropping the reader makes
/// every later write fail with [PageError::Closed].
pub fn page_channel(capacity: usize) -> (ChannelPageWriter, ChannelPageReader) {
    let (tx, rx) = flume::bounded(capacity);
    (ChannelPageWriter { tx }, ChannelPageReader { rx })
}

#[derive(Clone)]
/// The sending half of a [page_channel].
pub struct ChannelPageWriter {
    tx: flume::Sender<PageHandle>,
}

impl PageWriter for ChannelPageWriter {
    fn write_page(&mut self, page: PageHandle) -> Result<u64, PageError> {
        let num_values = page.num_values() as u64;
        self.tx.send(page).map_err(|_| PageError::Closed)?;
        trace!(num_values, "Sent page");
        Ok(num_values)
    }
}

/// The receiving half of a [page_channel].
pub struct ChannelPageReader {
    rx: flume::Receiver<PageHandle>,
}

impl PageReader for ChannelPageReader {
    fn read_page(&mut self) -> Result<Option<PageHandle>, PageError> {
        match self.rx.recv() {
            Ok(page) => Ok(Some(page)),
            Err(flume::RecvError::Disconnected) => Ok(None),
        }
    }
}
