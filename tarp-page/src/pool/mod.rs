//! Scratch buffers backing page serialization.
//!
//! Pools are constructed explicitly and shared as `Arc<dyn PageBufferPool>`
//! between the components writing pages.

mod buffer;
mod file;
mod memory;

pub use self::buffer::PageBuffer;
pub use self::file::{FileBufferPool, FileBufferPoolOptions};
pub use self::memory::{MemoryBufferPool, MemoryBufferPoolOptions};

/// A pool of read-write page buffers.
///
/// Every acquired buffer must be released exactly once and never used
/// after being released. Both operations are safe to call concurrently.
pub trait PageBufferPool: Send + Sync {
    /// Returns an empty buffer.
    ///
    /// Acquiring never fails, a pool unable to produce buffers hands out
    /// buffers failing every read and write with the error it ran into.
    fn acquire(&self) -> PageBuffer;

    /// Returns the buffer to the pool.
    fn release(&self, buffer: PageBuffer);
}
