use bon::Builder;
use bytes::BytesMut;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::buffer::{BufferInner, PageBuffer};
use super::PageBufferPool;

#[derive(Debug, Clone, Builder)]
/// Limits applied to the free list of a [MemoryBufferPool].
pub struct MemoryBufferPoolOptions {
    #[builder(default = 64)]
    /// The maximum number of released buffers kept around for reuse.
    pub max_idle_buffers: usize,
    #[builder(default = 4 << 20)]
    /// Buffers which grew past this capacity are dropped on release
    /// instead of being recycled.
    pub max_retained_capacity: usize,
}

impl Default for MemoryBufferPoolOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Default)]
/// A pool of in-memory buffers recycling released buffers.
pub struct MemoryBufferPool {
    options: MemoryBufferPoolOptions,
    free: Mutex<Vec<BytesMut>>,
}

impl MemoryBufferPool {
    pub fn new(options: MemoryBufferPoolOptions) -> Self {
        Self {
            options,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of buffers waiting to be reused.
    pub fn num_idle_buffers(&self) -> usize {
        self.free.lock().len()
    }
}

impl PageBufferPool for MemoryBufferPool {
    fn acquire(&self) -> PageBuffer {
        let recycled = self.free.lock().pop();
        match recycled {
            Some(buffer) => {
                trace!(capacity = buffer.capacity(), "Reusing page buffer");
                PageBuffer::memory(buffer)
            },
            None => {
                debug!("Creating new page buffer");
                PageBuffer::memory(BytesMut::new())
            },
        }
    }

    fn release(&self, buffer: PageBuffer) {
        let BufferInner::Memory(mut buffer) = buffer.inner else {
            return;
        };

        if buffer.capacity() > self.options.max_retained_capacity {
            trace!(capacity = buffer.capacity(), "Dropping oversized page buffer");
            return;
        }

        buffer.clear();
        let mut free = self.free.lock();
        if free.len() < self.options.max_idle_buffers {
            free.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn test_released_buffers_are_reused_empty() {
        let pool = MemoryBufferPool::default();

        let mut buffer = pool.acquire();
        buffer.write_all(b"leftover").unwrap();
        pool.release(buffer);
        assert_eq!(pool.num_idle_buffers(), 1);

        let mut buffer = pool.acquire();
        assert_eq!(pool.num_idle_buffers(), 0);
        assert!(buffer.is_empty());

        let mut data = Vec::new();
        buffer.read_to_end(&mut data).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_idle_buffer_limit() {
        let options = MemoryBufferPoolOptions::builder().max_idle_buffers(2).build();
        let pool = MemoryBufferPool::new(options);

        let buffers: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        for buffer in buffers {
            pool.release(buffer);
        }
        assert_eq!(pool.num_idle_buffers(), 2);
    }

    #[test]
    fn test_oversized_buffers_are_dropped() {
        let options = MemoryBufferPoolOptions::builder()
            .max_retained_capacity(16)
            .build();
        let pool = MemoryBufferPool::new(options);

        let mut buffer = pool.acquire();
        buffer.write_all(&[0; 64]).unwrap();
        pool.release(buffer);
        assert_eq!(pool.num_idle_buffers(), 0);

        let mut buffer = pool.acquire();
        buffer.write_all(&[0; 8]).unwrap();
        pool.release(buffer);
        assert_eq!(pool.num_idle_buffers(), 1);
    }

    #[test]
    fn test_default_options() {
        let options = MemoryBufferPoolOptions::default();
        assert_eq!(options.max_idle_buffers, 64);
        assert_eq!(options.max_retained_capacity, 4 * 1024 * 1024);
    }
}
