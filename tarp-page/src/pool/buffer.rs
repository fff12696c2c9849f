use std::fmt::{Debug, Formatter};
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use tempfile::NamedTempFile;

/// A read-write scratch buffer handed out by a
/// [PageBufferPool](crate::PageBufferPool).
///
/// Buffers are FIFOs: reads return the bytes in the order they were
/// written, independently of how much has been written since.
pub struct PageBuffer {
    pub(crate) inner: BufferInner,
}

pub(crate) enum BufferInner {
    Memory(BytesMut),
    File {
        file: NamedTempFile,
        read_offset: u64,
        write_offset: u64,
    },
    Error {
        kind: io::ErrorKind,
        message: Arc<str>,
    },
}

impl PageBuffer {
    pub(crate) fn memory(buffer: BytesMut) -> Self {
        Self {
            inner: BufferInner::Memory(buffer),
        }
    }

    pub(crate) fn file(file: NamedTempFile) -> Self {
        Self {
            inner: BufferInner::File {
                file,
                read_offset: 0,
                write_offset: 0,
            },
        }
    }

    /// Creates a buffer failing every operation with the given error.
    pub(crate) fn error(error: &io::Error) -> Self {
        Self {
            inner: BufferInner::Error {
                kind: error.kind(),
                message: Arc::from(error.to_string()),
            },
        }
    }

    /// Returns the number of bytes written but not yet read.
    pub fn len(&self) -> u64 {
        match &self.inner {
            BufferInner::Memory(buffer) => buffer.remaining() as u64,
            BufferInner::File {
                read_offset,
                write_offset,
                ..
            } => write_offset - read_offset,
            BufferInner::Error { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the buffer was handed out by a pool in an
    /// error state.
    pub fn is_error(&self) -> bool {
        matches!(self.inner, BufferInner::Error { .. })
    }
}

impl Debug for PageBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            BufferInner::Memory(buffer) => f
                .debug_struct("PageBuffer::Memory")
                .field("len", &buffer.len())
                .field("capacity", &buffer.capacity())
                .finish(),
            BufferInner::File {
                file,
                read_offset,
                write_offset,
            } => f
                .debug_struct("PageBuffer::File")
                .field("path", &file.path())
                .field("read_offset", read_offset)
                .field("write_offset", write_offset)
                .finish(),
            BufferInner::Error { kind, message } => f
                .debug_struct("PageBuffer::Error")
                .field("kind", kind)
                .field("message", message)
                .finish(),
        }
    }
}

impl Read for PageBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            BufferInner::Memory(buffer) => {
                let n = buf.len().min(buffer.remaining());
                buffer.copy_to_slice(&mut buf[..n]);
                Ok(n)
            },
            BufferInner::File {
                file,
                read_offset,
                ..
            } => {
                let file = file.as_file_mut();
                file.seek(SeekFrom::Start(*read_offset))?;
                let n = file.read(buf)?;
                *read_offset += n as u64;
                Ok(n)
            },
            BufferInner::Error { kind, message } => Err(io::Error::new(*kind, message.to_string())),
        }
    }
}

impl Write for PageBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            BufferInner::Memory(buffer) => {
                buffer.put_slice(buf);
                Ok(buf.len())
            },
            BufferInner::File {
                file,
                write_offset,
                ..
            } => {
                let file = file.as_file_mut();
                file.seek(SeekFrom::Start(*write_offset))?;
                let n = file.write(buf)?;
                *write_offset += n as u64;
                Ok(n)
            },
            BufferInner::Error { kind, message } => Err(io::Error::new(*kind, message.to_string())),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            BufferInner::Memory(_) => Ok(()),
            BufferInner::File { file, .. } => file.as_file_mut().flush(),
            BufferInner::Error { kind, message } => Err(io::Error::new(*kind, message.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_buffer_reads_in_write_order() {
        let mut buffer = PageBuffer::memory(BytesMut::new());
        assert!(buffer.is_empty());

        buffer.write_all(b"abc").unwrap();
        buffer.write_all(b"def").unwrap();
        assert_eq!(buffer.len(), 6);

        let mut out = [0; 4];
        buffer.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"abcd");
        assert_eq!(buffer.len(), 2);

        let mut rest = Vec::new();
        buffer.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"ef");
        assert_eq!(buffer.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_file_buffer_tracks_offsets() {
        let file = NamedTempFile::new().unwrap();
        let mut buffer = PageBuffer::file(file);

        buffer.write_all(b"0123456789").unwrap();
        let mut out = [0; 5];
        buffer.read_exact(&mut out).unwrap();
        assert_eq!(&out, b"01234");

        buffer.write_all(b"ab").unwrap();
        assert_eq!(buffer.len(), 7);

        let mut rest = Vec::new();
        buffer.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"56789ab");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_error_buffer_fails_every_operation() {
        let error = io::Error::new(io::ErrorKind::NotFound, "no such directory");
        let mut buffer = PageBuffer::error(&error);
        assert!(buffer.is_error());

        for _ in 0..2 {
            let err = buffer.write(b"data").expect_err("Write should fail");
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
            assert_eq!(err.to_string(), "no such directory");

            let err = buffer.read(&mut [0; 4]).expect_err("Read should fail");
            assert_eq!(err.kind(), io::ErrorKind::NotFound);

            let err = buffer.flush().expect_err("Flush should fail");
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
        }
    }
}
