use std::io;
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::{debug, trace, warn};

use super::buffer::{BufferInner, PageBuffer};
use super::PageBufferPool;

const DEFAULT_PATTERN: &str = "page-*.buf";

#[derive(Debug, Clone, Builder)]
/// Where and how a [FileBufferPool] creates its temporary files.
pub struct FileBufferPoolOptions {
    #[builder(into)]
    /// The directory temporary files are created in.
    pub tempdir: PathBuf,
    #[builder(into, default = DEFAULT_PATTERN.to_string())]
    /// The file name pattern of temporary files.
    ///
    /// The last `*` is replaced with a random string, the random string is
    /// appended if the pattern contains no `*`.
    pub pattern: String,
}

#[derive(Debug)]
enum PoolState {
    Ready {
        directory: PathBuf,
        prefix: String,
        suffix: String,
    },
    Failed(io::Error),
}

#[derive(Debug)]
/// A pool creating a fresh temporary file for every acquired buffer.
///
/// Releasing a buffer closes and deletes its file.
pub struct FileBufferPool {
    state: PoolState,
}

impl FileBufferPool {
    /// Creates a new pool writing to the configured directory.
    ///
    /// An invalid directory does not fail construction, the pool instead
    /// hands out buffers failing with the error it ran into.
    pub fn new(options: FileBufferPoolOptions) -> Self {
        let (prefix, suffix) = split_pattern(&options.pattern);

        let state = match resolve_directory(&options.tempdir) {
            Ok(directory) => {
                debug!(directory = %directory.display(), "Created file buffer pool");
                PoolState::Ready {
                    directory,
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    directory = %options.tempdir.display(),
                    "Unable to use directory for page buffers"
                );
                PoolState::Failed(e)
            },
        };

        Self { state }
    }

    /// Returns the error the pool is stuck with, if any.
    pub fn error(&self) -> Option<&io::Error> {
        match &self.state {
            PoolState::Failed(e) => Some(e),
            PoolState::Ready { .. } => None,
        }
    }
}

impl PageBufferPool for FileBufferPool {
    fn acquire(&self) -> PageBuffer {
        let (directory, prefix, suffix) = match &self.state {
            PoolState::Ready {
                directory,
                prefix,
                suffix,
            } => (directory, prefix, suffix),
            PoolState::Failed(e) => return PageBuffer::error(e),
        };

        let result = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(directory);

        match result {
            Ok(file) => {
                debug!(path = %file.path().display(), "Created page buffer file");
                PageBuffer::file(file)
            },
            Err(e) => {
                warn!(error = %e, "Unable to create page buffer file");
                PageBuffer::error(&e)
            },
        }
    }

    fn release(&self, buffer: PageBuffer) {
        let BufferInner::File { file, .. } = buffer.inner else {
            return;
        };

        let path = file.path().to_path_buf();
        match file.close() {
            Ok(()) => trace!(path = %path.display(), "Removed page buffer file"),
            Err(e) => warn!(error = %e, path = %path.display(), "Unable to remove page buffer file"),
        }
    }
}

fn resolve_directory(path: &Path) -> io::Result<PathBuf> {
    let directory = std::path::absolute(path)?;
    if !directory.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", directory.display()),
        ));
    }
    Ok(directory)
}

/// Splits the pattern around its last `*`.
fn split_pattern(pattern: &str) -> (&str, &str) {
    match pattern.rfind('*') {
        Some(i) => (&pattern[..i], &pattern[i + 1..]),
        None => (pattern, ""),
    }
}
