//! Builder for creating and preallocating temp download files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::writer::StorageWriter;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Builder for a new temp download file. Call `preallocate` (partitioned path)
/// then `build` to get a `StorageWriter`.
pub struct StorageWriterBuilder {
    file: File,
    temp_path: PathBuf,
}

impl StorageWriterBuilder {
    /// Create a new temp file at `temp_path` (e.g. `destination.part`).
    /// Truncates if the path already exists.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(StorageWriterBuilder {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Preallocate `size` bytes so range workers can write at any offset.
    /// On Unix tries `posix_fallocate` for real block allocation; falls back to
    /// `set_len` (sparse) on failure or non-Unix.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        #[cfg(unix)]
        {
            if let Ok(len) = libc::off_t::try_from(size) {
                let fd = self.file.as_raw_fd();
                let r = unsafe { libc::posix_fallocate(fd, 0, len) };
                if r == 0 {
                    return Ok(());
                }
                tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
            }
        }
        self.file.set_len(size)
    }

    /// Finish building and return the writer.
    pub fn build(self) -> StorageWriter {
        StorageWriter::from_file_and_path(self.file, self.temp_path)
    }
}
