//! Offset writer for temp download files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::FileExt;

/// Writer for a temp download file.
///
/// Each range worker gets its own handle through `reopen`, so no two workers
/// share a file cursor. `write_at` never moves the cursor on Unix (pwrite).
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
}

impl StorageWriter {
    pub(crate) fn from_file_and_path(file: File, temp_path: PathBuf) -> Self {
        Self { file, temp_path }
    }

    /// Open an independent read+write handle on the same temp file (no truncation).
    pub fn reopen(&self) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .open(&self.temp_path)?;
        Ok(StorageWriter {
            file,
            temp_path: self.temp_path.clone(),
        })
    }

    /// Write all of `data` at `offset`.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.write_all_at(data, offset)
    }

    /// Seek + write. Sound because every worker owns its handle.
    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> io::Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = &self.file;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data)
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically rename the temp file to the final path. Consumes the writer and closes the file.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let StorageWriter { file, temp_path } = self;
        drop(file);
        std::fs::rename(&temp_path, final_path)
    }

    /// Close and delete the temp file after a failed transfer. Best effort.
    pub fn discard(self) {
        let StorageWriter { file, temp_path } = self;
        drop(file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), "failed to remove temp file: {}", e);
        }
    }
}
