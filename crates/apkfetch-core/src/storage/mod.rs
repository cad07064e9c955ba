//! Disk I/O and file lifecycle for a single download.
//!
//! Downloads land in a sibling `.part` file that is preallocated for the
//! partitioned path (fallocate on Unix when available, else set_len), written
//! with offset-scoped writes, and atomically renamed onto the destination once
//! the transfer has succeeded.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `app.xapk` → `app.xapk.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
