//! Helpers that play the part of an external writer of a watched file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append `data` to `path` (creating it) and flush.
pub fn append(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

/// Truncate `path` to zero length.
pub fn truncate(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(0)
}

/// Create an empty file at `path`.
pub fn touch(path: &Path) -> io::Result<()> {
    File::create(path).map(|_| ())
}
