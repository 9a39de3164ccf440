// src/fs/mod.rs

//! Small filesystem helpers used around command execution.

use std::fs;
use std::io;
use std::path::Path;

/// Create `path` (and any missing parents) with owner-only permissions.
///
/// Directories that already exist keep their permissions.
pub fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path)
}

/// Write `contents` to a new file at `path` readable only by the owner.
pub fn write_private_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let mut file = opts.open(path)?;
    io::Write::write_all(&mut file, contents)
}

/// Copy the content of `src` into a newly created (or truncated) `dst`,
/// returning the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut source = fs::File::open(src)?;
    let mut dest = fs::File::create(dst)?;
    io::copy(&mut source, &mut dest)
}
