use std::fs;
use std::io;
use std::path::Path;

/// Stores a compressed blob verbatim.
pub fn write_blob(path: impl AsRef<Path>, blob: &[u8]) -> io::Result<()> {
    fs::write(path, blob)
}

pub fn read_blob(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    fs::read(path)
}
