//! Positioned block I/O
//!
//! Both backing files are arrays of fixed-size blocks. Reads past the end
//! of a file (or into a hole) yield zeros, so unallocated blocks look empty.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read the block at `offset` into `buf`, zero-filling whatever lies past EOF
///
/// Returns the number of bytes actually read from the file.
pub fn read_block(file: &mut File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    file.seek(SeekFrom::Start(offset))?;

    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    buf[filled..].fill(0);

    Ok(filled)
}

/// Write `buf` as the block at `offset`
pub fn write_block(file: &mut File, offset: u64, buf: &[u8]) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)
}
