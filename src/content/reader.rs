//! Line-oriented file reading. Files at or above [`MMAP_THRESHOLD`] are
//! memory mapped; smaller ones go through a buffered stream. Both paths
//! sniff the leading bytes for NUL to skip binaries.

use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use memmap2::Mmap;

pub const MMAP_THRESHOLD: u64 = 64 * 1024;
pub const BINARY_SNIFF_LEN: usize = 8192;

/// Read a file as UTF-8 text. `Ok(None)` means empty or binary; both are
/// skipped silently by content-oriented modes.
pub fn read_text(path: &Path) -> io::Result<Option<String>> {
    let len = fs::metadata(path)?.len();
    if len == 0 {
        return Ok(None);
    }
    if len >= MMAP_THRESHOLD {
        read_mapped(path)
    } else {
        read_buffered(path)
    }
}

fn read_mapped(path: &Path) -> io::Result<Option<String>> {
    let file = File::open(path)?;
    let map = unsafe { Mmap::map(&file) }?;
    if is_binary(&map) {
        return Ok(None);
    }
    match std::str::from_utf8(&map) {
        Ok(text) => Ok(Some(text.to_owned())),
        Err(_) => Err(invalid_utf8()),
    }
}

fn read_buffered(path: &Path) -> io::Result<Option<String>> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);

    let mut sniff = [0u8; BINARY_SNIFF_LEN];
    let sniffed = reader.read(&mut sniff)?;
    if is_binary(&sniff[..sniffed]) {
        return Ok(None);
    }

    let mut bytes = Vec::from(&sniff[..sniffed]);
    reader.read_to_end(&mut bytes)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(_) => Err(invalid_utf8()),
    }
}

pub fn is_binary(data: &[u8]) -> bool {
    let len = data.len().min(BINARY_SNIFF_LEN);
    data[..len].contains(&0)
}

fn invalid_utf8() -> io::Error {
    io::Error::new(ErrorKind::InvalidData, "not valid UTF-8")
}
