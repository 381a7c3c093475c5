//! # `RawFile`
//!
//! The pool is generic over anything that can be read, written and
//! resized at an absolute offset. This keeps the eviction and paging
//! logic independent of `std::fs` so it can run against an in-memory
//! fake in tests without a tempdir per case.

use std::io;

pub trait RawFile {
    /// Read up to `buf.len()` bytes starting at `offset`. Short reads
    /// past the current end of file are padded with zeroes by the
    /// caller, not by this trait; implementations should behave like
    /// `pread(2)` and return only the bytes actually on disk.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;

    fn file_size(&self) -> io::Result<u64>;

    fn set_len(&self, len: u64) -> io::Result<()>;
}

impl RawFile for std::fs::File {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        imp::read_at(self, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        imp::write_at(self, buf, offset)
    }

    fn file_size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        std::fs::File::set_len(self, len)
    }
}

#[cfg(unix)]
mod imp {
    use std::fs::File;
    use std::io;
    use std::os::unix::fs::FileExt;

    pub fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.read_at(buf, offset)
    }

    pub fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
        file.write_at(buf, offset)
    }
}

#[cfg(windows)]
mod imp {
    use std::fs::File;
    use std::io;
    use std::os::windows::fs::FileExt;

    pub fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        file.seek_read(buf, offset)
    }

    pub fn write_at(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
        file.seek_write(buf, offset)
    }
}

/// In-memory [`RawFile`] fake used by this crate's own tests and
/// available to embedders' test suites as well.
#[derive(Debug, Default)]
pub struct MemoryFile {
    data: std::cell::RefCell<Vec<u8>>,
}

impl MemoryFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self { data: std::cell::RefCell::new(bytes) }
    }

    pub fn snapshot(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

impl RawFile for MemoryFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.data.borrow();
        let offset = offset as usize;
        if offset >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - offset);
        buf[..n].copy_from_slice(&data[offset..offset + n]);
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let mut data = self.data.borrow_mut();
        let offset = offset as usize;
        let end = offset + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn file_size(&self) -> io::Result<u64> {
        Ok(self.data.borrow().len() as u64)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        self.data.borrow_mut().resize(len as usize, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_file_reads_back_what_it_wrote() {
        let file = MemoryFile::new();
        file.write_at(b"hello", 10).unwrap();
        let mut buf = [0u8; 5];
        let n = file.read_at(&mut buf, 10).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn memory_file_read_past_eof_returns_zero() {
        let file = MemoryFile::new();
        let mut buf = [0u8; 4];
        assert_eq!(file.read_at(&mut buf, 0).unwrap(), 0);
    }

    #[test]
    fn memory_file_set_len_truncates() {
        let file = MemoryFile::with_contents(vec![1, 2, 3, 4, 5]);
        file.set_len(2).unwrap();
        assert_eq!(file.file_size().unwrap(), 2);
    }
}
