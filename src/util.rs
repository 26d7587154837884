use std::io::{self, Read, Seek, SeekFrom};

/// Random-access byte ranges over a backing file or buffer.
///
/// Every read is absolute; implementations keep no notion of a "current"
/// position that callers could depend on.
pub trait ByteSource {
    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Fails with `UnexpectedEof` when the range runs past the end.
    fn read_at(&mut self, offset: u64, len: u64) -> io::Result<Vec<u8>>;

    /// Read everything from `offset` to the end of the source.
    fn read_tail(&mut self, offset: u64) -> io::Result<Vec<u8>> {
        let len = self.len().checked_sub(offset).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("offset {offset} is past end of source ({})", self.len()),
            )
        })?;
        self.read_at(offset, len)
    }
}

/// [`ByteSource`] over anything seekable (`File`, `Cursor<Vec<u8>>`, ...).
pub struct SeekSource<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> SeekSource<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&mut self, offset: u64, len: u64) -> io::Result<Vec<u8>> {
        if offset.checked_add(len).is_none_or(|end| end > self.len) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "range {offset}+{len} is past end of source ({})",
                    self.len
                ),
            ));
        }
        read_slice(&mut self.inner, offset, len)
    }
}

pub fn read_slice<R: Read + Seek>(r: &mut R, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;
    let mut v = vec![0u8; len as usize];
    r.read_exact(&mut v)?;
    Ok(v)
}
