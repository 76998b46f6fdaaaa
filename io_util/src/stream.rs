use std::borrow::Cow;
use std::fs::File;
use std::io::{
    Read,
    Result as IOResult,
    Seek,
    SeekFrom,
    Write,
};

/// A random-access readable byte stream.
///
/// `Read::read` is the partial read (it may return fewer bytes than
/// requested at the end of the stream), `Read::read_exact` is the
/// fill-or-fail read and reports a short read as
/// `ErrorKind::UnexpectedEof`. `Seek::stream_position` is the current
/// absolute address.
pub trait ReadStream: Read + Seek {
    /// Whether the cursor is at or past the end of the stream.
    fn eof(&mut self) -> IOResult<bool> {
        let at = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if at < end {
            self.seek(SeekFrom::Start(at))?;
        }
        Ok(at >= end)
    }

    /// The backing buffer, if the stream is an in-memory stream.
    fn as_memory(&self) -> Option<&[u8]> {
        None
    }

    /// The backing file, if the stream is a file stream.
    fn as_file(&self) -> Option<&File> {
        None
    }
}

impl<S: ReadStream + ?Sized> ReadStream for Box<S> {
    fn eof(&mut self) -> IOResult<bool> {
        (**self).eof()
    }

    fn as_memory(&self) -> Option<&[u8]> {
        (**self).as_memory()
    }

    fn as_file(&self) -> Option<&File> {
        (**self).as_file()
    }
}

/// A random-access writable byte stream.
///
/// `Write::write` is the partial write, `Write::write_all` the
/// fill-or-fail variant.
pub trait WriteStream: Write + Seek {}

impl<S: WriteStream + ?Sized> WriteStream for Box<S> {}

/// Readable stream over a borrowed or owned byte buffer.
pub struct MemoryReadStream<'a> {
    data: Cow<'a, [u8]>,
    at: u64,
}

impl<'a> MemoryReadStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            at: 0,
        }
    }

    pub fn new_owned(data: Vec<u8>) -> MemoryReadStream<'static> {
        MemoryReadStream {
            data: Cow::Owned(data),
            at: 0,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.data
    }
}

impl Read for MemoryReadStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        // the cursor may sit past the end after a seek
        let start = (self.at as usize).min(self.data.len());
        let len = (self.data.len() - start).min(buf.len());
        buf[..len].copy_from_slice(&self.data[start..start + len]);
        self.at += len as u64;
        Ok(len)
    }
}

impl Seek for MemoryReadStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> IOResult<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(offset) => self.at as i64 + offset,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
        };
        if target < 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ));
        }
        self.at = target as u64;
        Ok(self.at)
    }
}

impl ReadStream for MemoryReadStream<'_> {
    fn eof(&mut self) -> IOResult<bool> {
        Ok(self.at >= self.data.len() as u64)
    }

    fn as_memory(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}

/// Readable stream over an owned file handle.
///
/// The handle is owned exclusively and closed when the stream is dropped.
pub struct FileReadStream {
    file: File,
}

impl FileReadStream {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P) -> IOResult<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl Read for FileReadStream {
    fn read(&mut self, buf: &mut [u8]) -> IOResult<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileReadStream {
    fn seek(&mut self, pos: SeekFrom) -> IOResult<u64> {
        self.file.seek(pos)
    }
}

impl ReadStream for FileReadStream {
    fn as_file(&self) -> Option<&File> {
        Some(&self.file)
    }
}

/// Growable in-memory write stream with total seek semantics.
///
/// Writing or seeking past the current end zero-fills the gap.
pub struct MemoryWriteStream {
    data: Vec<u8>,
    at: u64,
}

impl MemoryWriteStream {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            at: 0,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Default for MemoryWriteStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemoryWriteStream {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        let at = self.at as usize;
        let end = at + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0u8);
        }
        self.data[at..end].copy_from_slice(buf);
        self.at = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> IOResult<()> {
        Ok(())
    }
}

impl Seek for MemoryWriteStream {
    fn seek(&mut self, pos: SeekFrom) -> IOResult<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(offset) => self.at as i64 + offset,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
        };
        if target < 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of stream",
            ));
        }
        self.at = target as u64;
        Ok(self.at)
    }
}

impl WriteStream for MemoryWriteStream {}

/// Writable stream over an owned file handle.
pub struct FileWriteStream {
    file: File,
}

impl FileWriteStream {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn create<P: AsRef<std::path::Path>>(path: P) -> IOResult<Self> {
        Ok(Self {
            file: File::create(path)?,
        })
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl Write for FileWriteStream {
    fn write(&mut self, buf: &[u8]) -> IOResult<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> IOResult<()> {
        self.file.flush()
    }
}

impl Seek for FileWriteStream {
    fn seek(&mut self, pos: SeekFrom) -> IOResult<u64> {
        self.file.seek(pos)
    }
}

impl WriteStream for FileWriteStream {}
