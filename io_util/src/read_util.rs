use std::io::{
    Read,
    Result as IOResult,
    Seek,
    SeekFrom,
};

pub trait RawDataRead {
    /// Reads exactly `len` bytes, failing on a short read.
    fn read_data_exact(&mut self, len: usize) -> IOResult<Box<[u8]>>;
    /// Reads up to `len` bytes, returning however many were available.
    fn read_data(&mut self, len: usize) -> IOResult<Box<[u8]>>;
}

impl<T: Read + ?Sized> RawDataRead for T {
    fn read_data_exact(&mut self, len: usize) -> IOResult<Box<[u8]>> {
        let mut buffer = vec![0u8; len];
        self.read_exact(&mut buffer)?;
        Ok(buffer.into_boxed_slice())
    }

    fn read_data(&mut self, len: usize) -> IOResult<Box<[u8]>> {
        let mut buffer = vec![0u8; len];
        let mut read_offset = 0;
        loop {
            let bytes_read = self.read(&mut buffer[read_offset..])?;
            read_offset += bytes_read;
            if bytes_read == 0 || read_offset == buffer.len() {
                break;
            }
        }
        buffer.truncate(read_offset);
        Ok(buffer.into_boxed_slice())
    }
}

pub trait ReadEntireSeekable {
    fn read_seekable_to_end(&mut self) -> IOResult<Box<[u8]>>;
}

// The standard library read_to_end does a lot of small reads because it
// can't rely on Seek.
impl<T: Read + Seek + ?Sized> ReadEntireSeekable for T {
    fn read_seekable_to_end(&mut self) -> IOResult<Box<[u8]>> {
        let len = self.seek(SeekFrom::End(0))? as usize;
        self.seek(SeekFrom::Start(0))?;
        self.read_data_exact(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_data_short() {
        let data = [1u8, 2, 3];
        let mut cursor = &data[..];
        let read = cursor.read_data(8).unwrap();
        assert_eq!(&*read, &[1, 2, 3]);
    }

    #[test]
    fn test_read_data_exact_short_fails() {
        let data = [1u8, 2, 3];
        let mut cursor = &data[..];
        assert!(cursor.read_data_exact(8).is_err());
    }

    #[test]
    fn test_read_seekable_to_end() {
        let mut stream = crate::MemoryReadStream::new(&[5u8, 6, 7, 8]);
        stream.seek(SeekFrom::Start(2)).unwrap();
        let all = stream.read_seekable_to_end().unwrap();
        assert_eq!(&*all, &[5, 6, 7, 8]);
    }
}
