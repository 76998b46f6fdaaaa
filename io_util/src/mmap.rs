use std::io::{
    Seek,
    SeekFrom,
};

use log::warn;

use crate::read_util::RawDataRead;
use crate::stream::ReadStream;

enum Backing {
    /// Read-only file mapping.
    Mapped(memmap2::Mmap),
    /// The stream could neither hand out a buffer nor be mapped, so its
    /// contents were copied.
    Owned(Box<[u8]>),
    /// The stream is an in-memory stream; data comes straight from it.
    Memory,
}

/// Maps the complete contents of a `ReadStream` into memory.
///
/// A memory stream hands out its buffer directly, a file stream is mapped
/// read-only, anything else is read into an owned buffer. The map owns the
/// stream until `release` gives it back.
pub struct ReadStreamMemoryMap<'a> {
    backing: Backing,
    size: u64,
    map_size: u64,
    stream: Box<dyn ReadStream + 'a>,
}

impl<'a> ReadStreamMemoryMap<'a> {
    pub fn new(
        stream: Box<dyn ReadStream + 'a>,
    ) -> Result<Self, Box<dyn ReadStream + 'a>> {
        Self::with_options(stream, false)
    }

    /// Like `new`, but when `fail_on_copy` is set the stream is returned
    /// unmapped instead of being copied into an owned buffer.
    pub fn with_options(
        mut stream: Box<dyn ReadStream + 'a>,
        fail_on_copy: bool,
    ) -> Result<Self, Box<dyn ReadStream + 'a>> {
        if let Some(buffer) = stream.as_memory() {
            let size = buffer.len() as u64;
            return Ok(Self {
                backing: Backing::Memory,
                size,
                map_size: size,
                stream,
            });
        }

        if let Some(file) = stream.as_file() {
            // Mapping can fail for special files, fall through to copying
            // in that case.
            match unsafe { memmap2::Mmap::map(file) } {
                Ok(map) => {
                    let size = map.len() as u64;
                    let map_size = page_align(size);
                    return Ok(Self {
                        backing: Backing::Mapped(map),
                        size,
                        map_size,
                        stream,
                    });
                }
                Err(e) => {
                    warn!("mmap failed, falling back to copy: {}", e);
                }
            }
        }

        if fail_on_copy {
            return Err(stream);
        }

        let size = match stream.seek(SeekFrom::End(0)) {
            Ok(size) => size,
            Err(_) => return Err(stream),
        };
        if stream.seek(SeekFrom::Start(0)).is_err() {
            return Err(stream);
        }
        let owned = match stream.read_data_exact(size as usize) {
            Ok(data) => data,
            Err(_) => return Err(stream),
        };

        Ok(Self {
            backing: Backing::Owned(owned),
            size,
            map_size: size,
            stream,
        })
    }

    pub fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(map) => &map[..self.size as usize],
            Backing::Owned(owned) => owned,
            Backing::Memory => self.stream.as_memory().unwrap(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// The backing allocation size. For file mappings this is the logical
    /// size aligned up to the page size.
    pub fn map_size(&self) -> u64 {
        self.map_size
    }

    /// Drops the mapping and returns the stream.
    pub fn release(self) -> Box<dyn ReadStream + 'a> {
        self.stream
    }
}

fn page_align(size: u64) -> u64 {
    const PAGE_SIZE: u64 = 4096;
    if size == 0 {
        return 0;
    }
    let rest = size % PAGE_SIZE;
    if rest == 0 {
        size
    } else {
        size + (PAGE_SIZE - rest)
    }
}
