mod mmap;
mod read_util;
mod stream;

pub use self::mmap::ReadStreamMemoryMap;
pub use self::read_util::{
    RawDataRead,
    ReadEntireSeekable,
};
pub use self::stream::{
    FileReadStream,
    FileWriteStream,
    MemoryReadStream,
    MemoryWriteStream,
    ReadStream,
    WriteStream,
};
