use std::io::{
    Read,
    Seek,
    SeekFrom,
    Write,
};

use byteorder::{
    LittleEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use io_util::{
    RawDataRead,
    ReadStream,
    WriteStream,
};
use log::{
    debug,
    warn,
};

use crate::format::Format;
use crate::image_provider::{
    ImageProvider,
    ProbeError,
    ProbeResult,
    ReadError,
    WriteError,
};
use crate::layout::{
    align_up,
    size_bytes,
};
use crate::Vec3UI;

// source: https://github.khronos.org/KTX-Specification/
const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const SUPERCOMPRESSION_NONE: u32 = 0;
const SUPERCOMPRESSION_ZLIB: u32 = 3;

struct Ktx2Header {
    vk_format: u32,
    type_size: u32,
    pixel_width: u32,
    pixel_height: u32,
    pixel_depth: u32,
    layer_count: u32,
    face_count: u32,
    level_count: u32,
    supercompression: u32,
    dfd_byte_offset: u32,
    dfd_byte_length: u32,
    kvd_byte_offset: u32,
    kvd_byte_length: u32,
    sgd_byte_offset: u64,
    sgd_byte_length: u64,
}

impl Ktx2Header {
    fn read<R: Read + ?Sized>(r: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            vk_format: r.read_u32::<LittleEndian>()?,
            type_size: r.read_u32::<LittleEndian>()?,
            pixel_width: r.read_u32::<LittleEndian>()?,
            pixel_height: r.read_u32::<LittleEndian>()?,
            pixel_depth: r.read_u32::<LittleEndian>()?,
            layer_count: r.read_u32::<LittleEndian>()?,
            face_count: r.read_u32::<LittleEndian>()?,
            level_count: r.read_u32::<LittleEndian>()?,
            supercompression: r.read_u32::<LittleEndian>()?,
            dfd_byte_offset: r.read_u32::<LittleEndian>()?,
            dfd_byte_length: r.read_u32::<LittleEndian>()?,
            kvd_byte_offset: r.read_u32::<LittleEndian>()?,
            kvd_byte_length: r.read_u32::<LittleEndian>()?,
            sgd_byte_offset: r.read_u64::<LittleEndian>()?,
            sgd_byte_length: r.read_u64::<LittleEndian>()?,
        })
    }

    fn write<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.vk_format)?;
        w.write_u32::<LittleEndian>(self.type_size)?;
        w.write_u32::<LittleEndian>(self.pixel_width)?;
        w.write_u32::<LittleEndian>(self.pixel_height)?;
        w.write_u32::<LittleEndian>(self.pixel_depth)?;
        w.write_u32::<LittleEndian>(self.layer_count)?;
        w.write_u32::<LittleEndian>(self.face_count)?;
        w.write_u32::<LittleEndian>(self.level_count)?;
        w.write_u32::<LittleEndian>(self.supercompression)?;
        w.write_u32::<LittleEndian>(self.dfd_byte_offset)?;
        w.write_u32::<LittleEndian>(self.dfd_byte_length)?;
        w.write_u32::<LittleEndian>(self.kvd_byte_offset)?;
        w.write_u32::<LittleEndian>(self.kvd_byte_length)?;
        w.write_u64::<LittleEndian>(self.sgd_byte_offset)?;
        w.write_u64::<LittleEndian>(self.sgd_byte_length)
    }
}

#[derive(Clone, Copy, Default)]
struct LevelInfo {
    /// Relative to the start of the stream.
    byte_offset: u64,
    byte_length: u64,
    uncompressed_byte_length: u64,
}

/// Random-access reader over a KTX2 container, with optional zlib
/// supercompression.
pub struct Ktx2Reader<'a> {
    format: Format,
    size: Vec3UI,
    faces: u32,
    // raw header value, 0 for non-array textures
    layer_count: u32,
    supercompression: u32,
    // position of the identifier, in case the container is embedded in a
    // larger stream
    initial_offset: u64,
    // in file order: entry 0 is the smallest mip, the last entry is the
    // base level
    levels: Vec<LevelInfo>,
    inflated: Vec<Option<Box<[u8]>>>,
    stream: Box<dyn ReadStream + 'a>,
    tmp: Vec<u8>,
}

impl Ktx2Reader<'_> {
    fn face_size(&self, mip: u32) -> u64 {
        size_bytes(self.size, mip, self.format)
    }

    fn level(&self, mip: u32) -> LevelInfo {
        self.levels[self.levels.len() - 1 - mip as usize]
    }

    fn ensure_inflated(&mut self, mip: u32) -> Result<(), ReadError> {
        if self.inflated[mip as usize].is_some() {
            return Ok(());
        }

        let level = self.level(mip);
        self.stream
            .seek(SeekFrom::Start(self.initial_offset + level.byte_offset))?;
        let compressed = self.stream.read_data_exact(level.byte_length as usize)?;

        let mut out = vec![0u8; level.uncompressed_byte_length as usize];
        let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
        decoder.read_exact(&mut out)?;

        self.inflated[mip as usize] = Some(out.into_boxed_slice());
        Ok(())
    }
}

impl ImageProvider for Ktx2Reader<'_> {
    fn size(&self) -> Vec3UI {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn mip_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    fn layers(&self) -> u32 {
        (self.faces * self.layer_count.max(1)).max(1)
    }

    fn cubemap(&self) -> bool {
        self.faces == 6
    }

    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError> {
        assert!(mip < self.mip_levels());
        assert!(layer < self.layers());

        if self.supercompression == SUPERCOMPRESSION_ZLIB {
            let byte_size = self.face_size(mip) as usize;
            self.ensure_inflated(mip)?;
            let buf = self.inflated[mip as usize].as_ref().unwrap();
            let start = byte_size * layer as usize;
            if start + byte_size > buf.len() {
                return Err(ReadError::UnexpectedEnd);
            }
            Ok(&buf[start..start + byte_size])
        } else {
            let byte_size = self.face_size(mip) as usize;
            let mut tmp = std::mem::take(&mut self.tmp);
            tmp.resize(byte_size, 0u8);
            let res = self.read_into(&mut tmp, mip, layer);
            self.tmp = tmp;
            res?;
            Ok(&self.tmp)
        }
    }

    fn read_into(
        &mut self,
        data: &mut [u8],
        mip: u32,
        layer: u32,
    ) -> Result<u64, ReadError> {
        assert!(mip < self.mip_levels());
        assert!(layer < self.layers());

        let byte_size = self.face_size(mip);
        assert!(data.len() as u64 >= byte_size);
        debug_assert_eq!(
            self.level(mip).uncompressed_byte_length,
            byte_size * self.layers() as u64
        );

        if self.supercompression == SUPERCOMPRESSION_ZLIB {
            self.ensure_inflated(mip)?;
            let buf = self.inflated[mip as usize].as_ref().unwrap();
            let start = (byte_size * layer as u64) as usize;
            if start + byte_size as usize > buf.len() {
                return Err(ReadError::UnexpectedEnd);
            }
            data[..byte_size as usize]
                .copy_from_slice(&buf[start..start + byte_size as usize]);
        } else {
            let level = self.level(mip);
            let address = self.initial_offset + level.byte_offset + byte_size * layer as u64;
            self.stream.seek(SeekFrom::Start(address))?;
            self.stream.read_exact(&mut data[..byte_size as usize])?;
        }

        Ok(byte_size)
    }
}

struct ParsedKtx2 {
    format: Format,
    size: Vec3UI,
    faces: u32,
    layer_count: u32,
    supercompression: u32,
    initial_offset: u64,
    levels: Vec<LevelInfo>,
}

fn parse_ktx2(stream: &mut dyn ReadStream) -> Result<ParsedKtx2, ReadError> {
    let initial_offset = stream.stream_position()?;

    let mut identifier = [0u8; 12];
    stream.read_exact(&mut identifier)?;
    if identifier != KTX2_IDENTIFIER {
        return Err(ReadError::InvalidType);
    }

    let header = Ktx2Header::read(stream)?;

    let format = match Format::from_vulkan(header.vk_format) {
        Some(format) => format,
        None => {
            debug!("KTX2 file with undefined vkFormat {}", header.vk_format);
            return Err(ReadError::UnsupportedFormat);
        }
    };

    if header.pixel_width == 0 {
        warn!("KTX2 pixelWidth == 0");
        return Err(ReadError::Empty);
    }

    if header.supercompression != SUPERCOMPRESSION_NONE
        && header.supercompression != SUPERCOMPRESSION_ZLIB
    {
        warn!(
            "KTX2 supercompression scheme {} unsupported",
            header.supercompression
        );
        return Err(ReadError::UnsupportedFormat);
    }

    if header.pixel_depth > 1 && (header.face_count > 1 || header.layer_count > 1) {
        warn!("KTX2 3D image with faces/layers unsupported");
        return Err(ReadError::CantRepresent);
    }

    let mut faces = header.face_count;
    if faces == 0 {
        warn!("KTX2 faceCount == 0, assuming 1");
        faces = 1;
    }

    // a levelCount of zero asks the loader to generate mips; the index
    // still carries one entry for the base level
    let level_count = header.level_count.max(1);
    let mut levels = Vec::with_capacity(level_count as usize);
    for _ in 0..level_count {
        levels.push(LevelInfo {
            byte_offset: stream.read_u64::<LittleEndian>()?,
            byte_length: stream.read_u64::<LittleEndian>()?,
            uncompressed_byte_length: stream.read_u64::<LittleEndian>()?,
        });
    }

    Ok(ParsedKtx2 {
        format,
        size: Vec3UI::new(
            header.pixel_width,
            header.pixel_height.max(1),
            header.pixel_depth.max(1),
        ),
        faces,
        layer_count: header.layer_count,
        supercompression: header.supercompression,
        initial_offset,
        levels,
    })
}

/// Probes the stream for a KTX2 container. On success the returned
/// provider owns the stream; on failure the stream is handed back.
pub fn load_ktx2<'a>(mut stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    match parse_ktx2(&mut stream) {
        Ok(parsed) => {
            let level_count = parsed.levels.len();
            Ok(Box::new(Ktx2Reader {
                format: parsed.format,
                size: parsed.size,
                faces: parsed.faces,
                layer_count: parsed.layer_count,
                supercompression: parsed.supercompression,
                initial_offset: parsed.initial_offset,
                levels: parsed.levels,
                inflated: vec![None; level_count],
                stream,
                tmp: Vec::new(),
            }))
        }
        Err(error) => Err(ProbeError { error, stream }),
    }
}

fn type_size_for(format: Format) -> u32 {
    if format.is_compressed() {
        1
    } else if format.is_packed() {
        format.element_size()
    } else {
        format.element_size() / format.component_count()
    }
}

/// Serializes the image as a KTX2 container, optionally compressing each
/// level with zlib.
///
/// Level data is written base mip first; the level index is emitted
/// smallest-mip-first (the base level is the last entry) and patched in
/// place once all level byte ranges are known.
pub fn write_ktx2(
    write: &mut dyn WriteStream,
    image: &mut dyn ImageProvider,
    zlib: bool,
) -> Result<(), WriteError> {
    let format = image.format();
    let size = image.size();
    let mips = image.mip_levels().max(1);
    let total_layers = image.layers().max(1);
    let mut faces = 1u32;
    let mut layers = total_layers;
    if image.cubemap() {
        assert!(layers % 6 == 0);
        faces = 6;
        layers /= 6;
    }

    let header = Ktx2Header {
        vk_format: format.vulkan(),
        type_size: type_size_for(format),
        pixel_width: size.x,
        pixel_height: if size.y > 1 { size.y } else { 0 },
        pixel_depth: if size.z > 1 { size.z } else { 0 },
        layer_count: if layers > 1 { layers } else { 0 },
        face_count: faces,
        level_count: mips,
        supercompression: if zlib {
            SUPERCOMPRESSION_ZLIB
        } else {
            SUPERCOMPRESSION_NONE
        },
        dfd_byte_offset: 0,
        dfd_byte_length: 0,
        kvd_byte_offset: 0,
        kvd_byte_length: 0,
        sgd_byte_offset: 0,
        sgd_byte_length: 0,
    };

    write.write_all(&KTX2_IDENTIFIER)?;
    header.write(write)?;

    // placeholder level index, patched after the data is emitted
    let index_pos = write.stream_position()?;
    let zero_entry = [0u8; 24];
    for _ in 0..mips {
        write.write_all(&zero_entry)?;
    }

    let alignment = 4u64.max(format.element_size() as u64);
    let zero = [0u8; 64];
    let mut levels = vec![LevelInfo::default(); mips as usize];

    for m in 0..mips {
        let face_size = size_bytes(size, m, format);

        let mut pos = write.stream_position()?;
        let aligned = align_up(pos, alignment);
        while pos < aligned {
            let chunk = ((aligned - pos) as usize).min(zero.len());
            write.write_all(&zero[..chunk])?;
            pos += chunk as u64;
        }

        let uncompressed = face_size * total_layers as u64;
        let data_begin = pos;

        if zlib {
            let mut encoder = ZlibEncoder::new(&mut *write, Compression::new(6));
            for l in 0..layers {
                for f in 0..faces {
                    let data = image
                        .read(m, l * faces + f)
                        .map_err(|_| WriteError::ReadFailed)?;
                    if data.len() as u64 != face_size {
                        return Err(WriteError::ReadFailed);
                    }
                    encoder.write_all(data)?;
                }
            }
            encoder.finish()?;
        } else {
            for l in 0..layers {
                for f in 0..faces {
                    let data = image
                        .read(m, l * faces + f)
                        .map_err(|_| WriteError::ReadFailed)?;
                    if data.len() as u64 != face_size {
                        return Err(WriteError::ReadFailed);
                    }
                    write.write_all(data)?;
                }
            }
        }

        let data_end = write.stream_position()?;
        levels[m as usize] = LevelInfo {
            byte_offset: data_begin,
            byte_length: data_end - data_begin,
            uncompressed_byte_length: uncompressed,
        };
    }

    // patch the index: entry p describes mip (levelCount - 1 - p)
    let end = write.stream_position()?;
    write.seek(SeekFrom::Start(index_pos))?;
    for p in 0..mips {
        let level = levels[(mips - 1 - p) as usize];
        write.write_u64::<LittleEndian>(level.byte_offset)?;
        write.write_u64::<LittleEndian>(level.byte_length)?;
        write.write_u64::<LittleEndian>(level.uncompressed_byte_length)?;
    }
    write.seek(SeekFrom::Start(end))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_provider::wrap_blocks;
    use io_util::{
        MemoryReadStream,
        MemoryWriteStream,
    };

    fn checker_provider(
        size: Vec3UI,
        mips: u32,
        layers: u32,
        cubemap: bool,
    ) -> crate::image_provider::MemImageProvider<'static> {
        let mut blocks = Vec::new();
        for m in 0..mips {
            for l in 0..layers {
                let byte_size = size_bytes(size, m, Format::R8G8B8A8Unorm) as usize;
                blocks.push(vec![(7 * m + 3 * l + 1) as u8; byte_size].into_boxed_slice());
            }
        }
        wrap_blocks(size, Format::R8G8B8A8Unorm, mips, layers, blocks, cubemap)
    }

    #[test]
    fn test_identifier_rejected() {
        let data = [0u8; 128];
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        let err = load_ktx2(stream).err().unwrap();
        assert_eq!(err.error, ReadError::InvalidType);
    }

    #[test]
    fn test_undefined_format_rejected() {
        let mut out = MemoryWriteStream::new();
        out.write_all(&KTX2_IDENTIFIER).unwrap();
        // a zeroed header has vkFormat == 0
        out.write_all(&[0u8; 68]).unwrap();
        let data = out.into_inner();
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        assert_eq!(
            load_ktx2(stream).err().unwrap().error,
            ReadError::UnsupportedFormat
        );
    }

    #[test]
    fn test_header_has_80_bytes_before_index() {
        let mut provider = checker_provider(Vec3UI::new(2, 2, 1), 1, 1, false);
        let mut out = MemoryWriteStream::new();
        write_ktx2(&mut out, &mut provider, false).unwrap();
        let bytes = out.into_inner();
        // identifier + fixed header
        assert_eq!(&bytes[..12], &KTX2_IDENTIFIER);
        let vk = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(vk, Format::R8G8B8A8Unorm.vulkan());
        // level index entry for the single level starts at byte 80
        let offset = u64::from_le_bytes(bytes[80..88].try_into().unwrap());
        assert_eq!(offset % 4, 0);
        assert!(offset >= 104);
    }

    #[test]
    fn test_roundtrip_mips_layers() {
        let size = Vec3UI::new(8, 4, 1);
        let mips = 3;
        let layers = 4;
        let mut provider = checker_provider(size, mips, layers, false);

        let mut out = MemoryWriteStream::new();
        write_ktx2(&mut out, &mut provider, false).unwrap();
        let bytes = out.into_inner();

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
        let mut read_back = load_ktx2(stream).unwrap();
        assert_eq!(read_back.size(), size);
        assert_eq!(read_back.format(), Format::R8G8B8A8Unorm);
        assert_eq!(read_back.mip_levels(), mips);
        assert_eq!(read_back.layers(), layers);

        for m in 0..mips {
            for l in 0..layers {
                assert_eq!(
                    read_back.read(m, l).unwrap(),
                    provider.read(m, l).unwrap(),
                    "mip {} layer {}",
                    m,
                    l
                );
            }
        }
    }

    #[test]
    fn test_level_index_is_smallest_first() {
        let size = Vec3UI::new(8, 8, 1);
        let mut provider = checker_provider(size, 4, 1, false);
        let mut out = MemoryWriteStream::new();
        write_ktx2(&mut out, &mut provider, false).unwrap();
        let bytes = out.into_inner();

        let mut offsets = Vec::new();
        for p in 0..4usize {
            let at = 80 + p * 24;
            offsets.push(u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap()));
        }
        // entry 0 is the smallest mip; data is written base-first, so
        // offsets decrease over the index
        assert!(offsets.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_zlib_roundtrip_matches_uncompressed() {
        let size = Vec3UI::new(16, 16, 1);
        let mips = 2;
        let layers = 2;

        let mut provider = checker_provider(size, mips, layers, false);
        let mut plain = MemoryWriteStream::new();
        write_ktx2(&mut plain, &mut provider, false).unwrap();
        let plain = plain.into_inner();

        let mut compressed = MemoryWriteStream::new();
        write_ktx2(&mut compressed, &mut provider, true).unwrap();
        let compressed = compressed.into_inner();

        let mut a = load_ktx2(Box::new(MemoryReadStream::new(&plain))).unwrap();
        let mut b = load_ktx2(Box::new(MemoryReadStream::new(&compressed))).unwrap();
        for m in 0..mips {
            for l in 0..layers {
                assert_eq!(a.read(m, l).unwrap(), b.read(m, l).unwrap());
            }
        }
    }

    #[test]
    fn test_unsupported_supercompression_rejected() {
        let mut provider = checker_provider(Vec3UI::new(2, 2, 1), 1, 1, false);
        let mut out = MemoryWriteStream::new();
        write_ktx2(&mut out, &mut provider, false).unwrap();
        let mut bytes = out.into_inner();
        // patch the supercompression scheme to zstd
        bytes[44..48].copy_from_slice(&2u32.to_le_bytes());

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
        assert_eq!(
            load_ktx2(stream).err().unwrap().error,
            ReadError::UnsupportedFormat
        );
    }

    #[test]
    fn test_embedded_container_initial_offset() {
        let mut provider = checker_provider(Vec3UI::new(4, 4, 1), 1, 1, false);
        let mut out = MemoryWriteStream::new();
        write_ktx2(&mut out, &mut provider, false).unwrap();
        let container = out.into_inner();

        // embed after a 16-byte prefix
        let mut embedded = vec![0xEEu8; 16];
        embedded.extend_from_slice(&container);
        let mut stream: Box<dyn ReadStream> =
            Box::new(MemoryReadStream::new(&embedded));
        stream.seek(SeekFrom::Start(16)).unwrap();

        let mut read_back = load_ktx2(stream).unwrap();
        assert_eq!(
            read_back.read(0, 0).unwrap(),
            provider.read(0, 0).unwrap()
        );
    }
}
