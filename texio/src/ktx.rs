use std::collections::HashMap;
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
    mip_size,
    size_bytes,
};
use crate::Vec3UI;

// OpenGL enumerants used by the legacy container header.
mod gl {
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const BYTE: u32 = 0x1400;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const SHORT: u32 = 0x1402;
    pub const UNSIGNED_INT: u32 = 0x1405;
    pub const INT: u32 = 0x1404;
    pub const FLOAT: u32 = 0x1406;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const UNSIGNED_INT_5_9_9_9_REV: u32 = 0x8C3E;

    pub const RED: u32 = 0x1903;
    pub const RG: u32 = 0x8227;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const RED_INTEGER: u32 = 0x8D94;
    pub const RG_INTEGER: u32 = 0x8228;
    pub const RGB_INTEGER: u32 = 0x8D98;
    pub const RGBA_INTEGER: u32 = 0x8D99;

    pub const R8: u32 = 0x8229;
    pub const RG8: u32 = 0x822B;
    pub const RGB8: u32 = 0x8051;
    pub const RGBA8: u32 = 0x8058;
    pub const SR8: u32 = 0x8FBD;
    pub const SRGB8: u32 = 0x8C41;
    pub const SRGB8_ALPHA8: u32 = 0x8C43;
    pub const R8_SNORM: u32 = 0x8F94;
    pub const RG8_SNORM: u32 = 0x8F95;
    pub const RGB8_SNORM: u32 = 0x8F96;
    pub const RGBA8_SNORM: u32 = 0x8F97;
    pub const R8I: u32 = 0x8231;
    pub const RG8I: u32 = 0x8237;
    pub const RGB8I: u32 = 0x8D8F;
    pub const RGBA8I: u32 = 0x8D8E;
    pub const R8UI: u32 = 0x8232;
    pub const RG8UI: u32 = 0x8238;
    pub const RGB8UI: u32 = 0x8D7D;
    pub const RGBA8UI: u32 = 0x8D7C;

    pub const R16: u32 = 0x822A;
    pub const RG16: u32 = 0x822C;
    pub const RGB16: u32 = 0x8054;
    pub const RGBA16: u32 = 0x805B;
    pub const R16F: u32 = 0x822D;
    pub const RG16F: u32 = 0x822F;
    pub const RGB16F: u32 = 0x881B;
    pub const RGBA16F: u32 = 0x881A;
    pub const R16_SNORM: u32 = 0x8F98;
    pub const RG16_SNORM: u32 = 0x8F99;
    pub const RGB16_SNORM: u32 = 0x8F9A;
    pub const R16I: u32 = 0x8233;
    pub const RG16I: u32 = 0x8239;
    pub const RGB16I: u32 = 0x8D89;
    pub const RGBA16I: u32 = 0x8D88;
    pub const R16UI: u32 = 0x8234;
    pub const RG16UI: u32 = 0x823A;
    pub const RGB16UI: u32 = 0x8D77;
    pub const RGBA16UI: u32 = 0x8D76;

    pub const R32F: u32 = 0x822E;
    pub const RG32F: u32 = 0x8230;
    pub const RGBA32F: u32 = 0x8814;
    pub const R32I: u32 = 0x8235;
    pub const RG32I: u32 = 0x823B;
    pub const RGB32I: u32 = 0x8D83;
    pub const RGBA32I: u32 = 0x8D82;
    pub const R32UI: u32 = 0x8236;
    pub const RG32UI: u32 = 0x823C;
    pub const RGB32UI: u32 = 0x8D71;
    pub const RGBA32UI: u32 = 0x8D70;

    pub const RGB9_E5: u32 = 0x8C3D;
    pub const COMPRESSED_RGBA_BPTC_UNORM: u32 = 0x8E8C;
    pub const COMPRESSED_SRGB_ALPHA_BPTC_UNORM: u32 = 0x8E8D;
}

struct FormatEntry {
    gl_internal_format: u32,
    gl_pixel_format: u32,
    gl_pixel_type: u32,
    format: Format,
}

const fn entry(
    gl_internal_format: u32,
    gl_pixel_format: u32,
    gl_pixel_type: u32,
    format: Format,
) -> FormatEntry {
    FormatEntry {
        gl_internal_format,
        gl_pixel_format,
        gl_pixel_type,
        format,
    }
}

static FORMAT_MAP: &[FormatEntry] = &[
    // 8 bit
    entry(gl::R8, gl::RED, gl::UNSIGNED_BYTE, Format::R8Unorm),
    entry(gl::RG8, gl::RG, gl::UNSIGNED_BYTE, Format::R8G8Unorm),
    entry(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE, Format::R8G8B8Unorm),
    entry(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, Format::R8G8B8A8Unorm),
    entry(gl::SR8, gl::RED, gl::UNSIGNED_BYTE, Format::R8Srgb),
    entry(gl::SRGB8, gl::RGB, gl::UNSIGNED_BYTE, Format::R8G8B8Srgb),
    entry(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE, Format::R8G8B8A8Srgb),
    entry(gl::R8_SNORM, gl::RED, gl::BYTE, Format::R8Snorm),
    entry(gl::RG8_SNORM, gl::RG, gl::BYTE, Format::R8G8Snorm),
    entry(gl::RGB8_SNORM, gl::RGB, gl::BYTE, Format::R8G8B8Snorm),
    entry(gl::RGBA8_SNORM, gl::RGBA, gl::BYTE, Format::R8G8B8A8Snorm),
    entry(gl::R8I, gl::RED_INTEGER, gl::BYTE, Format::R8Sint),
    entry(gl::RG8I, gl::RG_INTEGER, gl::BYTE, Format::R8G8Sint),
    entry(gl::RGB8I, gl::RGB_INTEGER, gl::BYTE, Format::R8G8B8Sint),
    entry(gl::RGBA8I, gl::RGBA_INTEGER, gl::BYTE, Format::R8G8B8A8Sint),
    entry(gl::R8UI, gl::RED_INTEGER, gl::UNSIGNED_BYTE, Format::R8Uint),
    entry(gl::RG8UI, gl::RG_INTEGER, gl::UNSIGNED_BYTE, Format::R8G8Uint),
    entry(gl::RGB8UI, gl::RGB_INTEGER, gl::UNSIGNED_BYTE, Format::R8G8B8Uint),
    entry(gl::RGBA8UI, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE, Format::R8G8B8A8Uint),
    // 16 bit
    entry(gl::R16, gl::RED, gl::UNSIGNED_SHORT, Format::R16Unorm),
    entry(gl::RG16, gl::RG, gl::UNSIGNED_SHORT, Format::R16G16Unorm),
    entry(gl::RGB16, gl::RGB, gl::UNSIGNED_SHORT, Format::R16G16B16Unorm),
    entry(gl::RGBA16, gl::RGBA, gl::UNSIGNED_SHORT, Format::R16G16B16A16Unorm),
    entry(gl::R16F, gl::RED, gl::HALF_FLOAT, Format::R16Sfloat),
    entry(gl::RG16F, gl::RG, gl::HALF_FLOAT, Format::R16G16Sfloat),
    entry(gl::RGB16F, gl::RGB, gl::HALF_FLOAT, Format::R16G16B16Sfloat),
    entry(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT, Format::R16G16B16A16Sfloat),
    entry(gl::R16_SNORM, gl::RED, gl::SHORT, Format::R16Snorm),
    entry(gl::RG16_SNORM, gl::RG, gl::SHORT, Format::R16G16Snorm),
    entry(gl::RGB16_SNORM, gl::RGB, gl::SHORT, Format::R16G16B16Snorm),
    entry(gl::R16I, gl::RED_INTEGER, gl::SHORT, Format::R16Sint),
    entry(gl::RG16I, gl::RG_INTEGER, gl::SHORT, Format::R16G16Sint),
    entry(gl::RGB16I, gl::RGB_INTEGER, gl::SHORT, Format::R16G16B16Sint),
    entry(gl::RGBA16I, gl::RGBA_INTEGER, gl::SHORT, Format::R16G16B16A16Sint),
    entry(gl::R16UI, gl::RED_INTEGER, gl::UNSIGNED_SHORT, Format::R16Uint),
    entry(gl::RG16UI, gl::RG_INTEGER, gl::UNSIGNED_SHORT, Format::R16G16Uint),
    entry(gl::RGB16UI, gl::RGB_INTEGER, gl::UNSIGNED_SHORT, Format::R16G16B16Uint),
    entry(gl::RGBA16UI, gl::RGBA_INTEGER, gl::UNSIGNED_SHORT, Format::R16G16B16A16Uint),
    // 32 bit
    entry(gl::R32F, gl::RED, gl::FLOAT, Format::R32Sfloat),
    entry(gl::RG32F, gl::RG, gl::FLOAT, Format::R32G32Sfloat),
    entry(gl::RGBA32F, gl::RGBA, gl::FLOAT, Format::R32G32B32A32Sfloat),
    entry(gl::R32I, gl::RED_INTEGER, gl::INT, Format::R32Sint),
    entry(gl::RG32I, gl::RG_INTEGER, gl::INT, Format::R32G32Sint),
    entry(gl::RGB32I, gl::RGB_INTEGER, gl::INT, Format::R32G32B32Sint),
    entry(gl::RGBA32I, gl::RGBA_INTEGER, gl::INT, Format::R32G32B32A32Sint),
    entry(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT, Format::R32Uint),
    entry(gl::RG32UI, gl::RG_INTEGER, gl::UNSIGNED_INT, Format::R32G32Uint),
    entry(gl::RGB32UI, gl::RGB_INTEGER, gl::UNSIGNED_INT, Format::R32G32B32Uint),
    entry(gl::RGBA32UI, gl::RGBA_INTEGER, gl::UNSIGNED_INT, Format::R32G32B32A32Uint),
    entry(
        gl::RGB9_E5,
        gl::RGB,
        gl::UNSIGNED_INT_5_9_9_9_REV,
        Format::E5B9G9R9UfloatPack32,
    ),
    entry(gl::COMPRESSED_RGBA_BPTC_UNORM, gl::RGBA, 0, Format::Bc7UnormBlock),
    entry(
        gl::COMPRESSED_SRGB_ALPHA_BPTC_UNORM,
        gl::RGBA,
        0,
        Format::Bc7SrgbBlock,
    ),
];

lazy_static! {
    static ref GL_INTERNAL_TO_ENTRY: HashMap<u32, &'static FormatEntry> = {
        let mut m = HashMap::new();
        for entry in FORMAT_MAP {
            m.insert(entry.gl_internal_format, entry);
        }
        m
    };
}

fn entry_for_format(format: Format) -> Option<&'static FormatEntry> {
    FORMAT_MAP.iter().find(|e| e.format == format)
}

const KTX_ENDIANNESS: u32 = 0x04030201;
const KTX_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

struct KtxHeader {
    endianness: u32,
    gl_type: u32,
    gl_type_size: u32,
    gl_format: u32,
    gl_internal_format: u32,
    gl_base_internal_format: u32,
    pixel_width: u32,
    pixel_height: u32,
    pixel_depth: u32,
    number_array_elements: u32,
    number_faces: u32,
    number_mipmap_levels: u32,
    bytes_key_value_data: u32,
}

impl KtxHeader {
    fn read<R: Read + ?Sized>(r: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            endianness: r.read_u32::<LittleEndian>()?,
            gl_type: r.read_u32::<LittleEndian>()?,
            gl_type_size: r.read_u32::<LittleEndian>()?,
            gl_format: r.read_u32::<LittleEndian>()?,
            gl_internal_format: r.read_u32::<LittleEndian>()?,
            gl_base_internal_format: r.read_u32::<LittleEndian>()?,
            pixel_width: r.read_u32::<LittleEndian>()?,
            pixel_height: r.read_u32::<LittleEndian>()?,
            pixel_depth: r.read_u32::<LittleEndian>()?,
            number_array_elements: r.read_u32::<LittleEndian>()?,
            number_faces: r.read_u32::<LittleEndian>()?,
            number_mipmap_levels: r.read_u32::<LittleEndian>()?,
            bytes_key_value_data: r.read_u32::<LittleEndian>()?,
        })
    }

    fn write<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(self.endianness)?;
        w.write_u32::<LittleEndian>(self.gl_type)?;
        w.write_u32::<LittleEndian>(self.gl_type_size)?;
        w.write_u32::<LittleEndian>(self.gl_format)?;
        w.write_u32::<LittleEndian>(self.gl_internal_format)?;
        w.write_u32::<LittleEndian>(self.gl_base_internal_format)?;
        w.write_u32::<LittleEndian>(self.pixel_width)?;
        w.write_u32::<LittleEndian>(self.pixel_height)?;
        w.write_u32::<LittleEndian>(self.pixel_depth)?;
        w.write_u32::<LittleEndian>(self.number_array_elements)?;
        w.write_u32::<LittleEndian>(self.number_faces)?;
        w.write_u32::<LittleEndian>(self.number_mipmap_levels)?;
        w.write_u32::<LittleEndian>(self.bytes_key_value_data)
    }
}

/// Random-access reader over a legacy KTX container. Subresource offsets
/// are computed on demand by walking the preceding mip levels.
pub struct KtxReader<'a> {
    format: Format,
    size: Vec3UI,
    mip_levels: u32,
    faces: u32,
    // stays 0 for non-array textures, the imageSize cubemap exception
    // depends on it
    array_elements: u32,
    data_begin: u64,
    stream: Box<dyn ReadStream + 'a>,
    tmp: Vec<u8>,
}

impl KtxReader<'_> {
    /// The size of a single face/layer image in the given mip level.
    fn face_size(&self, mip: u32) -> u64 {
        size_bytes(self.size, mip, self.format)
    }

    fn offset(&self, mip: u32, layer: u32) -> u64 {
        assert!(mip < self.mip_levels);
        assert!(layer < self.layers());

        let mut address = self.data_begin;
        for i in 0..mip {
            let face_size = align_up(self.face_size(i), 4);
            let mip_bytes = align_up(self.layers() as u64 * face_size, 4);
            // the u32 imageSize prefix is not included in the padding
            address += 4 + mip_bytes;
        }

        let face_size = align_up(self.face_size(mip), 4);
        address + 4 + layer as u64 * face_size
    }
}

impl ImageProvider for KtxReader<'_> {
    fn size(&self) -> Vec3UI {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    fn layers(&self) -> u32 {
        (self.faces * self.array_elements.max(1)).max(1)
    }

    fn cubemap(&self) -> bool {
        self.faces == 6
    }

    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError> {
        let byte_size = self.face_size(mip) as usize;
        let mut tmp = std::mem::take(&mut self.tmp);
        tmp.resize(byte_size, 0u8);
        let res = self.read_into(&mut tmp, mip, layer);
        self.tmp = tmp;
        res?;
        Ok(&self.tmp)
    }

    fn read_into(
        &mut self,
        data: &mut [u8],
        mip: u32,
        layer: u32,
    ) -> Result<u64, ReadError> {
        let byte_size = self.face_size(mip);
        assert!(data.len() as u64 >= byte_size);

        let address = self.offset(mip, layer);
        self.stream.seek(SeekFrom::Start(address))?;
        self.stream.read_exact(&mut data[..byte_size as usize])?;
        Ok(byte_size)
    }
}

struct ParsedKtx {
    format: Format,
    size: Vec3UI,
    mip_levels: u32,
    faces: u32,
    array_elements: u32,
    data_begin: u64,
}

fn parse_ktx(stream: &mut dyn ReadStream) -> Result<ParsedKtx, ReadError> {
    let mut identifier = [0u8; 12];
    stream.read_exact(&mut identifier)?;
    if identifier != KTX_IDENTIFIER {
        return Err(ReadError::InvalidType);
    }

    let header = KtxHeader::read(stream)?;

    if header.endianness != KTX_ENDIANNESS {
        // Written in non-native endianness; supporting that would mean
        // swapping every field and every texel, so error out.
        debug!("KTX invalid endianness: {:#x}", header.endianness);
        return Err(ReadError::InvalidEndianness);
    }

    if header.pixel_depth > 1
        && (header.number_faces > 1 || header.number_array_elements > 1)
    {
        warn!(
            "KTX 3D image with faces/layers unsupported: size {}x{}x{}, layers {}, faces {}",
            header.pixel_width,
            header.pixel_height,
            header.pixel_depth,
            header.number_array_elements,
            header.number_faces
        );
        return Err(ReadError::CantRepresent);
    }

    if header.pixel_width == 0 {
        return Err(ReadError::Empty);
    }

    let format = match GL_INTERNAL_TO_ENTRY.get(&header.gl_internal_format) {
        Some(entry) => entry.format,
        None => {
            warn!("unsupported KTX format: {:#x}", header.gl_internal_format);
            return Err(ReadError::UnsupportedFormat);
        }
    };

    // read keys and values, purely informational
    let keys_pos = stream.stream_position()?;
    let mut bytes_read = 0u64;
    while bytes_read + 4 <= header.bytes_key_value_data as u64 {
        let byte_size = stream.read_u32::<LittleEndian>()?;
        if bytes_read + 4 + byte_size as u64 > header.bytes_key_value_data as u64 {
            warn!("KTX key/value pair runs past the metadata block");
            return Err(ReadError::UnexpectedEnd);
        }
        let key_value = stream.read_data_exact(byte_size as usize)?;
        let padding = align_up(byte_size as u64, 4) - byte_size as u64;
        if padding > 0 {
            stream.seek(SeekFrom::Current(padding as i64))?;
        }
        bytes_read += 4 + align_up(byte_size as u64, 4);

        match key_value.iter().position(|&b| b == 0) {
            Some(sep) => {
                let key = String::from_utf8_lossy(&key_value[..sep]);
                let value = &key_value[sep + 1..];
                if value.len() > 50 {
                    debug!("KTX key value pair: {} = <too long to print>", key);
                } else {
                    debug!(
                        "KTX key value pair: {} = {}",
                        key,
                        String::from_utf8_lossy(value)
                    );
                }
            }
            None => warn!("KTX key/value pair without null separator"),
        }
    }

    Ok(ParsedKtx {
        format,
        size: Vec3UI::new(
            header.pixel_width,
            header.pixel_height.max(1),
            header.pixel_depth.max(1),
        ),
        // zero mipmap levels asks the loader to generate mips; treat the
        // base level as the single level
        mip_levels: header.number_mipmap_levels.max(1),
        faces: header.number_faces.max(1),
        array_elements: header.number_array_elements,
        data_begin: keys_pos + header.bytes_key_value_data as u64,
    })
}

/// Probes the stream for a KTX container. On success the returned
/// provider owns the stream; on failure the stream is handed back.
pub fn load_ktx<'a>(mut stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    match parse_ktx(&mut stream) {
        Ok(parsed) => Ok(Box::new(KtxReader {
            format: parsed.format,
            size: parsed.size,
            mip_levels: parsed.mip_levels,
            faces: parsed.faces,
            array_elements: parsed.array_elements,
            data_begin: parsed.data_begin,
            stream,
            tmp: Vec::new(),
        })),
        Err(error) => Err(ProbeError { error, stream }),
    }
}

/// Serializes the image as a KTX container. Only uncompressed formats
/// with an OpenGL mapping can be written.
pub fn write_ktx(
    write: &mut dyn WriteStream,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    let format = image.format();
    if format.is_compressed() {
        return Err(WriteError::UnsupportedFormat);
    }
    let entry = entry_for_format(format).ok_or(WriteError::UnsupportedFormat)?;

    let size = image.size();
    let mips = image.mip_levels().max(1);
    let mut layers = image.layers().max(1);
    let mut faces = 1u32;
    if image.cubemap() {
        assert!(layers % 6 == 0);
        faces = 6;
        layers /= 6;
    }
    let format_size = format.element_size();

    let header = KtxHeader {
        endianness: KTX_ENDIANNESS,
        gl_type: entry.gl_pixel_type,
        gl_type_size: format_size,
        gl_format: entry.gl_pixel_format,
        gl_internal_format: entry.gl_internal_format,
        gl_base_internal_format: entry.gl_pixel_format,
        pixel_width: size.x,
        pixel_height: if size.y > 1 { size.y } else { 0 },
        pixel_depth: if size.z > 1 { size.z } else { 0 },
        number_array_elements: if layers > 1 { layers } else { 0 },
        number_faces: faces,
        number_mipmap_levels: mips,
        bytes_key_value_data: 0,
    };

    write.write_all(&KTX_IDENTIFIER)?;
    header.write(write)?;

    let zero = [0u8; 4];
    let mut off = KTX_IDENTIFIER.len() as u64 + 13 * 4;
    for m in 0..mips {
        let msize = mip_size(size, m);
        let face_size =
            msize.x as u64 * msize.y as u64 * msize.z as u64 * format_size as u64;

        // ktx exception: a non-array cubemap stores the size of one face
        // instead of the whole level
        let image_size = if header.number_array_elements == 0 && image.cubemap() {
            face_size
        } else {
            align_up(face_size, 4) * layers as u64 * faces as u64
        };
        write.write_u32::<LittleEndian>(image_size as u32)?;
        off += 4;

        for l in 0..layers {
            for f in 0..faces {
                let data = image
                    .read(m, l * faces + f)
                    .map_err(|_| WriteError::ReadFailed)?;
                if data.len() as u64 != face_size {
                    debug!(
                        "invalid provider read size: got {}, expected {}",
                        data.len(),
                        face_size
                    );
                    return Err(WriteError::ReadFailed);
                }

                write.write_all(data)?;
                off += data.len() as u64;

                let padding = align_up(off, 4) - off;
                if padding > 0 {
                    write.write_all(&zero[..padding as usize])?;
                    off += padding;
                }
            }
        }

        let padding = align_up(off, 4) - off;
        if padding > 0 {
            write.write_all(&zero[..padding as usize])?;
            off += padding;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_provider::{
        load_image,
        wrap_single,
    };
    use io_util::{
        MemoryReadStream,
        MemoryWriteStream,
    };

    #[test]
    fn test_identifier_rejected() {
        let data = [0u8; 64];
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        let err = load_ktx(stream).err().unwrap();
        assert_eq!(err.error, ReadError::InvalidType);
        // the stream comes back to the caller
        assert_eq!(err.stream.as_memory().unwrap().len(), 64);
    }

    #[test]
    fn test_truncated_header() {
        let stream: Box<dyn ReadStream> =
            Box::new(MemoryReadStream::new(&KTX_IDENTIFIER));
        let err = load_ktx(stream).err().unwrap();
        assert_eq!(err.error, ReadError::UnexpectedEnd);
    }

    #[test]
    fn test_foreign_endianness_rejected() {
        let mut out = MemoryWriteStream::new();
        out.write_all(&KTX_IDENTIFIER).unwrap();
        let header = KtxHeader {
            endianness: 0x01020304,
            gl_type: gl::UNSIGNED_BYTE,
            gl_type_size: 4,
            gl_format: gl::RGBA,
            gl_internal_format: gl::RGBA8,
            gl_base_internal_format: gl::RGBA,
            pixel_width: 1,
            pixel_height: 0,
            pixel_depth: 0,
            number_array_elements: 0,
            number_faces: 1,
            number_mipmap_levels: 1,
            bytes_key_value_data: 0,
        };
        header.write(&mut out).unwrap();
        let data = out.into_inner();
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        assert_eq!(
            load_ktx(stream).err().unwrap().error,
            ReadError::InvalidEndianness
        );
    }

    #[test]
    fn test_rgba8_roundtrip() {
        // alternating byte pattern over a 4x2 rgba image
        let pixels: Vec<u8> = (0..32u32)
            .map(|i| if (i / 4) % 2 == 0 { [0x00, 0xFF, 0x00, 0xFF][i as usize % 4] } else { [0xFF, 0x00, 0xFF, 0x00][i as usize % 4] })
            .collect();
        let mut provider =
            wrap_single(Vec3UI::new(4, 2, 1), Format::R8G8B8A8Unorm, &pixels);

        let mut out = MemoryWriteStream::new();
        write_ktx(&mut out, &mut provider).unwrap();
        let bytes = out.into_inner();
        assert_eq!(&bytes[..12], &KTX_IDENTIFIER);

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
        let mut read_back = load_ktx(stream).unwrap();
        assert_eq!(read_back.size(), Vec3UI::new(4, 2, 1));
        assert_eq!(read_back.format(), Format::R8G8B8A8Unorm);
        assert_eq!(read_back.mip_levels(), 1);
        assert_eq!(read_back.layers(), 1);
        assert!(!read_back.cubemap());
        assert_eq!(read_back.read(0, 0).unwrap(), &pixels[..]);
    }

    #[test]
    fn test_mip_and_layer_offsets_roundtrip() {
        // 4x4, 3 mips, 2 layers of r8 with distinct constants per subresource
        let size = Vec3UI::new(4, 4, 1);
        let mips = 3;
        let layers = 2;
        let mut blocks = Vec::new();
        for m in 0..mips {
            for l in 0..layers {
                let byte_size = size_bytes(size, m, Format::R8Unorm) as usize;
                blocks.push(vec![(0x10 * (m + 1) + l) as u8; byte_size].into_boxed_slice());
            }
        }
        let mut provider = crate::image_provider::wrap_blocks(
            size,
            Format::R8Unorm,
            mips,
            layers,
            blocks,
            false,
        );

        let mut out = MemoryWriteStream::new();
        write_ktx(&mut out, &mut provider).unwrap();
        let bytes = out.into_inner();

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
        let mut read_back = load_ktx(stream).unwrap();
        assert_eq!(read_back.mip_levels(), 3);
        assert_eq!(read_back.layers(), 2);
        for m in 0..mips {
            for l in 0..layers {
                let expected = (0x10 * (m + 1) + l) as u8;
                let data = read_back.read(m, l).unwrap();
                assert!(data.iter().all(|&b| b == expected), "mip {} layer {}", m, l);
            }
        }
    }

    #[test]
    fn test_dispatcher_finds_ktx_without_hint() {
        let pixels = vec![0xABu8; 16];
        let mut provider =
            wrap_single(Vec3UI::new(2, 2, 1), Format::R8G8B8A8Unorm, &pixels);
        let mut out = MemoryWriteStream::new();
        write_ktx(&mut out, &mut provider).unwrap();
        let bytes = out.into_inner();

        // no extension hint
        let provider = load_image(Box::new(MemoryReadStream::new(&bytes)), "").unwrap();
        assert_eq!(provider.format(), Format::R8G8B8A8Unorm);

        // misleading extension hint still succeeds
        let provider =
            load_image(Box::new(MemoryReadStream::new(&bytes)), "image.png").unwrap();
        assert_eq!(provider.format(), Format::R8G8B8A8Unorm);
    }
}
