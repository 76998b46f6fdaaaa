use std::io::Cursor;

use image::codecs::png::{
    PngDecoder,
    PngEncoder,
};
use image::{
    ColorType,
    DynamicImage,
    ImageDecoder,
    ImageEncoder,
};
use io_util::{
    ReadStream,
    ReadStreamMemoryMap,
    WriteStream,
};
use log::debug;

use super::{
    map_probe_stream,
    u16_bytes,
};
use crate::format::Format;
use crate::image_provider::{
    ImageProvider,
    ProbeError,
    ProbeResult,
    ReadError,
    WriteError,
};
use crate::layout::size_bytes;
use crate::{
    Vec2UI,
    Vec3UI,
};

pub struct PngReader<'a> {
    mmap: ReadStreamMemoryMap<'a>,
    size: Vec2UI,
    format: Format,
    decoded: Option<Box<[u8]>>,
}

// Palette images arrive expanded to rgb, sub-8-bit gray expanded to 8 bit
// (the decoder does both). Rgb without alpha is promoted to rgba with an
// opaque filler since bare rgb has poor GPU support.
fn catalogue_format(color: ColorType) -> Result<Format, ReadError> {
    Ok(match color {
        ColorType::L8 => Format::R8Srgb,
        ColorType::La8 => Format::R8G8Srgb,
        ColorType::Rgb8 | ColorType::Rgba8 => Format::R8G8B8A8Srgb,
        ColorType::L16 => Format::R16Unorm,
        ColorType::La16 => Format::R16G16Unorm,
        ColorType::Rgb16 | ColorType::Rgba16 => Format::R16G16B16A16Unorm,
        _ => return Err(ReadError::UnsupportedFormat),
    })
}

impl PngReader<'_> {
    fn decode(&mut self) -> Result<&[u8], ReadError> {
        if self.decoded.is_none() {
            let decoder = PngDecoder::new(Cursor::new(self.mmap.data()))
                .map_err(|_| ReadError::Internal)?;
            let img =
                DynamicImage::from_decoder(decoder).map_err(|_| ReadError::Internal)?;
            let bytes = match img {
                DynamicImage::ImageLuma8(b) => b.into_raw(),
                DynamicImage::ImageLumaA8(b) => b.into_raw(),
                DynamicImage::ImageRgba8(b) => b.into_raw(),
                img @ DynamicImage::ImageRgb8(_) => img.to_rgba8().into_raw(),
                DynamicImage::ImageLuma16(b) => u16_bytes(b.into_raw()),
                DynamicImage::ImageLumaA16(b) => u16_bytes(b.into_raw()),
                DynamicImage::ImageRgba16(b) => u16_bytes(b.into_raw()),
                img @ DynamicImage::ImageRgb16(_) => u16_bytes(img.to_rgba16().into_raw()),
                _ => return Err(ReadError::UnsupportedFormat),
            };
            self.decoded = Some(bytes.into_boxed_slice());
        }
        Ok(self.decoded.as_ref().unwrap())
    }
}

impl ImageProvider for PngReader<'_> {
    fn size(&self) -> Vec3UI {
        Vec3UI::new(self.size.x, self.size.y, 1)
    }

    fn format(&self) -> Format {
        self.format
    }

    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError> {
        assert!(mip == 0 && layer == 0);
        self.decode()
    }

    fn read_into(
        &mut self,
        data: &mut [u8],
        mip: u32,
        layer: u32,
    ) -> Result<u64, ReadError> {
        assert!(mip == 0 && layer == 0);
        let src = self.decode()?;
        assert!(data.len() >= src.len());
        let len = src.len();
        data[..len].copy_from_slice(src);
        Ok(len as u64)
    }
}

/// Probes the stream for a PNG image.
pub fn load_png<'a>(stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    let mmap = map_probe_stream(stream)?;

    let probed = (|| {
        let decoder = PngDecoder::new(Cursor::new(mmap.data()))
            .map_err(|_| ReadError::InvalidType)?;
        let (w, h) = decoder.dimensions();
        if w == 0 || h == 0 {
            return Err(ReadError::Empty);
        }
        let format = catalogue_format(decoder.color_type())?;
        Ok((Vec2UI::new(w, h), format))
    })();

    match probed {
        Ok((size, format)) => Ok(Box::new(PngReader {
            mmap,
            size,
            format,
            decoded: None,
        })),
        Err(error) => Err(ProbeError {
            error,
            stream: mmap.release(),
        }),
    }
}

/// Writes the first mip of the first layer as a PNG. Only 8 and 16 bit
/// unorm color formats can be encoded.
pub fn write_png(
    write: &mut dyn WriteStream,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    if image.size().z > 1 {
        debug!("write_png: discarding {} slices", image.size().z - 1);
    }
    if image.mip_levels() > 1 {
        debug!("write_png: discarding {} mips", image.mip_levels() - 1);
    }
    if image.layers() > 1 {
        debug!("write_png: discarding {} layers", image.layers() - 1);
    }

    let format = image.format();
    let color = match format {
        Format::R8Unorm | Format::R8Srgb => ColorType::L8,
        Format::R8G8B8Unorm | Format::R8G8B8Srgb => ColorType::Rgb8,
        Format::R8G8B8A8Unorm | Format::R8G8B8A8Srgb => ColorType::Rgba8,
        Format::R16Unorm => ColorType::L16,
        Format::R16G16B16Unorm => ColorType::Rgb16,
        Format::R16G16B16A16Unorm => ColorType::Rgba16,
        _ => return Err(WriteError::UnsupportedFormat),
    };

    let size = image.size();
    let expected = size_bytes(Vec3UI::new(size.x, size.y, 1), 0, format);
    let data = image.read(0, 0).map_err(|_| WriteError::ReadFailed)?;
    if data.len() as u64 != expected {
        return Err(WriteError::ReadFailed);
    }

    PngEncoder::new(&mut *write)
        .write_image(data, size.x, size.y, color)
        .map_err(|_| WriteError::CantWrite)
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
    fn test_png_write_read_roundtrip() {
        let size = Vec3UI::new(3, 2, 1);
        let pixels: Vec<u8> = (0..24).map(|i| (i * 11) as u8).collect();
        let mut provider = wrap_single(size, Format::R8G8B8A8Srgb, &pixels);

        let mut out = MemoryWriteStream::new();
        write_png(&mut out, &mut provider).unwrap();
        let encoded = out.into_inner();

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&encoded));
        let mut read_back = load_png(stream).unwrap();
        assert_eq!(read_back.size(), size);
        assert_eq!(read_back.format(), Format::R8G8B8A8Srgb);
        assert_eq!(read_back.read(0, 0).unwrap(), &pixels[..]);
    }

    #[test]
    fn test_png_probe_rejects_other_data() {
        let data = vec![0x42u8; 64];
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        let err = load_png(stream).err().unwrap();
        assert_eq!(err.error, ReadError::InvalidType);
        assert_eq!(err.stream.as_memory().unwrap().len(), 64);
    }

    #[test]
    fn test_dispatcher_decodes_png_with_wrong_extension() {
        let size = Vec3UI::new(2, 2, 1);
        let pixels = [0u8, 255, 0, 255, 255, 0, 255, 0, 1, 2, 3, 4, 5, 6, 7, 8];
        let mut provider = wrap_single(size, Format::R8G8B8A8Srgb, &pixels);
        let mut out = MemoryWriteStream::new();
        write_png(&mut out, &mut provider).unwrap();
        let encoded = out.into_inner();

        let provider =
            load_image(Box::new(MemoryReadStream::new(&encoded)), "tex.ktx").unwrap();
        assert_eq!(provider.format(), Format::R8G8B8A8Srgb);
        assert_eq!(provider.size(), size);
    }
}
