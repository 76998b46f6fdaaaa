use std::io::Cursor;

use image::codecs::openexr::{
    OpenExrDecoder,
    OpenExrEncoder,
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
    f32_bytes,
    map_probe_stream,
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

/// EXR adapter. The delegated decoder surfaces scanline images as f32;
/// a missing alpha channel reads as 1 when rgba output is forced.
pub struct ExrReader<'a> {
    mmap: ReadStreamMemoryMap<'a>,
    size: Vec2UI,
    format: Format,
    force_rgba: bool,
    decoded: Option<Box<[u8]>>,
}

impl ExrReader<'_> {
    fn decode(&mut self) -> Result<&[u8], ReadError> {
        if self.decoded.is_none() {
            let decoder = OpenExrDecoder::new(Cursor::new(self.mmap.data()))
                .map_err(|_| ReadError::Internal)?;
            let img =
                DynamicImage::from_decoder(decoder).map_err(|_| ReadError::Internal)?;
            let bytes = match img {
                DynamicImage::ImageRgba32F(b) => f32_bytes(b.into_raw()),
                img @ DynamicImage::ImageRgb32F(_) => {
                    if self.force_rgba {
                        f32_bytes(img.to_rgba32f().into_raw())
                    } else {
                        f32_bytes(img.to_rgb32f().into_raw())
                    }
                }
                _ => return Err(ReadError::UnsupportedFormat),
            };
            self.decoded = Some(bytes.into_boxed_slice());
        }
        Ok(self.decoded.as_ref().unwrap())
    }
}

impl ImageProvider for ExrReader<'_> {
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

/// Probes the stream for an EXR image. `force_rgba` pads rgb images with
/// an opaque alpha channel.
pub fn load_exr<'a>(stream: Box<dyn ReadStream + 'a>, force_rgba: bool) -> ProbeResult<'a> {
    let mmap = map_probe_stream(stream)?;

    let probed = (|| {
        let decoder = OpenExrDecoder::new(Cursor::new(mmap.data()))
            .map_err(|_| ReadError::InvalidType)?;
        let (w, h) = decoder.dimensions();
        if w == 0 || h == 0 {
            return Err(ReadError::Empty);
        }
        let format = match decoder.color_type() {
            ColorType::Rgba32F => Format::R32G32B32A32Sfloat,
            ColorType::Rgb32F if force_rgba => Format::R32G32B32A32Sfloat,
            ColorType::Rgb32F => Format::R32G32B32Sfloat,
            _ => return Err(ReadError::UnsupportedFormat),
        };
        Ok((Vec2UI::new(w, h), format))
    })();

    match probed {
        Ok((size, format)) => Ok(Box::new(ExrReader {
            mmap,
            size,
            format,
            force_rgba,
            decoded: None,
        })),
        Err(error) => Err(ProbeError {
            error,
            stream: mmap.release(),
        }),
    }
}

/// `load_exr` with rgba output forced, the dispatcher default.
pub fn load_exr_rgba<'a>(stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    load_exr(stream, true)
}

/// Writes the first mip of the first layer as a scanline EXR. Only f32
/// rgb/rgba images can be encoded.
pub fn write_exr(
    write: &mut dyn WriteStream,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    if image.mip_levels() > 1 || image.layers() > 1 || image.size().z > 1 {
        debug!("write_exr: only the first 2D subresource is written");
    }

    let format = image.format();
    let color = match format {
        Format::R32G32B32Sfloat => ColorType::Rgb32F,
        Format::R32G32B32A32Sfloat => ColorType::Rgba32F,
        _ => return Err(WriteError::UnsupportedFormat),
    };

    let size = image.size();
    let expected = size_bytes(Vec3UI::new(size.x, size.y, 1), 0, format);
    let data = image.read(0, 0).map_err(|_| WriteError::ReadFailed)?;
    if data.len() as u64 != expected {
        return Err(WriteError::ReadFailed);
    }

    OpenExrEncoder::new(&mut *write)
        .write_image(data, size.x, size.y, color)
        .map_err(|_| WriteError::CantWrite)
}
