use std::io::Cursor;

use image::io::Reader as ImageReader;
use image::ImageFormat;
use io_util::{
    ReadStream,
    ReadStreamMemoryMap,
};

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
};
use crate::{
    Vec2UI,
    Vec3UI,
};

/// Catch-all adapter for the formats without a dedicated probe (hdr,
/// tga, bmp, gif and whatever else the delegated decoder can guess).
/// HDR input decodes to f32 rgba, everything else to 8-bit rgba.
pub struct FallbackReader<'a> {
    mmap: ReadStreamMemoryMap<'a>,
    size: Vec2UI,
    format: Format,
    decoded: Option<Box<[u8]>>,
}

impl FallbackReader<'_> {
    fn decode(&mut self) -> Result<&[u8], ReadError> {
        if self.decoded.is_none() {
            let reader = ImageReader::new(Cursor::new(self.mmap.data()))
                .with_guessed_format()
                .map_err(|_| ReadError::Internal)?;
            let img = reader.decode().map_err(|_| ReadError::Internal)?;
            let bytes = match self.format {
                Format::R32G32B32A32Sfloat => f32_bytes(img.to_rgba32f().into_raw()),
                _ => img.to_rgba8().into_raw(),
            };
            self.decoded = Some(bytes.into_boxed_slice());
        }
        Ok(self.decoded.as_ref().unwrap())
    }
}

impl ImageProvider for FallbackReader<'_> {
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

/// Probes the stream with the format-guessing fallback decoder.
pub fn load_fallback<'a>(stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    let mmap = map_probe_stream(stream)?;

    let probed = (|| {
        let reader = ImageReader::new(Cursor::new(mmap.data()))
            .with_guessed_format()
            .map_err(|_| ReadError::Internal)?;
        let guessed = reader.format().ok_or(ReadError::InvalidType)?;
        let hdr = guessed == ImageFormat::Hdr || guessed == ImageFormat::OpenExr;
        let (w, h) = reader
            .into_dimensions()
            .map_err(|_| ReadError::InvalidType)?;
        if w == 0 || h == 0 {
            return Err(ReadError::Empty);
        }
        let format = if hdr {
            Format::R32G32B32A32Sfloat
        } else {
            Format::R8G8B8A8Unorm
        };
        Ok((Vec2UI::new(w, h), format))
    })();

    match probed {
        Ok((size, format)) => Ok(Box::new(FallbackReader {
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

#[cfg(test)]
mod tests {
    use super::*;
    use io_util::MemoryReadStream;

    #[test]
    fn test_fallback_rejects_garbage() {
        let data = vec![0x13u8; 48];
        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&data));
        let err = load_fallback(stream).err().unwrap();
        assert_eq!(err.error, ReadError::InvalidType);
    }

    #[test]
    fn test_fallback_decodes_bmp_as_rgba8() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut encoded = Cursor::new(Vec::new());
        img.write_to(&mut encoded, ImageFormat::Bmp).unwrap();
        let encoded = encoded.into_inner();

        let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&encoded));
        let mut reader = load_fallback(stream).unwrap();
        assert_eq!(reader.format(), Format::R8G8B8A8Unorm);
        assert_eq!(reader.size(), Vec3UI::new(2, 2, 1));
        let data = reader.read(0, 0).unwrap();
        assert_eq!(&data[..4], &[1, 2, 3, 255]);
    }
}
