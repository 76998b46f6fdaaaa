use std::io::Cursor;

use image::codecs::webp::WebPDecoder;
use image::{
    DynamicImage,
    ImageDecoder,
};
use io_util::{
    ReadStream,
    ReadStreamMemoryMap,
};

use super::map_probe_stream;
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

/// WebP adapter; always decodes to rgba.
pub struct WebpReader<'a> {
    mmap: ReadStreamMemoryMap<'a>,
    size: Vec2UI,
    decoded: Option<Box<[u8]>>,
}

impl WebpReader<'_> {
    fn decode(&mut self) -> Result<&[u8], ReadError> {
        if self.decoded.is_none() {
            let decoder = WebPDecoder::new(Cursor::new(self.mmap.data()))
                .map_err(|_| ReadError::Internal)?;
            let img =
                DynamicImage::from_decoder(decoder).map_err(|_| ReadError::Internal)?;
            self.decoded = Some(img.to_rgba8().into_raw().into_boxed_slice());
        }
        Ok(self.decoded.as_ref().unwrap())
    }
}

impl ImageProvider for WebpReader<'_> {
    fn size(&self) -> Vec3UI {
        Vec3UI::new(self.size.x, self.size.y, 1)
    }

    fn format(&self) -> Format {
        Format::R8G8B8A8Srgb
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

/// Probes the stream for a WebP image.
pub fn load_webp<'a>(stream: Box<dyn ReadStream + 'a>) -> ProbeResult<'a> {
    let mmap = map_probe_stream(stream)?;

    let probed = (|| {
        let decoder = WebPDecoder::new(Cursor::new(mmap.data()))
            .map_err(|_| ReadError::InvalidType)?;
        let (w, h) = decoder.dimensions();
        if w == 0 || h == 0 {
            return Err(ReadError::Empty);
        }
        Ok(Vec2UI::new(w, h))
    })();

    match probed {
        Ok(size) => Ok(Box::new(WebpReader {
            mmap,
            size,
            decoded: None,
        })),
        Err(error) => Err(ProbeError {
            error,
            stream: mmap.release(),
        }),
    }
}
