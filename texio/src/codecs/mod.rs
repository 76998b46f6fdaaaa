//! Thin adapters around third-party decoders. Each adapter maps the
//! stream into memory, probes the header without consuming the stream on
//! failure, and exposes the decoded pixels through `ImageProvider` in a
//! catalogue format.

pub mod exr;
pub mod fallback;
pub mod jpeg;
pub mod png;
pub mod webp;

pub use self::exr::{
    load_exr,
    load_exr_rgba,
    write_exr,
};
pub use self::fallback::load_fallback;
pub use self::jpeg::load_jpeg;
pub use self::png::{
    load_png,
    write_png,
};
pub use self::webp::load_webp;

use io_util::{
    ReadStream,
    ReadStreamMemoryMap,
};

use crate::image_provider::{
    ProbeError,
    ReadError,
};

/// Maps the probe stream into memory, or fails the probe while handing
/// the stream back.
pub(crate) fn map_probe_stream<'a>(
    stream: Box<dyn ReadStream + 'a>,
) -> Result<ReadStreamMemoryMap<'a>, ProbeError<'a>> {
    ReadStreamMemoryMap::new(stream).map_err(|stream| ProbeError {
        error: ReadError::Internal,
        stream,
    })
}

pub(crate) fn u16_bytes(samples: Vec<u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

pub(crate) fn f32_bytes(samples: Vec<f32>) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}
