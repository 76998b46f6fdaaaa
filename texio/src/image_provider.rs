use std::fmt;
use std::io::{
    ErrorKind,
    Seek,
    SeekFrom,
};

use io_util::{
    FileReadStream,
    MemoryReadStream,
    ReadStream,
};
use log::{
    debug,
    warn,
};

use crate::format::Format;
use crate::layout::{
    mip_size,
    size_bytes,
    tight_texel_number,
};
use crate::Vec3UI;

/// Failure modes when opening or reading an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    CantOpen,
    /// The probe rejected the stream's signature.
    InvalidType,
    Internal,
    UnexpectedEnd,
    InvalidEndianness,
    /// Known format or feature this library does not implement.
    UnsupportedFormat,
    /// The image shape can't be represented by a provider.
    CantRepresent,
    /// Zero dimension or no parseable channels.
    Empty,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadError::CantOpen => "can't open",
            ReadError::InvalidType => "invalid type",
            ReadError::Internal => "internal error",
            ReadError::UnexpectedEnd => "unexpected end of stream",
            ReadError::InvalidEndianness => "invalid endianness",
            ReadError::UnsupportedFormat => "unsupported format",
            ReadError::CantRepresent => "can't represent image",
            ReadError::Empty => "empty image",
        };
        f.write_str(name)
    }
}

impl std::error::Error for ReadError {}

impl From<std::io::Error> for ReadError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::UnexpectedEof => ReadError::UnexpectedEnd,
            ErrorKind::NotFound | ErrorKind::PermissionDenied => ReadError::CantOpen,
            _ => ReadError::Internal,
        }
    }
}

/// Failure modes when writing an image through a container writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    CantOpen,
    CantWrite,
    /// The image provider failed reading or returned an unexpected size.
    ReadFailed,
    UnsupportedFormat,
    Internal,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteError::CantOpen => "can't open",
            WriteError::CantWrite => "can't write",
            WriteError::ReadFailed => "image provider read failed",
            WriteError::UnsupportedFormat => "unsupported format",
            WriteError::Internal => "internal error",
        };
        f.write_str(name)
    }
}

impl std::error::Error for WriteError {}

impl From<std::io::Error> for WriteError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => WriteError::CantOpen,
            _ => WriteError::CantWrite,
        }
    }
}

/// Provides information and data of an image.
///
/// Close to the Vulkan model of an image: layers and depth are separate
/// since mipmapping treats them differently. An image with depth > 1 has
/// exactly one layer.
///
/// Reads take `&mut self`: the borrow-returning `read` may reuse an
/// internal scratch buffer and file-backed providers advance a stream
/// cursor, so a provider is a single-threaded resource and a returned
/// span is only valid until the next call.
pub trait ImageProvider {
    /// The size of the image, every component >= 1.
    fn size(&self) -> Vec3UI;

    /// The format the data from `read` is in.
    fn format(&self) -> Format;

    /// The number of layers, always >= 1. For cubemaps a multiple of 6,
    /// with face i of cube j at layer `6j + i`.
    fn layers(&self) -> u32 {
        1
    }

    /// The number of mip levels, always >= 1.
    fn mip_levels(&self) -> u32 {
        1
    }

    /// Whether this image is a cubemap, to the best of the
    /// implementation's knowledge.
    fn cubemap(&self) -> bool {
        false
    }

    /// Reads one full, tightly packed image of the given mip and layer.
    /// Out-of-range arguments are contract violations.
    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError>;

    /// Copies one full, tightly packed image of the given mip and layer
    /// into `data`, which must be large enough; partial reads are not
    /// supported. Returns the number of bytes written.
    fn read_into(&mut self, data: &mut [u8], mip: u32, layer: u32)
        -> Result<u64, ReadError>;
}

/// A failed probe hands the stream back so the caller can try the next
/// probe at its leisure.
pub struct ProbeError<'a> {
    pub error: ReadError,
    pub stream: Box<dyn ReadStream + 'a>,
}

impl fmt::Debug for ProbeError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeError")
            .field("error", &self.error)
            .finish()
    }
}

pub type ProbeResult<'a> = Result<Box<dyn ImageProvider + 'a>, ProbeError<'a>>;

enum Storage<'a> {
    /// One owned heap block per (mip, layer), mip-major.
    Blocks(Vec<Box<[u8]>>),
    /// A single owned buffer in tight linear layout.
    Contiguous(Box<[u8]>),
    /// A single borrowed buffer in tight linear layout.
    ContiguousRef(&'a [u8]),
    /// One borrowed slice per (mip, layer), mip-major.
    SliceRefs(Vec<&'a [u8]>),
}

/// Image provider over in-memory subresources.
pub struct MemImageProvider<'a> {
    size: Vec3UI,
    format: Format,
    mips: u32,
    layers: u32,
    cubemap: bool,
    storage: Storage<'a>,
}

impl MemImageProvider<'_> {
    fn face_size(&self, mip: u32) -> u64 {
        size_bytes(self.size, mip, self.format)
    }

    fn subresource(&self, mip: u32, layer: u32) -> &[u8] {
        assert!(mip < self.mips && layer < self.layers);
        let byte_size = self.face_size(mip) as usize;
        let id = (mip * self.layers + layer) as usize;
        match &self.storage {
            Storage::Blocks(blocks) => &blocks[id][..byte_size],
            Storage::SliceRefs(slices) => &slices[id][..byte_size],
            Storage::Contiguous(data) => {
                let off = self.format.element_size() as u64
                    * tight_texel_number(self.size, self.layers, mip, layer, 0, 0, 0, 0);
                &data[off as usize..off as usize + byte_size]
            }
            Storage::ContiguousRef(data) => {
                let off = self.format.element_size() as u64
                    * tight_texel_number(self.size, self.layers, mip, layer, 0, 0, 0, 0);
                &data[off as usize..off as usize + byte_size]
            }
        }
    }
}

impl ImageProvider for MemImageProvider<'_> {
    fn size(&self) -> Vec3UI {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn layers(&self) -> u32 {
        self.layers
    }

    fn mip_levels(&self) -> u32 {
        self.mips
    }

    fn cubemap(&self) -> bool {
        self.cubemap
    }

    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError> {
        Ok(self.subresource(mip, layer))
    }

    fn read_into(
        &mut self,
        data: &mut [u8],
        mip: u32,
        layer: u32,
    ) -> Result<u64, ReadError> {
        let src = self.subresource(mip, layer);
        assert!(data.len() >= src.len());
        let len = src.len();
        data[..len].copy_from_slice(src);
        Ok(len as u64)
    }
}

fn check_shape(size: Vec3UI, mips: u32, layers: u32, cubemap: bool) {
    assert!(size.x >= 1 && size.y >= 1 && size.z >= 1);
    assert!(mips >= 1);
    assert!(layers >= 1);
    assert!(size.z == 1 || layers == 1);
    assert!(!cubemap || layers % 6 == 0);
}

// Tight texel numbering is texel-granular, so the contiguous wrappers
// only address formats without a block extent.
fn check_linear_addressable(format: Format) {
    debug_assert_eq!(format.block_size(), Vec3UI::new(1, 1, 1));
}

/// Wraps a single flat buffer as a one-mip, one-layer image. The buffer
/// is only referenced and must outlive the provider.
pub fn wrap_single(size: Vec3UI, format: Format, data: &[u8]) -> MemImageProvider<'_> {
    check_shape(size, 1, 1, false);
    assert!(data.len() as u64 >= size_bytes(size, 0, format));

    MemImageProvider {
        size,
        format,
        mips: 1,
        layers: 1,
        cubemap: false,
        storage: Storage::ContiguousRef(data),
    }
}

/// Wraps per-subresource heap blocks, ordered mip-major (the block for
/// mip m, layer l sits at `m * layers + l`).
pub fn wrap_blocks(
    size: Vec3UI,
    format: Format,
    mips: u32,
    layers: u32,
    data: Vec<Box<[u8]>>,
    cubemap: bool,
) -> MemImageProvider<'static> {
    check_shape(size, mips, layers, cubemap);
    assert_eq!(data.len() as u64, mips as u64 * layers as u64);

    MemImageProvider {
        size,
        format,
        mips,
        layers,
        cubemap,
        storage: Storage::Blocks(data),
    }
}

/// Wraps one contiguous buffer in tight linear layout, taking ownership.
pub fn wrap_contiguous(
    size: Vec3UI,
    format: Format,
    mips: u32,
    layers: u32,
    data: Box<[u8]>,
    cubemap: bool,
) -> MemImageProvider<'static> {
    check_shape(size, mips, layers, cubemap);
    check_linear_addressable(format);

    MemImageProvider {
        size,
        format,
        mips,
        layers,
        cubemap,
        storage: Storage::Contiguous(data),
    }
}

/// Wraps one contiguous buffer in tight linear layout by reference.
pub fn wrap_contiguous_ref(
    size: Vec3UI,
    format: Format,
    mips: u32,
    layers: u32,
    data: &[u8],
    cubemap: bool,
) -> MemImageProvider<'_> {
    check_shape(size, mips, layers, cubemap);
    check_linear_addressable(format);

    MemImageProvider {
        size,
        format,
        mips,
        layers,
        cubemap,
        storage: Storage::ContiguousRef(data),
    }
}

/// Wraps a list of per-subresource slices, ordered mip-major.
pub fn wrap_slices<'a>(
    size: Vec3UI,
    format: Format,
    mips: u32,
    layers: u32,
    data: Vec<&'a [u8]>,
    cubemap: bool,
) -> MemImageProvider<'a> {
    check_shape(size, mips, layers, cubemap);
    assert_eq!(data.len() as u64, mips as u64 * layers as u64);

    MemImageProvider {
        size,
        format,
        mips,
        layers,
        cubemap,
        storage: Storage::SliceRefs(data),
    }
}

/// Eagerly read, single-subresource snapshot of an image.
pub struct ImageData {
    pub size: Vec3UI,
    pub format: Format,
    pub data: Box<[u8]>,
}

/// Reads one mip/layer of the given provider into memory.
pub fn read_image_data(
    provider: &mut dyn ImageProvider,
    mip: u32,
    layer: u32,
) -> Result<ImageData, ReadError> {
    if provider.layers() > 1 {
        debug!("read_image_data: discarding {} layers", provider.layers() - 1);
    }
    if provider.mip_levels() > 1 {
        debug!(
            "read_image_data: discarding {} mip levels",
            provider.mip_levels() - 1
        );
    }

    let format = provider.format();
    let size = mip_size(provider.size(), mip);
    let byte_size = size_bytes(provider.size(), mip, format);
    let mut data = vec![0u8; byte_size as usize];
    let read = provider.read_into(&mut data, mip, layer)?;
    debug_assert_eq!(read, byte_size);

    Ok(ImageData {
        size,
        format,
        data: data.into_boxed_slice(),
    })
}

/// Turns an `ImageData` into a provider, taking ownership of the pixels.
pub fn wrap_image_data(image: ImageData) -> MemImageProvider<'static> {
    check_shape(image.size, 1, 1, false);

    MemImageProvider {
        size: image.size,
        format: image.format,
        mips: 1,
        layers: 1,
        cubemap: false,
        storage: Storage::Contiguous(image.data),
    }
}

/// Aggregates several providers into one image, either stacking their
/// first layers or concatenating them as depth slices.
pub struct MultiImageProvider<'a> {
    providers: Vec<Box<dyn ImageProvider + 'a>>,
    as_slices: bool,
    mips: u32,
    cubemap: bool,
    size: Vec3UI,
    format: Format,
    scratch: Vec<u8>,
}

impl ImageProvider for MultiImageProvider<'_> {
    fn size(&self) -> Vec3UI {
        self.size
    }

    fn format(&self) -> Format {
        self.format
    }

    fn layers(&self) -> u32 {
        if self.as_slices {
            1
        } else {
            self.providers.len() as u32
        }
    }

    fn mip_levels(&self) -> u32 {
        self.mips
    }

    fn cubemap(&self) -> bool {
        self.cubemap
    }

    fn read(&mut self, mip: u32, layer: u32) -> Result<&[u8], ReadError> {
        if self.as_slices {
            // every mip keeps all slices, only width and height shrink
            let m = mip_size(Vec3UI::new(self.size.x, self.size.y, 1), mip);
            let byte_size = self.size.z as u64
                * m.x as u64
                * m.y as u64
                * self.format.element_size() as u64;
            let mut buf = std::mem::take(&mut self.scratch);
            buf.resize(byte_size as usize, 0u8);
            let res = self.read_into(&mut buf, mip, layer);
            self.scratch = buf;
            res?;
            Ok(&self.scratch)
        } else {
            assert!(mip < self.mips && (layer as usize) < self.providers.len());
            self.providers[layer as usize].read(mip, 0)
        }
    }

    fn read_into(
        &mut self,
        data: &mut [u8],
        mip: u32,
        layer: u32,
    ) -> Result<u64, ReadError> {
        if self.as_slices {
            assert!(mip < self.mips && layer == 0);
            debug_assert_eq!(self.size.z as usize, self.providers.len());

            let m = mip_size(Vec3UI::new(self.size.x, self.size.y, 1), mip);
            let slice_size =
                m.x as u64 * m.y as u64 * self.format.element_size() as u64;
            assert!(data.len() as u64 >= self.size.z as u64 * slice_size);

            let mut written = 0u64;
            for z in 0..self.size.z as usize {
                let off = z as u64 * slice_size;
                written += self.providers[z]
                    .read_into(&mut data[off as usize..(off + slice_size) as usize], mip, 0)?;
            }
            Ok(written)
        } else {
            assert!(mip < self.mips && (layer as usize) < self.providers.len());
            self.providers[layer as usize].read_into(data, mip, 0)
        }
    }
}

/// Composes providers as layers (or depth slices with `as_slices`). All
/// providers must agree in size, format and mip count, and none may have
/// depth > 1. Returns `None` when the shapes don't line up.
pub fn load_image_layers<'a>(
    providers: Vec<Box<dyn ImageProvider + 'a>>,
    cubemap: bool,
    as_slices: bool,
) -> Option<MultiImageProvider<'a>> {
    let first = providers.first()?;
    let format = first.format();
    let mut size = first.size();
    let mips = first.mip_levels();

    if size.z > 1 {
        warn!("layered image: sub-image has depth {}, not allowed", size.z);
        return None;
    }

    for (i, provider) in providers.iter().enumerate() {
        if provider.size() != size {
            warn!(
                "layered image: layer {} has size {:?}, expected {:?}",
                i,
                provider.size(),
                size
            );
            return None;
        }
        if provider.format() != format {
            warn!(
                "layered image: layer {} has format {:?}, expected {:?}",
                i,
                provider.format(),
                format
            );
            return None;
        }
        if provider.mip_levels() != mips {
            warn!(
                "layered image: layer {} has {} mips, expected {}",
                i,
                provider.mip_levels(),
                mips
            );
            return None;
        }
        if provider.layers() > 1 {
            debug!(
                "layered image: {} layers of sub-image {} are inaccessible",
                provider.layers() - 1,
                i
            );
        }
    }

    assert!(!cubemap || providers.len() % 6 == 0);

    if as_slices {
        size.z = providers.len() as u32;
    }

    Some(MultiImageProvider {
        providers,
        as_slices,
        mips,
        cubemap,
        size,
        format,
        scratch: Vec::new(),
    })
}

type LoaderFn<'a> = fn(Box<dyn ReadStream + 'a>) -> ProbeResult<'a>;

fn has_suffix_ci(ext: &str, suffix: &str) -> bool {
    ext.to_ascii_lowercase().ends_with(suffix)
}

/// Finds the matching backend for the image in the given stream.
///
/// `ext` may carry a filename or extension hint; the hinted probe runs
/// first, but all probes are tried before giving up. Every probe returns
/// the stream unconsumed on failure so the next one can reseek to 0.
pub fn load_image<'a>(
    stream: Box<dyn ReadStream + 'a>,
    ext: &str,
) -> Option<Box<dyn ImageProvider + 'a>> {
    let mut loaders: [(&[&str], LoaderFn<'a>, bool); 7] = [
        (&[".ktx"], crate::ktx::load_ktx, false),
        (&[".ktx2"], crate::ktx2::load_ktx2, false),
        (&[".png"], crate::codecs::png::load_png, false),
        (&[".jpg", ".jpeg"], crate::codecs::jpeg::load_jpeg, false),
        (&[".exr"], crate::codecs::exr::load_exr_rgba, false),
        (&[".webp"], crate::codecs::webp::load_webp, false),
        (
            &[".hdr", ".tga", ".bmp", ".psd", ".gif"],
            crate::codecs::fallback::load_fallback,
            false,
        ),
    ];

    let mut stream = stream;

    if !ext.is_empty() {
        for (exts, loader, tried) in loaders.iter_mut() {
            if !exts.iter().any(|&e| has_suffix_ci(ext, e)) {
                continue;
            }
            *tried = true;
            match loader(stream) {
                Ok(provider) => return Some(provider),
                Err(probe) => {
                    debug!("probe for {:?} failed: {}", exts, probe.error);
                    stream = probe.stream;
                }
            }
            break;
        }
    }

    for (exts, loader, tried) in loaders.iter() {
        if *tried {
            continue;
        }
        if stream.seek(SeekFrom::Start(0)).is_err() {
            return None;
        }
        match loader(stream) {
            Ok(provider) => return Some(provider),
            Err(probe) => {
                debug!("probe for {:?} failed: {}", exts, probe.error);
                stream = probe.stream;
            }
        }
    }

    None
}

/// Loads an image from an in-memory buffer.
pub fn load_image_memory(data: &[u8]) -> Option<Box<dyn ImageProvider + '_>> {
    load_image(Box::new(MemoryReadStream::new(data)), "")
}

/// Loads an image from an already opened file.
pub fn load_image_file(file: std::fs::File) -> Option<Box<dyn ImageProvider + 'static>> {
    load_image(Box::new(FileReadStream::new(file)), "")
}
