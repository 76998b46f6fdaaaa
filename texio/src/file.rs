use std::fs;
use std::path::Path;

use io_util::{
    FileReadStream,
    FileWriteStream,
};
use log::debug;

use crate::codecs::{
    write_exr,
    write_png,
};
use crate::image_provider::{
    load_image,
    load_image_layers,
    ImageProvider,
    MultiImageProvider,
    WriteError,
};
use crate::ktx::write_ktx;
use crate::ktx2::write_ktx2;

/// Reads the whole file at the given path.
pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<u8>> {
    fs::read(path)
}

/// Writes the given buffer to the file at the given path, replacing any
/// previous contents.
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}

/// Opens the file at the given path and dispatches on its extension and
/// content. Returns `None` when no backend accepts the file.
pub fn load_image_path<P: AsRef<Path>>(path: P) -> Option<Box<dyn ImageProvider + 'static>> {
    let path = path.as_ref();
    let stream = match FileReadStream::open(path) {
        Ok(stream) => stream,
        Err(e) => {
            debug!("open {:?}: {}", path, e);
            return None;
        }
    };

    let ext = path.to_str().unwrap_or("");
    load_image(Box::new(stream), ext)
}

/// Loads the images at the given paths and composes them as layers, or
/// as depth slices with `as_slices`. All images must match in size,
/// format and mip count; only their first layer is used.
pub fn load_image_layers_from_paths<P: AsRef<Path>>(
    paths: &[P],
    cubemap: bool,
    as_slices: bool,
) -> Option<MultiImageProvider<'static>> {
    let mut providers = Vec::with_capacity(paths.len());
    for path in paths {
        providers.push(load_image_path(path)?);
    }
    load_image_layers(providers, cubemap, as_slices)
}

/// Writes the image as a KTX file at the given path.
pub fn write_ktx_file<P: AsRef<Path>>(
    path: P,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    let mut stream =
        FileWriteStream::create(path).map_err(|_| WriteError::CantOpen)?;
    write_ktx(&mut stream, image)
}

/// Writes the image as a KTX2 file at the given path.
pub fn write_ktx2_file<P: AsRef<Path>>(
    path: P,
    image: &mut dyn ImageProvider,
    zlib: bool,
) -> Result<(), WriteError> {
    let mut stream =
        FileWriteStream::create(path).map_err(|_| WriteError::CantOpen)?;
    write_ktx2(&mut stream, image, zlib)
}

/// Writes the first 2D subresource of the image as a PNG file.
pub fn write_png_file<P: AsRef<Path>>(
    path: P,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    let mut stream =
        FileWriteStream::create(path).map_err(|_| WriteError::CantOpen)?;
    write_png(&mut stream, image)
}

/// Writes the first 2D subresource of the image as an EXR file.
pub fn write_exr_file<P: AsRef<Path>>(
    path: P,
    image: &mut dyn ImageProvider,
) -> Result<(), WriteError> {
    let mut stream =
        FileWriteStream::create(path).map_err(|_| WriteError::CantOpen)?;
    write_exr(&mut stream, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::image_provider::wrap_single;
    use crate::Vec3UI;

    #[test]
    fn test_missing_file_is_none() {
        assert!(load_image_path("/nonexistent/path/image.ktx").is_none());
    }

    #[test]
    fn test_file_roundtrip_through_ktx() {
        let dir = std::env::temp_dir().join("texio_file_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.ktx");

        let pixels = [7u8; 16];
        let mut provider =
            wrap_single(Vec3UI::new(2, 2, 1), Format::R8G8B8A8Unorm, &pixels);
        write_ktx_file(&path, &mut provider).unwrap();

        let mut read_back = load_image_path(&path).unwrap();
        assert_eq!(read_back.format(), Format::R8G8B8A8Unorm);
        assert_eq!(read_back.read(0, 0).unwrap(), &pixels[..]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_layered_load_from_paths() {
        let dir = std::env::temp_dir().join("texio_layers_test");
        fs::create_dir_all(&dir).unwrap();

        let mut paths = Vec::new();
        for i in 0..3u8 {
            let path = dir.join(format!("layer{}.ktx", i));
            let pixels = [i; 16];
            let mut provider =
                wrap_single(Vec3UI::new(2, 2, 1), Format::R8G8B8A8Unorm, &pixels);
            write_ktx_file(&path, &mut provider).unwrap();
            paths.push(path);
        }

        let mut slices = load_image_layers_from_paths(&paths, false, true).unwrap();
        assert_eq!(slices.size(), Vec3UI::new(2, 2, 3));
        let data = slices.read(0, 0).unwrap();
        assert_eq!(data.len(), 3 * 16);
        assert!(data[16..32].iter().all(|&b| b == 1));

        fs::remove_dir_all(&dir).ok();
    }
}
