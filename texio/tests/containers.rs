use io_util::{
    MemoryReadStream,
    MemoryWriteStream,
    ReadStream,
};
use texio::{
    e5b9g9r9_from_rgb,
    e5b9g9r9_to_rgb,
    load_image,
    load_image_layers,
    load_ktx,
    load_ktx2,
    read_texel,
    size_bytes,
    wrap_blocks,
    wrap_single,
    write_ktx,
    write_ktx2,
    write_texel,
    Format,
    ImageProvider,
    Vec3F,
    Vec3UI,
    Vec4D,
};

#[test]
fn rgba8_ktx_roundtrip() {
    // 4x2 rgba image of alternating pixels 00 FF 00 FF / FF 00 FF 00
    let mut pixels = Vec::new();
    for i in 0..8 {
        if i % 2 == 0 {
            pixels.extend_from_slice(&[0x00, 0xFF, 0x00, 0xFF]);
        } else {
            pixels.extend_from_slice(&[0xFF, 0x00, 0xFF, 0x00]);
        }
    }
    let mut provider = wrap_single(Vec3UI::new(4, 2, 1), Format::R8G8B8A8Unorm, &pixels);

    let mut out = MemoryWriteStream::new();
    write_ktx(&mut out, &mut provider).unwrap();
    let bytes = out.into_inner();

    let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
    let mut read_back = load_ktx(stream).unwrap();
    assert_eq!(read_back.size(), Vec3UI::new(4, 2, 1));
    assert_eq!(read_back.format(), Format::R8G8B8A8Unorm);
    assert_eq!(read_back.mip_levels(), 1);
    assert_eq!(read_back.layers(), 1);
    assert_eq!(read_back.read(0, 0).unwrap(), &pixels[..]);
}

fn cubemap_provider() -> texio::MemImageProvider<'static> {
    let size = Vec3UI::new(4, 4, 1);
    let mips = 3;
    let layers = 6;
    let mut blocks = Vec::new();
    for m in 0..mips {
        for f in 0..layers {
            let byte_size = size_bytes(size, m, Format::R8G8B8A8Unorm) as usize;
            blocks.push(vec![(0x20 * m + f + 1) as u8; byte_size].into_boxed_slice());
        }
    }
    wrap_blocks(size, Format::R8G8B8A8Unorm, mips, layers, blocks, true)
}

#[test]
fn ktx2_cubemap_with_mips() {
    let mut provider = cubemap_provider();

    let mut out = MemoryWriteStream::new();
    write_ktx2(&mut out, &mut provider, false).unwrap();
    let bytes = out.into_inner();

    let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
    let mut read_back = load_ktx2(stream).unwrap();
    assert_eq!(read_back.size(), Vec3UI::new(4, 4, 1));
    assert_eq!(read_back.mip_levels(), 3);
    assert_eq!(read_back.layers(), 6);
    assert!(read_back.cubemap());

    for m in 0..3 {
        for f in 0..6 {
            let expected = (0x20 * m + f + 1) as u8;
            let data = read_back.read(m, f).unwrap();
            assert!(
                data.iter().all(|&b| b == expected),
                "mip {} face {}",
                m,
                f
            );
        }
    }
}

#[test]
fn ktx2_zlib_matches_uncompressed() {
    let mut provider = cubemap_provider();
    let mut plain = MemoryWriteStream::new();
    write_ktx2(&mut plain, &mut provider, false).unwrap();
    let plain = plain.into_inner();

    let mut zlibbed = MemoryWriteStream::new();
    write_ktx2(&mut zlibbed, &mut provider, true).unwrap();
    let zlibbed = zlibbed.into_inner();

    let mut a = load_ktx2(Box::new(MemoryReadStream::new(&plain))).unwrap();
    let mut b = load_ktx2(Box::new(MemoryReadStream::new(&zlibbed))).unwrap();

    assert_eq!(a.size(), b.size());
    assert_eq!(a.format(), b.format());
    assert_eq!(a.mip_levels(), b.mip_levels());
    assert_eq!(a.layers(), b.layers());
    for m in 0..a.mip_levels() {
        for l in 0..a.layers() {
            assert_eq!(a.read(m, l).unwrap(), b.read(m, l).unwrap());
        }
    }
}

#[test]
fn srgb_transfer_mid_gray() {
    let mut bytes = Vec::new();
    write_texel(
        Format::R8G8B8A8Srgb,
        &mut bytes,
        Vec4D::new(0.5, 0.5, 0.5, 1.0),
    )
    .unwrap();
    assert_eq!(bytes[0], 188);

    let back = read_texel(Format::R8G8B8A8Srgb, &mut &bytes[..]).unwrap();
    for i in 0..3 {
        assert!((back[i] - 0.5).abs() <= 1.0 / 255.0);
    }
}

#[test]
fn shared_exponent_hdr() {
    let word = e5b9g9r9_from_rgb(Vec3F::new(1.0, 2.0, 4.0));
    let rgb = e5b9g9r9_to_rgb(word);
    assert!((rgb.x - 1.0).abs() < 0.01);
    assert!((rgb.y - 2.0).abs() / 2.0 < 0.01);
    assert!((rgb.z - 4.0).abs() / 4.0 < 0.01);

    let rgb = e5b9g9r9_to_rgb(e5b9g9r9_from_rgb(Vec3F::new(0.0, 0.0, 0.0)));
    assert_eq!((rgb.x, rgb.y, rgb.z), (0.0, 0.0, 0.0));
}

#[test]
fn aggregator_as_slices() {
    let size = Vec3UI::new(16, 16, 1);
    let byte_size = size_bytes(size, 0, Format::R8G8B8A8Unorm) as usize;
    let buffers: Vec<Vec<u8>> = (0..3).map(|i| vec![0x30 + i as u8; byte_size]).collect();

    let providers: Vec<Box<dyn ImageProvider + '_>> = buffers
        .iter()
        .map(|b| {
            Box::new(wrap_single(size, Format::R8G8B8A8Unorm, b))
                as Box<dyn ImageProvider + '_>
        })
        .collect();

    let mut multi = load_image_layers(providers, false, true).unwrap();
    assert_eq!(multi.size(), Vec3UI::new(16, 16, 3));
    assert_eq!(multi.layers(), 1);
    assert_eq!(multi.mip_levels(), 1);

    let data = multi.read(0, 0).unwrap();
    assert_eq!(data.len(), 3 * byte_size);
    for (i, chunk) in data.chunks(byte_size).enumerate() {
        assert!(chunk.iter().all(|&b| b == 0x30 + i as u8));
    }
}

#[test]
fn dispatcher_ignores_misleading_extension() {
    let mut provider = cubemap_provider();
    let mut out = MemoryWriteStream::new();
    write_ktx2(&mut out, &mut provider, false).unwrap();
    let bytes = out.into_inner();

    for ext in ["", "cube.ktx2", "cube.ktx", "cube.png", "whatever.webp"] {
        let provider = load_image(Box::new(MemoryReadStream::new(&bytes)), ext)
            .unwrap_or_else(|| panic!("dispatch failed for ext {:?}", ext));
        assert_eq!(provider.format(), Format::R8G8B8A8Unorm);
        assert_eq!(provider.layers(), 6);
    }
}

#[test]
fn ktx_non_array_cubemap_image_size_exception() {
    let mut provider = cubemap_provider();
    let mut out = MemoryWriteStream::new();
    write_ktx(&mut out, &mut provider).unwrap();
    let bytes = out.into_inner();

    // imageSize of the base level sits right after the 64-byte header and
    // holds the bytes of a single face for a non-array cubemap
    let image_size = u32::from_le_bytes(bytes[64..68].try_into().unwrap());
    assert_eq!(image_size, 4 * 4 * 4);

    let stream: Box<dyn ReadStream> = Box::new(MemoryReadStream::new(&bytes));
    let mut read_back = load_ktx(stream).unwrap();
    assert!(read_back.cubemap());
    assert_eq!(read_back.layers(), 6);
    for m in 0..3 {
        for f in 0..6 {
            let expected = (0x20 * m + f + 1) as u8;
            assert!(read_back.read(m, f).unwrap().iter().all(|&b| b == expected));
        }
    }
}
