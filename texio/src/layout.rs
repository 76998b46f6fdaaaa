use crate::format::Format;
use crate::Vec3UI;

/// Aligns `value` up to the given alignment. An alignment of zero leaves
/// the value unchanged; non-power-of-two alignments are allowed.
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if value == 0 || alignment == 0 {
        return value;
    }
    let rest = value % alignment;
    if rest == 0 {
        value
    } else {
        value + (alignment - rest)
    }
}

pub(crate) fn ceil_divide(num: u32, denom: u32) -> u32 {
    (num + denom - 1) / denom
}

/// The number of levels in a full mip chain for an image of the given
/// extent.
pub fn num_mip_levels(extent: Vec3UI) -> u32 {
    let m = extent.x.max(extent.y).max(extent.z).max(1);
    1 + m.ilog2()
}

/// The extent of the given mip level; every component stays >= 1.
pub fn mip_size(size: Vec3UI, level: u32) -> Vec3UI {
    if level >= 32 {
        return Vec3UI::new(1, 1, 1);
    }
    Vec3UI::new(
        (size.x >> level).max(1),
        (size.y >> level).max(1),
        (size.z >> level).max(1),
    )
}

/// The number of bytes needed to store a single face/layer of an image
/// with the given full (level 0) size and format, at the given mip level.
/// Block extents are folded in.
pub fn size_bytes(size: Vec3UI, mip: u32, format: Format) -> u64 {
    let m = mip_size(size, mip);
    let block = format.block_size();
    let w = ceil_divide(m.x, block.x) as u64;
    let h = ceil_divide(m.y, block.y) as u64;
    let d = ceil_divide(m.z, block.z) as u64;
    w * h * d * format.element_size() as u64
}

/// The texel number of (x, y, z) within a single layer of an image with
/// the given extent.
pub fn tight_layer_texel_number(extent: Vec3UI, x: u32, y: u32, z: u32) -> u64 {
    z as u64 * (extent.y as u64 * extent.x as u64) + y as u64 * extent.x as u64 + x as u64
}

/// The number of texels in the given subresource range of a tightly
/// packed, linear-layout image (mip-major, then layer, then z/y/x).
pub fn tight_texel_count(
    extent: Vec3UI,
    num_layers: u32,
    num_mips: u32,
    first_mip: u32,
) -> u64 {
    debug_assert!(first_mip + num_mips <= num_mip_levels(extent));

    let mut off = 0u64;
    for i in first_mip..first_mip + num_mips {
        let ie = mip_size(extent, i);
        off += ie.x as u64 * ie.y as u64 * ie.z as u64 * num_layers as u64;
    }
    off
}

/// The texel number of a given texel in a tightly packed, linear-layout
/// image, dimension order: mips, layers, depth, height, width. Multiply by
/// the format element size for the byte offset. `first_mip` is the mip
/// that starts at texel number 0; `mip` is absolute, not relative to it.
pub fn tight_texel_number(
    extent: Vec3UI,
    num_layers: u32,
    mip: u32,
    layer: u32,
    x: u32,
    y: u32,
    z: u32,
    first_mip: u32,
) -> u64 {
    debug_assert!(layer < num_layers);
    debug_assert!(mip < num_mip_levels(extent));
    debug_assert!(first_mip <= mip);

    let mut off = 0u64;
    for i in first_mip..mip {
        let ie = mip_size(extent, i);
        off += ie.x as u64 * ie.y as u64 * ie.z as u64 * num_layers as u64;
    }

    let ie = mip_size(extent, mip);
    let ltn = tight_layer_texel_number(ie, x, y, z);
    off + layer as u64 * (ie.x as u64 * ie.y as u64 * ie.z as u64) + ltn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(4, 4), 4);
        assert_eq!(align_up(5, 4), 8);
        assert_eq!(align_up(7, 0), 7);
        // non-power-of-two alignments
        assert_eq!(align_up(7, 6), 12);
        assert_eq!(align_up(12, 6), 12);
    }

    #[test]
    fn test_num_mip_levels() {
        assert_eq!(num_mip_levels(Vec3UI::new(1, 1, 1)), 1);
        assert_eq!(num_mip_levels(Vec3UI::new(2, 2, 1)), 2);
        assert_eq!(num_mip_levels(Vec3UI::new(1024, 4, 1)), 11);
        assert_eq!(num_mip_levels(Vec3UI::new(1023, 1, 1)), 10);
        assert_eq!(num_mip_levels(Vec3UI::new(1, 1, 64)), 7);
    }

    #[test]
    fn test_mip_size() {
        assert_eq!(mip_size(Vec3UI::new(16, 8, 1), 0), Vec3UI::new(16, 8, 1));
        assert_eq!(mip_size(Vec3UI::new(16, 8, 1), 2), Vec3UI::new(4, 2, 1));
        assert_eq!(mip_size(Vec3UI::new(16, 8, 1), 4), Vec3UI::new(1, 1, 1));
        assert_eq!(mip_size(Vec3UI::new(16, 8, 1), 31), Vec3UI::new(1, 1, 1));
    }

    #[test]
    fn test_size_bytes_folds_blocks() {
        use crate::format::Format;
        assert_eq!(size_bytes(Vec3UI::new(4, 2, 1), 0, Format::R8G8B8A8Unorm), 32);
        assert_eq!(size_bytes(Vec3UI::new(4, 2, 1), 1, Format::R8G8B8A8Unorm), 8);
        // one 4x4 BC7 block covers the whole 4x4 image and every mip below
        assert_eq!(size_bytes(Vec3UI::new(4, 4, 1), 0, Format::Bc7UnormBlock), 16);
        assert_eq!(size_bytes(Vec3UI::new(4, 4, 1), 1, Format::Bc7UnormBlock), 16);
        assert_eq!(size_bytes(Vec3UI::new(8, 8, 1), 0, Format::Bc7UnormBlock), 64);
    }

    #[test]
    fn test_tight_texel_number_orders_mips_then_layers() {
        let extent = Vec3UI::new(4, 4, 1);
        // layer stride inside mip 0
        assert_eq!(tight_texel_number(extent, 2, 0, 1, 0, 0, 0, 0), 16);
        // mip 1 starts after both layers of mip 0
        assert_eq!(tight_texel_number(extent, 2, 1, 0, 0, 0, 0, 0), 32);
        // x/y addressing inside one mip
        assert_eq!(tight_texel_number(extent, 2, 0, 0, 3, 2, 0, 0), 11);
        // first_mip re-bases the numbering
        assert_eq!(tight_texel_number(extent, 2, 1, 0, 0, 0, 0, 1), 0);
    }

    #[test]
    fn test_tight_texel_number_below_count() {
        let extent = Vec3UI::new(16, 8, 1);
        let layers = 3;
        let mips = num_mip_levels(extent);
        for first_mip in 0..mips {
            let count = tight_texel_count(extent, layers, mips - first_mip, first_mip);
            for mip in first_mip..mips {
                for layer in 0..layers {
                    let n =
                        tight_texel_number(extent, layers, mip, layer, 0, 0, 0, first_mip);
                    assert!(n < count);
                }
            }
        }
    }

    #[test]
    fn test_mip_chain_sum_bound() {
        // geometric-series bounds on the chain total: 8/7 of the base level
        // when all three dimensions halve, 4/3 for 2D, 2x in the worst case
        for size in [Vec3UI::new(64, 64, 64), Vec3UI::new(32, 32, 32)] {
            let mips = num_mip_levels(size);
            let total = tight_texel_count(size, 1, mips, 0);
            let base = size.x as u64 * size.y as u64 * size.z as u64;
            assert!(total * 7 <= base * 8);
        }
        for size in [
            Vec3UI::new(256, 256, 1),
            Vec3UI::new(512, 128, 1),
            Vec3UI::new(100, 7, 1),
            Vec3UI::new(1024, 1, 1),
        ] {
            let mips = num_mip_levels(size);
            let total = tight_texel_count(size, 1, mips, 0);
            let base = size.x as u64 * size.y as u64 * size.z as u64;
            assert!(total <= 2 * base);
        }
    }
}
