use std::io::{
    Read,
    Result as IOResult,
    Write,
};

use byteorder::{
    LittleEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use half::f16;

use crate::format::{
    linear_to_srgb_vec,
    srgb_to_linear_vec,
    Format,
};
use crate::image_provider::{
    ReadError,
    WriteError,
};
use crate::Vec3F;
use crate::Vec4D;

#[derive(Debug, Clone, Copy)]
enum Scalar {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F16,
    F32,
    F64,
}

impl Scalar {
    fn is_float(self) -> bool {
        matches!(self, Scalar::F16 | Scalar::F32 | Scalar::F64)
    }
}

/// How one texel of a format maps onto bytes.
#[derive(Debug, Clone, Copy)]
enum Codec {
    /// `n` consecutive scalars, each divided by `fac` on read.
    /// `fac` is 1 for integer and float formats.
    Vector {
        n: usize,
        scalar: Scalar,
        fac: f64,
        snorm: bool,
    },
    /// Bit fields sharing one word, most significant field first.
    Packed {
        word_bits: u32,
        bits: &'static [u32],
        norm: bool,
        signed: bool,
    },
    D16S8,
    D24S8,
    X8D24,
    D32S8,
    E5B9G9R9,
}

const fn vector(n: usize, scalar: Scalar, fac: f64) -> Codec {
    Codec::Vector {
        n,
        scalar,
        fac,
        snorm: false,
    }
}

const fn vector_snorm(n: usize, scalar: Scalar, fac: f64) -> Codec {
    Codec::Vector {
        n,
        scalar,
        fac,
        snorm: true,
    }
}

const fn packed(word_bits: u32, bits: &'static [u32], norm: bool, signed: bool) -> Codec {
    Codec::Packed {
        word_bits,
        bits,
        norm,
        signed,
    }
}

// The sRGB transfer is applied outside of the codec, after swizzling, so
// an sRGB format shares its codec with the unorm twin.
fn codec_for(format: Format) -> Option<Codec> {
    use Format::*;
    use Scalar::*;
    Some(match format {
        R16Sfloat => vector(1, F16, 1.0),
        R16G16Sfloat => vector(2, F16, 1.0),
        R16G16B16Sfloat => vector(3, F16, 1.0),
        R16G16B16A16Sfloat => vector(4, F16, 1.0),

        R32Sfloat => vector(1, F32, 1.0),
        R32G32Sfloat => vector(2, F32, 1.0),
        R32G32B32Sfloat => vector(3, F32, 1.0),
        R32G32B32A32Sfloat => vector(4, F32, 1.0),

        R64Sfloat => vector(1, F64, 1.0),
        R64G64Sfloat => vector(2, F64, 1.0),
        R64G64B64Sfloat => vector(3, F64, 1.0),
        R64G64B64A64Sfloat => vector(4, F64, 1.0),

        R8Unorm | R8Srgb => vector(1, U8, 255.0),
        R8G8Unorm | R8G8Srgb => vector(2, U8, 255.0),
        R8G8B8Unorm | R8G8B8Srgb | B8G8R8Unorm | B8G8R8Srgb => vector(3, U8, 255.0),
        R8G8B8A8Unorm | R8G8B8A8Srgb | B8G8R8A8Unorm | B8G8R8A8Srgb => {
            vector(4, U8, 255.0)
        }

        R16Unorm => vector(1, U16, 65535.0),
        R16G16Unorm => vector(2, U16, 65535.0),
        R16G16B16Unorm => vector(3, U16, 65535.0),
        R16G16B16A16Unorm => vector(4, U16, 65535.0),

        R8Snorm => vector_snorm(1, I8, 127.0),
        R8G8Snorm => vector_snorm(2, I8, 127.0),
        R8G8B8Snorm | B8G8R8Snorm => vector_snorm(3, I8, 127.0),
        R8G8B8A8Snorm | B8G8R8A8Snorm => vector_snorm(4, I8, 127.0),

        R16Snorm => vector_snorm(1, I16, 32767.0),
        R16G16Snorm => vector_snorm(2, I16, 32767.0),
        R16G16B16Snorm => vector_snorm(3, I16, 32767.0),
        R16G16B16A16Snorm => vector_snorm(4, I16, 32767.0),

        R8Uscaled | R8Uint => vector(1, U8, 1.0),
        R8G8Uscaled | R8G8Uint => vector(2, U8, 1.0),
        R8G8B8Uscaled | R8G8B8Uint | B8G8R8Uscaled | B8G8R8Uint => vector(3, U8, 1.0),
        R8G8B8A8Uscaled | R8G8B8A8Uint | B8G8R8A8Uscaled | B8G8R8A8Uint => {
            vector(4, U8, 1.0)
        }

        R16Uscaled | R16Uint => vector(1, U16, 1.0),
        R16G16Uscaled | R16G16Uint => vector(2, U16, 1.0),
        R16G16B16Uscaled | R16G16B16Uint => vector(3, U16, 1.0),
        R16G16B16A16Uscaled | R16G16B16A16Uint => vector(4, U16, 1.0),

        R32Uint => vector(1, U32, 1.0),
        R32G32Uint => vector(2, U32, 1.0),
        R32G32B32Uint => vector(3, U32, 1.0),
        R32G32B32A32Uint => vector(4, U32, 1.0),

        R8Sscaled | R8Sint => vector(1, I8, 1.0),
        R8G8Sscaled | R8G8Sint => vector(2, I8, 1.0),
        R8G8B8Sscaled | R8G8B8Sint | B8G8R8Sscaled | B8G8R8Sint => vector(3, I8, 1.0),
        R8G8B8A8Sscaled | R8G8B8A8Sint | B8G8R8A8Sscaled | B8G8R8A8Sint => {
            vector(4, I8, 1.0)
        }

        R16Sscaled | R16Sint => vector(1, I16, 1.0),
        R16G16Sscaled | R16G16Sint => vector(2, I16, 1.0),
        R16G16B16Sscaled | R16G16B16Sint => vector(3, I16, 1.0),
        R16G16B16A16Sscaled | R16G16B16A16Sint => vector(4, I16, 1.0),

        R32Sint => vector(1, I32, 1.0),
        R32G32Sint => vector(2, I32, 1.0),
        R32G32B32Sint => vector(3, I32, 1.0),
        R32G32B32A32Sint => vector(4, I32, 1.0),

        // NOTE: precision for 64-bit integer formats can be problematic
        R64Uint => vector(1, U64, 1.0),
        R64G64Uint => vector(2, U64, 1.0),
        R64G64B64Uint => vector(3, U64, 1.0),
        R64G64B64A64Uint => vector(4, U64, 1.0),
        R64Sint => vector(1, I64, 1.0),
        R64G64Sint => vector(2, I64, 1.0),
        R64G64B64Sint => vector(3, I64, 1.0),
        R64G64B64A64Sint => vector(4, I64, 1.0),

        R4G4UnormPack8 => packed(8, &[4, 4], true, false),
        R5G5B5A1UnormPack16 | B5G5R5A1UnormPack16 => packed(16, &[5, 5, 5, 1], true, false),
        A1R5G5B5UnormPack16 => packed(16, &[1, 5, 5, 5], true, false),
        R5G6B5UnormPack16 | B5G6R5UnormPack16 => packed(16, &[5, 6, 5], true, false),
        R4G4B4A4UnormPack16 | B4G4R4A4UnormPack16 | A4R4G4B4UnormPack16
        | A4B4G4R4UnormPack16 => packed(16, &[4, 4, 4, 4], true, false),

        A8B8G8R8UnormPack32 | A8B8G8R8SrgbPack32 => packed(32, &[8, 8, 8, 8], true, false),
        A8B8G8R8SnormPack32 => packed(32, &[8, 8, 8, 8], true, true),
        A8B8G8R8UintPack32 | A8B8G8R8UscaledPack32 => packed(32, &[8, 8, 8, 8], false, false),
        A8B8G8R8SintPack32 | A8B8G8R8SscaledPack32 => packed(32, &[8, 8, 8, 8], false, true),

        A2R10G10B10UnormPack32 | A2B10G10R10UnormPack32 => {
            packed(32, &[2, 10, 10, 10], true, false)
        }
        A2R10G10B10SnormPack32 | A2B10G10R10SnormPack32 => {
            packed(32, &[2, 10, 10, 10], true, true)
        }
        A2R10G10B10UintPack32 | A2B10G10R10UintPack32 | A2R10G10B10UscaledPack32
        | A2B10G10R10UscaledPack32 => packed(32, &[2, 10, 10, 10], false, false),
        A2R10G10B10SintPack32 | A2B10G10R10SintPack32 | A2R10G10B10SscaledPack32
        | A2B10G10R10SscaledPack32 => packed(32, &[2, 10, 10, 10], false, true),

        S8Uint => vector(1, U8, 1.0),
        D16Unorm => vector(1, U16, 65535.0),
        D32Sfloat => vector(1, F32, 1.0),
        D16UnormS8Uint => Codec::D16S8,
        D24UnormS8Uint => Codec::D24S8,
        X8D24UnormPack32 => Codec::X8D24,
        D32SfloatS8Uint => Codec::D32S8,

        E5B9G9R9UfloatPack32 => Codec::E5B9G9R9,

        // b10g11r11, block-compressed and multi-planar formats have no
        // per-texel codec
        _ => return None,
    })
}

fn read_scalar<R: Read>(scalar: Scalar, r: &mut R) -> IOResult<f64> {
    Ok(match scalar {
        Scalar::U8 => r.read_u8()? as f64,
        Scalar::I8 => r.read_i8()? as f64,
        Scalar::U16 => r.read_u16::<LittleEndian>()? as f64,
        Scalar::I16 => r.read_i16::<LittleEndian>()? as f64,
        Scalar::U32 => r.read_u32::<LittleEndian>()? as f64,
        Scalar::I32 => r.read_i32::<LittleEndian>()? as f64,
        Scalar::U64 => r.read_u64::<LittleEndian>()? as f64,
        Scalar::I64 => r.read_i64::<LittleEndian>()? as f64,
        Scalar::F16 => f16::from_bits(r.read_u16::<LittleEndian>()?).to_f64(),
        Scalar::F32 => r.read_f32::<LittleEndian>()? as f64,
        Scalar::F64 => r.read_f64::<LittleEndian>()?,
    })
}

fn write_scalar<W: Write>(scalar: Scalar, w: &mut W, v: f64) -> IOResult<()> {
    match scalar {
        Scalar::U8 => w.write_u8(v as u8),
        Scalar::I8 => w.write_i8(v as i8),
        Scalar::U16 => w.write_u16::<LittleEndian>(v as u16),
        Scalar::I16 => w.write_i16::<LittleEndian>(v as i16),
        Scalar::U32 => w.write_u32::<LittleEndian>(v as u32),
        Scalar::I32 => w.write_i32::<LittleEndian>(v as i32),
        Scalar::U64 => w.write_u64::<LittleEndian>(v as u64),
        Scalar::I64 => w.write_i64::<LittleEndian>(v as i64),
        Scalar::F16 => w.write_u16::<LittleEndian>(f16::from_f64(v).to_bits()),
        Scalar::F32 => w.write_f32::<LittleEndian>(v as f32),
        Scalar::F64 => w.write_f64::<LittleEndian>(v),
    }
}

fn read_packed_word<R: Read>(word_bits: u32, r: &mut R) -> IOResult<u32> {
    Ok(match word_bits {
        8 => r.read_u8()? as u32,
        16 => r.read_u16::<LittleEndian>()? as u32,
        _ => r.read_u32::<LittleEndian>()?,
    })
}

fn write_packed_word<W: Write>(word_bits: u32, w: &mut W, word: u32) -> IOResult<()> {
    match word_bits {
        8 => w.write_u8(word as u8),
        16 => w.write_u16::<LittleEndian>(word as u16),
        _ => w.write_u32::<LittleEndian>(word),
    }
}

// Fields are laid out most-significant-first in declaration order, so the
// last declared field sits in the lowest bits.
fn unpack_fields(mut word: u32, bits: &[u32], norm: bool, signed: bool) -> Vec4D {
    let mut out = Vec4D::new(0.0, 0.0, 0.0, 0.0);
    for (i, &b) in bits.iter().enumerate().rev() {
        let limit = 1u32 << b;
        let mask = limit - 1;
        let raw = (word & mask) as f64;
        word >>= b;

        let mut v = raw;
        if signed {
            v -= (limit >> 1) as f64;
        }
        if norm {
            let denom = if signed { (limit >> 1) - 1 } else { mask };
            v /= denom as f64;
            if signed {
                v = v.max(-1.0);
            }
        }
        out[i] = v;
    }
    out
}

fn pack_fields(color: Vec4D, bits: &[u32], norm: bool, signed: bool) -> u32 {
    let mut word = 0u32;
    for (i, &b) in bits.iter().enumerate() {
        let limit = 1u32 << b;
        let mask = limit - 1;
        let half = (limit >> 1) as f64;
        let v = color[i];

        let raw = if signed {
            let scaled = if norm { v * (half - 1.0) } else { v };
            (scaled.round() + half).max(0.0) as u32
        } else if norm {
            (v * mask as f64).round().max(0.0) as u32
        } else {
            v.round().max(0.0) as u32
        };

        word = (word << b) | (raw & mask);
    }
    word
}

// Component orders that need normalizing into rgba. The a8b8g8r8 and
// a2b10g10r10 words unpack in name order, so they reverse; a2r10g10b10
// and friends rotate.
fn is_bgra_order(format: Format) -> bool {
    use Format::*;
    matches!(
        format,
        B8G8R8Unorm
            | B8G8R8Snorm
            | B8G8R8Uscaled
            | B8G8R8Sscaled
            | B8G8R8Uint
            | B8G8R8Sint
            | B8G8R8Srgb
            | B8G8R8A8Unorm
            | B8G8R8A8Snorm
            | B8G8R8A8Uscaled
            | B8G8R8A8Sscaled
            | B8G8R8A8Uint
            | B8G8R8A8Sint
            | B8G8R8A8Srgb
            | B5G6R5UnormPack16
            | B5G5R5A1UnormPack16
            | B4G4R4A4UnormPack16
    )
}

fn is_abgr_order(format: Format) -> bool {
    use Format::*;
    matches!(
        format,
        A8B8G8R8UnormPack32
            | A8B8G8R8SnormPack32
            | A8B8G8R8UscaledPack32
            | A8B8G8R8SscaledPack32
            | A8B8G8R8UintPack32
            | A8B8G8R8SintPack32
            | A8B8G8R8SrgbPack32
            | A2B10G10R10UnormPack32
            | A2B10G10R10SnormPack32
            | A2B10G10R10UscaledPack32
            | A2B10G10R10SscaledPack32
            | A2B10G10R10UintPack32
            | A2B10G10R10SintPack32
            | A4B4G4R4UnormPack16
    )
}

fn is_argb_order(format: Format) -> bool {
    use Format::*;
    matches!(
        format,
        A2R10G10B10UnormPack32
            | A2R10G10B10SnormPack32
            | A2R10G10B10UscaledPack32
            | A2R10G10B10SscaledPack32
            | A2R10G10B10UintPack32
            | A2R10G10B10SintPack32
            | A1R5G5B5UnormPack16
            | A4R4G4B4UnormPack16
    )
}

fn swizzle_to_rgba(format: Format, v: Vec4D) -> Vec4D {
    if is_bgra_order(format) {
        Vec4D::new(v.z, v.y, v.x, v.w)
    } else if is_abgr_order(format) {
        Vec4D::new(v.w, v.z, v.y, v.x)
    } else if is_argb_order(format) {
        Vec4D::new(v.y, v.z, v.w, v.x)
    } else {
        v
    }
}

fn swizzle_from_rgba(format: Format, v: Vec4D) -> Vec4D {
    if is_bgra_order(format) {
        Vec4D::new(v.z, v.y, v.x, v.w)
    } else if is_abgr_order(format) {
        Vec4D::new(v.w, v.z, v.y, v.x)
    } else if is_argb_order(format) {
        Vec4D::new(v.w, v.x, v.y, v.z)
    } else {
        v
    }
}

/// Decodes one texel into a linear RGBA vector. Integer formats keep
/// their raw values, missing components read as 0, alpha is linear even
/// for sRGB formats.
pub fn read_texel<R: Read>(format: Format, src: &mut R) -> Result<Vec4D, ReadError> {
    let codec = codec_for(format).ok_or(ReadError::UnsupportedFormat)?;

    let raw = match codec {
        Codec::Vector {
            n,
            scalar,
            fac,
            snorm,
        } => {
            let mut out = Vec4D::new(0.0, 0.0, 0.0, 0.0);
            for i in 0..n {
                let mut v = read_scalar(scalar, src)? / fac;
                if snorm {
                    v = v.max(-1.0);
                }
                out[i] = v;
            }
            out
        }
        Codec::Packed {
            word_bits,
            bits,
            norm,
            signed,
        } => unpack_fields(read_packed_word(word_bits, src)?, bits, norm, signed),
        Codec::D16S8 => {
            let d = src.read_u16::<LittleEndian>()? as f64 / 65535.0;
            let s = src.read_u8()? as f64;
            Vec4D::new(d, s, 0.0, 0.0)
        }
        Codec::D24S8 => {
            let mut d = [0u8; 3];
            src.read_exact(&mut d)?;
            let word = (d[0] as u32) << 16 | (d[1] as u32) << 8 | d[2] as u32;
            let s = src.read_u8()? as f64;
            Vec4D::new(word as f64 / 16777215.0, s, 0.0, 0.0)
        }
        Codec::X8D24 => {
            let word = src.read_u32::<LittleEndian>()?;
            let mask = (1u32 << 24) - 1;
            Vec4D::new((word & mask) as f64 / mask as f64, 0.0, 0.0, 0.0)
        }
        Codec::D32S8 => {
            let d = src.read_f32::<LittleEndian>()? as f64;
            let s = src.read_u8()? as f64;
            Vec4D::new(d, s, 0.0, 0.0)
        }
        Codec::E5B9G9R9 => {
            let rgb = e5b9g9r9_to_rgb(src.read_u32::<LittleEndian>()?);
            Vec4D::new(rgb.x as f64, rgb.y as f64, rgb.z as f64, 0.0)
        }
    };

    let swizzled = swizzle_to_rgba(format, raw);
    Ok(if format.is_srgb() {
        srgb_to_linear_vec(swizzled)
    } else {
        swizzled
    })
}

/// Encodes a linear RGBA vector as one texel. Normed and scaled values
/// quantize round-to-nearest.
pub fn write_texel<W: Write>(
    format: Format,
    dst: &mut W,
    color: Vec4D,
) -> Result<(), WriteError> {
    let codec = codec_for(format).ok_or(WriteError::UnsupportedFormat)?;

    let color = if format.is_srgb() {
        linear_to_srgb_vec(color)
    } else {
        color
    };
    let c = swizzle_from_rgba(format, color);

    match codec {
        Codec::Vector {
            n, scalar, fac, ..
        } => {
            for i in 0..n {
                let v = if scalar.is_float() {
                    c[i]
                } else {
                    (c[i] * fac).round()
                };
                write_scalar(scalar, dst, v)?;
            }
        }
        Codec::Packed {
            word_bits,
            bits,
            norm,
            signed,
        } => {
            write_packed_word(word_bits, dst, pack_fields(c, bits, norm, signed))?;
        }
        Codec::D16S8 => {
            dst.write_u16::<LittleEndian>((c.x * 65535.0).round() as u16)?;
            dst.write_u8(c.y as u8)?;
        }
        Codec::D24S8 => {
            let d = (c.x * 16777215.0).round() as u32;
            dst.write_u8(((d >> 16) & 0xFF) as u8)?;
            dst.write_u8(((d >> 8) & 0xFF) as u8)?;
            dst.write_u8((d & 0xFF) as u8)?;
            dst.write_u8(c.y as u8)?;
        }
        Codec::X8D24 => {
            let mask = (1u32 << 24) - 1;
            dst.write_u32::<LittleEndian>((c.x * mask as f64).round() as u32 & mask)?;
        }
        Codec::D32S8 => {
            dst.write_f32::<LittleEndian>(c.x as f32)?;
            dst.write_u8(c.y as u8)?;
        }
        Codec::E5B9G9R9 => {
            let word = e5b9g9r9_from_rgb(Vec3F::new(c.x as f32, c.y as f32, c.z as f32));
            dst.write_u32::<LittleEndian>(word)?;
        }
    }

    Ok(())
}

/// Reads one texel in `src_format` and writes it in `dst_format`.
pub fn convert_texel<R: Read, W: Write>(
    dst_format: Format,
    dst: &mut W,
    src_format: Format,
    src: &mut R,
) -> Result<(), WriteError> {
    let color = read_texel(src_format, src).map_err(|e| match e {
        ReadError::UnsupportedFormat => WriteError::UnsupportedFormat,
        _ => WriteError::ReadFailed,
    })?;
    write_texel(dst_format, dst, color)
}

// Shared-exponent codec, following the layout of the OpenGL
// EXT_texture_shared_exponent definition: 5 exponent bits in the top of
// the word, then three unsigned 9-bit mantissas for b, g, r.
mod e5b9g9r9 {
    pub const EXP_BIAS: i32 = 15;
    pub const MAX_BIASED_EXP: i32 = 32;
    pub const MAX_EXP: i32 = MAX_BIASED_EXP - EXP_BIAS;
    pub const MANTISSA_VALUES: i32 = 1 << 9;
    pub const MAX_MANTISSA: i32 = MANTISSA_VALUES - 1;
    pub const MAX: f32 =
        (MAX_MANTISSA as f32 / MANTISSA_VALUES as f32) * (1u32 << MAX_EXP) as f32;

    // NaN fails the first comparison and clamps to 0.
    pub fn clamp(x: f32) -> f32 {
        if x > 0.0 {
            if x > MAX {
                MAX
            } else {
                x
            }
        } else {
            0.0
        }
    }

    // Not correct for denormals and zero, but the caller takes a max with
    // the minimum representable exponent which hides those cases.
    pub fn floor_log2(x: f32) -> i32 {
        ((x.to_bits() >> 23) & 0xFF) as i32 - 127
    }
}

/// Encodes a linear rgb triple as a shared-exponent e5b9g9r9 word.
pub fn e5b9g9r9_from_rgb(rgb: Vec3F) -> u32 {
    use e5b9g9r9::*;

    let rc = clamp(rgb.x);
    let gc = clamp(rgb.y);
    let bc = clamp(rgb.z);
    let maxrgb = rc.max(gc).max(bc);

    let mut exp_shared = (floor_log2(maxrgb) + 1 + EXP_BIAS).max(0);
    debug_assert!(exp_shared <= MAX_BIASED_EXP);

    let mut denom = (exp_shared - EXP_BIAS - 9) as f64;
    denom = denom.exp2();

    let maxm = (maxrgb as f64 / denom + 0.5).floor() as i32;
    if maxm == MAX_MANTISSA + 1 {
        denom *= 2.0;
        exp_shared += 1;
        debug_assert!(exp_shared <= MAX_BIASED_EXP);
    } else {
        debug_assert!(maxm <= MAX_MANTISSA);
    }

    let rm = (rc as f64 / denom + 0.5).floor() as u32;
    let gm = (gc as f64 / denom + 0.5).floor() as u32;
    let bm = (bc as f64 / denom + 0.5).floor() as u32;
    debug_assert!(rm <= MAX_MANTISSA as u32);
    debug_assert!(gm <= MAX_MANTISSA as u32);
    debug_assert!(bm <= MAX_MANTISSA as u32);

    ((exp_shared as u32) << 27) | (bm << 18) | (gm << 9) | rm
}

/// Decodes a shared-exponent e5b9g9r9 word into linear rgb.
pub fn e5b9g9r9_to_rgb(word: u32) -> Vec3F {
    use e5b9g9r9::*;

    let exponent = (word >> 27) as i32 - EXP_BIAS - 9;
    let scale = (exponent as f32).exp2();
    Vec3F::new(
        scale * (word & 0x1FF) as f32,
        scale * ((word >> 9) & 0x1FF) as f32,
        scale * ((word >> 18) & 0x1FF) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(format: Format, color: Vec4D) -> Vec4D {
        let mut bytes = Vec::new();
        write_texel(format, &mut bytes, color).unwrap();
        assert_eq!(bytes.len(), format.element_size() as usize);
        read_texel(format, &mut &bytes[..]).unwrap()
    }

    #[test]
    fn test_unorm8_roundtrip() {
        let c = Vec4D::new(0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0);
        let r = roundtrip(Format::R8G8B8A8Unorm, c);
        for i in 0..4 {
            assert!((r[i] - c[i]).abs() <= 0.5 / 255.0, "{:?} vs {:?}", r, c);
        }
    }

    #[test]
    fn test_bgra_swizzle_bytes() {
        let c = Vec4D::new(1.0, 0.0, 0.0, 1.0);
        let mut bytes = Vec::new();
        write_texel(Format::B8G8R8A8Unorm, &mut bytes, c).unwrap();
        // red lands in the third byte of a bgra layout
        assert_eq!(bytes, vec![0, 0, 255, 255]);
        let back = read_texel(Format::B8G8R8A8Unorm, &mut &bytes[..]).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_snorm_roundtrip_and_clamp() {
        let c = Vec4D::new(-1.0, -0.5, 0.5, 1.0);
        let r = roundtrip(Format::R8G8B8A8Snorm, c);
        for i in 0..4 {
            assert!((r[i] - c[i]).abs() <= 1.0 / 127.0);
        }
        // the i8 minimum decodes clamped to exactly -1
        let bytes = [0x80u8];
        let v = read_texel(Format::R8Snorm, &mut &bytes[..]).unwrap();
        assert_eq!(v.x, -1.0);
    }

    #[test]
    fn test_uint_is_raw() {
        let c = Vec4D::new(200.0, 13.0, 0.0, 0.0);
        let mut bytes = Vec::new();
        write_texel(Format::R16G16Uint, &mut bytes, c).unwrap();
        let r = read_texel(Format::R16G16Uint, &mut &bytes[..]).unwrap();
        assert_eq!(r.x, 200.0);
        assert_eq!(r.y, 13.0);
    }

    #[test]
    fn test_sfloat_roundtrip() {
        let c = Vec4D::new(1.5, -2.25, 1e4, 0.125);
        let r = roundtrip(Format::R32G32B32A32Sfloat, c);
        assert_eq!(r, c);
        let r = roundtrip(Format::R16G16B16A16Sfloat, c);
        for i in 0..4 {
            assert!((r[i] - c[i]).abs() <= (c[i].abs() * 1e-3).max(1e-6));
        }
    }

    #[test]
    fn test_packed_565_roundtrip() {
        let c = Vec4D::new(1.0, 0.5, 0.0, 0.0);
        let mut bytes = Vec::new();
        write_texel(Format::R5G6B5UnormPack16, &mut bytes, c).unwrap();
        assert_eq!(bytes.len(), 2);
        let r = read_texel(Format::R5G6B5UnormPack16, &mut &bytes[..]).unwrap();
        assert_eq!(r.x, 1.0);
        assert!((r.y - 0.5).abs() <= 0.5 / 63.0);
        assert_eq!(r.z, 0.0);
        // red occupies the top 5 bits of the 16-bit word
        let word = u16::from_le_bytes([bytes[0], bytes[1]]);
        assert_eq!(word >> 11, 0b11111);
    }

    #[test]
    fn test_packed_a2b10g10r10_order() {
        let c = Vec4D::new(1.0, 0.0, 0.0, 1.0);
        let mut bytes = Vec::new();
        write_texel(Format::A2B10G10R10UnormPack32, &mut bytes, c).unwrap();
        let word = u32::from_le_bytes(bytes.clone().try_into().unwrap());
        // alpha in the top 2 bits, red in the lowest 10
        assert_eq!(word >> 30, 0b11);
        assert_eq!(word & 0x3FF, 0x3FF);
        assert_eq!((word >> 10) & 0x3FF, 0);
        let r = read_texel(Format::A2B10G10R10UnormPack32, &mut &bytes[..]).unwrap();
        assert_eq!(r, c);
    }

    #[test]
    fn test_packed_snorm_offset_binary() {
        // packed snorm fields are offset-binary: raw 0 is the most
        // negative value, the field's half point is zero
        let c = Vec4D::new(1.0, 0.0, -1.0, 1.0);
        let mut bytes = Vec::new();
        write_texel(Format::A2B10G10R10SnormPack32, &mut bytes, c).unwrap();
        let word = u32::from_le_bytes(bytes.clone().try_into().unwrap());
        // a = 3, b = 1, g = 512, r = 1023
        assert_eq!(word, 0xC01803FF);
        let r = read_texel(Format::A2B10G10R10SnormPack32, &mut &bytes[..]).unwrap();
        assert_eq!(r, c);

        let c = Vec4D::new(1.0, 0.5, -0.5, -1.0);
        let mut bytes = Vec::new();
        write_texel(Format::A8B8G8R8SnormPack32, &mut bytes, c).unwrap();
        // fields round to nearest: +-0.5 * 127 lands on +-64
        assert_eq!(bytes, vec![0xFF, 0xC0, 0x40, 0x01]);
        let r = read_texel(Format::A8B8G8R8SnormPack32, &mut &bytes[..]).unwrap();
        for i in 0..4 {
            assert!((r[i] - c[i]).abs() <= 1.0 / 127.0);
        }
    }

    #[test]
    fn test_srgb_mid_gray_encodes_to_188() {
        let c = Vec4D::new(0.5, 0.5, 0.5, 1.0);
        let mut bytes = Vec::new();
        write_texel(Format::R8G8B8A8Srgb, &mut bytes, c).unwrap();
        assert_eq!(bytes, vec![188, 188, 188, 255]);
        let r = read_texel(Format::R8G8B8A8Srgb, &mut &bytes[..]).unwrap();
        for i in 0..3 {
            assert!((r[i] - 0.5).abs() <= 1.0 / 255.0);
        }
        assert_eq!(r.w, 1.0);
    }

    #[test]
    fn test_srgb_alpha_stays_linear() {
        let c = Vec4D::new(0.0, 0.0, 0.0, 0.5);
        let mut bytes = Vec::new();
        write_texel(Format::R8G8B8A8Srgb, &mut bytes, c).unwrap();
        assert_eq!(bytes[3], 128);
    }

    #[test]
    fn test_depth_stencil_composites() {
        let c = Vec4D::new(0.25, 42.0, 0.0, 0.0);
        let r = roundtrip(Format::D24UnormS8Uint, c);
        assert!((r.x - 0.25).abs() <= 1.0 / 16777215.0);
        assert_eq!(r.y, 42.0);

        let r = roundtrip(Format::D16UnormS8Uint, c);
        assert!((r.x - 0.25).abs() <= 1.0 / 65535.0);
        assert_eq!(r.y, 42.0);

        let r = roundtrip(Format::D32SfloatS8Uint, c);
        assert_eq!(r.x, 0.25);
        assert_eq!(r.y, 42.0);

        let r = roundtrip(Format::X8D24UnormPack32, c);
        assert!((r.x - 0.25).abs() <= 1.0 / 16777215.0);
    }

    #[test]
    fn test_unsupported_formats_rejected() {
        let bytes = [0u8; 16];
        assert!(matches!(
            read_texel(Format::B10G11R11UfloatPack32, &mut &bytes[..]),
            Err(ReadError::UnsupportedFormat)
        ));
        assert!(matches!(
            read_texel(Format::Bc7UnormBlock, &mut &bytes[..]),
            Err(ReadError::UnsupportedFormat)
        ));
        assert!(matches!(
            read_texel(Format::G8B8R83Plane420Unorm, &mut &bytes[..]),
            Err(ReadError::UnsupportedFormat)
        ));
        let mut out = Vec::new();
        assert!(matches!(
            write_texel(Format::B10G11R11UfloatPack32, &mut out, Vec4D::new(0.0, 0.0, 0.0, 0.0)),
            Err(WriteError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_convert_texel() {
        let mut src = Vec::new();
        write_texel(
            Format::R8G8B8A8Unorm,
            &mut src,
            Vec4D::new(1.0, 0.0, 0.0, 1.0),
        )
        .unwrap();
        let mut dst = Vec::new();
        convert_texel(
            Format::B8G8R8A8Unorm,
            &mut dst,
            Format::R8G8B8A8Unorm,
            &mut &src[..],
        )
        .unwrap();
        assert_eq!(dst, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_e5b9g9r9_known_values() {
        let word = e5b9g9r9_from_rgb(Vec3F::new(1.0, 2.0, 4.0));
        let rgb = e5b9g9r9_to_rgb(word);
        assert!((rgb.x - 1.0).abs() / 1.0 < 0.01);
        assert!((rgb.y - 2.0).abs() / 2.0 < 0.01);
        assert!((rgb.z - 4.0).abs() / 4.0 < 0.01);

        let zero = e5b9g9r9_from_rgb(Vec3F::new(0.0, 0.0, 0.0));
        let rgb = e5b9g9r9_to_rgb(zero);
        assert_eq!((rgb.x, rgb.y, rgb.z), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_e5b9g9r9_bit_layout() {
        // one exact mantissa per channel, exponent in the top 5 bits
        let word = e5b9g9r9_from_rgb(Vec3F::new(1.0, 0.0, 0.0));
        let exp = word >> 27;
        let rm = word & 0x1FF;
        assert!(exp < 32);
        // 1.0 = rm * 2^(exp - 24) requires rm * 2^(exp-24) == 1
        let scale = ((exp as i32 - 24) as f32).exp2();
        assert_eq!(rm as f32 * scale, 1.0);
        assert_eq!((word >> 9) & 0x1FF, 0);
        assert_eq!((word >> 18) & 0x1FF, 0);
    }

    #[test]
    fn test_e5b9g9r9_idempotent_and_monotonic() {
        for x in [0.001f32, 0.5, 1.0, 3.7, 100.0, 60000.0] {
            let once = e5b9g9r9_to_rgb(e5b9g9r9_from_rgb(Vec3F::new(x, x * 0.5, x * 0.25)));
            let twice = e5b9g9r9_to_rgb(e5b9g9r9_from_rgb(once));
            assert_eq!(once, twice);
        }

        // within one exponent, increasing mantissa increases the value
        let exp = 16u32;
        let mut prev = -1.0f32;
        for m in 0..512u32 {
            let v = e5b9g9r9_to_rgb((exp << 27) | m).x;
            assert!(v > prev);
            prev = v;
        }
    }

    #[test]
    fn test_argb1555_swizzle() {
        let c = Vec4D::new(0.0, 0.0, 1.0, 1.0);
        let mut bytes = Vec::new();
        write_texel(Format::A1R5G5B5UnormPack16, &mut bytes, c).unwrap();
        let word = u16::from_le_bytes([bytes[0], bytes[1]]);
        // alpha bit on top, blue in the lowest 5 bits
        assert_eq!(word >> 15, 1);
        assert_eq!(word & 0x1F, 0x1F);
        assert_eq!((word >> 5) & 0x3FF, 0);
        let r = read_texel(Format::A1R5G5B5UnormPack16, &mut &bytes[..]).unwrap();
        assert_eq!(r, c);
    }
}
