use crate::Vec3UI;
use crate::Vec4D;

bitflags! {
    /// Logical facets of a texel.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct FormatAspect: u32 {
        const COLOR    = 0b0000001;
        const DEPTH    = 0b0000010;
        const STENCIL  = 0b0000100;
        const METADATA = 0b0001000;
        const PLANE_0  = 0b0010000;
        const PLANE_1  = 0b0100000;
        const PLANE_2  = 0b1000000;
    }
}

// The enum and the raw-value parser are generated together so the Vulkan
// numeric values stay single-sourced.
macro_rules! formats {
    ($($name:ident = $value:literal,)+) => {
        /// Pixel format catalogue, numerically identical to VkFormat.
        ///
        /// KHR aliases share their value with the base format and are not
        /// repeated. There is no `undefined` variant; absence of a format
        /// is `Option::<Format>::None`.
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Format {
            $($name = $value,)+
        }

        impl Format {
            /// Maps a raw VkFormat value into the catalogue.
            /// Returns `None` for zero (undefined) and unknown values.
            pub fn from_vulkan(value: u32) -> Option<Format> {
                match value {
                    $($value => Some(Format::$name),)+
                    _ => None,
                }
            }
        }
    };
}

formats! {
    R4G4UnormPack8 = 1,
    R4G4B4A4UnormPack16 = 2,
    B4G4R4A4UnormPack16 = 3,
    R5G6B5UnormPack16 = 4,
    B5G6R5UnormPack16 = 5,
    R5G5B5A1UnormPack16 = 6,
    B5G5R5A1UnormPack16 = 7,
    A1R5G5B5UnormPack16 = 8,
    R8Unorm = 9,
    R8Snorm = 10,
    R8Uscaled = 11,
    R8Sscaled = 12,
    R8Uint = 13,
    R8Sint = 14,
    R8Srgb = 15,
    R8G8Unorm = 16,
    R8G8Snorm = 17,
    R8G8Uscaled = 18,
    R8G8Sscaled = 19,
    R8G8Uint = 20,
    R8G8Sint = 21,
    R8G8Srgb = 22,
    R8G8B8Unorm = 23,
    R8G8B8Snorm = 24,
    R8G8B8Uscaled = 25,
    R8G8B8Sscaled = 26,
    R8G8B8Uint = 27,
    R8G8B8Sint = 28,
    R8G8B8Srgb = 29,
    B8G8R8Unorm = 30,
    B8G8R8Snorm = 31,
    B8G8R8Uscaled = 32,
    B8G8R8Sscaled = 33,
    B8G8R8Uint = 34,
    B8G8R8Sint = 35,
    B8G8R8Srgb = 36,
    R8G8B8A8Unorm = 37,
    R8G8B8A8Snorm = 38,
    R8G8B8A8Uscaled = 39,
    R8G8B8A8Sscaled = 40,
    R8G8B8A8Uint = 41,
    R8G8B8A8Sint = 42,
    R8G8B8A8Srgb = 43,
    B8G8R8A8Unorm = 44,
    B8G8R8A8Snorm = 45,
    B8G8R8A8Uscaled = 46,
    B8G8R8A8Sscaled = 47,
    B8G8R8A8Uint = 48,
    B8G8R8A8Sint = 49,
    B8G8R8A8Srgb = 50,
    A8B8G8R8UnormPack32 = 51,
    A8B8G8R8SnormPack32 = 52,
    A8B8G8R8UscaledPack32 = 53,
    A8B8G8R8SscaledPack32 = 54,
    A8B8G8R8UintPack32 = 55,
    A8B8G8R8SintPack32 = 56,
    A8B8G8R8SrgbPack32 = 57,
    A2R10G10B10UnormPack32 = 58,
    A2R10G10B10SnormPack32 = 59,
    A2R10G10B10UscaledPack32 = 60,
    A2R10G10B10SscaledPack32 = 61,
    A2R10G10B10UintPack32 = 62,
    A2R10G10B10SintPack32 = 63,
    A2B10G10R10UnormPack32 = 64,
    A2B10G10R10SnormPack32 = 65,
    A2B10G10R10UscaledPack32 = 66,
    A2B10G10R10SscaledPack32 = 67,
    A2B10G10R10UintPack32 = 68,
    A2B10G10R10SintPack32 = 69,
    R16Unorm = 70,
    R16Snorm = 71,
    R16Uscaled = 72,
    R16Sscaled = 73,
    R16Uint = 74,
    R16Sint = 75,
    R16Sfloat = 76,
    R16G16Unorm = 77,
    R16G16Snorm = 78,
    R16G16Uscaled = 79,
    R16G16Sscaled = 80,
    R16G16Uint = 81,
    R16G16Sint = 82,
    R16G16Sfloat = 83,
    R16G16B16Unorm = 84,
    R16G16B16Snorm = 85,
    R16G16B16Uscaled = 86,
    R16G16B16Sscaled = 87,
    R16G16B16Uint = 88,
    R16G16B16Sint = 89,
    R16G16B16Sfloat = 90,
    R16G16B16A16Unorm = 91,
    R16G16B16A16Snorm = 92,
    R16G16B16A16Uscaled = 93,
    R16G16B16A16Sscaled = 94,
    R16G16B16A16Uint = 95,
    R16G16B16A16Sint = 96,
    R16G16B16A16Sfloat = 97,
    R32Uint = 98,
    R32Sint = 99,
    R32Sfloat = 100,
    R32G32Uint = 101,
    R32G32Sint = 102,
    R32G32Sfloat = 103,
    R32G32B32Uint = 104,
    R32G32B32Sint = 105,
    R32G32B32Sfloat = 106,
    R32G32B32A32Uint = 107,
    R32G32B32A32Sint = 108,
    R32G32B32A32Sfloat = 109,
    R64Uint = 110,
    R64Sint = 111,
    R64Sfloat = 112,
    R64G64Uint = 113,
    R64G64Sint = 114,
    R64G64Sfloat = 115,
    R64G64B64Uint = 116,
    R64G64B64Sint = 117,
    R64G64B64Sfloat = 118,
    R64G64B64A64Uint = 119,
    R64G64B64A64Sint = 120,
    R64G64B64A64Sfloat = 121,
    B10G11R11UfloatPack32 = 122,
    E5B9G9R9UfloatPack32 = 123,
    D16Unorm = 124,
    X8D24UnormPack32 = 125,
    D32Sfloat = 126,
    S8Uint = 127,
    D16UnormS8Uint = 128,
    D24UnormS8Uint = 129,
    D32SfloatS8Uint = 130,
    Bc1RgbUnormBlock = 131,
    Bc1RgbSrgbBlock = 132,
    Bc1RgbaUnormBlock = 133,
    Bc1RgbaSrgbBlock = 134,
    Bc2UnormBlock = 135,
    Bc2SrgbBlock = 136,
    Bc3UnormBlock = 137,
    Bc3SrgbBlock = 138,
    Bc4UnormBlock = 139,
    Bc4SnormBlock = 140,
    Bc5UnormBlock = 141,
    Bc5SnormBlock = 142,
    Bc6hUfloatBlock = 143,
    Bc6hSfloatBlock = 144,
    Bc7UnormBlock = 145,
    Bc7SrgbBlock = 146,
    Etc2R8G8B8UnormBlock = 147,
    Etc2R8G8B8SrgbBlock = 148,
    Etc2R8G8B8A1UnormBlock = 149,
    Etc2R8G8B8A1SrgbBlock = 150,
    Etc2R8G8B8A8UnormBlock = 151,
    Etc2R8G8B8A8SrgbBlock = 152,
    EacR11UnormBlock = 153,
    EacR11SnormBlock = 154,
    EacR11G11UnormBlock = 155,
    EacR11G11SnormBlock = 156,
    Astc4x4UnormBlock = 157,
    Astc4x4SrgbBlock = 158,
    Astc5x4UnormBlock = 159,
    Astc5x4SrgbBlock = 160,
    Astc5x5UnormBlock = 161,
    Astc5x5SrgbBlock = 162,
    Astc6x5UnormBlock = 163,
    Astc6x5SrgbBlock = 164,
    Astc6x6UnormBlock = 165,
    Astc6x6SrgbBlock = 166,
    Astc8x5UnormBlock = 167,
    Astc8x5SrgbBlock = 168,
    Astc8x6UnormBlock = 169,
    Astc8x6SrgbBlock = 170,
    Astc8x8UnormBlock = 171,
    Astc8x8SrgbBlock = 172,
    Astc10x5UnormBlock = 173,
    Astc10x5SrgbBlock = 174,
    Astc10x6UnormBlock = 175,
    Astc10x6SrgbBlock = 176,
    Astc10x8UnormBlock = 177,
    Astc10x8SrgbBlock = 178,
    Astc10x10UnormBlock = 179,
    Astc10x10SrgbBlock = 180,
    Astc12x10UnormBlock = 181,
    Astc12x10SrgbBlock = 182,
    Astc12x12UnormBlock = 183,
    Astc12x12SrgbBlock = 184,
    Pvrtc12BppUnormBlock = 1000054000,
    Pvrtc14BppUnormBlock = 1000054001,
    Pvrtc22BppUnormBlock = 1000054002,
    Pvrtc24BppUnormBlock = 1000054003,
    Pvrtc12BppSrgbBlock = 1000054004,
    Pvrtc14BppSrgbBlock = 1000054005,
    Pvrtc22BppSrgbBlock = 1000054006,
    Pvrtc24BppSrgbBlock = 1000054007,
    Astc4x4SfloatBlock = 1000066000,
    Astc5x4SfloatBlock = 1000066001,
    Astc5x5SfloatBlock = 1000066002,
    Astc6x5SfloatBlock = 1000066003,
    Astc6x6SfloatBlock = 1000066004,
    Astc8x5SfloatBlock = 1000066005,
    Astc8x6SfloatBlock = 1000066006,
    Astc8x8SfloatBlock = 1000066007,
    Astc10x5SfloatBlock = 1000066008,
    Astc10x6SfloatBlock = 1000066009,
    Astc10x8SfloatBlock = 1000066010,
    Astc10x10SfloatBlock = 1000066011,
    Astc12x10SfloatBlock = 1000066012,
    Astc12x12SfloatBlock = 1000066013,
    G8B8G8R8422Unorm = 1000156000,
    B8G8R8G8422Unorm = 1000156001,
    G8B8R83Plane420Unorm = 1000156002,
    G8B8R82Plane420Unorm = 1000156003,
    G8B8R83Plane422Unorm = 1000156004,
    G8B8R82Plane422Unorm = 1000156005,
    G8B8R83Plane444Unorm = 1000156006,
    R10X6UnormPack16 = 1000156007,
    R10X6G10X6Unorm2Pack16 = 1000156008,
    R10X6G10X6B10X6A10X6Unorm4Pack16 = 1000156009,
    G10X6B10X6G10X6R10X6422Unorm4Pack16 = 1000156010,
    B10X6G10X6R10X6G10X6422Unorm4Pack16 = 1000156011,
    G10X6B10X6R10X63Plane420Unorm3Pack16 = 1000156012,
    G10X6B10X6R10X62Plane420Unorm3Pack16 = 1000156013,
    G10X6B10X6R10X63Plane422Unorm3Pack16 = 1000156014,
    G10X6B10X6R10X62Plane422Unorm3Pack16 = 1000156015,
    G10X6B10X6R10X63Plane444Unorm3Pack16 = 1000156016,
    R12X4UnormPack16 = 1000156017,
    R12X4G12X4Unorm2Pack16 = 1000156018,
    R12X4G12X4B12X4A12X4Unorm4Pack16 = 1000156019,
    G12X4B12X4G12X4R12X4422Unorm4Pack16 = 1000156020,
    B12X4G12X4R12X4G12X4422Unorm4Pack16 = 1000156021,
    G12X4B12X4R12X43Plane420Unorm3Pack16 = 1000156022,
    G12X4B12X4R12X42Plane420Unorm3Pack16 = 1000156023,
    G12X4B12X4R12X43Plane422Unorm3Pack16 = 1000156024,
    G12X4B12X4R12X42Plane422Unorm3Pack16 = 1000156025,
    G12X4B12X4R12X43Plane444Unorm3Pack16 = 1000156026,
    G16B16G16R16422Unorm = 1000156027,
    B16G16R16G16422Unorm = 1000156028,
    G16B16R163Plane420Unorm = 1000156029,
    G16B16R162Plane420Unorm = 1000156030,
    G16B16R163Plane422Unorm = 1000156031,
    G16B16R162Plane422Unorm = 1000156032,
    G16B16R163Plane444Unorm = 1000156033,
    A4R4G4B4UnormPack16 = 1000340000,
    A4B4G4R4UnormPack16 = 1000340001,
}

impl Format {
    pub fn vulkan(self) -> u32 {
        self as u32
    }

    pub fn has_depth(self) -> bool {
        matches!(
            self,
            Format::D16Unorm
                | Format::X8D24UnormPack32
                | Format::D32Sfloat
                | Format::D16UnormS8Uint
                | Format::D24UnormS8Uint
                | Format::D32SfloatS8Uint
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(
            self,
            Format::S8Uint
                | Format::D16UnormS8Uint
                | Format::D24UnormS8Uint
                | Format::D32SfloatS8Uint
        )
    }

    pub fn is_compressed(self) -> bool {
        let v = self.vulkan();
        // BC, ETC2/EAC, ASTC LDR
        (131..=184).contains(&v)
            // PVRTC
            || (1000054000..=1000054007).contains(&v)
            // ASTC HDR
            || (1000066000..=1000066013).contains(&v)
    }

    pub fn is_multiplanar(self) -> bool {
        matches!(
            self,
            Format::G8B8R83Plane420Unorm
                | Format::G8B8R82Plane420Unorm
                | Format::G8B8R83Plane422Unorm
                | Format::G8B8R82Plane422Unorm
                | Format::G8B8R83Plane444Unorm
                | Format::G10X6B10X6R10X63Plane420Unorm3Pack16
                | Format::G10X6B10X6R10X62Plane420Unorm3Pack16
                | Format::G10X6B10X6R10X63Plane422Unorm3Pack16
                | Format::G10X6B10X6R10X62Plane422Unorm3Pack16
                | Format::G10X6B10X6R10X63Plane444Unorm3Pack16
                | Format::G12X4B12X4R12X43Plane420Unorm3Pack16
                | Format::G12X4B12X4R12X42Plane420Unorm3Pack16
                | Format::G12X4B12X4R12X43Plane422Unorm3Pack16
                | Format::G12X4B12X4R12X42Plane422Unorm3Pack16
                | Format::G12X4B12X4R12X43Plane444Unorm3Pack16
                | Format::G16B16R163Plane420Unorm
                | Format::G16B16R162Plane420Unorm
                | Format::G16B16R163Plane422Unorm
                | Format::G16B16R162Plane422Unorm
                | Format::G16B16R163Plane444Unorm
        )
    }

    /// Whether all components share one 8/16/32-bit word.
    pub fn is_packed(self) -> bool {
        matches!(
            self,
            Format::R4G4UnormPack8
                | Format::R4G4B4A4UnormPack16
                | Format::B4G4R4A4UnormPack16
                | Format::R5G6B5UnormPack16
                | Format::B5G6R5UnormPack16
                | Format::R5G5B5A1UnormPack16
                | Format::B5G5R5A1UnormPack16
                | Format::A1R5G5B5UnormPack16
                | Format::A4R4G4B4UnormPack16
                | Format::A4B4G4R4UnormPack16
                | Format::A8B8G8R8UnormPack32
                | Format::A8B8G8R8SnormPack32
                | Format::A8B8G8R8UscaledPack32
                | Format::A8B8G8R8SscaledPack32
                | Format::A8B8G8R8UintPack32
                | Format::A8B8G8R8SintPack32
                | Format::A8B8G8R8SrgbPack32
                | Format::A2R10G10B10UnormPack32
                | Format::A2R10G10B10SnormPack32
                | Format::A2R10G10B10UscaledPack32
                | Format::A2R10G10B10SscaledPack32
                | Format::A2R10G10B10UintPack32
                | Format::A2R10G10B10SintPack32
                | Format::A2B10G10R10UnormPack32
                | Format::A2B10G10R10SnormPack32
                | Format::A2B10G10R10UscaledPack32
                | Format::A2B10G10R10SscaledPack32
                | Format::A2B10G10R10UintPack32
                | Format::A2B10G10R10SintPack32
                | Format::B10G11R11UfloatPack32
                | Format::E5B9G9R9UfloatPack32
                | Format::X8D24UnormPack32
                | Format::R10X6UnormPack16
                | Format::R10X6G10X6Unorm2Pack16
                | Format::R10X6G10X6B10X6A10X6Unorm4Pack16
                | Format::R12X4UnormPack16
                | Format::R12X4G12X4Unorm2Pack16
                | Format::R12X4G12X4B12X4A12X4Unorm4Pack16
        )
    }

    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            Format::R8Srgb
                | Format::R8G8Srgb
                | Format::R8G8B8Srgb
                | Format::B8G8R8Srgb
                | Format::R8G8B8A8Srgb
                | Format::B8G8R8A8Srgb
                | Format::A8B8G8R8SrgbPack32
                | Format::Bc1RgbSrgbBlock
                | Format::Bc1RgbaSrgbBlock
                | Format::Bc2SrgbBlock
                | Format::Bc3SrgbBlock
                | Format::Bc7SrgbBlock
                | Format::Etc2R8G8B8SrgbBlock
                | Format::Etc2R8G8B8A1SrgbBlock
                | Format::Etc2R8G8B8A8SrgbBlock
                | Format::Astc4x4SrgbBlock
                | Format::Astc5x4SrgbBlock
                | Format::Astc5x5SrgbBlock
                | Format::Astc6x5SrgbBlock
                | Format::Astc6x6SrgbBlock
                | Format::Astc8x5SrgbBlock
                | Format::Astc8x6SrgbBlock
                | Format::Astc8x8SrgbBlock
                | Format::Astc10x5SrgbBlock
                | Format::Astc10x6SrgbBlock
                | Format::Astc10x8SrgbBlock
                | Format::Astc10x10SrgbBlock
                | Format::Astc12x10SrgbBlock
                | Format::Astc12x12SrgbBlock
                | Format::Pvrtc12BppSrgbBlock
                | Format::Pvrtc14BppSrgbBlock
                | Format::Pvrtc22BppSrgbBlock
                | Format::Pvrtc24BppSrgbBlock
        )
    }

    /// The linear variant of an sRGB format and vice versa. Formats
    /// without a paired variant are returned unchanged; the paired set is
    /// restricted to the 8-bit color formats and BC7.
    pub fn toggle_srgb(self) -> Format {
        match self {
            Format::R8Srgb => Format::R8Unorm,
            Format::R8G8Srgb => Format::R8G8Unorm,
            Format::R8G8B8Srgb => Format::R8G8B8Unorm,
            Format::B8G8R8Srgb => Format::B8G8R8Unorm,
            Format::R8G8B8A8Srgb => Format::R8G8B8A8Unorm,
            Format::B8G8R8A8Srgb => Format::B8G8R8A8Unorm,
            Format::A8B8G8R8SrgbPack32 => Format::A8B8G8R8UnormPack32,

            Format::R8Unorm => Format::R8Srgb,
            Format::R8G8Unorm => Format::R8G8Srgb,
            Format::R8G8B8Unorm => Format::R8G8B8Srgb,
            Format::B8G8R8Unorm => Format::B8G8R8Srgb,
            Format::R8G8B8A8Unorm => Format::R8G8B8A8Srgb,
            Format::B8G8R8A8Unorm => Format::B8G8R8A8Srgb,
            Format::A8B8G8R8UnormPack32 => Format::A8B8G8R8SrgbPack32,

            Format::Bc7UnormBlock => Format::Bc7SrgbBlock,
            Format::Bc7SrgbBlock => Format::Bc7UnormBlock,

            _ => self,
        }
    }

    pub fn aspects(self) -> FormatAspect {
        if self.has_depth() || self.has_stencil() {
            let mut aspect = FormatAspect::empty();
            if self.has_depth() {
                aspect |= FormatAspect::DEPTH;
            }
            if self.has_stencil() {
                aspect |= FormatAspect::STENCIL;
            }
            return aspect;
        }

        match self.plane_count() {
            3 => {
                FormatAspect::COLOR
                    | FormatAspect::PLANE_0
                    | FormatAspect::PLANE_1
                    | FormatAspect::PLANE_2
            }
            2 => FormatAspect::COLOR | FormatAspect::PLANE_0 | FormatAspect::PLANE_1,
            _ => FormatAspect::COLOR,
        }
    }

    fn plane_count(self) -> u32 {
        if !self.is_multiplanar() {
            return 1;
        }
        match self {
            Format::G8B8R82Plane420Unorm
            | Format::G8B8R82Plane422Unorm
            | Format::G10X6B10X6R10X62Plane420Unorm3Pack16
            | Format::G10X6B10X6R10X62Plane422Unorm3Pack16
            | Format::G12X4B12X4R12X42Plane420Unorm3Pack16
            | Format::G12X4B12X4R12X42Plane422Unorm3Pack16
            | Format::G16B16R162Plane420Unorm
            | Format::G16B16R162Plane422Unorm => 2,
            _ => 3,
        }
    }

    /// The number of declared components (channels) of the format.
    pub fn component_count(self) -> u32 {
        use Format::*;
        match self {
            R8Unorm | R8Snorm | R8Uscaled | R8Sscaled | R8Uint | R8Sint | R8Srgb
            | R16Unorm | R16Snorm | R16Uscaled | R16Sscaled | R16Uint | R16Sint
            | R16Sfloat | R32Uint | R32Sint | R32Sfloat | R64Uint | R64Sint
            | R64Sfloat | D16Unorm | X8D24UnormPack32 | D32Sfloat | S8Uint
            | R10X6UnormPack16 | R12X4UnormPack16 | Bc4UnormBlock | Bc4SnormBlock
            | EacR11UnormBlock | EacR11SnormBlock => 1,

            R4G4UnormPack8 | R8G8Unorm | R8G8Snorm | R8G8Uscaled | R8G8Sscaled
            | R8G8Uint | R8G8Sint | R8G8Srgb | R16G16Unorm | R16G16Snorm
            | R16G16Uscaled | R16G16Sscaled | R16G16Uint | R16G16Sint
            | R16G16Sfloat | R32G32Uint | R32G32Sint | R32G32Sfloat | R64G64Uint
            | R64G64Sint | R64G64Sfloat | D16UnormS8Uint | D24UnormS8Uint
            | D32SfloatS8Uint | R10X6G10X6Unorm2Pack16 | R12X4G12X4Unorm2Pack16
            | Bc5UnormBlock | Bc5SnormBlock | EacR11G11UnormBlock
            | EacR11G11SnormBlock => 2,

            R5G6B5UnormPack16 | B5G6R5UnormPack16 | R8G8B8Unorm | R8G8B8Snorm
            | R8G8B8Uscaled | R8G8B8Sscaled | R8G8B8Uint | R8G8B8Sint | R8G8B8Srgb
            | B8G8R8Unorm | B8G8R8Snorm | B8G8R8Uscaled | B8G8R8Sscaled
            | B8G8R8Uint | B8G8R8Sint | B8G8R8Srgb | R16G16B16Unorm
            | R16G16B16Snorm | R16G16B16Uscaled | R16G16B16Sscaled | R16G16B16Uint
            | R16G16B16Sint | R16G16B16Sfloat | R32G32B32Uint | R32G32B32Sint
            | R32G32B32Sfloat | R64G64B64Uint | R64G64B64Sint | R64G64B64Sfloat
            | B10G11R11UfloatPack32 | E5B9G9R9UfloatPack32 | Bc1RgbUnormBlock
            | Bc1RgbSrgbBlock | Bc6hUfloatBlock | Bc6hSfloatBlock
            | Etc2R8G8B8UnormBlock | Etc2R8G8B8SrgbBlock | G8B8R83Plane420Unorm
            | G8B8R82Plane420Unorm | G8B8R83Plane422Unorm | G8B8R82Plane422Unorm
            | G8B8R83Plane444Unorm | G10X6B10X6R10X63Plane420Unorm3Pack16
            | G10X6B10X6R10X62Plane420Unorm3Pack16
            | G10X6B10X6R10X63Plane422Unorm3Pack16
            | G10X6B10X6R10X62Plane422Unorm3Pack16
            | G10X6B10X6R10X63Plane444Unorm3Pack16
            | G12X4B12X4R12X43Plane420Unorm3Pack16
            | G12X4B12X4R12X42Plane420Unorm3Pack16
            | G12X4B12X4R12X43Plane422Unorm3Pack16
            | G12X4B12X4R12X42Plane422Unorm3Pack16
            | G12X4B12X4R12X43Plane444Unorm3Pack16 | G16B16R163Plane420Unorm
            | G16B16R162Plane420Unorm | G16B16R163Plane422Unorm
            | G16B16R162Plane422Unorm | G16B16R163Plane444Unorm => 3,

            // everything else carries four declared components
            _ => 4,
        }
    }

    /// Bytes of a single texel block. For depth-stencil composites this is
    /// the sum of the depth and stencil aspect sizes; for multi-planar
    /// formats the sum of all planes over one block.
    pub fn element_size(self) -> u32 {
        use Format::*;
        match self {
            R4G4UnormPack8 | R8Unorm | R8Snorm | R8Uscaled | R8Sscaled | R8Uint
            | R8Sint | R8Srgb | S8Uint => 1,

            R4G4B4A4UnormPack16 | B4G4R4A4UnormPack16 | R5G6B5UnormPack16
            | B5G6R5UnormPack16 | R5G5B5A1UnormPack16 | B5G5R5A1UnormPack16
            | A1R5G5B5UnormPack16 | A4R4G4B4UnormPack16 | A4B4G4R4UnormPack16
            | R8G8Unorm | R8G8Snorm | R8G8Uscaled | R8G8Sscaled | R8G8Uint
            | R8G8Sint | R8G8Srgb | R16Unorm | R16Snorm | R16Uscaled | R16Sscaled
            | R16Uint | R16Sint | R16Sfloat | D16Unorm | R10X6UnormPack16
            | R12X4UnormPack16 => 2,

            R8G8B8Unorm | R8G8B8Snorm | R8G8B8Uscaled | R8G8B8Sscaled | R8G8B8Uint
            | R8G8B8Sint | R8G8B8Srgb | B8G8R8Unorm | B8G8R8Snorm | B8G8R8Uscaled
            | B8G8R8Sscaled | B8G8R8Uint | B8G8R8Sint | B8G8R8Srgb
            | D16UnormS8Uint | G8B8R83Plane444Unorm => 3,

            R8G8B8A8Unorm | R8G8B8A8Snorm | R8G8B8A8Uscaled | R8G8B8A8Sscaled
            | R8G8B8A8Uint | R8G8B8A8Sint | R8G8B8A8Srgb | B8G8R8A8Unorm
            | B8G8R8A8Snorm | B8G8R8A8Uscaled | B8G8R8A8Sscaled | B8G8R8A8Uint
            | B8G8R8A8Sint | B8G8R8A8Srgb | A8B8G8R8UnormPack32
            | A8B8G8R8SnormPack32 | A8B8G8R8UscaledPack32 | A8B8G8R8SscaledPack32
            | A8B8G8R8UintPack32 | A8B8G8R8SintPack32 | A8B8G8R8SrgbPack32
            | A2R10G10B10UnormPack32 | A2R10G10B10SnormPack32
            | A2R10G10B10UscaledPack32 | A2R10G10B10SscaledPack32
            | A2R10G10B10UintPack32 | A2R10G10B10SintPack32
            | A2B10G10R10UnormPack32 | A2B10G10R10SnormPack32
            | A2B10G10R10UscaledPack32 | A2B10G10R10SscaledPack32
            | A2B10G10R10UintPack32 | A2B10G10R10SintPack32 | R16G16Unorm
            | R16G16Snorm | R16G16Uscaled | R16G16Sscaled | R16G16Uint
            | R16G16Sint | R16G16Sfloat | R32Uint | R32Sint | R32Sfloat | D32Sfloat
            | B10G11R11UfloatPack32 | E5B9G9R9UfloatPack32 | X8D24UnormPack32
            | D24UnormS8Uint | R10X6G10X6Unorm2Pack16 | R12X4G12X4Unorm2Pack16
            | G8B8G8R8422Unorm | B8G8R8G8422Unorm | G8B8R83Plane422Unorm
            | G8B8R82Plane422Unorm => 4,

            D32SfloatS8Uint => 5,

            R16G16B16Unorm | R16G16B16Snorm | R16G16B16Uscaled | R16G16B16Sscaled
            | R16G16B16Uint | R16G16B16Sint | R16G16B16Sfloat
            | G8B8R83Plane420Unorm | G8B8R82Plane420Unorm
            | G10X6B10X6R10X63Plane444Unorm3Pack16
            | G12X4B12X4R12X43Plane444Unorm3Pack16 | G16B16R163Plane444Unorm => 6,

            R16G16B16A16Unorm | R16G16B16A16Snorm | R16G16B16A16Uscaled
            | R16G16B16A16Sscaled | R16G16B16A16Uint | R16G16B16A16Sint
            | R16G16B16A16Sfloat | R32G32Uint | R32G32Sint | R32G32Sfloat
            | R64Uint | R64Sint | R64Sfloat | R10X6G10X6B10X6A10X6Unorm4Pack16
            | R12X4G12X4B12X4A12X4Unorm4Pack16 | G10X6B10X6G10X6R10X6422Unorm4Pack16
            | B10X6G10X6R10X6G10X6422Unorm4Pack16 | G12X4B12X4G12X4R12X4422Unorm4Pack16
            | B12X4G12X4R12X4G12X4422Unorm4Pack16 | G16B16G16R16422Unorm
            | B16G16R16G16422Unorm | G10X6B10X6R10X63Plane422Unorm3Pack16
            | G10X6B10X6R10X62Plane422Unorm3Pack16
            | G12X4B12X4R12X43Plane422Unorm3Pack16
            | G12X4B12X4R12X42Plane422Unorm3Pack16 | G16B16R163Plane422Unorm
            | G16B16R162Plane422Unorm
            | Bc1RgbUnormBlock | Bc1RgbSrgbBlock | Bc1RgbaUnormBlock
            | Bc1RgbaSrgbBlock | Bc4UnormBlock | Bc4SnormBlock
            | Etc2R8G8B8UnormBlock | Etc2R8G8B8SrgbBlock | Etc2R8G8B8A1UnormBlock
            | Etc2R8G8B8A1SrgbBlock | EacR11UnormBlock | EacR11SnormBlock
            | Pvrtc12BppUnormBlock | Pvrtc14BppUnormBlock | Pvrtc22BppUnormBlock
            | Pvrtc24BppUnormBlock | Pvrtc12BppSrgbBlock | Pvrtc14BppSrgbBlock
            | Pvrtc22BppSrgbBlock | Pvrtc24BppSrgbBlock => 8,

            R32G32B32Uint | R32G32B32Sint | R32G32B32Sfloat
            | G10X6B10X6R10X63Plane420Unorm3Pack16
            | G10X6B10X6R10X62Plane420Unorm3Pack16
            | G12X4B12X4R12X43Plane420Unorm3Pack16
            | G12X4B12X4R12X42Plane420Unorm3Pack16 | G16B16R163Plane420Unorm
            | G16B16R162Plane420Unorm => 12,

            R32G32B32A32Uint | R32G32B32A32Sint | R32G32B32A32Sfloat | R64G64Uint
            | R64G64Sint | R64G64Sfloat | Bc2UnormBlock | Bc2SrgbBlock
            | Bc3UnormBlock | Bc3SrgbBlock | Bc5UnormBlock | Bc5SnormBlock
            | Bc6hUfloatBlock | Bc6hSfloatBlock | Bc7UnormBlock | Bc7SrgbBlock
            | Etc2R8G8B8A8UnormBlock | Etc2R8G8B8A8SrgbBlock
            | EacR11G11UnormBlock | EacR11G11SnormBlock => 16,

            R64G64B64Uint | R64G64B64Sint | R64G64B64Sfloat => 24,
            R64G64B64A64Uint | R64G64B64A64Sint | R64G64B64A64Sfloat => 32,

            // ASTC is always a 128-bit block
            _ => 16,
        }
    }

    /// Bytes of a single aspect of a texel. Depth-stencil writers need the
    /// per-aspect decomposition; the plane aspects report per-plane block
    /// bytes for completeness.
    pub fn element_size_aspect(self, aspect: FormatAspect) -> u32 {
        use Format::*;
        if aspect == FormatAspect::DEPTH {
            return match self {
                D16Unorm | D16UnormS8Uint => 2,
                X8D24UnormPack32 | D24UnormS8Uint => 3,
                D32Sfloat | D32SfloatS8Uint => 4,
                _ => 0,
            };
        }
        if aspect == FormatAspect::STENCIL {
            return if self.has_stencil() { 1 } else { 0 };
        }
        if aspect == FormatAspect::PLANE_0 || aspect == FormatAspect::PLANE_1
            || aspect == FormatAspect::PLANE_2
        {
            if !self.is_multiplanar() {
                return 0;
            }
            let word = match self {
                G8B8R83Plane420Unorm | G8B8R82Plane420Unorm | G8B8R83Plane422Unorm
                | G8B8R82Plane422Unorm | G8B8R83Plane444Unorm => 1,
                _ => 2,
            };
            let two_plane = self.plane_count() == 2;
            return if aspect == FormatAspect::PLANE_0 {
                word
            } else if aspect == FormatAspect::PLANE_1 {
                // the combined chroma plane of a two-plane format holds
                // both b and r samples
                if two_plane {
                    2 * word
                } else {
                    word
                }
            } else if two_plane {
                0
            } else {
                word
            };
        }

        // color
        if self.has_depth() || self.has_stencil() {
            0
        } else {
            self.element_size()
        }
    }

    /// The (w, h, d) extent of one texel block; (1, 1, 1) for formats that
    /// aren't blocked or subsampled.
    pub fn block_size(self) -> Vec3UI {
        use Format::*;
        match self {
            Bc1RgbUnormBlock | Bc1RgbSrgbBlock | Bc1RgbaUnormBlock
            | Bc1RgbaSrgbBlock | Bc2UnormBlock | Bc2SrgbBlock | Bc3UnormBlock
            | Bc3SrgbBlock | Bc4UnormBlock | Bc4SnormBlock | Bc5UnormBlock
            | Bc5SnormBlock | Bc6hUfloatBlock | Bc6hSfloatBlock | Bc7UnormBlock
            | Bc7SrgbBlock | Etc2R8G8B8UnormBlock | Etc2R8G8B8SrgbBlock
            | Etc2R8G8B8A1UnormBlock | Etc2R8G8B8A1SrgbBlock
            | Etc2R8G8B8A8UnormBlock | Etc2R8G8B8A8SrgbBlock | EacR11UnormBlock
            | EacR11SnormBlock | EacR11G11UnormBlock | EacR11G11SnormBlock
            | Astc4x4UnormBlock | Astc4x4SrgbBlock | Astc4x4SfloatBlock
            | Pvrtc14BppUnormBlock | Pvrtc14BppSrgbBlock | Pvrtc24BppUnormBlock
            | Pvrtc24BppSrgbBlock => Vec3UI::new(4, 4, 1),

            Astc5x4UnormBlock | Astc5x4SrgbBlock | Astc5x4SfloatBlock => {
                Vec3UI::new(5, 4, 1)
            }
            Astc5x5UnormBlock | Astc5x5SrgbBlock | Astc5x5SfloatBlock => {
                Vec3UI::new(5, 5, 1)
            }
            Astc6x5UnormBlock | Astc6x5SrgbBlock | Astc6x5SfloatBlock => {
                Vec3UI::new(6, 5, 1)
            }
            Astc6x6UnormBlock | Astc6x6SrgbBlock | Astc6x6SfloatBlock => {
                Vec3UI::new(6, 6, 1)
            }
            Astc8x5UnormBlock | Astc8x5SrgbBlock | Astc8x5SfloatBlock => {
                Vec3UI::new(8, 5, 1)
            }
            Astc8x6UnormBlock | Astc8x6SrgbBlock | Astc8x6SfloatBlock => {
                Vec3UI::new(8, 6, 1)
            }
            Astc8x8UnormBlock | Astc8x8SrgbBlock | Astc8x8SfloatBlock => {
                Vec3UI::new(8, 8, 1)
            }
            Astc10x5UnormBlock | Astc10x5SrgbBlock | Astc10x5SfloatBlock => {
                Vec3UI::new(10, 5, 1)
            }
            Astc10x6UnormBlock | Astc10x6SrgbBlock | Astc10x6SfloatBlock => {
                Vec3UI::new(10, 6, 1)
            }
            Astc10x8UnormBlock | Astc10x8SrgbBlock | Astc10x8SfloatBlock => {
                Vec3UI::new(10, 8, 1)
            }
            Astc10x10UnormBlock | Astc10x10SrgbBlock | Astc10x10SfloatBlock => {
                Vec3UI::new(10, 10, 1)
            }
            Astc12x10UnormBlock | Astc12x10SrgbBlock | Astc12x10SfloatBlock => {
                Vec3UI::new(12, 10, 1)
            }
            Astc12x12UnormBlock | Astc12x12SrgbBlock | Astc12x12SfloatBlock => {
                Vec3UI::new(12, 12, 1)
            }

            Pvrtc12BppUnormBlock | Pvrtc12BppSrgbBlock | Pvrtc22BppUnormBlock
            | Pvrtc22BppSrgbBlock => Vec3UI::new(8, 4, 1),

            // horizontally subsampled 4:2:2
            G8B8G8R8422Unorm | B8G8R8G8422Unorm
            | G10X6B10X6G10X6R10X6422Unorm4Pack16
            | B10X6G10X6R10X6G10X6422Unorm4Pack16
            | G12X4B12X4G12X4R12X4422Unorm4Pack16
            | B12X4G12X4R12X4G12X4422Unorm4Pack16 | G16B16G16R16422Unorm
            | B16G16R16G16422Unorm | G8B8R83Plane422Unorm | G8B8R82Plane422Unorm
            | G10X6B10X6R10X63Plane422Unorm3Pack16
            | G10X6B10X6R10X62Plane422Unorm3Pack16
            | G12X4B12X4R12X43Plane422Unorm3Pack16
            | G12X4B12X4R12X42Plane422Unorm3Pack16 | G16B16R163Plane422Unorm
            | G16B16R162Plane422Unorm => Vec3UI::new(2, 1, 1),

            // 4:2:0, subsampled in both directions
            G8B8R83Plane420Unorm | G8B8R82Plane420Unorm
            | G10X6B10X6R10X63Plane420Unorm3Pack16
            | G10X6B10X6R10X62Plane420Unorm3Pack16
            | G12X4B12X4R12X43Plane420Unorm3Pack16
            | G12X4B12X4R12X42Plane420Unorm3Pack16 | G16B16R163Plane420Unorm
            | G16B16R162Plane420Unorm => Vec3UI::new(2, 2, 1),

            _ => Vec3UI::new(1, 1, 1),
        }
    }
}

// - https://en.wikipedia.org/wiki/SRGB
// - https://www.w3.org/Graphics/Color/srgb
pub fn linear_to_srgb(linear: f64) -> f64 {
    if linear < 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

pub fn srgb_to_linear(srgb: f64) -> f64 {
    if srgb < 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

/// Applies the transfer function to rgb, leaving alpha linear.
pub fn linear_to_srgb_vec(mut v: Vec4D) -> Vec4D {
    v.x = linear_to_srgb(v.x);
    v.y = linear_to_srgb(v.y);
    v.z = linear_to_srgb(v.z);
    v
}

pub fn srgb_to_linear_vec(mut v: Vec4D) -> Vec4D {
    v.x = srgb_to_linear(v.x);
    v.y = srgb_to_linear(v.y);
    v.z = srgb_to_linear(v.z);
    v
}
