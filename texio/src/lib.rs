#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

pub mod codecs;
mod file;
mod format;
mod image_provider;
mod ktx;
mod ktx2;
mod layout;
mod texel;

pub use self::file::{
    load_image_layers_from_paths,
    load_image_path,
    read_file,
    write_exr_file,
    write_file,
    write_ktx2_file,
    write_ktx_file,
    write_png_file,
};
pub use self::format::{
    linear_to_srgb,
    linear_to_srgb_vec,
    srgb_to_linear,
    srgb_to_linear_vec,
    Format,
    FormatAspect,
};
pub use self::image_provider::{
    load_image,
    load_image_file,
    load_image_layers,
    load_image_memory,
    read_image_data,
    wrap_blocks,
    wrap_contiguous,
    wrap_contiguous_ref,
    wrap_image_data,
    wrap_single,
    wrap_slices,
    ImageData,
    ImageProvider,
    MemImageProvider,
    MultiImageProvider,
    ProbeError,
    ProbeResult,
    ReadError,
    WriteError,
};
pub use self::codecs::{
    write_exr,
    write_png,
};
pub use self::ktx::{
    load_ktx,
    write_ktx,
};
pub use self::ktx2::{
    load_ktx2,
    write_ktx2,
};
pub use self::layout::{
    align_up,
    mip_size,
    num_mip_levels,
    size_bytes,
    tight_layer_texel_number,
    tight_texel_count,
    tight_texel_number,
};
pub use self::texel::{
    convert_texel,
    e5b9g9r9_from_rgb,
    e5b9g9r9_to_rgb,
    read_texel,
    write_texel,
};

pub type Vec2UI = vek::Vec2<u32>;
pub type Vec3UI = vek::Vec3<u32>;
pub type Vec3F = vek::Vec3<f32>;
pub type Vec4D = vek::Vec4<f64>;
