use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};
use constants::texture::{ACTIVE_PARTICLE_FLAG, INACTIVE_PARTICLE_FLAG, TEXEL_COMPONENTS};

use crate::engine::data::PositionBuffer;

/// Interleave a position buffer into RGBA texels, `w` carrying the active flag.
pub fn position_texels(buffer: &PositionBuffer) -> Vec<f32> {
    let mut texels = Vec::with_capacity(buffer.point_count() * TEXEL_COMPONENTS);
    for (index, position) in buffer.positions().enumerate() {
        let flag = if buffer.is_active(index) {
            ACTIVE_PARTICLE_FLAG
        } else {
            INACTIVE_PARTICLE_FLAG
        };
        texels.extend_from_slice(&[position.x, position.y, position.z, flag]);
    }
    texels
}

/// Create an RGBA32F position texture sized exactly to the buffer grid.
///
/// The texture is readable from shaders, writable as a storage texture by the
/// simulation pass and sampled with nearest filtering so texel values are never
/// interpolated.
pub fn create_position_image(buffer: &PositionBuffer) -> Image {
    let texels = position_texels(buffer);

    let mut image = Image::new(
        Extent3d {
            width: buffer.width(),
            height: buffer.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        bytemuck::cast_slice(&texels).to_vec(),
        TextureFormat::Rgba32Float,
        RenderAssetUsages::default(),
    );

    image.texture_descriptor.usage = TextureUsages::TEXTURE_BINDING
        | TextureUsages::STORAGE_BINDING
        | TextureUsages::COPY_SRC
        | TextureUsages::COPY_DST;

    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..default()
    });

    image
}
