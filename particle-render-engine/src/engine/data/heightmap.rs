use constants::luminance::luma;
use constants::texture::POSITION_COMPONENTS;
use image::DynamicImage;
use image::imageops::FilterType;

use super::PositionBuffer;
use crate::engine::config::SourceKind;
use crate::engine::error::ParticleError;

/// Project image brightness onto a flat XZ grid of `width × height` particles.
///
/// The image is resampled to exactly `width × height` pixels regardless of its
/// native resolution. Pixel `(col, row)` becomes
/// `x = (col / width - 0.5) * width`, `y = luma * elevation`,
/// `z = (row / height - 0.5) * height`.
pub fn heightmap_positions(
    image: &DynamicImage,
    width: u32,
    height: u32,
    elevation: f32,
) -> Result<PositionBuffer, ParticleError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ParticleError::malformed(
            SourceKind::Image.to_string(),
            format!("image has zero dimensions ({}x{})", image.width(), image.height()),
        ));
    }
    if width == 0 || height == 0 {
        return Err(ParticleError::malformed(
            SourceKind::Image.to_string(),
            format!("grid dimensions must be non-zero, got {width}x{height}"),
        ));
    }

    let resampled = if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    };

    let mut data = Vec::with_capacity(width as usize * height as usize * POSITION_COMPONENTS);
    for (col, row, pixel) in resampled.enumerate_pixels() {
        let [red, green, blue, _] = pixel.0;
        data.push((col as f32 / width as f32 - 0.5) * width as f32);
        data.push(luma(red, green, blue) * elevation);
        data.push((row as f32 / height as f32 - 0.5) * height as f32);
    }

    PositionBuffer::new(width, height, data, SourceKind::Image)
}
