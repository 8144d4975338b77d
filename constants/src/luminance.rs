/// Rec. 601 luma weights used by the heightmap projection
pub const LUMA_RED: f32 = 0.299;
pub const LUMA_GREEN: f32 = 0.587;
pub const LUMA_BLUE: f32 = 0.114;

/// Maximum value of an 8-bit colour channel
pub const CHANNEL_MAX: f32 = 255.0;

/// Luma of an 8-bit RGB triple, normalised to 0..=1
pub fn luma(red: u8, green: u8, blue: u8) -> f32 {
    red as f32 / CHANNEL_MAX * LUMA_RED
        + green as f32 / CHANNEL_MAX * LUMA_GREEN
        + blue as f32 / CHANNEL_MAX * LUMA_BLUE
}
