/// Particle sprite size in pixels (`pointSize` uniform)
pub const DEFAULT_POINT_SIZE: f32 = 2.0;

/// Default particle tint, premultiplied by nothing (straight alpha)
pub const DEFAULT_PARTICLE_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 0.85];

/// Background colour as 0xRRGGBB
pub const CLEAR_COLOUR_HEX: u32 = 0x262626;

/// Perspective camera settings
pub const CAMERA_FOV_DEGREES: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 10_000.0;
pub const CAMERA_DISTANCE: f32 = 100.0;

/// Translation applied to particle systems built from mesh data
pub const MESH_PARTICLE_OFFSET: [f32; 3] = [0.0, 0.0, 30.0];

/// Orbit control sensitivities
pub const ORBIT_YAW_SENSITIVITY: f32 = 0.0035;
pub const ORBIT_PITCH_SENSITIVITY: f32 = 0.0030;
pub const ORBIT_PITCH_LIMIT: f32 = 1.55;
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 5_000.0;

/// Split a 0xRRGGBB colour into normalised channels
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}
