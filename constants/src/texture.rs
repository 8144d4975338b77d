/// Default particle grid resolution along each axis (positions texture is square by default)
pub const DEFAULT_GRID_SIZE: u32 = 256;

/// Floats stored per particle in a position buffer (x, y, z)
pub const POSITION_COMPONENTS: usize = 3;

/// Floats stored per texel in the RGBA32F positions texture (x, y, z, flag)
pub const TEXEL_COMPONENTS: usize = 4;

/// Bytes per RGBA32F texel
pub const TEXEL_BYTES: usize = TEXEL_COMPONENTS * std::mem::size_of::<f32>();

/// Alpha flag written for texels holding a real particle
pub const ACTIVE_PARTICLE_FLAG: f32 = 1.0;

/// Alpha flag written for padding texels; the render shader culls these
pub const INACTIVE_PARTICLE_FLAG: f32 = 0.0;

/// Vertices emitted per particle by the point index mesh (two triangles)
pub const VERTICES_PER_PARTICLE: usize = 6;

/// Largest positions texture side accepted, wgpu's default `max_texture_dimension_2d`
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;
