/// Compute workgroup edge length; must match `@workgroup_size` in particle_simulation.wgsl
pub const WORKGROUP_SIZE: u32 = 8;

/// Default rotation speed of the simulation pass, radians per second
pub const DEFAULT_ANGULAR_SPEED: f32 = 0.1;

/// Default extent of the random particle cloud
pub const DEFAULT_RANDOM_SCALE: f32 = 256.0;

/// Default height scale of the heightmap projection
pub const DEFAULT_ELEVATION: f32 = 100.0;

/// Seconds an asset load may stay pending before it is reported as failed
pub const DEFAULT_LOAD_TIMEOUT_SECS: f32 = 30.0;
