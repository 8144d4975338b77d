//! Main world to render world synchronisation.

/// Particle render phases per active camera.
pub mod camera_phases;

/// Particle system textures, dimensions and simulation parameters.
pub mod render_state;
