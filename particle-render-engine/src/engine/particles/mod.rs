//! GPU particle system resources.
//!
//! A position buffer becomes two identical RGBA32F textures used as
//! ping-pong targets by the simulation pass, plus an index mesh the render
//! pipeline expands into one quad per particle.

/// Particle system handle: acquisition, per-frame swap and release.
pub mod particle_system;

/// Index-only mesh for GPU-side quad expansion.
pub mod point_index_mesh;

/// Position buffer to RGBA32F texture encoding.
pub mod position_texture;
