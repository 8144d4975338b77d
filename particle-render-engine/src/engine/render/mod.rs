//! Render world systems for the particle subsystem.
//!
//! Each frame the main world's particle system is extracted, the simulation
//! compute pass advances positions into the write texture, and the particle
//! render phase draws that texture. Compile failures of either shader are
//! reported back to the main world.

/// Main world to render world extraction systems.
pub mod extraction;

/// Custom particle render pipeline with GPU-side quad expansion.
pub mod pipeline;

/// Shader compile failure detection and reporting.
pub mod shader_failure;

/// Ping-pong simulation compute pass.
pub mod simulation;
