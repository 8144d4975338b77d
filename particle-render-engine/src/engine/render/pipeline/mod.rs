//! Particle render pipeline.
//!
//! Extends Bevy's `MeshPipeline` with a material bind group holding the
//! positions texture, its sampler and a uniform with point size, colour and
//! texture dimensions:
//!
//! - **@group(0)**: view uniforms via `SetMeshViewBindGroup`
//! - **@group(1)**: mesh transform via `SetMeshBindGroup`
//! - **@group(2)**: particle material
//!
//! Each particle is six vertices of the index mesh. The vertex shader reads
//! the particle's texel, culls inactive padding and expands the rest into a
//! screen-aligned quad `pointSize` pixels wide. The phase runs between the
//! main transparent pass and the end of the main pass, alpha blended and
//! depth tested against opaque geometry without writing depth.

/// Custom specialised mesh pipeline, render phase and graph node for particles.
pub mod particle_render_pipeline;
