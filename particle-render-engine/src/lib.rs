//! GPU particle renderer.
//!
//! Particle positions live in an RGBA32F texture built from one of three
//! providers (random cloud, image heightmap, mesh vertices). A compute pass
//! advances them each frame into a second texture and a custom render
//! pipeline draws the result as screen-aligned point sprites.

pub mod engine;

pub use engine::core::app_setup::{ParticleCorePlugin, ParticleEnginePlugin, create_app};
