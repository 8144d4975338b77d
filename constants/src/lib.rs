//! Constants shared between the particle render engine and its tests.

pub mod luminance;
pub mod render_settings;
pub mod simulation;
pub mod texture;
