//! Asset types and loaders for particle source data.
//!
//! Both loaders run on Bevy's IO task pool; their errors surface through the
//! asset server's load state and are reported by the loading systems.

/// Raster images decoded for the heightmap projection.
pub mod heightmap_source;

/// Wavefront OBJ files decoded into a mesh scene graph.
pub mod obj_scene;
