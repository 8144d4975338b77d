//! Particle position providers.
//!
//! Each provider turns a source (random numbers, a heightmap image, a mesh
//! scene) into a [`PositionBuffer`] laid out as a grid matching the positions
//! texture it will be uploaded into.

/// Heightmap projection of a raster image onto an XZ grid.
pub mod heightmap;

/// Mesh scene graph traversal and square-grid vertex packing.
pub mod mesh;

/// Uniformly distributed random cloud.
pub mod random;

use bevy::math::Vec3;
use constants::texture::{MAX_TEXTURE_DIMENSION, POSITION_COMPONENTS};

use crate::engine::config::SourceKind;
use crate::engine::error::ParticleError;

/// Flat XYZ triplets laid out as a `width × height` grid.
///
/// Entries at index `active_count` and beyond are padding: they stay at the
/// origin and are flagged inactive when uploaded to the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
    active_count: usize,
    source: SourceKind,
}

impl PositionBuffer {
    /// Wrap a fully populated buffer.
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<f32>,
        source: SourceKind,
    ) -> Result<Self, ParticleError> {
        let point_count = width as usize * height as usize;
        Self::with_active_count(width, height, data, point_count, source)
    }

    /// Wrap a buffer whose first `active_count` entries hold real particles.
    pub fn with_active_count(
        width: u32,
        height: u32,
        data: Vec<f32>,
        active_count: usize,
        source: SourceKind,
    ) -> Result<Self, ParticleError> {
        if width == 0 || height == 0 {
            return Err(ParticleError::malformed(
                source.to_string(),
                format!("grid dimensions must be non-zero, got {width}x{height}"),
            ));
        }
        if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
            return Err(ParticleError::malformed(
                source.to_string(),
                format!("{width}x{height} grid exceeds the {MAX_TEXTURE_DIMENSION} texel limit"),
            ));
        }

        let point_count = width as usize * height as usize;
        let expected = point_count * POSITION_COMPONENTS;
        if data.len() != expected {
            return Err(ParticleError::malformed(
                source.to_string(),
                format!(
                    "{width}x{height} grid needs {expected} floats, got {}",
                    data.len()
                ),
            ));
        }

        Ok(Self {
            width,
            height,
            data,
            active_count: active_count.min(point_count),
            source,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Number of floats, always `width * height * 3`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Grid cells, active or not.
    pub fn point_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn padding_count(&self) -> usize {
        self.point_count() - self.active_count
    }

    pub fn is_active(&self, index: usize) -> bool {
        index < self.active_count
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        let start = index * POSITION_COMPONENTS;
        self.data
            .get(start..start + POSITION_COMPONENTS)
            .map(|xyz| Vec3::new(xyz[0], xyz[1], xyz[2]))
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.data
            .chunks_exact(POSITION_COMPONENTS)
            .map(|xyz| Vec3::new(xyz[0], xyz[1], xyz[2]))
    }
}
