//! Particle engine configuration.
//!
//! A `ParticleConfig` is handed to the engine plugin at construction and can
//! optionally be reloaded from a JSON asset at runtime.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use constants::render_settings::{
    DEFAULT_PARTICLE_COLOUR, DEFAULT_POINT_SIZE, MESH_PARTICLE_OFFSET,
};
use constants::simulation::{
    DEFAULT_ANGULAR_SPEED, DEFAULT_ELEVATION, DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_RANDOM_SCALE,
};
use constants::texture::{DEFAULT_GRID_SIZE, MAX_TEXTURE_DIMENSION};
use serde::{Deserialize, Serialize};

use crate::engine::error::ConfigError;

/// Where initial particle positions come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Random,
    Image,
    #[default]
    #[serde(alias = "obj")]
    Mesh,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Random => "random",
            Self::Image => "image",
            Self::Mesh => "mesh",
        };
        f.write_str(name)
    }
}

#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub source: SourceKind,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Half extent of the random cloud on every axis.
    pub random_scale: f32,
    /// Fixed seed for the random provider; entropy-seeded when absent.
    pub random_seed: Option<u64>,
    /// Height of a white pixel in the heightmap projection.
    pub elevation: f32,
    pub image_path: String,
    pub mesh_path: String,
    pub mesh_offset: [f32; 3],
    pub point_size: f32,
    pub particle_colour: [f32; 4],
    /// Radians per second the simulation pass rotates particles about Y.
    pub angular_speed: f32,
    pub load_timeout_secs: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            grid_width: DEFAULT_GRID_SIZE,
            grid_height: DEFAULT_GRID_SIZE,
            random_scale: DEFAULT_RANDOM_SCALE,
            random_seed: None,
            elevation: DEFAULT_ELEVATION,
            image_path: "img/test.png".to_string(),
            mesh_path: "obj/test.obj".to_string(),
            mesh_offset: MESH_PARTICLE_OFFSET,
            point_size: DEFAULT_POINT_SIZE,
            particle_colour: DEFAULT_PARTICLE_COLOUR,
            angular_speed: DEFAULT_ANGULAR_SPEED,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl ParticleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load from `path`, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "Using default particle config ({}: {})",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid {
                field: "grid_width/grid_height",
                reason: format!(
                    "grid must be non-empty, got {}x{}",
                    self.grid_width, self.grid_height
                ),
            });
        }
        if self.grid_width > MAX_TEXTURE_DIMENSION || self.grid_height > MAX_TEXTURE_DIMENSION {
            return Err(ConfigError::Invalid {
                field: "grid_width/grid_height",
                reason: format!(
                    "grid sides are limited to {}, got {}x{}",
                    MAX_TEXTURE_DIMENSION, self.grid_width, self.grid_height
                ),
            });
        }
        if !(self.point_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "point_size",
                reason: format!("must be positive, got {}", self.point_size),
            });
        }
        if !(self.load_timeout_secs > 0.0) {
            return Err(ConfigError::Invalid {
                field: "load_timeout_secs",
                reason: format!("must be positive, got {}", self.load_timeout_secs),
            });
        }
        Ok(())
    }

    pub fn grid(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    pub fn mesh_offset(&self) -> Vec3 {
        Vec3::from_array(self.mesh_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_scene() {
        let config = ParticleConfig::default();
        assert_eq!(config.grid(), (256, 256));
        assert_eq!(config.random_scale, 256.0);
        assert_eq!(config.elevation, 100.0);
        assert_eq!(config.point_size, 2.0);
        assert_eq!(config.mesh_offset(), Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(config.source, SourceKind::Mesh);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ParticleConfig::from_json_str(r#"{ "source": "random", "grid_width": 4 }"#).unwrap();
        assert_eq!(config.source, SourceKind::Random);
        assert_eq!(config.grid(), (4, 256));
        assert_eq!(config.mesh_path, "obj/test.obj");
    }

    #[test]
    fn obj_is_an_alias_for_mesh() {
        let config = ParticleConfig::from_json_str(r#"{ "source": "obj" }"#).unwrap();
        assert_eq!(config.source, SourceKind::Mesh);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let err = ParticleConfig::from_json_str(r#"{ "grid_height": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn grid_larger_than_a_texture_is_rejected() {
        let err = ParticleConfig::from_json_str(r#"{ "grid_width": 70000, "grid_height": 70000 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grid_width/grid_height", .. }));

        let config = ParticleConfig {
            grid_width: MAX_TEXTURE_DIMENSION,
            grid_height: MAX_TEXTURE_DIMENSION,
            ..default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_point_size_is_rejected() {
        let err = ParticleConfig::from_json_str(r#"{ "point_size": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "point_size", .. }));
    }

    #[test]
    fn unknown_source_is_a_json_error() {
        let err = ParticleConfig::from_json_str(r#"{ "source": "video" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ParticleConfig::load_or_default("does/not/exist.config.json");
        assert_eq!(config, ParticleConfig::default());
    }
}
