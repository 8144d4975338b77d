use bevy::prelude::*;

use crate::engine::config::SourceKind;
use crate::engine::data::PositionBuffer;
use crate::engine::error::ParticleError;

/// Request particle data from a source; replaces the active particle system once it arrives.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadParticleData {
    pub source: SourceKind,
}

/// A provider finished and produced a buffer ready for upload.
#[derive(Event, Debug, Clone)]
pub struct ParticleDataReady(pub PositionBuffer);

/// Any load, decode or shader failure.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ParticleFailure(pub ParticleError);
