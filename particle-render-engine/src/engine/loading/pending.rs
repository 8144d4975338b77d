use std::time::Duration;

use bevy::asset::UntypedAssetId;
use bevy::prelude::*;

use crate::engine::assets::heightmap_source::HeightmapSource;
use crate::engine::assets::obj_scene::MeshScene;
use crate::engine::config::SourceKind;

/// Typed handle of the asset an in-flight load is waiting on.
#[derive(Debug, Clone)]
pub enum PendingAsset {
    Heightmap(Handle<HeightmapSource>),
    Scene(Handle<MeshScene>),
}

impl PendingAsset {
    pub fn id(&self) -> UntypedAssetId {
        match self {
            Self::Heightmap(handle) => handle.id().untyped(),
            Self::Scene(handle) => handle.id().untyped(),
        }
    }
}

/// The single in-flight asynchronous load.
///
/// Replacing or removing the resource drops its handle, which cancels the
/// load from the engine's point of view: a late completion has nothing to
/// report to.
#[derive(Resource, Debug, Clone)]
pub struct PendingLoad {
    pub source: SourceKind,
    pub path: String,
    pub asset: PendingAsset,
    pub started: Duration,
}

impl PendingLoad {
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started)
    }

    pub fn is_expired(&self, now: Duration, timeout_secs: f32) -> bool {
        is_expired(self.started, now, timeout_secs)
    }
}

pub fn is_expired(started: Duration, now: Duration, timeout_secs: f32) -> bool {
    now.saturating_sub(started).as_secs_f32() > timeout_secs
}
