use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::heightmap_source::HeightmapSource;
use crate::engine::assets::obj_scene::MeshScene;
use crate::engine::config::{ParticleConfig, SourceKind};
use crate::engine::data::heightmap::heightmap_positions;
use crate::engine::data::mesh::mesh_positions;
use crate::engine::data::random::{random_positions, seeded_rng};
use crate::engine::data::PositionBuffer;
use crate::engine::error::ParticleError;
use crate::engine::loading::events::{LoadParticleData, ParticleDataReady, ParticleFailure};
use crate::engine::loading::pending::{PendingAsset, PendingLoad};

/// Send the configured source as the first load request.
pub fn request_initial_load(config: Res<ParticleConfig>, mut requests: EventWriter<LoadParticleData>) {
    info!("Requesting initial particle data from '{}' source", config.source);
    requests.write(LoadParticleData {
        source: config.source,
    });
}

/// Start the most recent load request of the frame.
///
/// Random data is produced immediately. Image and mesh sources start an
/// asset load tracked by [`PendingLoad`]; any earlier pending load is dropped.
pub fn handle_load_requests(
    mut commands: Commands,
    mut requests: EventReader<LoadParticleData>,
    pending: Option<Res<PendingLoad>>,
    config: Res<ParticleConfig>,
    asset_server: Res<AssetServer>,
    time: Res<Time<Real>>,
    mut ready: EventWriter<ParticleDataReady>,
    mut failures: EventWriter<ParticleFailure>,
) {
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    if let Some(pending) = pending {
        info!(
            "Cancelling pending {} load of '{}' after {:.2}s",
            pending.source,
            pending.path,
            pending.elapsed(time.elapsed()).as_secs_f32()
        );
        commands.remove_resource::<PendingLoad>();
    }

    let (width, height) = config.grid();
    match request.source {
        SourceKind::Random => {
            let mut rng = seeded_rng(config.random_seed);
            match random_positions(width, height, config.random_scale, &mut rng) {
                Ok(buffer) => {
                    info!("Generated {}x{} random particles", width, height);
                    ready.write(ParticleDataReady(buffer));
                }
                Err(err) => report_failure(&mut failures, err),
            }
        }
        SourceKind::Image => {
            let handle = asset_server.load::<HeightmapSource>(config.image_path.clone());
            info!("Loading heightmap '{}'", config.image_path);
            commands.insert_resource(PendingLoad {
                source: SourceKind::Image,
                path: config.image_path.clone(),
                asset: PendingAsset::Heightmap(handle),
                started: time.elapsed(),
            });
        }
        SourceKind::Mesh => {
            let handle = asset_server.load::<MeshScene>(config.mesh_path.clone());
            info!("Loading mesh '{}'", config.mesh_path);
            commands.insert_resource(PendingLoad {
                source: SourceKind::Mesh,
                path: config.mesh_path.clone(),
                asset: PendingAsset::Scene(handle),
                started: time.elapsed(),
            });
        }
    }
}

/// Finish, fail or time out the pending load.
pub fn poll_pending_load(
    mut commands: Commands,
    pending: Option<Res<PendingLoad>>,
    config: Res<ParticleConfig>,
    asset_server: Res<AssetServer>,
    heightmaps: Res<Assets<HeightmapSource>>,
    scenes: Res<Assets<MeshScene>>,
    time: Res<Time<Real>>,
    mut ready: EventWriter<ParticleDataReady>,
    mut failures: EventWriter<ParticleFailure>,
) {
    let Some(pending) = pending else {
        return;
    };

    let outcome = match asset_server.get_load_state(pending.asset.id()) {
        Some(LoadState::Loaded) => build_buffer(&pending, &config, &heightmaps, &scenes),
        Some(LoadState::Failed(err)) => Some(Err(ParticleError::load(pending.path.clone(), err))),
        _ if pending.is_expired(time.elapsed(), config.load_timeout_secs) => Some(Err(
            ParticleError::load(pending.path.clone(), "timed out"),
        )),
        _ => None,
    };

    let Some(outcome) = outcome else {
        return;
    };

    commands.remove_resource::<PendingLoad>();
    match outcome {
        Ok(buffer) => {
            info!(
                "Loaded {} source '{}' in {:.2}s ({}x{} grid)",
                pending.source,
                pending.path,
                pending.elapsed(time.elapsed()).as_secs_f32(),
                buffer.width(),
                buffer.height()
            );
            ready.write(ParticleDataReady(buffer));
        }
        Err(err) => report_failure(&mut failures, err),
    }
}

/// Run the provider for a loaded asset. `None` while the asset is not yet in its store.
fn build_buffer(
    pending: &PendingLoad,
    config: &ParticleConfig,
    heightmaps: &Assets<HeightmapSource>,
    scenes: &Assets<MeshScene>,
) -> Option<Result<PositionBuffer, ParticleError>> {
    match &pending.asset {
        PendingAsset::Heightmap(handle) => {
            let source = heightmaps.get(handle)?;
            let (width, height) = config.grid();
            Some(
                heightmap_positions(&source.image, width, height, config.elevation).map_err(
                    |err| match err {
                        ParticleError::MalformedAsset { reason, .. } => {
                            ParticleError::malformed(pending.path.clone(), reason)
                        }
                        other => other,
                    },
                ),
            )
        }
        PendingAsset::Scene(handle) => {
            let scene = scenes.get(handle)?;
            Some(mesh_positions(&scene.root).map(|(buffer, packing)| {
                if packing.padded > 0 || packing.dropped > 0 {
                    warn!(
                        "Packed {} vertices into {}x{} grid: {} padding, {} dropped",
                        packing.vertex_count,
                        packing.side,
                        packing.side,
                        packing.padded,
                        packing.dropped
                    );
                }
                buffer
            }))
        }
    }
}

pub fn report_failure(failures: &mut EventWriter<ParticleFailure>, err: ParticleError) {
    error!("{}", err);
    failures.write(ParticleFailure(err));
}
