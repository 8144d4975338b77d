use bevy::prelude::*;

use crate::engine::config::ParticleConfig;
use crate::engine::loading::events::LoadParticleData;

/// Handle of the watched configuration asset.
#[derive(Resource, Debug, Clone)]
pub struct ConfigAsset(pub Handle<ParticleConfig>);

/// Start watching the configuration file through the asset server.
pub fn watch_config_asset(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    path: Res<ConfigAssetPath>,
) {
    info!("Watching configuration asset '{}'", path.0);
    commands.insert_resource(ConfigAsset(asset_server.load(path.0.clone())));
}

/// Asset path of the live configuration, relative to the asset root.
#[derive(Resource, Debug, Clone)]
pub struct ConfigAssetPath(pub String);

/// Activate a (re)loaded configuration asset and reload particle data if it changed.
pub fn apply_config_updates(
    mut events: EventReader<AssetEvent<ParticleConfig>>,
    watched: Option<Res<ConfigAsset>>,
    configs: Res<Assets<ParticleConfig>>,
    mut active: ResMut<ParticleConfig>,
    mut requests: EventWriter<LoadParticleData>,
) {
    let Some(watched) = watched else {
        events.clear();
        return;
    };

    let mut changed = false;
    for event in events.read() {
        if event.is_loaded_with_dependencies(&watched.0) || event.is_modified(&watched.0) {
            changed = true;
        }
    }
    if !changed {
        return;
    }

    let Some(config) = configs.get(&watched.0) else {
        return;
    };

    if *config == *active {
        debug!("Configuration asset unchanged");
        return;
    }

    if let Err(err) = config.validate() {
        warn!("Ignoring configuration update: {}", err);
        return;
    }

    info!("Configuration changed, reloading '{}' source", config.source);
    *active = config.clone();
    requests.write(LoadParticleData {
        source: active.source,
    });
}
