//! Runtime configuration updates through the watched config asset.

mod common;

use bevy::prelude::*;
use common::{failures, headless_app_with, update_frames};
use particle_render_engine::ParticleCorePlugin;
use particle_render_engine::engine::config::{ParticleConfig, SourceKind};
use particle_render_engine::engine::core::app_state::FrameState;
use particle_render_engine::engine::loading::config_reload::ConfigAsset;
use particle_render_engine::engine::particles::particle_system::ParticleSystem;

fn random_config() -> ParticleConfig {
    ParticleConfig {
        source: SourceKind::Random,
        grid_width: 4,
        grid_height: 4,
        random_seed: Some(3),
        ..default()
    }
}

/// App watching a config asset held in memory instead of the file.
fn watching_app() -> (App, Handle<ParticleConfig>) {
    let plugin = ParticleCorePlugin::new(random_config())
        .without_startup_load()
        .with_config_asset("absent.config.json");
    let mut app = headless_app_with(plugin);
    app.update();

    let handle = app
        .world_mut()
        .resource_mut::<Assets<ParticleConfig>>()
        .add(random_config());
    app.insert_resource(ConfigAsset(handle.clone()));
    update_frames(&mut app, 2);
    (app, handle)
}

fn edit_config(app: &mut App, handle: &Handle<ParticleConfig>, config: ParticleConfig) {
    let mut configs = app.world_mut().resource_mut::<Assets<ParticleConfig>>();
    if let Some(stored) = configs.get_mut(handle) {
        *stored = config;
    }
}

#[test]
fn changed_config_asset_becomes_active_and_reloads() {
    let (mut app, handle) = watching_app();
    assert!(app.world().get_resource::<ParticleSystem>().is_none());

    let changed = ParticleConfig {
        grid_width: 2,
        grid_height: 3,
        ..random_config()
    };
    edit_config(&mut app, &handle, changed.clone());
    update_frames(&mut app, 3);

    assert_eq!(*app.world().resource::<ParticleConfig>(), changed);
    let system = app.world().resource::<ParticleSystem>();
    assert_eq!((system.width, system.height), (2, 3));
    assert_eq!(system.source, SourceKind::Random);
    assert_eq!(
        *app.world().resource::<State<FrameState>>().get(),
        FrameState::Active
    );
    assert!(failures(&app).is_empty());
}

#[test]
fn invalid_config_update_is_ignored() {
    let (mut app, handle) = watching_app();

    let invalid = ParticleConfig {
        point_size: 0.0,
        ..random_config()
    };
    edit_config(&mut app, &handle, invalid);
    update_frames(&mut app, 3);

    assert_eq!(*app.world().resource::<ParticleConfig>(), random_config());
    assert!(app.world().get_resource::<ParticleSystem>().is_none());
}
