#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use particle_render_engine::ParticleCorePlugin;
use particle_render_engine::engine::config::ParticleConfig;
use particle_render_engine::engine::error::ParticleError;
use particle_render_engine::engine::loading::events::ParticleFailure;
use particle_render_engine::engine::particles::particle_system::ParticleCloud;

/// Failures observed by the test app, in order.
#[derive(Resource, Default)]
pub struct FailureLog(pub Vec<ParticleError>);

fn collect_failures(mut failures: EventReader<ParticleFailure>, mut log: ResMut<FailureLog>) {
    log.0.extend(failures.read().map(|failure| failure.0.clone()));
}

/// Headless app with the core particle plugin and no GPU.
pub fn headless_app(config: ParticleConfig) -> App {
    headless_app_with(ParticleCorePlugin::new(config).without_startup_load())
}

pub fn headless_app_with(plugin: ParticleCorePlugin) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        AssetPlugin {
            meta_check: AssetMetaCheck::Never,
            ..default()
        },
        StatesPlugin,
    ))
    .init_asset::<Image>()
    .init_asset::<Mesh>()
    .add_plugins(plugin)
    .init_resource::<FailureLog>()
    .add_systems(Last, collect_failures);
    app
}

pub fn update_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Update until `done` holds, giving asset IO threads time to run.
pub fn update_until(app: &mut App, mut done: impl FnMut(&mut App) -> bool) -> bool {
    for _ in 0..500 {
        app.update();
        if done(app) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

pub fn clouds(app: &mut App) -> Vec<(Entity, ParticleCloud, Transform)> {
    let mut query = app
        .world_mut()
        .query::<(Entity, &ParticleCloud, &Transform)>();
    query
        .iter(app.world())
        .map(|(entity, cloud, transform)| (entity, cloud.clone(), *transform))
        .collect()
}

pub fn failures(app: &App) -> &[ParticleError] {
    &app.world().resource::<FailureLog>().0
}
