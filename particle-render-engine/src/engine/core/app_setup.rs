use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::WindowResized;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::assets::heightmap_source::{HeightmapSource, HeightmapSourceLoader};
use crate::engine::assets::obj_scene::{MeshScene, ObjSceneLoader};
use crate::engine::camera::frame_driver::{
    ViewportResize, clear_colour, forward_window_resize, handle_viewport_resize,
    init_output_surface, spawn_particle_camera,
};
use crate::engine::camera::viewport_camera::{OrbitCamera, camera_controller};
use crate::engine::config::ParticleConfig;
use crate::engine::core::app_state::{FrameState, log_frame_state};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_reload::{
    ConfigAssetPath, apply_config_updates, watch_config_asset,
};
use crate::engine::loading::events::{LoadParticleData, ParticleDataReady, ParticleFailure};
use crate::engine::loading::request::{
    handle_load_requests, poll_pending_load, request_initial_load,
};
use crate::engine::particles::particle_system::{
    initialise_particle_system, release_on_exit, update_particle_system,
};
use crate::engine::render::pipeline::particle_render_pipeline::ParticleRenderPlugin;
use crate::engine::render::shader_failure::{ShaderFailureChannel, handle_shader_failures};
use crate::engine::render::simulation::ParticleSimulationPlugin;

/// Main world particle logic: loading, particle system lifecycle and viewport resizes.
///
/// Needs no GPU, so it also runs in headless apps.
pub struct ParticleCorePlugin {
    config: ParticleConfig,
    load_on_startup: bool,
    config_asset: Option<String>,
}

impl ParticleCorePlugin {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            load_on_startup: true,
            config_asset: None,
        }
    }

    /// Skip the startup load request; data only arrives through [`LoadParticleData`].
    pub fn without_startup_load(mut self) -> Self {
        self.load_on_startup = false;
        self
    }

    /// Watch a `*.config.json` asset and apply its changes at runtime.
    pub fn with_config_asset(mut self, path: impl Into<String>) -> Self {
        self.config_asset = Some(path.into());
        self
    }
}

impl Plugin for ParticleCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_state::<FrameState>()
            .init_resource::<OrbitCamera>()
            .init_resource::<ShaderFailureChannel>()
            .add_event::<LoadParticleData>()
            .add_event::<ParticleDataReady>()
            .add_event::<ParticleFailure>()
            .add_event::<ViewportResize>()
            .add_event::<WindowResized>()
            .init_asset::<MeshScene>()
            .init_asset_loader::<ObjSceneLoader>()
            .init_asset::<HeightmapSource>()
            .init_asset_loader::<HeightmapSourceLoader>();

        app.add_systems(
            Update,
            (
                handle_shader_failures,
                handle_load_requests,
                poll_pending_load,
                initialise_particle_system,
            )
                .chain(),
        )
        .add_systems(Update, (forward_window_resize, handle_viewport_resize).chain())
        .add_systems(
            PostUpdate,
            update_particle_system.run_if(in_state(FrameState::Active)),
        )
        .add_systems(Last, release_on_exit)
        .add_systems(OnEnter(FrameState::Active), log_frame_state)
        .add_systems(OnEnter(FrameState::Uninitialised), log_frame_state);

        if self.load_on_startup {
            app.add_systems(Startup, request_initial_load);
        }

        if let Some(path) = &self.config_asset {
            app.add_plugins(JsonAssetPlugin::<ParticleConfig>::new(&["config.json"]))
                .insert_resource(ConfigAssetPath(path.clone()))
                .add_systems(Startup, watch_config_asset)
                .add_systems(Update, apply_config_updates.before(handle_load_requests));
        }
    }
}

/// Full particle engine: core logic plus camera, simulation and render pipelines.
pub struct ParticleEnginePlugin {
    config: ParticleConfig,
    config_asset: Option<String>,
}

impl ParticleEnginePlugin {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            config,
            config_asset: None,
        }
    }

    pub fn with_config_asset(mut self, path: impl Into<String>) -> Self {
        self.config_asset = Some(path.into());
        self
    }
}

impl Plugin for ParticleEnginePlugin {
    fn build(&self, app: &mut App) {
        let mut core = ParticleCorePlugin::new(self.config.clone());
        if let Some(path) = &self.config_asset {
            core = core.with_config_asset(path.clone());
        }

        app.add_plugins(core)
            .add_plugins(ParticleRenderPlugin)
            .add_plugins(ParticleSimulationPlugin)
            .insert_resource(clear_colour())
            .add_systems(Startup, (init_output_surface, spawn_particle_camera).chain())
            .add_systems(Update, camera_controller);
    }
}

pub fn create_app(config: ParticleConfig, config_asset: Option<&str>) -> App {
    let mut engine = ParticleEnginePlugin::new(config);
    if let Some(path) = config_asset {
        engine = engine.with_config_asset(path);
    }

    let mut app = App::new();
    app.add_plugins(create_default_plugins()).add_plugins(engine);
    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
