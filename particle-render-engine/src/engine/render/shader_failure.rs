//! Shader compile failure reporting.
//!
//! The render world inspects the pipeline cache for the simulation and render
//! pipelines and sends the first hard failure of each particle system
//! generation to the main world, which tears that system down. Shader
//! assets that fail to load are reported from the main world the same way,
//! since the pipeline cache only ever sees them as not loaded yet.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::render_resource::{
    CachedComputePipelineId, CachedPipelineState, CachedRenderPipelineId, PipelineCache,
    PipelineCacheError, Shader,
};
use crossbeam_channel::{Receiver, Sender};

use crate::engine::core::app_state::FrameState;
use crate::engine::error::ParticleError;
use crate::engine::loading::events::ParticleFailure;
use crate::engine::particles::particle_system::{ParticleSystem, release};
use crate::engine::render::extraction::render_state::ParticleRenderState;

pub const SIMULATION_SHADER: &str = "shaders/particle_simulation.wgsl";
pub const RENDER_SHADER: &str = "shaders/particle_render.wgsl";

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderFailureReport {
    pub generation: u64,
    pub error: ParticleError,
}

/// Both ends of the render world to main world failure channel.
#[derive(Resource, Clone)]
pub struct ShaderFailureChannel {
    pub sender: Sender<ShaderFailureReport>,
    pub receiver: Receiver<ShaderFailureReport>,
}

impl Default for ShaderFailureChannel {
    fn default() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }
}

/// Render world end of the channel.
#[derive(Resource)]
pub struct ShaderFailureSender {
    sender: Sender<ShaderFailureReport>,
    reported_generation: Option<u64>,
}

impl ShaderFailureSender {
    pub fn new(sender: Sender<ShaderFailureReport>) -> Self {
        Self {
            sender,
            reported_generation: None,
        }
    }
}

/// Pipelines queued for the current particle system, filled in by the queue systems.
#[derive(Resource, Default)]
pub struct ParticlePipelineIds {
    pub simulation: Option<CachedComputePipelineId>,
    pub render: Option<CachedRenderPipelineId>,
}

/// Shader assets the particle pipelines are built from, keyed by asset path.
#[derive(Resource, Debug, Clone, Default)]
pub struct ParticleShaders(pub Vec<(String, Handle<Shader>)>);

pub fn load_particle_shaders(mut commands: Commands, asset_server: Res<AssetServer>) {
    let shaders = [SIMULATION_SHADER, RENDER_SHADER]
        .into_iter()
        .map(|path| (path.to_string(), asset_server.load(path)))
        .collect();
    commands.insert_resource(ParticleShaders(shaders));
}

/// Main world: a shader asset that failed to load aborts the current generation.
pub fn report_failed_shader_loads(
    shaders: Option<Res<ParticleShaders>>,
    system: Option<Res<ParticleSystem>>,
    asset_server: Res<AssetServer>,
    channel: Res<ShaderFailureChannel>,
    mut reported_generation: Local<Option<u64>>,
) {
    let (Some(shaders), Some(system)) = (shaders, system) else {
        return;
    };
    if *reported_generation == Some(system.generation) {
        return;
    }

    let failed = shaders.0.iter().find_map(|(path, handle)| {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Failed(err)) => {
                Some(ParticleError::shader(path.clone(), format!("failed to load: {err}")))
            }
            _ => None,
        }
    });
    let Some(error) = failed else {
        return;
    };

    let report = ShaderFailureReport {
        generation: system.generation,
        error,
    };
    if channel.sender.send(report).is_err() {
        warn!("Shader failure receiver dropped");
    }
    *reported_generation = Some(system.generation);
}

/// Turn a pipeline cache state into a compile failure, ignoring transient states.
pub fn compile_failure(shader: &str, state: &CachedPipelineState) -> Option<ParticleError> {
    let CachedPipelineState::Err(err) = state else {
        return None;
    };
    match err {
        PipelineCacheError::ShaderNotLoaded(_) | PipelineCacheError::ShaderImportNotYetAvailable => {
            None
        }
        other => Some(ParticleError::shader(shader, other)),
    }
}

/// Render world: report the first failed particle pipeline once per generation.
pub fn report_pipeline_failures(
    mut sender: ResMut<ShaderFailureSender>,
    pipeline_ids: Res<ParticlePipelineIds>,
    pipeline_cache: Res<PipelineCache>,
    render_state: Res<ParticleRenderState>,
) {
    if !render_state.active || sender.reported_generation == Some(render_state.generation) {
        return;
    }

    let simulation = pipeline_ids.simulation.and_then(|id| {
        compile_failure(SIMULATION_SHADER, pipeline_cache.get_compute_pipeline_state(id))
    });
    let render = pipeline_ids.render.and_then(|id| {
        compile_failure(RENDER_SHADER, pipeline_cache.get_render_pipeline_state(id))
    });

    let Some(error) = simulation.or(render) else {
        return;
    };

    let report = ShaderFailureReport {
        generation: render_state.generation,
        error,
    };
    if sender.sender.send(report).is_err() {
        warn!("Shader failure receiver dropped");
    }
    sender.reported_generation = Some(render_state.generation);
}

/// Main world: abort the particle system a shader failure was reported for.
pub fn handle_shader_failures(
    mut commands: Commands,
    channel: Res<ShaderFailureChannel>,
    system: Option<Res<ParticleSystem>>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut next_state: ResMut<NextState<FrameState>>,
    mut failures: EventWriter<ParticleFailure>,
) {
    for report in channel.receiver.try_iter() {
        let Some(system) = system.as_deref() else {
            continue;
        };
        if system.generation != report.generation {
            debug!(
                "Ignoring shader failure for released generation {}",
                report.generation
            );
            continue;
        }

        error!("{}", report.error);
        release(&mut commands, system, &mut images, &mut meshes);
        next_state.set(FrameState::Uninitialised);
        failures.write(ParticleFailure(report.error));
    }
}
