use bevy::prelude::*;
use bevy::render::Extract;

use crate::engine::config::ParticleConfig;
use crate::engine::particles::particle_system::ParticleSystem;

/// Per-frame particle data the render world needs for simulation and drawing.
///
/// Always present in the render world; `active` is false until a particle
/// system exists, and every render-world particle system is skipped then.
#[derive(Resource, Default, Clone, Debug, PartialEq)]
pub struct ParticleRenderState {
    pub active: bool,
    pub generation: u64,
    /// Simulation input: last frame's output.
    pub read_texture: Handle<Image>,
    /// Simulation output and render input.
    pub write_texture: Handle<Image>,
    pub width: u32,
    pub height: u32,
    pub point_size: f32,
    pub colour: [f32; 4],
    pub delta_time: f32,
    pub angular_speed: f32,
}

impl ParticleRenderState {
    pub fn from_system(
        system: Option<&ParticleSystem>,
        config: &ParticleConfig,
        delta_time: f32,
    ) -> Self {
        let Some(system) = system else {
            return Self::default();
        };

        Self {
            active: true,
            generation: system.generation,
            read_texture: system.read_texture().clone(),
            write_texture: system.write_texture().clone(),
            width: system.width,
            height: system.height,
            point_size: config.point_size,
            colour: config.particle_colour,
            delta_time,
            angular_speed: config.angular_speed,
        }
    }

    pub fn point_count(&self) -> u32 {
        self.width * self.height
    }
}

pub fn extract_particle_render_state(
    mut commands: Commands,
    system: Extract<Option<Res<ParticleSystem>>>,
    config: Extract<Res<ParticleConfig>>,
    time: Extract<Res<Time>>,
) {
    commands.insert_resource(ParticleRenderState::from_system(
        system.as_deref(),
        &config,
        time.delta_secs(),
    ));
}

/// Run condition for render-world systems that need an active particle system.
pub fn particles_active(state: Option<Res<ParticleRenderState>>) -> bool {
    state.is_some_and(|state| state.active)
}
