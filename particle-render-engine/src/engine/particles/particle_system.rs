use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponent;
use bevy::render::view::NoFrustumCulling;

use crate::engine::config::{ParticleConfig, SourceKind};
use crate::engine::core::app_state::FrameState;
use crate::engine::data::PositionBuffer;
use crate::engine::loading::events::ParticleDataReady;
use crate::engine::particles::point_index_mesh::create_point_index_mesh;
use crate::engine::particles::position_texture::create_position_image;

/// Marks the drawable point cloud and carries what the draw call needs.
#[derive(Component, Clone, Debug, PartialEq, Eq, ExtractComponent)]
pub struct ParticleCloud {
    pub point_count: u32,
    pub width: u32,
    pub height: u32,
}

/// The active particle system.
///
/// Owns both ping-pong position textures, the point index mesh and the
/// spawned entity. Present as a resource only while a system is active.
#[derive(Resource, Debug, Clone)]
pub struct ParticleSystem {
    pub entity: Entity,
    pub textures: [Handle<Image>; 2],
    pub mesh: Handle<Mesh>,
    pub width: u32,
    pub height: u32,
    pub active_count: usize,
    pub source: SourceKind,
    /// Increases with every initialisation; used to ignore reports about released systems.
    pub generation: u64,
    front: usize,
    frames: u64,
}

impl ParticleSystem {
    /// Texture the simulation reads this frame: the previous frame's output.
    pub fn read_texture(&self) -> &Handle<Image> {
        &self.textures[self.front]
    }

    /// Texture the simulation writes this frame and the render pass draws from.
    pub fn write_texture(&self) -> &Handle<Image> {
        &self.textures[1 - self.front]
    }

    pub fn point_count(&self) -> u32 {
        self.width * self.height
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Swap ping-pong roles so this frame reads what the last one wrote.
    pub fn advance(&mut self) {
        self.front = 1 - self.front;
        self.frames += 1;
    }
}

/// Build a particle system from the latest ready buffer, releasing the previous one.
pub fn initialise_particle_system(
    mut commands: Commands,
    mut ready: EventReader<ParticleDataReady>,
    existing: Option<Res<ParticleSystem>>,
    config: Res<ParticleConfig>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut next_state: ResMut<NextState<FrameState>>,
    mut generation: Local<u64>,
) {
    let Some(ParticleDataReady(buffer)) = ready.read().last() else {
        return;
    };

    if let Some(existing) = existing {
        info!(
            "Replacing particle system generation {} ({}x{})",
            existing.generation, existing.width, existing.height
        );
        release(&mut commands, &existing, &mut images, &mut meshes);
    }

    *generation += 1;
    let system = acquire(
        &mut commands,
        buffer,
        &config,
        *generation,
        &mut images,
        &mut meshes,
    );

    info!(
        "Particle system generation {} initialised: {}x{} grid, {} active, {} padding",
        system.generation,
        system.width,
        system.height,
        buffer.active_count(),
        buffer.padding_count()
    );

    commands.insert_resource(system);
    next_state.set(FrameState::Active);
}

fn acquire(
    commands: &mut Commands,
    buffer: &PositionBuffer,
    config: &ParticleConfig,
    generation: u64,
    images: &mut Assets<Image>,
    meshes: &mut Assets<Mesh>,
) -> ParticleSystem {
    let image = create_position_image(buffer);
    let textures = [images.add(image.clone()), images.add(image)];
    let mesh = meshes.add(create_point_index_mesh(buffer.width(), buffer.height()));

    let translation = match buffer.source() {
        SourceKind::Mesh => config.mesh_offset(),
        _ => Vec3::ZERO,
    };

    let entity = commands
        .spawn((
            Mesh3d(mesh.clone()),
            Transform::from_translation(translation),
            Visibility::Visible,
            ParticleCloud {
                point_count: buffer.point_count() as u32,
                width: buffer.width(),
                height: buffer.height(),
            },
            NoFrustumCulling,
        ))
        .id();

    ParticleSystem {
        entity,
        textures,
        mesh,
        width: buffer.width(),
        height: buffer.height(),
        active_count: buffer.active_count(),
        source: buffer.source(),
        generation,
        front: 0,
        frames: 0,
    }
}

/// Despawn the particle entity and drop its textures and mesh from their stores.
pub fn release(
    commands: &mut Commands,
    system: &ParticleSystem,
    images: &mut Assets<Image>,
    meshes: &mut Assets<Mesh>,
) {
    commands.entity(system.entity).despawn();
    for texture in &system.textures {
        images.remove(texture);
    }
    meshes.remove(&system.mesh);
    commands.remove_resource::<ParticleSystem>();

    info!("Released particle system generation {}", system.generation);
}

/// Per-frame update: swap which texture the simulation reads and writes.
pub fn update_particle_system(system: Option<ResMut<ParticleSystem>>) {
    if let Some(mut system) = system {
        system.advance();
    }
}

/// Release the active system when the app is shutting down.
pub fn release_on_exit(
    mut commands: Commands,
    mut exits: EventReader<AppExit>,
    system: Option<Res<ParticleSystem>>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(system) = system {
        release(&mut commands, &system, &mut images, &mut meshes);
    }
}
