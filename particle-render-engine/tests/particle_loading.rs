//! End-to-end data flow: load requests through providers into the particle system.

mod common;

use bevy::prelude::*;
use common::{clouds, failures, headless_app, update_frames, update_until};
use particle_render_engine::engine::config::{ParticleConfig, SourceKind};
use particle_render_engine::engine::core::app_state::FrameState;
use particle_render_engine::engine::error::ParticleError;
use bevy::render::render_resource::Shader;
use particle_render_engine::engine::loading::events::LoadParticleData;
use particle_render_engine::engine::loading::pending::{PendingAsset, PendingLoad};
use particle_render_engine::engine::particles::particle_system::ParticleSystem;
use particle_render_engine::engine::render::shader_failure::{
    ParticleShaders, RENDER_SHADER, ShaderFailureChannel, ShaderFailureReport,
    handle_shader_failures, report_failed_shader_loads,
};

fn random_config() -> ParticleConfig {
    ParticleConfig {
        source: SourceKind::Random,
        grid_width: 4,
        grid_height: 4,
        random_scale: 10.0,
        random_seed: Some(42),
        ..default()
    }
}

fn request(app: &mut App, source: SourceKind) {
    app.world_mut().send_event(LoadParticleData { source });
}

fn frame_state(app: &App) -> FrameState {
    *app.world().resource::<State<FrameState>>().get()
}

fn particle_system(app: &App) -> ParticleSystem {
    app.world().resource::<ParticleSystem>().clone()
}

#[test]
fn random_load_builds_one_cloud_of_sixteen_points() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);

    assert_eq!(frame_state(&app), FrameState::Active);

    let clouds = clouds(&mut app);
    assert_eq!(clouds.len(), 1);
    assert_eq!(clouds[0].1.point_count, 16);
    assert_eq!(clouds[0].2.translation, Vec3::ZERO);

    let system = particle_system(&app);
    assert_eq!((system.width, system.height), (4, 4));

    let images = app.world().resource::<Assets<Image>>();
    let image = images.get(system.read_texture()).unwrap();
    assert_eq!((image.width(), image.height()), (4, 4));

    let texels: Vec<f32> = image
        .data
        .as_ref()
        .unwrap()
        .chunks_exact(4)
        .map(|bytes| f32::from_le_bytes(bytes.try_into().unwrap()))
        .collect();
    assert_eq!(texels.len(), 16 * 4);
    for texel in texels.chunks_exact(4) {
        assert!(texel[..3].iter().all(|v| (-10.0..=10.0).contains(v)));
        assert_eq!(texel[3], 1.0);
    }
}

#[test]
fn both_ping_pong_textures_start_identical() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);

    let system = particle_system(&app);
    let images = app.world().resource::<Assets<Image>>();
    let read = images.get(system.read_texture()).unwrap();
    let write = images.get(system.write_texture()).unwrap();
    assert_ne!(system.read_texture(), system.write_texture());
    assert_eq!(read.data, write.data);
}

#[test]
fn ping_pong_roles_swap_every_active_frame() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);

    let before = particle_system(&app);
    app.update();
    let after = particle_system(&app);

    assert_eq!(after.frames(), before.frames() + 1);
    assert_eq!(after.read_texture(), before.write_texture());
    assert_eq!(after.write_texture(), before.read_texture());
}

#[test]
fn new_data_replaces_the_particle_system() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    let first = particle_system(&app);

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    let second = particle_system(&app);

    assert_eq!(frame_state(&app), FrameState::Active);
    assert_eq!(second.generation, first.generation + 1);
    assert_eq!(clouds(&mut app).len(), 1);
    assert!(app.world().get_entity(first.entity).is_err());

    let images = app.world().resource::<Assets<Image>>();
    for texture in &first.textures {
        assert!(images.get(texture).is_none());
    }
    assert!(
        app.world()
            .resource::<Assets<Mesh>>()
            .get(&first.mesh)
            .is_none()
    );
}

#[test]
fn mesh_load_packs_vertices_and_offsets_cloud() {
    let config = ParticleConfig {
        source: SourceKind::Mesh,
        mesh_path: "obj/test.obj".to_string(),
        ..default()
    };
    let mut app = headless_app(config);

    request(&mut app, SourceKind::Mesh);
    let loaded = update_until(&mut app, |app| {
        app.world().contains_resource::<ParticleSystem>() || !failures(app).is_empty()
    });
    assert!(loaded, "mesh load did not finish");
    assert!(failures(&app).is_empty(), "{:?}", failures(&app));

    // 6 quads fan-triangulated into 36 vertices: floor(sqrt(108)) = 10.
    let system = particle_system(&app);
    assert_eq!((system.width, system.height), (10, 10));
    assert_eq!(system.active_count, 36);

    app.update();
    let clouds = clouds(&mut app);
    assert_eq!(clouds.len(), 1);
    assert_eq!(clouds[0].1.point_count, 100);
    assert_eq!(clouds[0].2.translation, Vec3::new(0.0, 0.0, 30.0));
}

#[test]
fn heightmap_load_fills_configured_grid() {
    let config = ParticleConfig {
        source: SourceKind::Image,
        grid_width: 32,
        grid_height: 16,
        image_path: "img/test.png".to_string(),
        ..default()
    };
    let mut app = headless_app(config);

    request(&mut app, SourceKind::Image);
    let loaded = update_until(&mut app, |app| {
        app.world().contains_resource::<ParticleSystem>() || !failures(app).is_empty()
    });
    assert!(loaded, "image load did not finish");
    assert!(failures(&app).is_empty(), "{:?}", failures(&app));

    let system = particle_system(&app);
    assert_eq!((system.width, system.height), (32, 16));
    assert_eq!(system.active_count, 32 * 16);
}

#[test]
fn missing_mesh_reports_load_failure_and_keeps_state() {
    let config = ParticleConfig {
        mesh_path: "obj/missing.obj".to_string(),
        ..random_config()
    };
    let mut app = headless_app(config);

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    let active = particle_system(&app);

    request(&mut app, SourceKind::Mesh);
    let failed = update_until(&mut app, |app| !failures(app).is_empty());
    assert!(failed, "missing mesh never failed");

    assert!(matches!(
        &failures(&app)[0],
        ParticleError::LoadFailure { path, .. } if path == "obj/missing.obj"
    ));
    assert_eq!(frame_state(&app), FrameState::Active);
    assert_eq!(particle_system(&app).generation, active.generation);
}

#[test]
fn stalled_load_times_out_and_keeps_state() {
    let config = ParticleConfig {
        load_timeout_secs: 0.001,
        ..random_config()
    };
    let mut app = headless_app(config);

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    let active = particle_system(&app);

    // Nothing ever loads the default handle, so the load never leaves the pending state.
    let started = app.world().resource::<Time<Real>>().elapsed();
    app.insert_resource(PendingLoad {
        source: SourceKind::Mesh,
        path: "obj/stalled.obj".to_string(),
        asset: PendingAsset::Scene(Handle::default()),
        started,
    });
    let failed = update_until(&mut app, |app| !failures(app).is_empty());
    assert!(failed, "stalled load never timed out");

    assert!(matches!(
        &failures(&app)[0],
        ParticleError::LoadFailure { path, reason }
            if path == "obj/stalled.obj" && reason.contains("timed out")
    ));
    assert!(app.world().get_resource::<PendingLoad>().is_none());
    assert_eq!(frame_state(&app), FrameState::Active);
    assert_eq!(particle_system(&app).generation, active.generation);
}

#[test]
fn newer_request_cancels_pending_load() {
    let config = ParticleConfig {
        mesh_path: "obj/test.obj".to_string(),
        ..random_config()
    };
    let mut app = headless_app(config);

    request(&mut app, SourceKind::Mesh);
    app.update();
    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);

    assert_eq!(particle_system(&app).source, SourceKind::Random);

    // Give the superseded mesh load time to finish; it must never be applied.
    update_frames(&mut app, 50);
    assert_eq!(particle_system(&app).source, SourceKind::Random);
    assert_eq!(particle_system(&app).generation, 1);
}

#[test]
fn shader_failure_aborts_current_particle_system() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    let system = particle_system(&app);

    let sender = app.world().resource::<ShaderFailureChannel>().sender.clone();
    sender
        .send(ShaderFailureReport {
            generation: system.generation,
            error: ParticleError::shader(RENDER_SHADER, "unknown identifier"),
        })
        .unwrap();
    update_frames(&mut app, 2);

    assert_eq!(frame_state(&app), FrameState::Uninitialised);
    assert!(app.world().get_resource::<ParticleSystem>().is_none());
    assert!(clouds(&mut app).is_empty());
    assert!(failures(&app).iter().any(ParticleError::is_fatal));
}

#[test]
fn stale_shader_failure_is_ignored() {
    let mut app = headless_app(random_config());

    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);
    request(&mut app, SourceKind::Random);
    update_frames(&mut app, 2);

    let sender = app.world().resource::<ShaderFailureChannel>().sender.clone();
    sender
        .send(ShaderFailureReport {
            generation: 1,
            error: ParticleError::shader(RENDER_SHADER, "unknown identifier"),
        })
        .unwrap();
    update_frames(&mut app, 2);

    assert_eq!(frame_state(&app), FrameState::Active);
    assert_eq!(particle_system(&app).generation, 2);
    assert!(failures(&app).is_empty());
}

#[test]
fn unloadable_shader_aborts_particle_system() {
    let mut app = headless_app(random_config());
    app.init_asset::<Shader>();

    let path = "shaders/missing.wgsl";
    let handle = app.world().resource::<AssetServer>().load::<Shader>(path);
    app.insert_resource(ParticleShaders(vec![(path.to_string(), handle)]))
        .add_systems(
            Update,
            report_failed_shader_loads.before(handle_shader_failures),
        );

    request(&mut app, SourceKind::Random);
    let failed = update_until(&mut app, |app| !failures(app).is_empty());
    assert!(failed, "missing shader never reported");
    update_frames(&mut app, 1);

    assert!(matches!(
        &failures(&app)[0],
        ParticleError::ShaderCompileFailure { shader, .. } if shader == path
    ));
    assert_eq!(frame_state(&app), FrameState::Uninitialised);
    assert!(app.world().get_resource::<ParticleSystem>().is_none());
    assert!(clouds(&mut app).is_empty());
}
