//! Frame driver behaviour without a particle system and across viewport resizes.

mod common;

use bevy::prelude::*;
use common::{clouds, failures, headless_app, update_frames};
use particle_render_engine::engine::camera::frame_driver::{
    OutputSurface, ParticleCamera, ViewportResize, perspective_projection,
};
use particle_render_engine::engine::config::ParticleConfig;
use particle_render_engine::engine::core::app_state::FrameState;
use particle_render_engine::engine::particles::particle_system::ParticleSystem;

fn frame_state(app: &App) -> FrameState {
    *app.world().resource::<State<FrameState>>().get()
}

fn camera_aspect(app: &mut App, camera: Entity) -> f32 {
    match app.world().get::<Projection>(camera) {
        Some(Projection::Perspective(perspective)) => perspective.aspect_ratio,
        other => panic!("expected perspective projection, got {other:?}"),
    }
}

fn spawn_camera(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            ParticleCamera,
            Projection::Perspective(perspective_projection(1.0)),
        ))
        .id()
}

#[test]
fn rendering_without_particle_system_does_nothing() {
    let mut app = headless_app(ParticleConfig::default());

    update_frames(&mut app, 5);

    assert_eq!(frame_state(&app), FrameState::Uninitialised);
    assert!(app.world().get_resource::<ParticleSystem>().is_none());
    assert!(clouds(&mut app).is_empty());
    assert!(failures(&app).is_empty());
}

#[test]
fn resize_sets_camera_aspect_and_output_surface() {
    let mut app = headless_app(ParticleConfig::default());
    let camera = spawn_camera(&mut app);
    app.update();

    app.world_mut().send_event(ViewportResize {
        width: 1280,
        height: 720,
    });
    app.update();

    assert_eq!(camera_aspect(&mut app, camera), 1280.0 / 720.0);
    assert_eq!(
        *app.world().resource::<OutputSurface>(),
        OutputSurface {
            width: 1280,
            height: 720
        }
    );

    app.world_mut().send_event(ViewportResize {
        width: 300,
        height: 600,
    });
    app.update();

    assert_eq!(camera_aspect(&mut app, camera), 0.5);
    assert_eq!(app.world().resource::<OutputSurface>().height, 600);
}

#[test]
fn zero_height_resize_is_ignored() {
    let mut app = headless_app(ParticleConfig::default());
    let camera = spawn_camera(&mut app);

    app.world_mut().send_event(ViewportResize {
        width: 640,
        height: 0,
    });
    app.update();

    assert_eq!(camera_aspect(&mut app, camera), 1.0);
    assert!(app.world().get_resource::<OutputSurface>().is_none());
}
