use bevy::prelude::*;
use bevy::render::Extract;
use bevy::render::render_phase::ViewSortedRenderPhases;
use bevy::render::view::RetainedViewEntity;
use std::collections::HashSet;

use crate::engine::camera::frame_driver::ParticleCamera;
use crate::engine::render::pipeline::particle_render_pipeline::ParticlePhase;

/// Give every active particle camera a particle phase; other cameras never draw particles.
pub fn extract_camera_phases(
    mut phases: ResMut<ViewSortedRenderPhases<ParticlePhase>>,
    cameras: Extract<Query<(Entity, &Camera), (With<Camera3d>, With<ParticleCamera>)>>,
    mut views: Local<HashSet<RetainedViewEntity>>,
) {
    views.clear();
    views.extend(
        cameras
            .iter()
            .filter(|(_, camera)| camera.is_active)
            .map(|(entity, _)| RetainedViewEntity::new(entity.into(), None, 0)),
    );

    for view in views.iter() {
        phases.insert_or_clear(*view);
    }
    // Views of despawned or deactivated cameras.
    phases.retain(|view, _| views.contains(view));
}
