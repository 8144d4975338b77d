use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::render_settings::{
    CAMERA_DISTANCE, ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE, ORBIT_PITCH_LIMIT,
    ORBIT_PITCH_SENSITIVITY, ORBIT_YAW_SENSITIVITY,
};

use crate::engine::camera::frame_driver::ParticleCamera;

/// Orbit state around a focus point: right-drag rotates, wheel dollies.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            distance: CAMERA_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn orbit(&mut self, mouse_delta: Vec2) {
        self.yaw -= mouse_delta.x * ORBIT_YAW_SENSITIVITY;
        self.pitch -= mouse_delta.y * ORBIT_PITCH_SENSITIVITY;
        self.pitch = self.pitch.clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    /// Move towards (positive) or away from (negative) the focus point.
    pub fn dolly(&mut self, scroll: f32) {
        let speed = (self.distance * 0.1).clamp(0.5, 500.0);
        self.distance =
            (self.distance - scroll * speed).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera transform looking at the focus from `distance` along the orbit's +Z.
    pub fn transform(&self) -> Transform {
        let rotation = self.rotation();
        Transform {
            translation: self.focus_point + rotation * Vec3::Z * self.distance,
            rotation,
            ..default()
        }
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<ParticleCamera>>,
    mut orbit: ResMut<OrbitCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        orbit.orbit(mouse_delta);
    }

    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    if scroll.abs() > f32::EPSILON {
        orbit.dolly(scroll);
    }

    if !orbit.is_changed() {
        return;
    }

    let target = orbit.transform();
    for mut transform in &mut camera_query {
        *transform = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_sits_on_positive_z() {
        let transform = OrbitCamera::default().transform();
        assert!((transform.translation - Vec3::new(0.0, 0.0, CAMERA_DISTANCE)).length() < 1e-4);
        assert!((transform.forward().as_vec3() - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(Vec2::new(0.0, -1.0e6));
        assert_eq!(orbit.pitch, ORBIT_PITCH_LIMIT);
    }

    #[test]
    fn dolly_never_crosses_focus() {
        let mut orbit = OrbitCamera::default();
        for _ in 0..1000 {
            orbit.dolly(10.0);
        }
        assert_eq!(orbit.distance, ORBIT_MIN_DISTANCE);
    }

    #[test]
    fn orbit_keeps_distance_to_focus() {
        let mut orbit = OrbitCamera::default();
        orbit.orbit(Vec2::new(240.0, 80.0));
        let transform = orbit.transform();
        assert!((transform.translation.length() - CAMERA_DISTANCE).abs() < 1e-3);
    }
}
