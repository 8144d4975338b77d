use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;
use bevy::window::{PrimaryWindow, WindowResized};
use constants::render_settings::{
    CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CLEAR_COLOUR_HEX, hex_to_rgb,
};

use crate::engine::camera::viewport_camera::OrbitCamera;

/// Cameras whose projection follows the output surface.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ParticleCamera;

/// Pixel size of the output surface, updated by [`ViewportResize`].
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSurface {
    pub width: u32,
    pub height: u32,
}

impl OutputSurface {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Host request to resize the viewport.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportResize {
    pub width: u32,
    pub height: u32,
}

pub fn perspective_projection(aspect_ratio: f32) -> PerspectiveProjection {
    PerspectiveProjection {
        fov: CAMERA_FOV_DEGREES.to_radians(),
        aspect_ratio,
        near: CAMERA_NEAR,
        far: CAMERA_FAR,
    }
}

pub fn clear_colour() -> ClearColor {
    let [r, g, b] = hex_to_rgb(CLEAR_COLOUR_HEX);
    ClearColor(Color::srgb(r, g, b))
}

/// Seed the output surface from the primary window, when there is one.
pub fn init_output_surface(mut commands: Commands, windows: Query<&Window, With<PrimaryWindow>>) {
    let Ok(window) = windows.single() else {
        return;
    };
    let (width, height) = (window.width() as u32, window.height() as u32);
    if width > 0 && height > 0 {
        commands.insert_resource(OutputSurface { width, height });
    }
}

/// Spawn the perspective camera looking at the origin from the orbit's start position.
pub fn spawn_particle_camera(
    mut commands: Commands,
    orbit: Res<OrbitCamera>,
    surface: Option<Res<OutputSurface>>,
) {
    let aspect_ratio = surface.map(|s| s.aspect_ratio()).unwrap_or(1.0);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(perspective_projection(aspect_ratio)),
        orbit.transform(),
        ParticleCamera,
    ));
}

/// Apply viewport resizes to camera aspect, output surface and primary window.
pub fn handle_viewport_resize(
    mut commands: Commands,
    mut resizes: EventReader<ViewportResize>,
    mut cameras: Query<&mut Projection, With<ParticleCamera>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    surface: Option<Res<OutputSurface>>,
) {
    let Some(resize) = resizes.read().last().copied() else {
        return;
    };

    if resize.width == 0 || resize.height == 0 {
        warn!(
            "Ignoring viewport resize to {}x{}",
            resize.width, resize.height
        );
        return;
    }

    let next = OutputSurface {
        width: resize.width,
        height: resize.height,
    };
    if surface.as_deref() == Some(&next) {
        return;
    }

    let aspect_ratio = next.aspect_ratio();
    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = aspect_ratio;
        }
    }

    for mut window in &mut windows {
        let (width, height) = (resize.width as f32, resize.height as f32);
        if window.resolution.width() != width || window.resolution.height() != height {
            window.resolution.set(width, height);
        }
    }

    debug!("Viewport resized to {}x{}", resize.width, resize.height);
    commands.insert_resource(next);
}

/// Forward window resizes from the windowing backend as viewport resizes.
pub fn forward_window_resize(
    mut window_events: EventReader<WindowResized>,
    mut resizes: EventWriter<ViewportResize>,
) {
    if let Some(event) = window_events.read().last() {
        resizes.write(ViewportResize {
            width: event.width.round() as u32,
            height: event.height.round() as u32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_uses_renderer_settings() {
        let projection = perspective_projection(2.0);
        assert_eq!(projection.fov, 50.0_f32.to_radians());
        assert_eq!(projection.near, 1.0);
        assert_eq!(projection.far, 10_000.0);
        assert_eq!(projection.aspect_ratio, 2.0);
    }

    #[test]
    fn clear_colour_is_dark_grey() {
        let ClearColor(colour) = clear_colour();
        let srgba = colour.to_srgba();
        assert!((srgba.red - 38.0 / 255.0).abs() < 1e-6);
        assert_eq!(srgba.red, srgba.green);
        assert_eq!(srgba.green, srgba.blue);
    }
}
