//! Camera and frame driver.
//!
//! Owns the particle camera, tracks the output surface size and applies
//! viewport resizes. Orbit controls move the camera around the origin.

/// Particle camera, output surface and viewport resize handling.
pub mod frame_driver;

/// Orbit camera state and mouse controller.
pub mod viewport_camera;
