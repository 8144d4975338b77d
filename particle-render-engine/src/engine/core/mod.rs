//! Core application setup and state management.
//!
//! Handles plugin composition, the frame driver state machine and window
//! configuration for both native and WASM targets.

/// Engine plugins and app construction.
///
/// The core plugin carries all main world logic and runs headless; the
/// engine plugin adds the camera and GPU pipelines on top.
pub mod app_setup;

/// Frame driver state machine.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
pub mod window_config;
