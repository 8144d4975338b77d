//! Particle data loading.
//!
//! Turns load requests into position buffers. Random data is produced in the
//! requesting frame; image and mesh sources go through the asset server and
//! are polled each frame until they finish, fail or time out. Only one load
//! is ever in flight: a newer request cancels the pending one.

/// Live configuration reloads through the JSON asset loader.
pub mod config_reload;

/// Request, completion and failure events.
pub mod events;

/// In-flight load bookkeeping and timeout checks.
pub mod pending;

/// Load request handling and pending load polling systems.
pub mod request;
