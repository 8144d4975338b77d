use bevy::prelude::*;

/// Frame driver state: whether a particle system is being simulated and drawn.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum FrameState {
    #[default]
    Uninitialised,
    Active,
}

pub fn log_frame_state(state: Res<State<FrameState>>) {
    info!("→ Frame state {:?}", state.get());
}
