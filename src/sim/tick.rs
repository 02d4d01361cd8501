//! Simulation tick
//!
//! Advances the whole pool by one frame delta.

use super::connections::{is_rebuild_tick, rebuild_connections};
use super::physics::{StepContext, integrate_particle};
use super::state::SimState;
use super::waves::advance_waves;
use crate::consts::*;

/// Advance the simulation by one frame.
///
/// `dt` is the normalized frame delta; it is clamped to `[0, MAX_DELTA]` and
/// non-finite values count as zero.
pub fn tick(state: &mut SimState, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DELTA) } else { 0.0 };

    state.time_ticks += 1;
    state.apply_pending_resize();

    let ctx = StepContext {
        dt,
        bounds: state.bounds,
        pointer: state.pointer,
        trails: state.trails,
    };
    for particle in &mut state.particles {
        integrate_particle(particle, &ctx, &mut state.rng);
    }

    if is_rebuild_tick(state.time_ticks, CONNECTION_PERIOD) {
        let cap = state.max_connections();
        rebuild_connections(&state.particles, cap, &mut state.rng, &mut state.connections);
        state.counters.rebuilds += 1;
        log::debug!(
            "Tick {}: rebuilt {} connections",
            state.time_ticks,
            state.connections.len()
        );
    }

    advance_waves(&mut state.waves, dt);
}
