//! Proximity graph over the particle pool
//!
//! Rebuilt from scratch every `CONNECTION_PERIOD` ticks. The pair scan is
//! O(n²); with at most 120 particles and an early exit at the cap that is
//! cheaper than maintaining a grid.

use std::f32::consts::TAU;

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Connection, Particle};
use crate::consts::CONNECTION_DISTANCE;

/// Whether the connection list should be rebuilt on this tick
#[inline]
pub fn is_rebuild_tick(time_ticks: u64, period: u64) -> bool {
    period > 0 && time_ticks % period == 0
}

/// Replace `out` with edges between particles closer than
/// `CONNECTION_DISTANCE`, scanning pairs i < j in pool order and stopping
/// once `cap` edges exist
pub fn rebuild_connections(particles: &[Particle], cap: usize, rng: &mut Pcg32, out: &mut Vec<Connection>) {
    out.clear();
    if cap == 0 {
        return;
    }

    'scan: for (a, first) in particles.iter().enumerate() {
        for (offset, second) in particles[a + 1..].iter().enumerate() {
            let distance = first.screen_pos().distance(second.screen_pos());
            if distance < CONNECTION_DISTANCE {
                out.push(Connection {
                    a,
                    b: a + 1 + offset,
                    strength: 1.0 - distance / CONNECTION_DISTANCE,
                    phase: rng.random_range(0.0..TAU),
                    data: rng.random::<f32>(),
                });
                if out.len() >= cap {
                    break 'scan;
                }
            }
        }
    }
}
