//! Particle simulation module
//!
//! All motion lives here. Given a seed and a sequence of frame deltas the
//! simulation is fully deterministic:
//! - Seeded RNG only
//! - Stable iteration order (pool index)
//! - No rendering or platform dependencies

pub mod connections;
pub mod physics;
pub mod state;
pub mod tick;
pub mod waves;

pub use connections::{is_rebuild_tick, rebuild_connections};
pub use physics::{StepContext, integrate_particle};
pub use state::{Connection, Particle, ParticleKind, SimCounters, SimState, TrailPoint, WaveField};
pub use tick::tick;
pub use waves::advance_waves;
