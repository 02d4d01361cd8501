//! Simulation state and entity types
//!
//! Everything the integrator, connection builder and wave oscillator mutate
//! lives in [`SimState`]. Nothing here draws.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tier::PerformanceTier;

/// Visual variant, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Glowing node with a soft halo
    Neural,
    /// Ring of flickering rotated segments
    Quantum,
    /// Ten-point rotating star
    Star,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [ParticleKind::Neural, ParticleKind::Quantum, ParticleKind::Star];
}

/// Trail sample (newest first in [`Particle::trail`])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub alpha: f32,
}

/// A simulated point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub size: f32,
    pub base_size: f32,
    pub alpha: f32,
    /// Degrees, always in [HUE_MIN, HUE_MIN + HUE_SPAN)
    pub hue: f32,
    pub life: f32,
    pub max_life: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub pulse: f32,
    pub kind: ParticleKind,
    pub trail: Vec<TrailPoint>,
    pub energy: f32,
}

impl Particle {
    /// Randomized particle somewhere inside `bounds`
    pub fn random(rng: &mut Pcg32, bounds: Vec2) -> Self {
        let size = rng.random_range(2.0..6.0);
        Self {
            pos: Vec3::new(
                rng.random::<f32>() * bounds.x,
                rng.random::<f32>() * bounds.y,
                rng.random_range(-500.0..500.0),
            ),
            vel: Vec3::new(
                rng.random_range(-0.4..0.4),
                rng.random_range(-0.4..0.4),
                rng.random_range(-0.2..0.2),
            ),
            size,
            base_size: rng.random_range(2.0..6.0),
            alpha: rng.random_range(0.3..1.0),
            hue: random_hue(rng),
            life: rng.random_range(0.0..1000.0),
            max_life: rng.random_range(1500.0..4000.0),
            rotation: rng.random_range(0.0..TAU),
            rotation_speed: rng.random_range(-0.015..0.015),
            pulse: rng.random_range(0.0..TAU),
            kind: ParticleKind::ALL[rng.random_range(0..ParticleKind::ALL.len())],
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
            energy: rng.random_range(0.0..MAX_ENERGY),
        }
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(
            0,
            TrailPoint {
                pos: self.pos.truncate(),
                alpha: self.alpha * 0.6,
            },
        );
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Start a new life: fresh energy and color
    pub fn respawn(&mut self, rng: &mut Pcg32) {
        self.life = 0.0;
        self.energy = rng.random_range(0.0..MAX_ENERGY);
        self.hue = random_hue(rng);
    }

    /// On-screen position (z ignored)
    #[inline]
    pub fn screen_pos(&self) -> Vec2 {
        self.pos.truncate()
    }
}

fn random_hue(rng: &mut Pcg32) -> f32 {
    HUE_MIN + rng.random::<f32>() * HUE_SPAN
}

/// A proximity edge between two particles (pool indices, `a < b`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// 1 - distance / CONNECTION_DISTANCE, in (0, 1]
    pub strength: f32,
    pub phase: f32,
    /// Offset of the traveling pulse, in [0, 1)
    pub data: f32,
}

/// An ambient oscillator drawn as a pulsing halo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveField {
    pub center: Vec2,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl WaveField {
    pub fn random(rng: &mut Pcg32, bounds: Vec2) -> Self {
        Self {
            center: Vec2::new(rng.random::<f32>() * bounds.x, rng.random::<f32>() * bounds.y),
            amplitude: rng.random_range(15.0..40.0),
            frequency: rng.random_range(0.015..0.04),
            phase: rng.random_range(0.0..TAU),
        }
    }
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimCounters {
    /// Connection rebuilds since creation
    pub rebuilds: u64,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Seed the pool was built from
    pub seed: u64,
    pub tier: PerformanceTier,
    /// Surface size in CSS pixels
    pub bounds: Vec2,
    /// Surface size the stored coordinates were laid out for; differs from
    /// `bounds` until the next tick after a resize
    layout_bounds: Vec2,
    pub particles: Vec<Particle>,
    pub connections: Vec<Connection>,
    pub waves: Vec<WaveField>,
    /// Latest pointer position, if the host ever reported one
    pub pointer: Option<Vec2>,
    /// Ticks advanced so far
    pub time_ticks: u64,
    /// Record trails during integration
    pub trails: bool,
    pub counters: SimCounters,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

impl SimState {
    /// Build a tier-sized pool
    pub fn new(seed: u64, tier: PerformanceTier, bounds: Vec2) -> Self {
        Self::with_particle_count(seed, tier, bounds, tier.particle_count())
    }

    /// Build a pool with an explicit particle count (reduced motion)
    pub fn with_particle_count(seed: u64, tier: PerformanceTier, bounds: Vec2, count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let particles = (0..count).map(|_| Particle::random(&mut rng, bounds)).collect();
        let waves = (0..WAVE_FIELD_COUNT)
            .map(|_| WaveField::random(&mut rng, bounds))
            .collect();

        Self {
            seed,
            tier,
            bounds,
            layout_bounds: bounds,
            particles,
            connections: Vec::with_capacity(tier.max_connections()),
            waves,
            pointer: None,
            time_ticks: 0,
            trails: true,
            counters: SimCounters::default(),
            rng,
        }
    }

    pub fn max_connections(&self) -> usize {
        self.tier.max_connections()
    }

    /// Record a new surface size; coordinates are rescaled on the next tick
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    /// Rescale stored coordinates if the surface changed since layout
    pub fn apply_pending_resize(&mut self) {
        if self.layout_bounds == self.bounds {
            return;
        }
        let old = self.layout_bounds;
        let new = self.bounds;
        let scale = Vec2::new(
            if old.x > 0.0 { new.x / old.x } else { 1.0 },
            if old.y > 0.0 { new.y / old.y } else { 1.0 },
        );
        let min = Vec2::splat(-WRAP_MARGIN);
        let max = new + Vec2::splat(WRAP_MARGIN);

        for p in &mut self.particles {
            let pos = (p.screen_pos() * scale).clamp(min, max);
            p.pos.x = pos.x;
            p.pos.y = pos.y;
            for point in &mut p.trail {
                point.pos = (point.pos * scale).clamp(min, max);
            }
        }
        for wave in &mut self.waves {
            wave.center *= scale;
        }

        log::debug!("Rescaled layout {:?} -> {:?}", old, new);
        self.layout_bounds = new;
    }

    /// Drop all entities (teardown)
    pub fn clear(&mut self) {
        self.particles.clear();
        self.connections.clear();
        self.waves.clear();
        self.pointer = None;
    }
}
