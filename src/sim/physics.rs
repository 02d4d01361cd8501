//! Particle integration
//!
//! One explicit Euler step per tick: move, wrap, attract, damp, age, animate.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::state::Particle;
use crate::consts::*;
use crate::wrap_coordinate;

/// Inputs shared by every particle in a tick
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    /// Normalized frame delta (1.0 = 16 ms)
    pub dt: f32,
    /// Surface size in CSS pixels
    pub bounds: Vec2,
    pub pointer: Option<Vec2>,
    pub trails: bool,
}

/// Advance one particle in place
pub fn integrate_particle(particle: &mut Particle, ctx: &StepContext, rng: &mut Pcg32) {
    let dt = ctx.dt;

    particle.pos += particle.vel * dt;

    // Teleport across the inflated viewport
    particle.pos.x = wrap_coordinate(particle.pos.x, -WRAP_MARGIN, ctx.bounds.x + WRAP_MARGIN);
    particle.pos.y = wrap_coordinate(particle.pos.y, -WRAP_MARGIN, ctx.bounds.y + WRAP_MARGIN);
    particle.pos.z = wrap_coordinate(particle.pos.z, -DEPTH_LIMIT, DEPTH_LIMIT);

    if let Some(pointer) = ctx.pointer {
        apply_pointer_attraction(particle, pointer, dt);
    }

    particle.vel.x *= FRICTION_XY;
    particle.vel.y *= FRICTION_XY;
    particle.vel.z *= FRICTION_Z;

    particle.life += dt;
    if particle.life >= particle.max_life {
        particle.respawn(rng);
    }

    particle.pulse += PULSE_RATE * dt;
    particle.rotation += particle.rotation_speed * dt;
    particle.size = particle.base_size * (1.0 + particle.pulse.sin() * 0.4);
    particle.alpha = 0.4 + (particle.pulse * 0.7).sin() * 0.3;

    if ctx.trails {
        particle.record_trail();
    }
}

/// Pull toward the pointer when inside its radius; only velocity changes
fn apply_pointer_attraction(particle: &mut Particle, pointer: Vec2, dt: f32) {
    let offset = pointer - particle.screen_pos();
    let distance = offset.length();
    if distance >= POINTER_RADIUS {
        return;
    }

    let attraction = POINTER_STRENGTH * (POINTER_RADIUS - distance) * dt;
    particle.vel.x += offset.x * attraction;
    particle.vel.y += offset.y * attraction;
    particle.energy = (particle.energy + ENERGY_GAIN * dt).min(MAX_ENERGY);
}
