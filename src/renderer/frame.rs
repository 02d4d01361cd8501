//! Per-frame renderer
//!
//! Draw order is fixed, back to front: fade, connections, particles, wave
//! halos. Particles are drawn in pool order rather than sorted by depth; the
//! depth illusion comes only from size and alpha scaling.

use std::f64::consts::TAU;

use glam::Vec2;

use super::shapes::{quantum_segment, quantum_segment_angle, star_polygon, trail_fan, QUANTUM_SEGMENTS};
use super::surface::{Color, Paint, RadialGradient, Surface};
use crate::depth_scale;
use crate::sim::state::{Connection, Particle, ParticleKind, SimState, WaveField};

/// Motion-blur fade laid over the previous frame
const FADE: Color = Color::rgba(0, 0, 0, 0.08);
const CONNECTION_COLOR: Color = Color::rgba(100, 200, 255, 0.4);
const CONNECTION_WIDTH: f32 = 1.5;
/// Pulse brightness oscillation rate (per tick)
const CONNECTION_PULSE_RATE: f64 = 0.06;
/// Traveling data pulse speed (edge lengths per tick)
const DATA_PULSE_RATE: f64 = 0.03;
const DATA_PULSE_RADIUS: f32 = 2.5;
/// Particles smaller than this after depth scaling are skipped
const VISIBILITY_FLOOR: f32 = 0.8;
const WAVE_ALPHA: f32 = 0.15;
const WAVE_RADIUS_SCALE: f32 = 4.0;

/// Clamp an alpha for the surface; NaN counts as fully transparent
#[inline]
pub fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) }
}

fn set_alpha(surface: &mut dyn Surface, alpha: f32) {
    surface.set_global_alpha(clamp_alpha(alpha));
}

/// Base particle color for a hue
#[inline]
pub fn particle_color(hue: f32) -> Color {
    Color::hsl(hue, 75.0, 65.0)
}

/// Brightness pulse for a connection at `time` (ticks), in [0, 1].
///
/// Phase math stays in f64: an f32 tick count stops resolving single ticks
/// past 2^24.
#[inline]
pub fn connection_pulse(time: f64, phase: f32) -> f32 {
    let angle = (time * CONNECTION_PULSE_RATE).rem_euclid(TAU) + phase as f64;
    (angle.sin() * 0.5 + 0.5) as f32
}

/// Position of the traveling pulse along an edge, in [0, 1)
#[inline]
pub fn data_progress(time: f64, data: f32) -> f32 {
    let progress = (time * DATA_PULSE_RATE + data as f64).rem_euclid(1.0) as f32;
    // Rounding to f32 can land exactly on 1.0
    progress.min(1.0 - f32::EPSILON)
}

/// Draw one frame of `state`
pub fn render_frame(surface: &mut dyn Surface, state: &SimState) {
    let time = state.time_ticks as f64;

    fade(surface);

    surface.set_stroke(CONNECTION_COLOR, CONNECTION_WIDTH);
    for connection in &state.connections {
        draw_connection(surface, connection, &state.particles, time);
    }

    for particle in &state.particles {
        draw_particle(surface, particle);
    }

    set_alpha(surface, WAVE_ALPHA);
    for wave in &state.waves {
        draw_wave(surface, wave);
    }

    set_alpha(surface, 1.0);
    surface.reset_composite();
}

/// Darken the previous frame instead of clearing it
fn fade(surface: &mut dyn Surface) {
    let size = surface.size();
    set_alpha(surface, 1.0);
    surface.set_fill(&Paint::Solid(FADE));
    surface.fill_rect(Vec2::ZERO, size);
}

fn draw_connection(surface: &mut dyn Surface, connection: &Connection, particles: &[Particle], time: f64) {
    let (Some(a), Some(b)) = (particles.get(connection.a), particles.get(connection.b)) else {
        return;
    };
    let from = a.screen_pos();
    let to = b.screen_pos();
    let pulse = connection_pulse(time, connection.phase);

    set_alpha(surface, connection.strength * pulse * 0.7);
    surface.stroke_line(from, to);

    let at = from.lerp(to, data_progress(time, connection.data));
    surface.set_fill(&Paint::Solid(Color::hsl(200.0, 100.0, 70.0 + pulse * 30.0)));
    set_alpha(surface, pulse * 0.8);
    surface.fill_circle(at, DATA_PULSE_RADIUS);
}

/// Draw a particle's trail and body; returns false when it is too small to see
pub fn draw_particle(surface: &mut dyn Surface, particle: &Particle) -> bool {
    let depth = depth_scale(particle.pos.z);
    let render_size = particle.size * depth;
    if render_size <= VISIBILITY_FLOOR {
        return false;
    }

    let color = particle_color(particle.hue);
    if !particle.trail.is_empty() {
        surface.set_fill(&Paint::Solid(color));
        for dot in trail_fan(&particle.trail, render_size, depth) {
            set_alpha(surface, dot.alpha);
            surface.fill_circle(dot.center, dot.radius);
        }
    }

    set_alpha(surface, particle.alpha * depth);
    let center = particle.screen_pos();
    match particle.kind {
        ParticleKind::Neural => draw_neural(surface, center, render_size, particle.hue),
        ParticleKind::Quantum => draw_quantum(surface, center, render_size, particle),
        ParticleKind::Star => draw_star(surface, center, render_size, particle.rotation, color),
    }
    true
}

fn draw_neural(surface: &mut dyn Surface, center: Vec2, radius: f32, hue: f32) {
    let halo = radius * 3.0;
    surface.set_fill(&Paint::Radial(RadialGradient {
        center,
        radius: halo,
        stops: vec![
            (0.0, Color::hsl(hue, 90.0, 75.0)),
            (0.6, Color::hsl(hue, 70.0, 50.0)),
            (1.0, Color::Transparent),
        ],
    }));
    surface.fill_circle(center, halo);

    surface.set_fill(&Paint::Solid(Color::hsl(hue, 100.0, 85.0)));
    surface.fill_circle(center, radius);
}

fn draw_quantum(surface: &mut dyn Surface, center: Vec2, radius: f32, particle: &Particle) {
    let uncertainty = (particle.pulse * 3.0).sin() * 0.5 + 0.5;
    let lightness = 40.0 + uncertainty * 40.0;
    for i in 0..QUANTUM_SEGMENTS {
        let hue = particle.hue + i as f32 * 8.0;
        surface.set_fill(&Paint::Solid(Color::hsl(hue, 80.0, lightness)));
        let quad = quantum_segment(center, radius, quantum_segment_angle(particle.rotation, i));
        surface.fill_polygon(&quad);
    }
}

fn draw_star(surface: &mut dyn Surface, center: Vec2, radius: f32, rotation: f32, color: Color) {
    surface.set_fill(&Paint::Solid(color));
    surface.fill_polygon(&star_polygon(center, radius, rotation));
}

fn draw_wave(surface: &mut dyn Surface, wave: &WaveField) {
    let radius = (wave.phase.sin() * wave.amplitude).abs() * WAVE_RADIUS_SCALE;
    // A zero-radius gradient is invalid on some hosts
    if radius.is_nan() || radius <= f32::EPSILON {
        return;
    }
    surface.set_fill(&Paint::Radial(RadialGradient {
        center: wave.center,
        radius,
        stops: vec![
            (0.0, Color::rgba(100, 220, 255, 0.4)),
            (0.7, Color::rgba(100, 220, 255, 0.1)),
            (1.0, Color::Transparent),
        ],
    }));
    surface.fill_circle(wave.center, radius);
}
