//! Neural Backdrop - an ambient pseudo-3D particle layer for web pages
//!
//! Core modules:
//! - `sim`: Particle simulation (entity pool, physics, connections, waves)
//! - `renderer`: Immediate-mode 2D renderer over an abstract drawing surface
//! - `scheduler`: Frame clock, pointer throttling and lifecycle
//! - `tier`: Host capability classification
//! - `platform`: Browser canvas binding (wasm only)

pub mod error;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tier;

pub use error::BackdropError;
pub use scheduler::{Backdrop, FrameClock, PointerThrottle, Viewport};
pub use settings::{Settings, TierPreference};
pub use tier::{GraphicsProbe, PerformanceTier};

/// Engine configuration constants
pub mod consts {
    /// Frame duration that maps to a delta of 1.0 (milliseconds)
    pub const REFERENCE_FRAME_MS: f64 = 16.0;
    /// Largest delta accepted after a stall
    pub const MAX_DELTA: f32 = 2.0;

    /// Off-screen margin before a particle wraps to the other side
    pub const WRAP_MARGIN: f32 = 100.0;
    /// Depth limit; z wraps between -DEPTH_LIMIT and DEPTH_LIMIT
    pub const DEPTH_LIMIT: f32 = 600.0;
    /// Fraction of size lost at the depth limit
    pub const DEPTH_FALLOFF: f32 = 0.6;

    /// Pointer attraction radius
    pub const POINTER_RADIUS: f32 = 250.0;
    /// Attraction gain per unit of (radius - distance)
    pub const POINTER_STRENGTH: f32 = 0.0002;
    /// Energy gained per tick while near the pointer
    pub const ENERGY_GAIN: f32 = 0.5;
    pub const MAX_ENERGY: f32 = 100.0;

    /// Planar velocity damping per tick
    pub const FRICTION_XY: f32 = 0.998;
    /// Depth velocity damping per tick
    pub const FRICTION_Z: f32 = 0.999;

    /// Pulse phase advance per tick
    pub const PULSE_RATE: f32 = 0.08;

    /// Hue band for particle colors (degrees)
    pub const HUE_MIN: f32 = 180.0;
    pub const HUE_SPAN: f32 = 80.0;

    /// Trail samples kept per particle
    pub const TRAIL_LENGTH: usize = 12;

    /// Maximum on-screen distance for a connection
    pub const CONNECTION_DISTANCE: f32 = 180.0;
    /// Ticks between connection rebuilds
    pub const CONNECTION_PERIOD: u64 = 45;

    /// Ambient wave fields
    pub const WAVE_FIELD_COUNT: usize = 6;

    /// Device pixel ratio cap for the backing store
    pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
    /// Minimum interval between accepted pointer samples (milliseconds)
    pub const POINTER_THROTTLE_MS: f64 = 16.0;
    /// FPS sampling window (milliseconds)
    pub const FPS_WINDOW_MS: f64 = 1000.0;
}

/// Scale factor that fakes distance from a z coordinate
#[inline]
pub fn depth_scale(z: f32) -> f32 {
    use consts::{DEPTH_FALLOFF, DEPTH_LIMIT};
    1.0 - (z.abs() / DEPTH_LIMIT).min(1.0) * DEPTH_FALLOFF
}

/// Teleport `value` to the opposite edge when it leaves `[min, max]`
#[inline]
pub fn wrap_coordinate(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        max
    } else if value > max {
        min
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_scale_bounds() {
        assert_eq!(depth_scale(0.0), 1.0);
        assert!((depth_scale(600.0) - 0.4).abs() < 1e-6);
        assert!((depth_scale(-600.0) - 0.4).abs() < 1e-6);
        assert!((depth_scale(300.0) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_teleports_instead_of_clamping() {
        assert_eq!(wrap_coordinate(-101.0, -100.0, 900.0), 900.0);
        assert_eq!(wrap_coordinate(901.0, -100.0, 900.0), -100.0);
        assert_eq!(wrap_coordinate(450.0, -100.0, 900.0), 450.0);
        assert_eq!(wrap_coordinate(900.0, -100.0, 900.0), 900.0);
    }
}
