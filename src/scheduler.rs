//! Frame scheduling and lifecycle
//!
//! The host calls [`Backdrop::frame`] once per display refresh with its
//! timestamp. Everything (tick, connection rebuild, wave advance, draw)
//! happens synchronously inside that call.

use glam::Vec2;

use crate::consts::*;
use crate::renderer::{Surface, render_frame};
use crate::settings::Settings;
use crate::sim::{SimState, tick};
use crate::tier::PerformanceTier;

/// Timing produced by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Normalized delta (1.0 = 16 ms), clamped to [0, MAX_DELTA]
    pub dt: f32,
    /// Frames counted in the window that just closed, if one did
    pub fps: Option<u32>,
}

/// Frame delta and approximate frame-rate bookkeeping
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    window_start_ms: Option<f64>,
    window_frames: u32,
    fps: u32,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frame at `now_ms` (host timestamp, milliseconds)
    pub fn advance(&mut self, now_ms: f64) -> FrameTiming {
        let dt = match self.last_ms {
            Some(last) => normalize_delta(now_ms - last),
            None => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        self.frames += 1;

        let fps = self.count_frame(now_ms);
        FrameTiming { dt, fps }
    }

    fn count_frame(&mut self, now_ms: f64) -> Option<u32> {
        if !now_ms.is_finite() {
            return None;
        }
        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.window_frames += 1;
        if now_ms - start >= FPS_WINDOW_MS {
            self.fps = self.window_frames;
            self.window_frames = 0;
            self.window_start_ms = Some(now_ms);
            return Some(self.fps);
        }
        None
    }

    /// Frames counted in the last closed window
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames seen since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Convert an elapsed time in milliseconds to a clamped normalized delta
pub fn normalize_delta(elapsed_ms: f64) -> f32 {
    if !elapsed_ms.is_finite() {
        return 0.0;
    }
    ((elapsed_ms / REFERENCE_FRAME_MS) as f32).clamp(0.0, MAX_DELTA)
}

/// Drops pointer samples that arrive faster than `POINTER_THROTTLE_MS`.
///
/// Timestamps come from the host's event clock, the same high-resolution
/// clock that stamps animation frames.
#[derive(Debug, Clone, Default)]
pub struct PointerThrottle {
    last_accepted_ms: Option<f64>,
}

impl PointerThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample at `now_ms` should be kept. Non-finite timestamps
    /// are dropped without touching the stored one.
    pub fn accept(&mut self, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            return false;
        }
        let accept = match self.last_accepted_ms {
            Some(last) => now_ms - last > POINTER_THROTTLE_MS,
            None => true,
        };
        if accept {
            self.last_accepted_ms = Some(now_ms);
        }
        accept
    }
}

/// Surface dimensions and backing-store scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size in CSS pixels
    pub css_size: Vec2,
    /// Device pixel ratio, capped at MAX_DEVICE_PIXEL_RATIO
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(css_size: Vec2, device_pixel_ratio: f64) -> Self {
        Self {
            css_size: css_size.max(Vec2::ZERO),
            pixel_ratio: cap_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Scale applied to the drawing transform
    pub fn scale_factor(&self) -> f64 {
        self.pixel_ratio
    }

    /// Backing store size in device pixels
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.css_size.x as f64 * self.pixel_ratio).round() as u32,
            (self.css_size.y as f64 * self.pixel_ratio).round() as u32,
        )
    }

    /// Apply new dimensions; returns true if anything changed
    pub fn resize(&mut self, css_size: Vec2, device_pixel_ratio: f64) -> bool {
        let next = Viewport::new(css_size, device_pixel_ratio);
        let changed = next != *self;
        *self = next;
        changed
    }
}

fn cap_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// A running backdrop: simulation state plus its frame clock.
///
/// After [`Backdrop::stop`] every entry point is a no-op.
#[derive(Debug)]
pub struct Backdrop {
    state: SimState,
    clock: FrameClock,
    throttle: PointerThrottle,
    viewport: Viewport,
    animation_speed: f32,
    log_fps: bool,
    running: bool,
}

impl Backdrop {
    /// Build the pool for `probed` (or the tier forced by settings)
    pub fn new(settings: &Settings, probed: PerformanceTier, fallback_seed: u64, viewport: Viewport) -> Self {
        let tier = settings.tier.resolve(probed);
        let seed = settings.seed.unwrap_or(fallback_seed);
        let count = settings.particle_count(tier);

        let mut state = SimState::with_particle_count(seed, tier, viewport.css_size, count);
        state.trails = settings.effective_trails();

        log::info!(
            "Backdrop: tier={} particles={} seed={} reduced_motion={}",
            tier.as_str(),
            count,
            seed,
            settings.reduced_motion
        );

        Self {
            state,
            clock: FrameClock::new(),
            throttle: PointerThrottle::new(),
            viewport,
            animation_speed: settings.animation_speed(),
            log_fps: settings.log_fps,
            running: true,
        }
    }

    /// Advance and draw one frame; returns false once stopped
    pub fn frame(&mut self, surface: &mut dyn Surface, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }

        let timing = self.clock.advance(now_ms);
        tick(&mut self.state, timing.dt * self.animation_speed);
        render_frame(surface, &self.state);

        if let Some(fps) = timing.fps {
            if self.log_fps {
                log::info!("{} fps", fps);
            } else {
                log::debug!("{} fps", fps);
            }
        }
        true
    }

    /// Record new surface dimensions. Returns the viewport to apply to the
    /// backing store, or None when stopped.
    pub fn resize(&mut self, css_size: Vec2, device_pixel_ratio: f64) -> Option<Viewport> {
        if !self.running {
            return None;
        }
        if self.viewport.resize(css_size, device_pixel_ratio) {
            self.state.resize(self.viewport.css_size);
            log::debug!(
                "Resized to {}x{} @{}",
                self.viewport.css_size.x,
                self.viewport.css_size.y,
                self.viewport.pixel_ratio
            );
        }
        Some(self.viewport)
    }

    /// Offer a pointer sample (surface-relative CSS pixels); returns true if
    /// it replaced the stored position
    pub fn pointer_moved(&mut self, pos: Vec2, now_ms: f64) -> bool {
        if !self.running || !pos.is_finite() || !self.throttle.accept(now_ms) {
            return false;
        }
        self.state.pointer = Some(pos);
        true
    }

    /// Stop and release the pool. Safe to call more than once.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.state.clear();
        log::info!("Backdrop stopped after {} frames", self.clock.frames());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingSurface;
    use crate::settings::TierPreference;

    fn viewport() -> Viewport {
        Viewport::new(Vec2::new(800.0, 600.0), 1.0)
    }

    fn backdrop(settings: &Settings) -> Backdrop {
        Backdrop::new(settings, PerformanceTier::High, 77, viewport())
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0).dt, 0.0);
        assert!((clock.advance(1016.0).dt - 1.0).abs() < 1e-6);
        assert!((clock.advance(1024.0).dt - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        assert_eq!(clock.advance(5000.0).dt, MAX_DELTA);
        // Clock going backwards never yields a negative delta
        assert_eq!(clock.advance(4000.0).dt, 0.0);
        assert_eq!(normalize_delta(f64::NAN), 0.0);
        assert_eq!(normalize_delta(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_fps_window() {
        let mut clock = FrameClock::new();
        let mut reported = None;
        for i in 0..=60 {
            if let Some(fps) = clock.advance(i as f64 * 1000.0 / 60.0).fps {
                reported = Some(fps);
            }
        }
        assert_eq!(reported, Some(61));
        assert_eq!(clock.fps(), 61);
        assert_eq!(clock.frames(), 61);
    }

    #[test]
    fn test_pointer_throttle_interval() {
        let mut throttle = PointerThrottle::new();
        assert!(throttle.accept(100.0));
        assert!(!throttle.accept(110.0));
        assert!(!throttle.accept(116.0));
        assert!(throttle.accept(116.5));
        assert!(!throttle.accept(120.0));
    }

    #[test]
    fn test_pointer_throttle_ignores_bad_timestamps() {
        let mut throttle = PointerThrottle::new();
        assert!(!throttle.accept(f64::NAN));
        assert!(!throttle.accept(f64::INFINITY));
        let later: Vec<bool> = [1000.0, 2000.0, 3000.0, 4000.0]
            .into_iter()
            .map(|t| throttle.accept(t))
            .collect();
        assert_eq!(later, vec![true, true, true, true]);

        let mut b = backdrop(&Settings::default());
        assert!(!b.pointer_moved(Vec2::new(10.0, 20.0), f64::NAN));
        assert!(b.pointer_moved(Vec2::new(10.0, 20.0), 50.0));
    }

    #[test]
    fn test_viewport_caps_ratio() {
        let v = Viewport::new(Vec2::new(100.0, 50.0), 3.0);
        assert_eq!(v.scale_factor(), 2.0);
        assert_eq!(v.backing_size(), (200, 100));
        assert_eq!(Viewport::new(Vec2::ONE, f64::NAN).scale_factor(), 1.0);
        assert_eq!(Viewport::new(Vec2::ONE, 0.0).scale_factor(), 1.0);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut once = viewport();
        let mut twice = viewport();
        assert!(once.resize(Vec2::new(1280.0, 720.0), 1.5));
        twice.resize(Vec2::new(1280.0, 720.0), 1.5);
        assert!(!twice.resize(Vec2::new(1280.0, 720.0), 1.5));
        assert_eq!(once, twice);
        assert_eq!(once.scale_factor(), twice.scale_factor());
    }

    #[test]
    fn test_frame_ticks_and_draws() {
        let mut b = backdrop(&Settings::default());
        let mut surface = RecordingSurface::new(Vec2::new(800.0, 600.0));
        assert!(b.frame(&mut surface, 0.0));
        assert!(b.frame(&mut surface, 16.0));
        assert_eq!(b.state().time_ticks, 2);
        assert!(surface.shape_count() > 0);
    }

    #[test]
    fn test_settings_shape_the_pool() {
        let settings = Settings {
            tier: TierPreference::Low,
            reduced_motion: true,
            seed: Some(5),
            ..Default::default()
        };
        let b = backdrop(&settings);
        assert_eq!(b.state().tier, PerformanceTier::Low);
        assert_eq!(b.state().particles.len(), 30);
        assert_eq!(b.state().seed, 5);
        assert!(!b.state().trails);
    }

    #[test]
    fn test_reduced_motion_slows_integration() {
        let normal = Settings {
            seed: Some(3),
            ..Default::default()
        };
        let slow = Settings {
            reduced_motion: true,
            trails: true,
            ..normal.clone()
        };
        let mut fast = backdrop(&normal);
        let mut calm = backdrop(&slow);
        let mut surface = RecordingSurface::new(Vec2::new(800.0, 600.0));
        for t in [0.0, 16.0] {
            fast.frame(&mut surface, t);
            calm.frame(&mut surface, t);
        }
        // Same seed, same first particle; calm advanced 0.3 as far
        let start = backdrop(&normal).state().particles[0].pulse;
        let fast_step = fast.state().particles[0].pulse - start;
        let calm_step = calm.state().particles[0].pulse - start;
        assert!(fast_step > 0.0);
        assert!((calm_step / fast_step - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_is_throttled_and_stored() {
        let mut b = backdrop(&Settings::default());
        assert!(b.pointer_moved(Vec2::new(10.0, 20.0), 0.0));
        assert!(!b.pointer_moved(Vec2::new(30.0, 40.0), 5.0));
        assert_eq!(b.state().pointer, Some(Vec2::new(10.0, 20.0)));
        assert!(!b.pointer_moved(Vec2::new(f32::NAN, 0.0), 100.0));
    }

    #[test]
    fn test_resize_reaches_sim_on_next_tick() {
        let mut b = backdrop(&Settings::default());
        let applied = b.resize(Vec2::new(1600.0, 1200.0), 4.0).unwrap();
        assert_eq!(applied.scale_factor(), 2.0);
        assert_eq!(b.state().bounds, Vec2::new(1600.0, 1200.0));

        let mut surface = RecordingSurface::new(Vec2::new(1600.0, 1200.0));
        b.frame(&mut surface, 0.0);
        for p in &b.state().particles {
            assert!(p.pos.x <= 1600.0 + WRAP_MARGIN);
        }
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let mut b = backdrop(&Settings::default());
        b.stop();
        b.stop();
        assert!(!b.is_running());
        assert!(b.state().particles.is_empty());

        let mut surface = RecordingSurface::new(Vec2::new(800.0, 600.0));
        assert!(!b.frame(&mut surface, 16.0));
        assert!(surface.commands.is_empty());
        assert_eq!(b.resize(Vec2::new(10.0, 10.0), 1.0), None);
        assert!(!b.pointer_moved(Vec2::ZERO, 1000.0));
        assert_eq!(b.state().pointer, None);
    }
}
