//! Ambient wave oscillators

use super::state::WaveField;

/// Advance every wave phase by `frequency * dt`.
///
/// Phases are left unbounded; the renderer only ever feeds them to `sin`.
pub fn advance_waves(waves: &mut [WaveField], dt: f32) {
    for wave in waves {
        wave.phase += wave.frequency * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_only_phase_changes() {
        let mut waves = [WaveField {
            center: Vec2::new(10.0, 20.0),
            amplitude: 30.0,
            frequency: 0.02,
            phase: 1.0,
        }];
        advance_waves(&mut waves, 2.0);
        assert!((waves[0].phase - 1.04).abs() < 1e-6);
        assert_eq!(waves[0].center, Vec2::new(10.0, 20.0));
        assert_eq!(waves[0].amplitude, 30.0);
        assert_eq!(waves[0].frequency, 0.02);
    }

    #[test]
    fn test_zero_delta_is_stationary() {
        let mut waves = [WaveField {
            center: Vec2::ZERO,
            amplitude: 15.0,
            frequency: 0.04,
            phase: 0.5,
        }];
        advance_waves(&mut waves, 0.0);
        assert_eq!(waves[0].phase, 0.5);
    }
}
