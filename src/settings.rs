//! Backdrop settings and preferences
//!
//! Persisted in LocalStorage on the web; natively they come from defaults or
//! a JSON string.

use serde::{Deserialize, Serialize};

use crate::error::BackdropError;
use crate::tier::PerformanceTier;

/// Tier selection: probe the host, or force one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TierPreference {
    #[default]
    Auto,
    High,
    Low,
}

impl TierPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierPreference::Auto => "Auto",
            TierPreference::High => "High",
            TierPreference::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(TierPreference::Auto),
            "high" => Some(TierPreference::High),
            "low" => Some(TierPreference::Low),
            _ => None,
        }
    }

    /// Resolve against the probed tier
    pub fn resolve(&self, probed: PerformanceTier) -> PerformanceTier {
        match self {
            TierPreference::Auto => probed,
            TierPreference::High => PerformanceTier::High,
            TierPreference::Low => PerformanceTier::Low,
        }
    }
}

/// Backdrop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Performance tier override
    pub tier: TierPreference,
    /// Fewer particles, no trails, slowed animation
    pub reduced_motion: bool,
    /// Particle motion trails
    pub trails: bool,
    /// Fixed RNG seed (random per page load when unset)
    pub seed: Option<u64>,
    /// Log the measured frame rate once per window
    pub log_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tier: TierPreference::Auto,
            reduced_motion: false,
            trails: true,
            seed: None,
            log_fps: false,
        }
    }
}

impl Settings {
    /// Particle count for a resolved tier
    pub fn particle_count(&self, tier: PerformanceTier) -> usize {
        if self.reduced_motion {
            tier.particle_count() / 2
        } else {
            tier.particle_count()
        }
    }

    /// Effective trails (respects reduced_motion)
    pub fn effective_trails(&self) -> bool {
        self.trails && !self.reduced_motion
    }

    /// Multiplier applied to every frame delta
    pub fn animation_speed(&self) -> f32 {
        if self.reduced_motion { 0.3 } else { 1.0 }
    }

    pub fn from_json(json: &str) -> Result<Self, BackdropError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BackdropError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Copy with a tier override (parsed case-insensitively) and reduced
    /// motion applied; `None` if the tier name is unknown
    pub fn with_overrides(&self, tier: &str, reduced_motion: bool) -> Option<Self> {
        let tier = TierPreference::from_str(tier)?;
        Some(Self {
            tier,
            reduced_motion,
            ..self.clone()
        })
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "neural_backdrop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native builds have no LocalStorage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = Settings::from_json(r#"{"tier":"Low"}"#).unwrap();
        assert_eq!(settings.tier, TierPreference::Low);
        assert!(settings.trails);
        assert!(!settings.reduced_motion);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            tier: TierPreference::High,
            reduced_motion: true,
            trails: false,
            seed: Some(42),
            log_fps: true,
        };
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back.tier, TierPreference::High);
        assert_eq!(back.seed, Some(42));
        assert!(back.reduced_motion);
        assert!(!back.trails);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{tier:"),
            Err(BackdropError::Settings(_))
        ));
    }

    #[test]
    fn test_reduced_motion_scales_work() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert_eq!(settings.particle_count(PerformanceTier::High), 60);
        assert_eq!(settings.particle_count(PerformanceTier::Low), 30);
        assert!(!settings.effective_trails());
        assert!((settings.animation_speed() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_overrides_keep_other_fields() {
        let base = Settings {
            seed: Some(9),
            trails: false,
            ..Default::default()
        };
        let updated = base.with_overrides("low", true).unwrap();
        assert_eq!(updated.tier, TierPreference::Low);
        assert!(updated.reduced_motion);
        assert_eq!(updated.seed, Some(9));
        assert!(!updated.trails);
        assert!(base.with_overrides("ultra", false).is_none());
    }

    #[test]
    fn test_tier_preference_resolution() {
        assert_eq!(TierPreference::from_str("HIGH"), Some(TierPreference::High));
        assert_eq!(TierPreference::from_str("medium"), None);
        assert_eq!(
            TierPreference::Auto.resolve(PerformanceTier::Low),
            PerformanceTier::Low
        );
        assert_eq!(
            TierPreference::High.resolve(PerformanceTier::Low),
            PerformanceTier::High
        );
    }
}
