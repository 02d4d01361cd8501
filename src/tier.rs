//! Host capability classification
//!
//! The browser probe (see `platform::web`) fills in a [`GraphicsProbe`];
//! classifying it is pure so it can be exercised natively.

use serde::{Deserialize, Serialize};

/// Coarse performance classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    High,
    Low,
}

impl PerformanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::High => "High",
            PerformanceTier::Low => "Low",
        }
    }

    /// Particles allocated at startup
    pub fn particle_count(&self) -> usize {
        match self {
            PerformanceTier::High => 120,
            PerformanceTier::Low => 60,
        }
    }

    /// Upper bound on the connection list after a rebuild
    pub fn max_connections(&self) -> usize {
        match self {
            PerformanceTier::High => 10,
            PerformanceTier::Low => 5,
        }
    }
}

/// Renderer name fragments that mark a low-end integrated or software GPU
const LOW_END_RENDERERS: &[&str] = &["intel", "swiftshader", "llvmpipe"];

/// Outcome of querying the host graphics stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsProbe {
    /// A context was created; `renderer` is the unmasked renderer string when
    /// the debug extension is exposed
    Context { renderer: Option<String> },
    /// No WebGL context could be created
    NoContext,
    /// The probe itself threw
    Failed,
}

/// Whether a renderer string names a low-end integrated renderer
pub fn is_low_end_renderer(renderer: &str) -> bool {
    let renderer = renderer.to_lowercase();
    LOW_END_RENDERERS.iter().any(|marker| renderer.contains(marker))
}

/// Pick a tier from the probe result and the reported logical core count.
///
/// Missing concurrency information counts as zero cores.
pub fn classify(probe: &GraphicsProbe, concurrency: Option<u32>) -> PerformanceTier {
    let cores = concurrency.unwrap_or(0);
    let high = match probe {
        GraphicsProbe::Context {
            renderer: Some(renderer),
        } => !is_low_end_renderer(renderer) || cores >= 4,
        GraphicsProbe::Context { renderer: None } => cores >= 4,
        GraphicsProbe::NoContext => false,
        // Relaxed threshold when we know nothing about the GPU
        GraphicsProbe::Failed => cores >= 2,
    };

    if high {
        PerformanceTier::High
    } else {
        PerformanceTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(renderer: &str) -> GraphicsProbe {
        GraphicsProbe::Context {
            renderer: Some(renderer.to_string()),
        }
    }

    #[test]
    fn test_discrete_gpu_is_high_regardless_of_cores() {
        let probe = context("ANGLE (NVIDIA GeForce RTX 3070 Direct3D11)");
        assert_eq!(classify(&probe, Some(1)), PerformanceTier::High);
        assert_eq!(classify(&probe, None), PerformanceTier::High);
    }

    #[test]
    fn test_integrated_gpu_needs_four_cores() {
        let probe = context("ANGLE (Intel(R) UHD Graphics 620)");
        assert_eq!(classify(&probe, Some(2)), PerformanceTier::Low);
        assert_eq!(classify(&probe, Some(4)), PerformanceTier::High);
    }

    #[test]
    fn test_masked_renderer_falls_back_to_cores() {
        let probe = GraphicsProbe::Context { renderer: None };
        assert_eq!(classify(&probe, Some(3)), PerformanceTier::Low);
        assert_eq!(classify(&probe, Some(8)), PerformanceTier::High);
    }

    #[test]
    fn test_no_context_is_low() {
        assert_eq!(classify(&GraphicsProbe::NoContext, Some(16)), PerformanceTier::Low);
    }

    #[test]
    fn test_failed_probe_uses_relaxed_threshold() {
        assert_eq!(classify(&GraphicsProbe::Failed, Some(2)), PerformanceTier::High);
        assert_eq!(classify(&GraphicsProbe::Failed, Some(1)), PerformanceTier::Low);
        assert_eq!(classify(&GraphicsProbe::Failed, None), PerformanceTier::Low);
    }

    #[test]
    fn test_software_renderers_are_low_end() {
        assert!(is_low_end_renderer("Google SwiftShader"));
        assert!(is_low_end_renderer("llvmpipe (LLVM 15.0.7, 256 bits)"));
        assert!(!is_low_end_renderer("Apple M2"));
    }

    #[test]
    fn test_tier_budgets() {
        assert_eq!(PerformanceTier::High.particle_count(), 120);
        assert_eq!(PerformanceTier::Low.particle_count(), 60);
        assert_eq!(PerformanceTier::High.max_connections(), 10);
        assert_eq!(PerformanceTier::Low.max_connections(), 5);
    }
}
