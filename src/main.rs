//! Neural Backdrop entry point
//!
//! On the web this only installs logging; pages mount the backdrop with
//! `new NeuralBackdrop("backdrop")` and call `unmount()` when the view goes
//! away. Natively it runs the simulation headless and reports what it drew.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use neural_backdrop::platform::web::NeuralBackdrop;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("Neural Backdrop loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neural Backdrop (native) starting...");
    log::info!("Native mode renders headless - run with `trunk serve` for the web version");

    let settings = load_settings(std::env::args().nth(1));
    run_headless(&settings, 600);
}

/// Settings from an optional JSON file, falling back to defaults
#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: Option<String>) -> neural_backdrop::Settings {
    use neural_backdrop::Settings;

    let Some(path) = path else {
        return Settings::load();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match Settings::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("{}: {} - using defaults", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read {}: {} - using defaults", path, e);
            Settings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(settings: &neural_backdrop::Settings, frames: u32) {
    use glam::Vec2;
    use neural_backdrop::renderer::RecordingSurface;
    use neural_backdrop::tier::classify;
    use neural_backdrop::{Backdrop, GraphicsProbe, Viewport};

    // No GPU to query natively; the core count alone decides
    let cores = std::thread::available_parallelism()
        .ok()
        .map(|n| n.get() as u32);
    let tier = classify(&GraphicsProbe::Failed, cores);

    let size = Vec2::new(1280.0, 720.0);
    let mut backdrop = Backdrop::new(settings, tier, 0x5eed, Viewport::new(size, 1.0));
    let mut surface = RecordingSurface::new(size);

    let mut shapes = 0usize;
    for frame in 0..frames {
        let now = frame as f64 * 1000.0 / 60.0;
        // Sweep the pointer across the middle of the surface
        let pointer = Vec2::new((frame as f32 * 4.0) % size.x, size.y / 2.0);
        backdrop.pointer_moved(pointer, now);

        surface.clear();
        backdrop.frame(&mut surface, now);
        shapes += surface.shape_count();
    }

    let state = backdrop.state();
    println!(
        "{} frames, {} particles, {} connection rebuilds, {} live connections, {:.1} shapes/frame, {} fps (simulated clock)",
        frames,
        state.particles.len(),
        state.counters.rebuilds,
        state.connections.len(),
        shapes as f64 / frames.max(1) as f64,
        backdrop.fps()
    );

    backdrop.stop();
}
