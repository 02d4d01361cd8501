//! Platform abstraction layer
//!
//! Browser bindings for:
//! - Capability probing (WebGL renderer, core count, reduced motion)
//! - The 2D canvas drawing surface
//! - Listener and frame-loop lifetime

#[cfg(target_arch = "wasm32")]
pub mod web;
