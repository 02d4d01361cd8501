//! 2D rendering module
//!
//! Immediate-mode drawing over the [`Surface`] trait; geometry for rotated
//! variants is precomputed in `shapes`.

pub mod frame;
pub mod shapes;
pub mod surface;

pub use frame::{clamp_alpha, draw_particle, render_frame};
pub use surface::{Color, DrawCommand, Paint, RadialGradient, RecordingSurface, Surface};
