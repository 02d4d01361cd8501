//! Immediate-mode 2D drawing surface
//!
//! The renderer only talks to [`Surface`]. The browser canvas implements it in
//! `platform::web`; [`RecordingSurface`] captures calls for tests and
//! headless runs.

use glam::Vec2;

/// A drawing color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Hue in degrees, saturation and lightness in percent
    Hsl { h: f32, s: f32, l: f32 },
    /// Channels 0-255, alpha 0-1
    Rgba { r: u8, g: u8, b: u8, a: f32 },
    Transparent,
}

impl Color {
    pub const fn hsl(h: f32, s: f32, l: f32) -> Self {
        Color::Hsl { h, s, l }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Color::Rgba { r, g, b, a }
    }

    /// CSS color string
    pub fn to_css(&self) -> String {
        match *self {
            Color::Hsl { h, s, l } => format!("hsl({}, {}%, {}%)", h, s, l),
            Color::Rgba { r, g, b, a } => format!("rgba({}, {}, {}, {})", r, g, b, a),
            Color::Transparent => "transparent".to_string(),
        }
    }
}

/// Radial gradient centered on one point, from radius 0 to `radius`
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    /// (offset in [0, 1], color), ascending offsets
    pub stops: Vec<(f32, Color)>,
}

/// Fill style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial(RadialGradient),
}

/// Minimal immediate-mode 2D drawing API
pub trait Surface {
    /// Drawable size in CSS pixels
    fn size(&self) -> Vec2;

    /// Global alpha for subsequent draws, already clamped to [0, 1]
    fn set_global_alpha(&mut self, alpha: f32);

    /// Restore default compositing (source-over)
    fn reset_composite(&mut self);

    fn set_fill(&mut self, paint: &Paint);

    fn set_stroke(&mut self, color: Color, width: f32);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2);

    fn fill_circle(&mut self, center: Vec2, radius: f32);

    fn stroke_line(&mut self, from: Vec2, to: Vec2);

    /// Fill a closed polygon
    fn fill_polygon(&mut self, points: &[Vec2]);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    GlobalAlpha(f32),
    ResetComposite,
    Fill(Paint),
    Stroke { color: Color, width: f32 },
    Rect { origin: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
    Line { from: Vec2, to: Vec2 },
    Polygon(Vec<Vec2>),
}

/// Surface that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Every alpha set through `set_global_alpha`
    pub fn alphas(&self) -> impl Iterator<Item = f32> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::GlobalAlpha(a) => Some(*a),
            _ => None,
        })
    }

    /// Number of shape draws (rects, circles, lines, polygons)
    pub fn shape_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Rect { .. }
                        | DrawCommand::Circle { .. }
                        | DrawCommand::Line { .. }
                        | DrawCommand::Polygon(_)
                )
            })
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn reset_composite(&mut self) {
        self.commands.push(DrawCommand::ResetComposite);
    }

    fn set_fill(&mut self, paint: &Paint) {
        self.commands.push(DrawCommand::Fill(paint.clone()));
    }

    fn set_stroke(&mut self, color: Color, width: f32) {
        self.commands.push(DrawCommand::Stroke { color, width });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Rect { origin, size });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn fill_polygon(&mut self, points: &[Vec2]) {
        self.commands.push(DrawCommand::Polygon(points.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_strings() {
        assert_eq!(Color::hsl(200.0, 100.0, 85.0).to_css(), "hsl(200, 100%, 85%)");
        assert_eq!(Color::rgba(0, 0, 0, 0.08).to_css(), "rgba(0, 0, 0, 0.08)");
        assert_eq!(Color::Transparent.to_css(), "transparent");
    }

    #[test]
    fn test_recording_counts_shapes() {
        let mut surface = RecordingSurface::new(Vec2::new(10.0, 10.0));
        surface.set_global_alpha(0.5);
        surface.fill_circle(Vec2::ZERO, 1.0);
        surface.stroke_line(Vec2::ZERO, Vec2::ONE);
        surface.fill_polygon(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(surface.shape_count(), 3);
        assert_eq!(surface.alphas().collect::<Vec<_>>(), vec![0.5]);
    }
}
