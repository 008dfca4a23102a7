//! Drawing surface abstraction
//!
//! The scene painter only ever talks to a [`Surface`]. Coordinates are play
//! field pixels, origin top-left, y down.

use glam::Vec2;

/// Linear RGBA color
pub type Color = [f32; 4];

/// Something the scene can be painted onto
pub trait Surface {
    /// Fill the whole surface
    fn clear(&mut self, color: Color);
    /// Axis-aligned filled rectangle
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    /// Filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect { min: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Surface that just remembers what was drawn
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rectangles drawn with exactly this color
    pub fn rects_with_color(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { color: c, .. } if *c == color))
            .count()
    }

    /// Number of circles drawn with exactly this color
    pub fn circles_with_color(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { color: c, .. } if *c == color))
            .count()
    }
}

impl Surface for CommandRecorder {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { min, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}
