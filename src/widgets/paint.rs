//! Draw command recording for the host renderer.
//!
//! Widgets never rasterize anything themselves. They record a flat display
//! list into a [`PaintContext`], which the host framework turns into pixels.

use super::widget::{Color, Rect};

/// A single recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill a rectangle in the current coordinate space.
    Rect { rect: Rect, color: Color },
    /// Translate every following command until the matching pop.
    PushTranslation { dx: f32, dy: f32 },
    PopTranslation,
    /// Everything until `EndOverlay` belongs to a full-screen modal layer.
    BeginOverlay,
    EndOverlay,
}

/// Display list recorded during a paint pass.
#[derive(Debug, Default)]
pub struct PaintContext {
    commands: Vec<DrawCommand>,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    /// Record `f` translated by `(dx, dy)`.
    pub fn translated(&mut self, dx: f32, dy: f32, f: impl FnOnce(&mut Self)) {
        self.commands.push(DrawCommand::PushTranslation { dx, dy });
        f(self);
        self.commands.push(DrawCommand::PopTranslation);
    }

    /// Record `f` on the modal overlay layer.
    pub fn overlay(&mut self, f: impl FnOnce(&mut Self)) {
        self.commands.push(DrawCommand::BeginOverlay);
        f(self);
        self.commands.push(DrawCommand::EndOverlay);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
