//! Sizes and box constraints shared by the host view and the alert overlay.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl Constraints {
    pub fn new(min_width: f32, min_height: f32, max_width: f32, max_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    pub fn tight(size: Size) -> Self {
        Self::new(size.width, size.height, size.width, size.height)
    }

    pub fn loose(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn unbounded() -> Self {
        Self::new(0.0, 0.0, f32::INFINITY, f32::INFINITY)
    }

    pub fn constrain(&self, size: Size) -> Size {
        Size {
            width: size.width.max(self.min_width).min(self.max_width),
            height: size.height.max(self.min_height).min(self.max_height),
        }
    }

    pub fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    /// Shrink the horizontal extent by `inset` on each side.
    ///
    /// Minimums are clamped so the result never becomes unsatisfiable.
    pub fn inset_horizontal(&self, inset: f32) -> Self {
        let max_width = (self.max_width - inset * 2.0).max(0.0);
        Self {
            min_width: self.min_width.min(max_width),
            max_width,
            ..*self
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::unbounded()
    }
}
