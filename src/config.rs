use crate::animation::Transition;
use crate::error::{AlertError, Result};
use crate::widgets::Color;

/// How the native container's default background is neutralized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundPolicy {
    /// Clear once on mount. Enough when the host styles synchronously.
    Immediate,
    /// Clear on mount and again on the next loop iteration, if the
    /// container reports that the host restyles it late.
    #[default]
    TwoPhase,
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Backdrop color at full opacity.
    pub backdrop_color: Color,
    /// Slide-up / fade-in transition.
    pub entrance: Transition,
    /// Slide-down / fade-out transition. The overlay is unmounted once its
    /// duration has elapsed.
    pub exit: Transition,
    /// Horizontal inset of the content inside the overlay.
    pub horizontal_padding: f32,
    pub background_policy: BackgroundPolicy,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            backdrop_color: Color::rgba(0.0, 0.0, 0.0, 0.5),
            entrance: Transition::bouncy(400.0, 0.05),
            exit: Transition::snappy(450.0, 0.0),
            horizontal_padding: 16.0,
            background_policy: BackgroundPolicy::TwoPhase,
        }
    }
}

impl AlertConfig {
    pub fn backdrop_color(mut self, color: Color) -> Self {
        self.backdrop_color = color;
        self
    }

    pub fn entrance(mut self, transition: Transition) -> Self {
        self.entrance = transition;
        self
    }

    pub fn exit(mut self, transition: Transition) -> Self {
        self.exit = transition;
        self
    }

    pub fn horizontal_padding(mut self, padding: f32) -> Self {
        self.horizontal_padding = padding;
        self
    }

    pub fn background_policy(mut self, policy: BackgroundPolicy) -> Self {
        self.background_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, transition) in [("entrance", &self.entrance), ("exit", &self.exit)] {
            if !transition.duration_ms.is_finite() || transition.duration_ms <= 0.0 {
                return Err(AlertError::InvalidConfig(format!(
                    "{} duration must be positive, got {}ms",
                    name, transition.duration_ms
                )));
            }
            if !transition.delay_ms.is_finite() || transition.delay_ms < 0.0 {
                return Err(AlertError::InvalidConfig(format!(
                    "{} delay must not be negative, got {}ms",
                    name, transition.delay_ms
                )));
            }
        }
        if !self.horizontal_padding.is_finite() || self.horizontal_padding < 0.0 {
            return Err(AlertError::InvalidConfig(format!(
                "horizontal padding must not be negative, got {}",
                self.horizontal_padding
            )));
        }
        if !(0.0..=1.0).contains(&self.backdrop_color.a) {
            return Err(AlertError::InvalidConfig(format!(
                "backdrop alpha must be within 0..=1, got {}",
                self.backdrop_color.a
            )));
        }
        Ok(())
    }
}
