mod animatable;
mod spring;
mod state;
mod timing;

pub use animatable::Animatable;
pub use spring::{SpringConfig, SpringState};
pub use state::{AdvanceResult, AnimationState};
pub use timing::TimingFunction;

/// Base bounce of the `bouncy` preset before any extra bounce is added.
const BOUNCY_BASE: f32 = 0.3;
/// `snappy` is critically damped unless extra bounce is requested.
const SNAPPY_BASE: f32 = 0.0;

/// Configuration for how a property should animate when it changes
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the animation in milliseconds
    pub duration_ms: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
    /// Delay before animation starts in milliseconds
    pub delay_ms: f32,
}

impl Transition {
    pub fn new(duration_ms: f32, timing: TimingFunction) -> Self {
        Self {
            duration_ms,
            timing,
            delay_ms: 0.0,
        }
    }

    /// Springy curve with visible overshoot.
    pub fn bouncy(duration_ms: f32, extra_bounce: f32) -> Self {
        Self::perceptual(duration_ms, BOUNCY_BASE + extra_bounce)
    }

    /// Quick, smooth curve; no overshoot unless `extra_bounce > 0`.
    pub fn snappy(duration_ms: f32, extra_bounce: f32) -> Self {
        Self::perceptual(duration_ms, SNAPPY_BASE + extra_bounce)
    }

    fn perceptual(duration_ms: f32, bounce: f32) -> Self {
        let config = SpringConfig::from_duration(duration_ms / 1000.0, bounce);
        Self::new(duration_ms, TimingFunction::Spring(config))
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Delay plus duration, as a `Duration`.
    pub fn total(&self) -> std::time::Duration {
        let micros = ((self.delay_ms + self.duration_ms).max(0.0) * 1000.0).round();
        std::time::Duration::from_micros(micros as u64)
    }
}
