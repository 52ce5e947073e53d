//! Timing functions for animations.
//!
//! - [`TimingFunction::Linear`] - Constant speed over a fixed duration
//! - [`TimingFunction::Spring`] - Physics-based spring (can overshoot)

use super::spring::SpringConfig;

/// Timing function that controls the animation curve
#[derive(Clone, Debug, PartialEq)]
pub enum TimingFunction {
    Linear,
    /// Spring physics simulation, driven by real elapsed time
    Spring(SpringConfig),
}

impl TimingFunction {
    /// Evaluate the timing function at normalized time t (0.0 to 1.0).
    ///
    /// Springs are stepped with real elapsed time by `AnimationState`, so
    /// this returns `t` unchanged for them.
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            TimingFunction::Linear => t,
            TimingFunction::Spring(_) => t,
        }
    }

    pub fn spring_config(&self) -> Option<&SpringConfig> {
        match self {
            TimingFunction::Spring(config) => Some(config),
            TimingFunction::Linear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        assert_eq!(TimingFunction::Linear.evaluate(0.5), 0.5);
    }

    #[test]
    fn test_spring_config_lookup() {
        let config = SpringConfig::from_duration(0.4, 0.35);
        let spring = TimingFunction::Spring(config);
        assert_eq!(spring.spring_config(), Some(&config));
        assert!(TimingFunction::Linear.spring_config().is_none());
    }
}
